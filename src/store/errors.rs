//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entity with the requested id
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u32 },

    /// A previous writer panicked while holding the lock
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

impl StoreError {
    pub fn service_not_found(id: u32) -> Self {
        Self::NotFound {
            entity: "Service",
            id,
        }
    }

    pub fn rule_not_found(id: u32) -> Self {
        Self::NotFound {
            entity: "Firewall rule",
            id,
        }
    }
}
