//! # Security Store
//!
//! Sole owner of the dashboard's mutable state: the settings singleton,
//! the managed services, the firewall rules and the append-only activity
//! log. In-memory only.

mod errors;
mod memory;
mod model;

pub use errors::{StoreError, StoreResult};
pub use memory::SecurityStore;
pub use model::{
    ActivityLog, Direction, FirewallRule, FirewallRulePatch, LogCategory, LogQuery, LogStatus,
    NewActivityLog, NewFirewallRule, Protocol, RuleAction, SecuritySettings, Service,
    ServicePatch, ServiceStatus, SettingsPatch, StartupType, DEFAULT_LOG_LIMIT, SETTINGS_ID,
};
