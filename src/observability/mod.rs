//! Observability for SecureGuard
//!
//! Structured JSON logging of control-plane events. Observability is
//! read-only and never affects a request's outcome.
//!
//! ```ignore
//! use secureguard::observability::Logger;
//!
//! Logger::info("FIREWALL_TOGGLED", &[("profile", "public"), ("enabled", "true")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
