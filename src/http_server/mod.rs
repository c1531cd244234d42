//! # SecureGuard HTTP Server Module
//!
//! HTTP API consumed by the dashboard UI.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/security/settings` - Settings singleton (GET, PATCH)
//! - `/api/security/remote-access/*` - RDP/SSH/VNC toggles
//! - `/api/security/firewall/*` - Firewall rules and profiles
//! - `/api/security/services/*` - Managed service control
//! - `/api/security/logs` - Activity log (JSON, CSV export)
//! - `/api/security/status` - Aggregate status and score

pub mod config;
pub mod observability_routes;
pub mod security_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::{HttpServer, API_PREFIX};
