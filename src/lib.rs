//! secureguard - local control service for the SecureGuard dashboard
//!
//! Holds simulated Windows remote-access, firewall and service settings in
//! memory, exposes them over a JSON HTTP API and records every change in
//! an activity log.

pub mod cli;
pub mod control;
pub mod http_server;
pub mod observability;
pub mod store;
