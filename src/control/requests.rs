//! Request bodies and the closed vocabularies they are validated against.
//!
//! Bodies carry plain strings so that an unknown value reaches the control
//! API and is rejected with its own message rather than a generic parse
//! failure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::{ApiError, ApiResult};
use crate::store::{
    LogCategory, LogQuery, ServicePatch, ServiceStatus, SettingsPatch, StartupType,
    DEFAULT_LOG_LIMIT,
};

// ==================
// Remote Access
// ==================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteService {
    Rdp,
    Ssh,
    Vnc,
}

impl RemoteService {
    pub const ALL: [RemoteService; 3] = [RemoteService::Rdp, RemoteService::Ssh, RemoteService::Vnc];

    pub fn parse(value: &str) -> ApiResult<Self> {
        match value {
            "rdp" => Ok(Self::Rdp),
            "ssh" => Ok(Self::Ssh),
            "vnc" => Ok(Self::Vnc),
            _ => Err(ApiError::validation("Invalid service type")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteService::Rdp => "rdp",
            RemoteService::Ssh => "ssh",
            RemoteService::Vnc => "vnc",
        }
    }

    /// Well-known listening port
    pub fn port(&self) -> u16 {
        match self {
            RemoteService::Rdp => 3389,
            RemoteService::Ssh => 22,
            RemoteService::Vnc => 5900,
        }
    }

    /// Patch setting only this service's flag
    pub fn patch(&self, enabled: bool) -> SettingsPatch {
        let mut patch = SettingsPatch::default();
        match self {
            RemoteService::Rdp => patch.rdp_enabled = Some(enabled),
            RemoteService::Ssh => patch.ssh_enabled = Some(enabled),
            RemoteService::Vnc => patch.vnc_enabled = Some(enabled),
        }
        patch
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToggleRemoteAccessRequest {
    pub service: String,
    pub enabled: bool,
}

// ==================
// Firewall
// ==================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallProfile {
    Domain,
    Private,
    Public,
}

impl FirewallProfile {
    pub fn parse(value: &str) -> ApiResult<Self> {
        match value {
            "domain" => Ok(Self::Domain),
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            _ => Err(ApiError::validation("Invalid firewall profile")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FirewallProfile::Domain => "domain",
            FirewallProfile::Private => "private",
            FirewallProfile::Public => "public",
        }
    }

    pub fn patch(&self, enabled: bool) -> SettingsPatch {
        let mut patch = SettingsPatch::default();
        match self {
            FirewallProfile::Domain => patch.firewall_domain_enabled = Some(enabled),
            FirewallProfile::Private => patch.firewall_private_enabled = Some(enabled),
            FirewallProfile::Public => patch.firewall_public_enabled = Some(enabled),
        }
        patch
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToggleFirewallRequest {
    pub profile: String,
    pub enabled: bool,
}

// ==================
// Services
// ==================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Enable,
    Disable,
}

impl ServiceAction {
    pub fn parse(value: &str) -> ApiResult<Self> {
        match value {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            _ => Err(ApiError::validation("Invalid service action")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            ServiceAction::Start => "started",
            ServiceAction::Stop => "stopped",
            ServiceAction::Enable => "enabled",
            ServiceAction::Disable => "disabled",
        }
    }

    /// State transition applied to the service
    pub fn patch(&self) -> ServicePatch {
        match self {
            ServiceAction::Start => ServicePatch {
                status: Some(ServiceStatus::Running),
                startup_type: None,
            },
            ServiceAction::Stop => ServicePatch {
                status: Some(ServiceStatus::Stopped),
                startup_type: None,
            },
            ServiceAction::Enable => ServicePatch {
                status: None,
                startup_type: Some(StartupType::Automatic),
            },
            ServiceAction::Disable => ServicePatch {
                status: Some(ServiceStatus::Stopped),
                startup_type: Some(StartupType::Disabled),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlServiceRequest {
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    StopAll,
    DisableAll,
    ResetAll,
}

impl BulkAction {
    pub fn parse(value: &str) -> ApiResult<Self> {
        match value {
            "stop-all" => Ok(Self::StopAll),
            "disable-all" => Ok(Self::DisableAll),
            "reset-all" => Ok(Self::ResetAll),
            _ => Err(ApiError::validation("Invalid bulk action")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::StopAll => "stop-all",
            BulkAction::DisableAll => "disable-all",
            BulkAction::ResetAll => "reset-all",
        }
    }

    /// Activity-log verb: `stop-all` becomes `STOP_ALL`
    pub fn log_action(&self) -> String {
        self.as_str().to_uppercase().replace('-', "_")
    }

    /// Transition applied to every managed service.
    ///
    /// `reset-all` currently shares the `disable-all` transition.
    pub fn patch(&self) -> ServicePatch {
        match self {
            BulkAction::StopAll => ServicePatch {
                status: Some(ServiceStatus::Stopped),
                startup_type: None,
            },
            BulkAction::DisableAll | BulkAction::ResetAll => ServicePatch {
                status: Some(ServiceStatus::Stopped),
                startup_type: Some(StartupType::Disabled),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkActionRequest {
    pub action: String,
}

// ==================
// Activity Log
// ==================

/// Build a log query from raw query-string parameters.
///
/// `limit` and `offset` read the leading integer of the value, so `10abc`
/// and `10.5` both mean 10. Missing, non-numeric, negative or (for
/// `limit`) zero values fall back to the defaults. An unknown `category`
/// is rejected.
pub fn log_query_from_params(params: &HashMap<String, String>) -> ApiResult<LogQuery> {
    let limit = params
        .get("limit")
        .and_then(|v| leading_integer(v))
        .filter(|v| *v > 0)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(DEFAULT_LOG_LIMIT);

    let offset = params
        .get("offset")
        .and_then(|v| leading_integer(v))
        .filter(|v| *v > 0)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(0);

    Ok(LogQuery {
        limit,
        offset,
        category: category_from_params(params)?,
    })
}

/// Optional sign followed by digits at the start of `value`; the rest is ignored
fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign_len = usize::from(value.starts_with('+') || value.starts_with('-'));
    let digits = value[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    value[..sign_len + digits].parse().ok()
}

pub fn category_from_params(params: &HashMap<String, String>) -> ApiResult<LogCategory> {
    match params.get("category") {
        None => Ok(LogCategory::All),
        Some(value) => LogCategory::parse(value)
            .ok_or_else(|| ApiError::validation(format!("Invalid log category: {}", value))),
    }
}
