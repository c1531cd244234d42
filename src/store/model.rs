//! Store entities
//!
//! Wire shapes follow the dashboard client: camelCase field names,
//! lowercase enum values, RFC 3339 timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed id of the settings singleton
pub const SETTINGS_ID: u32 = 1;

// ==================
// Security Settings
// ==================

/// Remote access and firewall profile flags.
///
/// Exactly one instance lives in the store. Updates build a complete new
/// value and swap it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub id: u32,
    pub rdp_enabled: bool,
    pub ssh_enabled: bool,
    pub vnc_enabled: bool,
    pub firewall_domain_enabled: bool,
    pub firewall_private_enabled: bool,
    pub firewall_public_enabled: bool,
    pub last_updated: DateTime<Utc>,
}

impl SecuritySettings {
    /// Hardened defaults: remote access off, every firewall profile on
    pub fn hardened(now: DateTime<Utc>) -> Self {
        Self {
            id: SETTINGS_ID,
            rdp_enabled: false,
            ssh_enabled: false,
            vnc_enabled: false,
            firewall_domain_enabled: true,
            firewall_private_enabled: true,
            firewall_public_enabled: true,
            last_updated: now,
        }
    }

    /// Merge a patch into a new value stamped with `now`
    pub fn merged(&self, patch: &SettingsPatch, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            rdp_enabled: patch.rdp_enabled.unwrap_or(self.rdp_enabled),
            ssh_enabled: patch.ssh_enabled.unwrap_or(self.ssh_enabled),
            vnc_enabled: patch.vnc_enabled.unwrap_or(self.vnc_enabled),
            firewall_domain_enabled: patch
                .firewall_domain_enabled
                .unwrap_or(self.firewall_domain_enabled),
            firewall_private_enabled: patch
                .firewall_private_enabled
                .unwrap_or(self.firewall_private_enabled),
            firewall_public_enabled: patch
                .firewall_public_enabled
                .unwrap_or(self.firewall_public_enabled),
            last_updated: now,
        }
    }
}

/// Partial settings update. Absent fields keep their current value.
///
/// Also the body of `PATCH /settings`; unknown keys (including `id` and
/// `lastUpdated`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdp_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnc_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_domain_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_private_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_public_enabled: Option<bool>,
}

// ==================
// Services
// ==================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupType {
    Automatic,
    Manual,
    Disabled,
}

/// A managed Windows service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub status: ServiceStatus,
    pub startup_type: StartupType,
}

impl Service {
    pub fn apply(&mut self, patch: &ServicePatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(startup_type) = patch.startup_type {
            self.startup_type = startup_type;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServicePatch {
    pub status: Option<ServiceStatus>,
    pub startup_type: Option<StartupType>,
}

// ==================
// Firewall Rules
// ==================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    pub id: u32,
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    pub direction: Direction,
    pub action: RuleAction,
    pub is_active: bool,
}

impl FirewallRule {
    /// Active block rules count towards the security score
    pub fn is_active_block(&self) -> bool {
        self.is_active && self.action == RuleAction::Block
    }

    pub fn apply(&mut self, patch: &FirewallRulePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(port) = patch.port {
            self.port = port;
        }
        if let Some(protocol) = patch.protocol {
            self.protocol = protocol;
        }
        if let Some(direction) = patch.direction {
            self.direction = direction;
        }
        if let Some(action) = patch.action {
            self.action = action;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }
}

/// Rule fields supplied on creation; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFirewallRule {
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    pub direction: Direction,
    pub action: RuleAction,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRulePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub action: Option<RuleAction>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// ==================
// Activity Log
// ==================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Error => "error",
        }
    }
}

/// One entry of the append-only activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub component: String,
    pub status: LogStatus,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Log entry fields supplied by callers; id and timestamp are server-assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivityLog {
    pub action: String,
    pub component: String,
    pub status: LogStatus,
    pub details: String,
    pub ip_address: Option<String>,
}

impl NewActivityLog {
    /// Successful entry without a client address
    pub fn success(
        action: impl Into<String>,
        component: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            component: component.into(),
            status: LogStatus::Success,
            details: details.into(),
            ip_address: None,
        }
    }

    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

/// Dashboard log filter tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    #[default]
    All,
    Firewall,
    Services,
    Connections,
}

impl LogCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "firewall" => Some(Self::Firewall),
            "services" => Some(Self::Services),
            "connections" => Some(Self::Connections),
            _ => None,
        }
    }

    pub fn matches(&self, log: &ActivityLog) -> bool {
        match self {
            LogCategory::All => true,
            LogCategory::Firewall => log.component == "Firewall",
            LogCategory::Services => log.component == "Service" || log.component == "Services",
            LogCategory::Connections => log.component == "Remote Access",
        }
    }
}

/// Paginated log read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub limit: usize,
    pub offset: usize,
    pub category: LogCategory,
}

pub const DEFAULT_LOG_LIMIT: usize = 50;

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOG_LIMIT,
            offset: 0,
            category: LogCategory::All,
        }
    }
}
