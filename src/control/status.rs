//! Aggregate security status
//!
//! Derived on every read from the store's current contents; never cached.

use serde::{Deserialize, Serialize};

use crate::store::{FirewallRule, SecuritySettings, Service, ServiceStatus};

const REMOTE_ACCESS_WEIGHT: u32 = 30;
const FIREWALL_WEIGHT: u32 = 25;
const SERVICES_WEIGHT: u32 = 20;
const BLOCK_RULE_WEIGHT: u32 = 5;
const BLOCK_RULES_CAP: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatus {
    pub remote_access_blocked: bool,
    pub firewall_active: bool,
    pub services_stopped: bool,
    pub security_score: u32,
    pub active_block_rules: u32,
    pub system_online: bool,
}

impl AggregateStatus {
    pub fn compute(
        settings: &SecuritySettings,
        services: &[Service],
        rules: &[FirewallRule],
    ) -> Self {
        let remote_access_blocked =
            !settings.rdp_enabled && !settings.ssh_enabled && !settings.vnc_enabled;
        let firewall_active = settings.firewall_domain_enabled
            && settings.firewall_private_enabled
            && settings.firewall_public_enabled;
        let services_stopped = services.iter().all(|s| s.status == ServiceStatus::Stopped);
        let active_block_rules = rules.iter().filter(|r| r.is_active_block()).count() as u32;

        let mut security_score = 0;
        if remote_access_blocked {
            security_score += REMOTE_ACCESS_WEIGHT;
        }
        if firewall_active {
            security_score += FIREWALL_WEIGHT;
        }
        if services_stopped {
            security_score += SERVICES_WEIGHT;
        }
        security_score += active_block_rules
            .saturating_mul(BLOCK_RULE_WEIGHT)
            .min(BLOCK_RULES_CAP);

        Self {
            remote_access_blocked,
            firewall_active,
            services_stopped,
            security_score,
            active_block_rules,
            system_online: true,
        }
    }
}
