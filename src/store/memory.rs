//! In-memory security store
//!
//! One `RwLock` per entity class: the settings singleton, the service
//! table, the firewall rule table and the activity log. Every
//! read-modify-write runs under a single write guard, so writers of one
//! class are serialized and never observe a half-applied update. Callers
//! always receive clones.
//!
//! Data is lost on restart.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::errors::{StoreError, StoreResult};
use super::model::{
    ActivityLog, Direction, FirewallRule, FirewallRulePatch, LogQuery, NewActivityLog,
    NewFirewallRule, Protocol, RuleAction, SecuritySettings, Service, ServicePatch,
    ServiceStatus, SettingsPatch, StartupType,
};

/// Id-keyed table that owns its own id counter
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<u32, T>,
    next_id: u32,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(u32) -> T) -> &T {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.entry(id).or_insert(build(id))
    }
}

#[derive(Debug)]
struct LogTable {
    entries: Vec<ActivityLog>,
    next_id: u64,
}

/// Process-lifetime owner of all dashboard state
#[derive(Debug)]
pub struct SecurityStore {
    settings: RwLock<SecuritySettings>,
    services: RwLock<Table<Service>>,
    rules: RwLock<Table<FirewallRule>>,
    logs: RwLock<LogTable>,
}

fn read<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> StoreResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| StoreError::Poisoned(name))
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> StoreResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| StoreError::Poisoned(name))
}

impl SecurityStore {
    /// Store seeded with hardened settings, the three managed remote
    /// services and the four inbound block rules.
    pub fn new() -> Self {
        let mut services = Table::new();
        for (name, display_name, description) in [
            (
                "TermService",
                "Terminal Services",
                "Remote Desktop Protocol service",
            ),
            (
                "RemoteRegistry",
                "Remote Registry",
                "Remote registry access service",
            ),
            (
                "RasMan",
                "Remote Access Manager",
                "VPN and dial-up connection manager",
            ),
        ] {
            services.insert_with(|id| Service {
                id,
                name: name.to_string(),
                display_name: display_name.to_string(),
                description: description.to_string(),
                status: ServiceStatus::Stopped,
                startup_type: StartupType::Disabled,
            });
        }

        let mut rules = Table::new();
        for (name, port, protocol) in [
            ("Block RDP TCP", 3389, Protocol::Tcp),
            ("Block RDP UDP", 3389, Protocol::Udp),
            ("Block SSH", 22, Protocol::Tcp),
            ("Block VNC", 5900, Protocol::Tcp),
        ] {
            rules.insert_with(|id| FirewallRule {
                id,
                name: name.to_string(),
                port,
                protocol,
                direction: Direction::Inbound,
                action: RuleAction::Block,
                is_active: true,
            });
        }

        Self {
            settings: RwLock::new(SecuritySettings::hardened(Utc::now())),
            services: RwLock::new(services),
            rules: RwLock::new(rules),
            logs: RwLock::new(LogTable {
                entries: Vec::new(),
                next_id: 1,
            }),
        }
    }

    // ==================
    // Settings
    // ==================

    pub fn get_security_settings(&self) -> StoreResult<SecuritySettings> {
        Ok(read(&self.settings, "settings")?.clone())
    }

    /// Merge `patch` onto the current settings and swap in the result
    pub fn update_security_settings(&self, patch: &SettingsPatch) -> StoreResult<SecuritySettings> {
        let mut settings = write(&self.settings, "settings")?;
        let updated = settings.merged(patch, Utc::now());
        *settings = updated.clone();
        Ok(updated)
    }

    // ==================
    // Services
    // ==================

    pub fn get_services(&self) -> StoreResult<Vec<Service>> {
        Ok(read(&self.services, "services")?
            .rows
            .values()
            .cloned()
            .collect())
    }

    pub fn get_service(&self, id: u32) -> StoreResult<Option<Service>> {
        Ok(read(&self.services, "services")?.rows.get(&id).cloned())
    }

    pub fn update_service(&self, id: u32, patch: &ServicePatch) -> StoreResult<Service> {
        let mut services = write(&self.services, "services")?;
        let service = services
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::service_not_found(id))?;
        service.apply(patch);
        Ok(service.clone())
    }

    /// Apply one patch to every managed service under a single guard
    pub fn update_services(&self, patch: &ServicePatch) -> StoreResult<Vec<Service>> {
        let mut services = write(&self.services, "services")?;
        Ok(services
            .rows
            .values_mut()
            .map(|service| {
                service.apply(patch);
                service.clone()
            })
            .collect())
    }

    // ==================
    // Firewall Rules
    // ==================

    pub fn get_firewall_rules(&self) -> StoreResult<Vec<FirewallRule>> {
        Ok(read(&self.rules, "firewall rules")?
            .rows
            .values()
            .cloned()
            .collect())
    }

    pub fn create_firewall_rule(&self, rule: NewFirewallRule) -> StoreResult<FirewallRule> {
        let mut rules = write(&self.rules, "firewall rules")?;
        let created = rules.insert_with(|id| FirewallRule {
            id,
            name: rule.name,
            port: rule.port,
            protocol: rule.protocol,
            direction: rule.direction,
            action: rule.action,
            is_active: rule.is_active,
        });
        Ok(created.clone())
    }

    pub fn update_firewall_rule(
        &self,
        id: u32,
        patch: &FirewallRulePatch,
    ) -> StoreResult<FirewallRule> {
        let mut rules = write(&self.rules, "firewall rules")?;
        let rule = rules
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::rule_not_found(id))?;
        rule.apply(patch);
        Ok(rule.clone())
    }

    pub fn delete_firewall_rule(&self, id: u32) -> StoreResult<()> {
        let mut rules = write(&self.rules, "firewall rules")?;
        rules
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::rule_not_found(id))
    }

    // ==================
    // Activity Log
    // ==================

    /// Newest-first page of the whole log
    pub fn get_activity_logs(&self, limit: usize, offset: usize) -> StoreResult<Vec<ActivityLog>> {
        self.query_activity_logs(&LogQuery {
            limit,
            offset,
            ..Default::default()
        })
    }

    /// Newest-first page of the entries matching `query.category`.
    ///
    /// Ordered by timestamp descending; entries sharing a timestamp are
    /// ordered by id descending. An offset past the end yields an empty page.
    pub fn query_activity_logs(&self, query: &LogQuery) -> StoreResult<Vec<ActivityLog>> {
        let logs = read(&self.logs, "activity log")?;
        let mut matching: Vec<&ActivityLog> = logs
            .entries
            .iter()
            .filter(|log| query.category.matches(log))
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    /// Append an entry, assigning the next id and the current time
    pub fn create_activity_log(&self, entry: NewActivityLog) -> StoreResult<ActivityLog> {
        let mut logs = write(&self.logs, "activity log")?;
        let record = ActivityLog {
            id: logs.next_id,
            timestamp: Utc::now(),
            action: entry.action,
            component: entry.component,
            status: entry.status,
            details: entry.details,
            ip_address: entry.ip_address,
        };
        logs.next_id += 1;
        logs.entries.push(record.clone());
        Ok(record)
    }

    pub fn activity_log_len(&self) -> StoreResult<usize> {
        Ok(read(&self.logs, "activity log")?.entries.len())
    }
}

impl Default for SecurityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::model::LogCategory;

    #[test]
    fn test_seeded_state() {
        let store = SecurityStore::new();

        let settings = store.get_security_settings().unwrap();
        assert!(!settings.rdp_enabled && !settings.ssh_enabled && !settings.vnc_enabled);
        assert!(settings.firewall_domain_enabled);

        let services = store.get_services().unwrap();
        let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["TermService", "RemoteRegistry", "RasMan"]);
        assert_eq!(
            services.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let rules = store.get_firewall_rules().unwrap();
        assert_eq!(rules.len(), 4);
        assert!(rules.iter().all(FirewallRule::is_active_block));
        assert_eq!(store.activity_log_len().unwrap(), 0);
    }

    #[test]
    fn test_update_settings_stamps_time() {
        let store = SecurityStore::new();
        let before = store.get_security_settings().unwrap();

        let updated = store
            .update_security_settings(&SettingsPatch {
                rdp_enabled: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert!(updated.rdp_enabled);
        assert!(updated.last_updated >= before.last_updated);
        assert_eq!(store.get_security_settings().unwrap(), updated);
    }

    #[test]
    fn test_returned_values_are_copies() {
        let store = SecurityStore::new();
        let mut services = store.get_services().unwrap();
        services[0].status = ServiceStatus::Running;
        assert_eq!(
            store.get_service(1).unwrap().unwrap().status,
            ServiceStatus::Stopped
        );
    }

    #[test]
    fn test_update_unknown_service() {
        let store = SecurityStore::new();
        let err = store
            .update_service(999, &ServicePatch::default())
            .unwrap_err();
        assert_eq!(err, StoreError::service_not_found(999));
    }

    #[test]
    fn test_update_service_merges() {
        let store = SecurityStore::new();
        let updated = store
            .update_service(
                2,
                &ServicePatch {
                    status: Some(ServiceStatus::Running),
                    startup_type: None,
                },
            )
            .unwrap();
        assert_eq!(updated.status, ServiceStatus::Running);
        assert_eq!(updated.startup_type, StartupType::Disabled);
    }

    #[test]
    fn test_firewall_rule_crud() {
        let store = SecurityStore::new();

        let created = store
            .create_firewall_rule(NewFirewallRule {
                name: "Allow HTTPS".to_string(),
                port: 443,
                protocol: Protocol::Tcp,
                direction: Direction::Outbound,
                action: RuleAction::Allow,
                is_active: true,
            })
            .unwrap();
        assert_eq!(created.id, 5);

        let updated = store
            .update_firewall_rule(
                created.id,
                &FirewallRulePatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.port, 443);

        store.delete_firewall_rule(created.id).unwrap();
        assert_eq!(store.get_firewall_rules().unwrap().len(), 4);

        assert_eq!(
            store.delete_firewall_rule(created.id),
            Err(StoreError::rule_not_found(created.id))
        );
        assert!(store
            .update_firewall_rule(42, &FirewallRulePatch::default())
            .is_err());
    }

    #[test]
    fn test_log_ids_increase() {
        let store = SecurityStore::new();
        let first = store
            .create_activity_log(NewActivityLog::success("UPDATED", "Security Settings", "a"))
            .unwrap();
        let second = store
            .create_activity_log(NewActivityLog::success("BLOCKED", "Remote Access", "b"))
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_logs_newest_first_and_paginated() {
        let store = SecurityStore::new();
        for i in 0..15 {
            store
                .create_activity_log(NewActivityLog::success(
                    "UPDATED",
                    "Security Settings",
                    format!("entry {}", i),
                ))
                .unwrap();
        }

        let page = store.get_activity_logs(10, 0).unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].details, "entry 14");
        assert!(page.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        let rest = store.get_activity_logs(10, 10).unwrap();
        assert_eq!(rest.len(), 5);
        assert_eq!(rest[4].details, "entry 0");

        assert!(store.get_activity_logs(10, 100).unwrap().is_empty());
    }

    #[test]
    fn test_category_filter_before_pagination() {
        let store = SecurityStore::new();
        store
            .create_activity_log(NewActivityLog::success("ENABLED", "Firewall", "f1"))
            .unwrap();
        store
            .create_activity_log(NewActivityLog::success("STOP", "Service", "s1"))
            .unwrap();
        store
            .create_activity_log(NewActivityLog::success("DISABLED", "Firewall", "f2"))
            .unwrap();

        let firewall = store
            .query_activity_logs(&LogQuery {
                limit: 1,
                offset: 1,
                category: LogCategory::Firewall,
            })
            .unwrap();
        assert_eq!(firewall.len(), 1);
        assert_eq!(firewall[0].details, "f1");
    }
}
