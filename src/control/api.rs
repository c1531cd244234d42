//! # Control API
//!
//! Validates dashboard requests, applies them to the [`SecurityStore`],
//! forwards them to the [`SystemChanger`] and records exactly one activity
//! log entry per successful mutation.
//!
//! Validation and not-found failures happen before anything is touched,
//! so a rejected request leaves no trace in the store or the log.

use std::sync::Arc;

use super::errors::{ApiError, ApiResult};
use super::requests::{
    BulkAction, BulkActionRequest, ControlServiceRequest, FirewallProfile, RemoteService,
    ServiceAction, ToggleFirewallRequest, ToggleRemoteAccessRequest,
};
use super::status::AggregateStatus;
use super::system_change::{
    ChangeTarget, DesiredState, NoopSystemChanger, SystemChange, SystemChanger,
};
use crate::observability::Logger;
use crate::store::{
    ActivityLog, FirewallRule, LogCategory, LogQuery, NewActivityLog, SecurityStore,
    SecuritySettings, Service, ServicePatch, SettingsPatch, StartupType,
};

const COMPONENT_SETTINGS: &str = "Security Settings";
const COMPONENT_REMOTE_ACCESS: &str = "Remote Access";
const COMPONENT_FIREWALL: &str = "Firewall";
const COMPONENT_SERVICE: &str = "Service";
const COMPONENT_SERVICES: &str = "Services";

/// Per-request information recorded alongside a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub ip_address: Option<String>,
}

impl RequestContext {
    pub fn from_ip(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip_address.into()),
        }
    }
}

pub struct ControlApi {
    store: SecurityStore,
    changer: Arc<dyn SystemChanger>,
}

impl ControlApi {
    /// Freshly seeded store, host changes discarded
    pub fn new() -> Self {
        Self::with_changer(Arc::new(NoopSystemChanger))
    }

    pub fn with_changer(changer: Arc<dyn SystemChanger>) -> Self {
        Self::with_store(SecurityStore::new(), changer)
    }

    pub fn with_store(store: SecurityStore, changer: Arc<dyn SystemChanger>) -> Self {
        Self { store, changer }
    }

    /// Read access for tests and diagnostics
    pub fn store(&self) -> &SecurityStore {
        &self.store
    }

    // ==================
    // Settings
    // ==================

    pub fn settings(&self) -> ApiResult<SecuritySettings> {
        Ok(self.store.get_security_settings()?)
    }

    pub fn update_settings(
        &self,
        patch: SettingsPatch,
        ctx: &RequestContext,
    ) -> ApiResult<SecuritySettings> {
        let updated = self.store.update_security_settings(&patch)?;

        Logger::info("SETTINGS_UPDATED", &[]);
        self.record(
            NewActivityLog::success(
                "UPDATED",
                COMPONENT_SETTINGS,
                "Security settings updated successfully",
            ),
            ctx,
        );
        Ok(updated)
    }

    // ==================
    // Remote Access
    // ==================

    pub fn toggle_remote_access(
        &self,
        request: ToggleRemoteAccessRequest,
        ctx: &RequestContext,
    ) -> ApiResult<SecuritySettings> {
        let service = RemoteService::parse(&request.service)?;
        let enabled = request.enabled;

        let updated = self.store.update_security_settings(&service.patch(enabled))?;

        self.notify(SystemChange::new(
            ChangeTarget::remote_access(service),
            DesiredState::from_enabled(enabled),
        ));

        let (action, verb) = if enabled {
            ("ENABLED", "allowed")
        } else {
            ("BLOCKED", "blocked")
        };
        Logger::info(
            "REMOTE_ACCESS_TOGGLED",
            &[
                ("service", service.as_str()),
                ("enabled", if enabled { "true" } else { "false" }),
            ],
        );
        self.record(
            NewActivityLog::success(
                action,
                COMPONENT_REMOTE_ACCESS,
                format!(
                    "{} {} on port {}",
                    service.as_str().to_uppercase(),
                    verb,
                    service.port()
                ),
            ),
            ctx,
        );
        Ok(updated)
    }

    /// Turn every remote access service off, whatever the current state
    pub fn block_all_remote_access(&self, ctx: &RequestContext) -> ApiResult<SecuritySettings> {
        let updated = self.store.update_security_settings(&SettingsPatch {
            rdp_enabled: Some(false),
            ssh_enabled: Some(false),
            vnc_enabled: Some(false),
            ..Default::default()
        })?;

        for service in RemoteService::ALL {
            self.notify(SystemChange::new(
                ChangeTarget::remote_access(service),
                DesiredState::Disabled,
            ));
        }

        Logger::info("REMOTE_ACCESS_BLOCKED", &[]);
        self.record(
            NewActivityLog::success(
                "BLOCKED",
                COMPONENT_REMOTE_ACCESS,
                "All remote access connections blocked",
            ),
            ctx,
        );
        Ok(updated)
    }

    // ==================
    // Firewall
    // ==================

    pub fn firewall_rules(&self) -> ApiResult<Vec<FirewallRule>> {
        Ok(self.store.get_firewall_rules()?)
    }

    pub fn toggle_firewall(
        &self,
        request: ToggleFirewallRequest,
        ctx: &RequestContext,
    ) -> ApiResult<SecuritySettings> {
        let profile = FirewallProfile::parse(&request.profile)?;
        let enabled = request.enabled;

        let updated = self.store.update_security_settings(&profile.patch(enabled))?;

        self.notify(SystemChange::new(
            ChangeTarget::FirewallProfile(profile),
            DesiredState::from_enabled(enabled),
        ));

        let (action, state) = if enabled {
            ("ENABLED", "enabled")
        } else {
            ("DISABLED", "disabled")
        };
        Logger::info(
            "FIREWALL_TOGGLED",
            &[("profile", profile.as_str()), ("state", state)],
        );
        self.record(
            NewActivityLog::success(
                action,
                COMPONENT_FIREWALL,
                format!("{} firewall profile {}", profile.as_str(), state),
            ),
            ctx,
        );
        Ok(updated)
    }

    // ==================
    // Services
    // ==================

    pub fn services(&self) -> ApiResult<Vec<Service>> {
        Ok(self.store.get_services()?)
    }

    pub fn control_service(
        &self,
        id: u32,
        request: ControlServiceRequest,
        ctx: &RequestContext,
    ) -> ApiResult<Service> {
        let action = ServiceAction::parse(&request.action)?;
        if self.store.get_service(id)?.is_none() {
            return Err(ApiError::not_found("Service not found"));
        }

        let updated = self.store.update_service(id, &action.patch())?;

        self.notify(SystemChange::new(
            ChangeTarget::Service {
                name: updated.name.clone(),
            },
            desired_for(action),
        ));

        Logger::info(
            "SERVICE_CONTROLLED",
            &[("service", updated.name.as_str()), ("action", action.as_str())],
        );
        self.record(
            NewActivityLog::success(
                action.as_str().to_uppercase(),
                COMPONENT_SERVICE,
                format!("{} {} successfully", updated.display_name, action.past_tense()),
            ),
            ctx,
        );
        Ok(updated)
    }

    /// Apply one transition to every managed service, logged once
    pub fn bulk_service_action(
        &self,
        request: BulkActionRequest,
        ctx: &RequestContext,
    ) -> ApiResult<Vec<Service>> {
        let action = BulkAction::parse(&request.action)?;
        let patch = action.patch();

        let updated = self.store.update_services(&patch)?;

        for service in &updated {
            self.notify(SystemChange::new(
                ChangeTarget::Service {
                    name: service.name.clone(),
                },
                desired_for_patch(&patch),
            ));
        }

        let count = updated.len().to_string();
        Logger::info(
            "SERVICES_BULK_ACTION",
            &[("action", action.as_str()), ("services", count.as_str())],
        );
        self.record(
            NewActivityLog::success(
                action.log_action(),
                COMPONENT_SERVICES,
                format!("Bulk action {} applied to all remote services", action.as_str()),
            ),
            ctx,
        );
        Ok(updated)
    }

    // ==================
    // Activity Log
    // ==================

    pub fn activity_logs(&self, query: &LogQuery) -> ApiResult<Vec<ActivityLog>> {
        Ok(self.store.query_activity_logs(query)?)
    }

    /// CSV rendering of every entry in `category`, newest first
    pub fn export_activity_logs(&self, category: LogCategory) -> ApiResult<String> {
        let logs = self.store.query_activity_logs(&LogQuery {
            limit: usize::MAX,
            offset: 0,
            category,
        })?;

        let mut csv = String::from("Timestamp,Action,Component,Status,Details\n");
        for log in &logs {
            let row = [
                log.timestamp.to_rfc3339(),
                log.action.clone(),
                log.component.clone(),
                log.status.as_str().to_string(),
                log.details.clone(),
            ];
            let quoted: Vec<String> = row.iter().map(|field| csv_quote(field)).collect();
            csv.push_str(&quoted.join(","));
            csv.push('\n');
        }
        Ok(csv)
    }

    // ==================
    // Status
    // ==================

    pub fn status(&self) -> ApiResult<AggregateStatus> {
        let settings = self.store.get_security_settings()?;
        let services = self.store.get_services()?;
        let rules = self.store.get_firewall_rules()?;
        Ok(AggregateStatus::compute(&settings, &services, &rules))
    }

    // ==================
    // Internals
    // ==================

    /// Forward a change to the host; failures are logged and dropped
    fn notify(&self, change: SystemChange) {
        if let Err(e) = self.changer.apply(&change) {
            let target = change.target.name();
            let error = e.to_string();
            Logger::warn(
                "SYSTEM_CHANGE_FAILED",
                &[
                    ("changer", self.changer.name()),
                    ("target", target.as_str()),
                    ("desired", change.desired.as_str()),
                    ("error", error.as_str()),
                ],
            );
        }
    }

    /// Append the entry for a mutation that already happened. A failed
    /// append does not undo the mutation.
    fn record(&self, entry: NewActivityLog, ctx: &RequestContext) {
        let entry = entry.with_ip(ctx.ip_address.clone());
        if let Err(e) = self.store.create_activity_log(entry) {
            let error = e.to_string();
            Logger::error("ACTIVITY_LOG_WRITE_FAILED", &[("error", error.as_str())]);
        }
    }
}

impl Default for ControlApi {
    fn default() -> Self {
        Self::new()
    }
}

fn desired_for(action: ServiceAction) -> DesiredState {
    match action {
        ServiceAction::Start => DesiredState::Running,
        ServiceAction::Stop => DesiredState::Stopped,
        ServiceAction::Enable => DesiredState::Enabled,
        ServiceAction::Disable => DesiredState::Disabled,
    }
}

fn desired_for_patch(patch: &ServicePatch) -> DesiredState {
    match patch.startup_type {
        Some(StartupType::Disabled) => DesiredState::Disabled,
        _ => DesiredState::Stopped,
    }
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
