//! System change collaborator
//!
//! After an in-memory mutation the control API asks a [`SystemChanger`] to
//! apply the same change to the host. The result is only logged: the
//! response and the activity log report success either way.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;

use thiserror::Error;

use super::requests::{FirewallProfile, RemoteService};

/// What a change is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeTarget {
    RemoteAccess { service: RemoteService, port: u16 },
    FirewallProfile(FirewallProfile),
    Service { name: String },
}

impl ChangeTarget {
    pub fn remote_access(service: RemoteService) -> Self {
        Self::RemoteAccess {
            service,
            port: service.port(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChangeTarget::RemoteAccess { .. } => "remote-access",
            ChangeTarget::FirewallProfile(_) => "firewall-profile",
            ChangeTarget::Service { .. } => "service",
        }
    }

    pub fn name(&self) -> String {
        match self {
            ChangeTarget::RemoteAccess { service, port } => {
                format!("{}:{}", service.as_str(), port)
            }
            ChangeTarget::FirewallProfile(profile) => profile.as_str().to_string(),
            ChangeTarget::Service { name } => name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Enabled,
    Disabled,
    Running,
    Stopped,
}

impl DesiredState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Enabled => "enabled",
            DesiredState::Disabled => "disabled",
            DesiredState::Running => "running",
            DesiredState::Stopped => "stopped",
        }
    }

    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemChange {
    pub target: ChangeTarget,
    pub desired: DesiredState,
}

impl SystemChange {
    pub fn new(target: ChangeTarget, desired: DesiredState) -> Self {
        Self { target, desired }
    }
}

impl fmt::Display for SystemChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.target.kind(),
            self.target.name(),
            self.desired.as_str()
        )
    }
}

#[derive(Debug, Error)]
pub enum SystemChangeError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no async runtime available to supervise {0}")]
    NoRuntime(String),

    #[error("system change rejected: {0}")]
    Rejected(String),
}

/// Applies dashboard changes to the host, best-effort
pub trait SystemChanger: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn apply(&self, change: &SystemChange) -> Result<(), SystemChangeError>;
}

/// Leaves the host untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSystemChanger;

impl SystemChanger for NoopSystemChanger {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn apply(&self, _change: &SystemChange) -> Result<(), SystemChangeError> {
        Ok(())
    }
}

/// Spawns `program [args..] <kind> <target> <state>` and does not wait for it.
///
/// The child is handed to tokio, which reaps it once it exits. Only a
/// failure to spawn is reported.
#[derive(Debug, Clone)]
pub struct CommandSystemChanger {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSystemChanger {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argument list for one change
    pub fn command_args(&self, change: &SystemChange) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(change.target.kind().to_string());
        args.push(change.target.name());
        args.push(change.desired.as_str().to_string());
        args
    }
}

impl SystemChanger for CommandSystemChanger {
    fn name(&self) -> &'static str {
        "command"
    }

    fn apply(&self, change: &SystemChange) -> Result<(), SystemChangeError> {
        let program = self.program.display().to_string();
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(SystemChangeError::NoRuntime(program));
        }

        tokio::process::Command::new(&self.program)
            .args(self.command_args(change))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|source| SystemChangeError::Spawn { program, source })
    }
}

/// Keeps every requested change in memory; optionally fails each one
#[derive(Debug, Default)]
pub struct RecordingSystemChanger {
    changes: Mutex<Vec<SystemChange>>,
    fail: bool,
}

impl RecordingSystemChanger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records changes but reports every one as rejected
    pub fn failing() -> Self {
        Self {
            changes: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn changes(&self) -> Vec<SystemChange> {
        self.changes
            .lock()
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }
}

impl SystemChanger for RecordingSystemChanger {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn apply(&self, change: &SystemChange) -> Result<(), SystemChangeError> {
        if let Ok(mut changes) = self.changes.lock() {
            changes.push(change.clone());
        }
        if self.fail {
            return Err(SystemChangeError::Rejected(change.to_string()));
        }
        Ok(())
    }
}
