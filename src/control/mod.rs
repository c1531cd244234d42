//! # Control API
//!
//! Translates dashboard requests into store mutations plus one
//! activity-log entry each, and derives the aggregate security status.
//!
//! Mutations follow the same sequence:
//! 1. Validate the request (client error, nothing touched)
//! 2. Apply it to the store
//! 3. Forward it to the system changer, best-effort
//! 4. Append one activity-log entry

mod api;
mod errors;
mod requests;
mod status;
mod system_change;

pub use api::{ControlApi, RequestContext};
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use requests::{
    category_from_params, log_query_from_params, BulkAction, BulkActionRequest,
    ControlServiceRequest, FirewallProfile, RemoteService, ServiceAction, ToggleFirewallRequest,
    ToggleRemoteAccessRequest,
};
pub use status::AggregateStatus;
pub use system_change::{
    ChangeTarget, CommandSystemChanger, DesiredState, NoopSystemChanger, RecordingSystemChanger,
    SystemChange, SystemChangeError, SystemChanger,
};
