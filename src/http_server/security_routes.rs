//! Security HTTP Routes
//!
//! Thin axum handlers over [`ControlApi`]. Each handler extracts the
//! request, turns framework rejections into validation errors and
//! delegates.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::control::{
    category_from_params, log_query_from_params, AggregateStatus, ApiError, ApiResult,
    BulkActionRequest, ControlApi, ControlServiceRequest, RequestContext, ToggleFirewallRequest,
    ToggleRemoteAccessRequest,
};
use crate::observability::Logger;
use crate::store::{ActivityLog, FirewallRule, SecuritySettings, Service, SettingsPatch};

type ApiState = Arc<ControlApi>;

/// Create security routes
pub fn security_routes(api: Arc<ControlApi>) -> Router {
    Router::new()
        // Settings
        .route("/settings", get(get_settings_handler).patch(update_settings_handler))
        // Remote access
        .route("/remote-access/toggle", post(toggle_remote_access_handler))
        .route("/remote-access/block-all", post(block_all_handler))
        // Firewall
        .route("/firewall/rules", get(firewall_rules_handler))
        .route("/firewall/toggle", post(toggle_firewall_handler))
        // Services
        .route("/services", get(services_handler))
        .route("/services/bulk-action", post(bulk_action_handler))
        .route("/services/:id/control", post(control_service_handler))
        // Activity log
        .route("/logs", get(logs_handler))
        .route("/logs/export", get(export_logs_handler))
        // Aggregate status
        .route("/status", get(status_handler))
        .with_state(api)
}

// ==================
// Helpers
// ==================

/// Unwrap a JSON body, reporting any rejection as a 400
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>, message: &str) -> ApiResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let reason = rejection.body_text();
            Logger::warn(
                "REQUEST_REJECTED",
                &[("message", message), ("reason", reason.as_str())],
            );
            Err(ApiError::validation(message))
        }
    }
}

fn request_context(connect_info: Option<ConnectInfo<SocketAddr>>) -> RequestContext {
    match connect_info {
        Some(ConnectInfo(addr)) => RequestContext::from_ip(addr.ip().to_string()),
        None => RequestContext::default(),
    }
}

// ==================
// Settings Handlers
// ==================

async fn get_settings_handler(State(api): State<ApiState>) -> ApiResult<Json<SecuritySettings>> {
    Ok(Json(api.settings()?))
}

async fn update_settings_handler(
    State(api): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> ApiResult<Json<SecuritySettings>> {
    let patch = parse_body(payload, "Invalid security settings data")?;
    let ctx = request_context(connect_info);
    Ok(Json(api.update_settings(patch, &ctx)?))
}

// ==================
// Remote Access Handlers
// ==================

async fn toggle_remote_access_handler(
    State(api): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<ToggleRemoteAccessRequest>, JsonRejection>,
) -> ApiResult<Json<SecuritySettings>> {
    let request = parse_body(payload, "Invalid remote access request")?;
    let ctx = request_context(connect_info);
    Ok(Json(api.toggle_remote_access(request, &ctx)?))
}

async fn block_all_handler(
    State(api): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ApiResult<Json<SecuritySettings>> {
    let ctx = request_context(connect_info);
    Ok(Json(api.block_all_remote_access(&ctx)?))
}

// ==================
// Firewall Handlers
// ==================

async fn firewall_rules_handler(State(api): State<ApiState>) -> ApiResult<Json<Vec<FirewallRule>>> {
    Ok(Json(api.firewall_rules()?))
}

async fn toggle_firewall_handler(
    State(api): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<ToggleFirewallRequest>, JsonRejection>,
) -> ApiResult<Json<SecuritySettings>> {
    let request = parse_body(payload, "Invalid firewall request")?;
    let ctx = request_context(connect_info);
    Ok(Json(api.toggle_firewall(request, &ctx)?))
}

// ==================
// Service Handlers
// ==================

async fn services_handler(State(api): State<ApiState>) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(api.services()?))
}

async fn control_service_handler(
    State(api): State<ApiState>,
    Path(id): Path<String>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<ControlServiceRequest>, JsonRejection>,
) -> ApiResult<Json<Service>> {
    let request = parse_body(payload, "Invalid service action")?;
    // A non-numeric id can never name a service
    let id: u32 = id
        .parse()
        .map_err(|_| ApiError::not_found("Service not found"))?;
    let ctx = request_context(connect_info);
    Ok(Json(api.control_service(id, request, &ctx)?))
}

async fn bulk_action_handler(
    State(api): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<BulkActionRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Service>>> {
    let request = parse_body(payload, "Invalid bulk action")?;
    let ctx = request_context(connect_info);
    Ok(Json(api.bulk_service_action(request, &ctx)?))
}

// ==================
// Activity Log Handlers
// ==================

async fn logs_handler(
    State(api): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let query = log_query_from_params(&params)?;
    Ok(Json(api.activity_logs(&query)?))
}

async fn export_logs_handler(
    State(api): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let category = category_from_params(&params)?;
    let csv = api.export_activity_logs(category)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"activity-logs.csv\"",
            ),
        ],
        csv,
    ))
}

// ==================
// Status Handler
// ==================

async fn status_handler(State(api): State<ApiState>) -> ApiResult<Json<AggregateStatus>> {
    Ok(Json(api.status()?))
}
