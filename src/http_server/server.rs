//! # HTTP Server
//!
//! Combines the security and health routers into the dashboard API.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use super::security_routes::security_routes;
use crate::control::ControlApi;
use crate::observability::Logger;

/// Prefix every security route is nested under
pub const API_PREFIX: &str = "/api/security";

/// HTTP Server for the SecureGuard dashboard
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration and a fresh store
    pub fn new() -> Self {
        Self::with_config(HttpServerConfig::default(), Arc::new(ControlApi::new()))
    }

    /// Create a new HTTP server around an existing control API
    pub fn with_config(config: HttpServerConfig, api: Arc<ControlApi>) -> Self {
        let router = Self::build_router(&config, api);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &HttpServerConfig, api: Arc<ControlApi>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            // The desktop shell loads the dashboard from its own origin
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .nest(API_PREFIX, security_routes(api))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        Logger::info(
            "HTTP_SERVER_STARTING",
            &[("addr", bound.as_str()), ("prefix", API_PREFIX)],
        );

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}
