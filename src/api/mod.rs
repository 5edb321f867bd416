//! Operator REST API
//!
//! ## Endpoints
//!
//! - `GET /api/v1/health` - Health check (never behind auth)
//! - `GET /api/v1/config` - Stored monitor config
//! - `POST /api/v1/config` - Save monitor config
//! - `GET /api/v1/monitor/status` - Scheduler state and storage summary
//! - `POST /api/v1/monitor/start` - Start with the stored config
//! - `POST /api/v1/monitor/stop` - Stop the schedule
//! - `POST /api/v1/monitor/check` - Run one cycle now
//! - `GET /api/v1/storages` - Last observed storages
//! - `GET /api/v1/notifications` - Notification log, newest first
//! - `POST /api/v1/test/inventory` - Test AList credentials
//! - `POST /api/v1/test/webhook` - Send a test message to a webhook

#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod middleware;
#[cfg(feature = "api")]
pub mod routes;
#[cfg(feature = "api")]
pub mod state;
#[cfg(feature = "api")]
pub mod types;

#[cfg(feature = "api")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "api")]
pub use state::ApiState;

#[cfg(feature = "api")]
use std::net::SocketAddr;

#[cfg(feature = "api")]
use axum::{
    Router,
    routing::{get, post},
};
#[cfg(feature = "api")]
use tracing::info;

#[cfg(feature = "api")]
use crate::config::ApiSettings;

/// Build the API router
#[cfg(feature = "api")]
pub fn router(state: ApiState, settings: &ApiSettings) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let mut protected = Router::new()
        .route(
            "/api/v1/config",
            get(routes::config::get_config).post(routes::config::save_config),
        )
        .route("/api/v1/monitor/status", get(routes::monitor::get_status))
        .route("/api/v1/monitor/start", post(routes::monitor::start))
        .route("/api/v1/monitor/stop", post(routes::monitor::stop))
        .route("/api/v1/monitor/check", post(routes::monitor::check))
        .route("/api/v1/storages", get(routes::storages::list_storages))
        .route(
            "/api/v1/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/v1/test/inventory",
            post(routes::connections::test_inventory),
        )
        .route(
            "/api/v1/test/webhook",
            post(routes::connections::test_webhook),
        );

    if let Some(token) = settings.token.clone() {
        protected = protected.layer(axum::middleware::from_fn_with_state(
            token,
            middleware::auth::auth_middleware,
        ));
    }

    let mut app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if settings.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
#[cfg(feature = "api")]
pub async fn spawn_api_server(settings: &ApiSettings, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", settings.bind);

    let app = router(state, settings);

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {e}");
        }
    });

    Ok(addr)
}
