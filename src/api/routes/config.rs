//! Monitor configuration endpoints

use axum::{Json, extract::State};
use tracing::info;

use crate::api::{error::ApiResult, state::ApiState};
use crate::config::MonitorConfig;

/// GET /api/v1/config
///
/// Returns the stored config, or `null` if none was saved yet
pub async fn get_config(State(state): State<ApiState>) -> ApiResult<Json<Option<MonitorConfig>>> {
    Ok(Json(state.store().get_config().await?))
}

/// POST /api/v1/config
///
/// Overwrites the stored config. A running schedule keeps its snapshot until
/// it is restarted.
pub async fn save_config(
    State(state): State<ApiState>,
    Json(config): Json<MonitorConfig>,
) -> ApiResult<Json<MonitorConfig>> {
    let saved = state.store().save_config(config).await?;
    info!("monitor configuration updated");
    Ok(Json(saved))
}
