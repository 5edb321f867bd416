//! Scheduler control endpoints

use axum::{Json, extract::State};

use crate::actors::MonitorOverview;
use crate::api::{error::ApiResult, state::ApiState, types::ActionResponse};
use crate::monitors::CycleReport;

/// GET /api/v1/monitor/status
pub async fn get_status(State(state): State<ApiState>) -> ApiResult<Json<MonitorOverview>> {
    Ok(Json(state.scheduler.overview().await?))
}

/// POST /api/v1/monitor/start
///
/// Starts (or restarts) the schedule with the stored config
pub async fn start(State(state): State<ApiState>) -> ApiResult<Json<ActionResponse>> {
    state.scheduler.start_from_store().await?;
    Ok(Json(ActionResponse::ok("monitor started")))
}

/// POST /api/v1/monitor/stop
pub async fn stop(State(state): State<ApiState>) -> Json<ActionResponse> {
    state.scheduler.stop().await;
    Json(ActionResponse::ok("monitor stopped"))
}

/// POST /api/v1/monitor/check
///
/// Runs one cycle immediately and returns its report
pub async fn check(State(state): State<ApiState>) -> ApiResult<Json<CycleReport>> {
    Ok(Json(state.scheduler.trigger_once().await?))
}
