use axum::{Json, extract::State};

use crate::api::{error::ApiResult, state::ApiState, types::NotificationsResponse};

/// GET /api/v1/notifications
///
/// Newest first
pub async fn list_notifications(
    State(state): State<ApiState>,
) -> ApiResult<Json<NotificationsResponse>> {
    let notifications = state.store().list_notifications().await?;
    Ok(Json(NotificationsResponse {
        count: notifications.len(),
        notifications,
    }))
}
