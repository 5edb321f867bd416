//! Connection test endpoints
//!
//! These check credentials before they are saved, so they take the endpoint
//! from the request body instead of the stored config.

use axum::{Json, extract::State};
use tracing::debug;

use crate::api::{
    error::{ApiError, ApiResult},
    state::ApiState,
    types::{ActionResponse, InventoryTestRequest, WebhookTestRequest},
};
use crate::config::InventoryTarget;

/// POST /api/v1/test/inventory
pub async fn test_inventory(
    State(state): State<ApiState>,
    Json(request): Json<InventoryTestRequest>,
) -> ApiResult<Json<ActionResponse>> {
    if request.alist_url.trim().is_empty() || request.alist_token.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "alist_url and alist_token are required".to_string(),
        ));
    }

    let target = InventoryTarget {
        base_url: request.alist_url,
        token: request.alist_token,
    };
    debug!("testing inventory connection to {}", target.base_url);

    if state.inventory.test_connection(&target).await {
        Ok(Json(ActionResponse::ok("inventory connection succeeded")))
    } else {
        Err(ApiError::InvalidRequest(
            "inventory connection failed".to_string(),
        ))
    }
}

/// POST /api/v1/test/webhook
///
/// Sends a fixed test message to the webhook
pub async fn test_webhook(
    State(state): State<ApiState>,
    Json(request): Json<WebhookTestRequest>,
) -> ApiResult<Json<ActionResponse>> {
    if request.webhook_url.trim().is_empty() {
        return Err(ApiError::InvalidRequest("webhook_url is required".to_string()));
    }

    if state.sender.test_connection(&request.webhook_url).await {
        Ok(Json(ActionResponse::ok("webhook connection succeeded")))
    } else {
        Err(ApiError::InvalidRequest("webhook connection failed".to_string()))
    }
}
