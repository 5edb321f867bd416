use axum::{Json, extract::State};

use crate::api::{error::ApiResult, state::ApiState, types::StoragesResponse};

/// GET /api/v1/storages
pub async fn list_storages(State(state): State<ApiState>) -> ApiResult<Json<StoragesResponse>> {
    let storages = state.store().list_storages().await?;
    Ok(Json(StoragesResponse {
        count: storages.len(),
        storages,
    }))
}
