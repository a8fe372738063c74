//! Org manager endpoints for sub-organizations.

use axum::{Json, Router, extract::State, routing::post};
use lessonspark_common::AppResult;
use lessonspark_core::services::organization::CreateChildOrganizationInput;
use lessonspark_db::entities::organization;
use serde::Deserialize;

use crate::{extractors::Caller, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub organization_id: String,
}

/// Create a sub-organization under an organization the caller manages.
async fn create_child(
    Caller(ctx): Caller,
    State(state): State<AppState>,
    Json(input): Json<CreateChildOrganizationInput>,
) -> AppResult<ApiResponse<organization::Model>> {
    let child = state.organization_service.create_child(&ctx, input).await?;

    Ok(ApiResponse::ok(child))
}

/// Leave the parent network and become top-level.
async fn disconnect(
    Caller(ctx): Caller,
    State(state): State<AppState>,
    Json(req): Json<DisconnectRequest>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state
        .organization_service
        .disconnect(&ctx, &req.organization_id)
        .await?;

    Ok(ApiResponse::ok(org))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/children/create", post(create_child))
        .route("/disconnect", post(disconnect))
}
