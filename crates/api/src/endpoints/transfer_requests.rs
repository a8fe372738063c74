//! Org manager transfer request endpoints.

use axum::{Json, Router, extract::State, routing::post};
use lessonspark_common::AppResult;
use lessonspark_core::services::transfer_request::{
    CreateTransferRequestInput, TransferRequestView,
};
use lessonspark_db::entities::transfer_request;
use serde::Deserialize;

use super::{MAX_LIMIT, default_limit};
use crate::{extractors::Caller, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTransferRequest {
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

async fn create(
    Caller(ctx): Caller,
    State(state): State<AppState>,
    Json(input): Json<CreateTransferRequestInput>,
) -> AppResult<ApiResponse<transfer_request::Model>> {
    let request = state.transfer_request_service.create(&ctx, input).await?;

    Ok(ApiResponse::ok(request))
}

async fn cancel(
    Caller(ctx): Caller,
    State(state): State<AppState>,
    Json(req): Json<CancelTransferRequest>,
) -> AppResult<ApiResponse<transfer_request::Model>> {
    let request = state
        .transfer_request_service
        .cancel(&ctx, &req.request_id)
        .await?;

    Ok(ApiResponse::ok(request))
}

/// Requests leaving or entering the caller's organization.
async fn list(
    Caller(ctx): Caller,
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Vec<TransferRequestView>>> {
    let requests = state
        .transfer_request_service
        .list_for_organization(&ctx, req.limit.min(MAX_LIMIT), req.offset)
        .await?;

    Ok(ApiResponse::ok(requests))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/cancel", post(cancel))
        .route("/list", post(list))
}
