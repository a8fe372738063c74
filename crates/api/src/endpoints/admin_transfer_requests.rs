//! Platform admin transfer request endpoints.

use axum::{Json, Router, extract::State, routing::post};
use lessonspark_common::AppResult;
use lessonspark_core::services::transfer_request::{ProcessTransferInput, TransferRequestView};
use lessonspark_db::entities::transfer_request::{self, TransferStatus};
use serde::Deserialize;

use super::{MAX_LIMIT, default_limit};
use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransferRequestsRequest {
    pub status: Option<TransferStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Transfer requests with display names, newest first.
async fn list(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ListTransferRequestsRequest>,
) -> AppResult<ApiResponse<Vec<TransferRequestView>>> {
    let requests = state
        .transfer_request_service
        .list_for_admin(req.status, req.limit.min(MAX_LIMIT), req.offset)
        .await?;

    Ok(ApiResponse::ok(requests))
}

/// Approve a request and move the member.
async fn approve(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<ProcessTransferInput>,
) -> AppResult<ApiResponse<transfer_request::Model>> {
    let request = state
        .transfer_request_service
        .approve(&admin.id, input)
        .await?;

    Ok(ApiResponse::ok(request))
}

async fn deny(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<ProcessTransferInput>,
) -> AppResult<ApiResponse<transfer_request::Model>> {
    let request = state.transfer_request_service.deny(&admin.id, input).await?;

    Ok(ApiResponse::ok(request))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/approve", post(approve))
        .route("/deny", post(deny))
}
