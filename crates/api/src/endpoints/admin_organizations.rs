//! Platform admin organization endpoints.

use axum::{Json, Router, extract::State, routing::post};
use lessonspark_common::AppResult;
use lessonspark_core::services::organization::{
    AssignLeaderInput, CreateOrganizationInput, OrganizationDetail, OrganizationTreeRow,
    TreeInput, UpdateOrganizationInput,
};
use lessonspark_core::services::organization_deletion::{
    DeleteOrganizationInput, DeletionReport,
};
use lessonspark_db::entities::{organization, profile};
use serde::Deserialize;

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Request naming a single organization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationIdRequest {
    pub organization_id: String,
}

/// Create an organization (approved immediately).
async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateOrganizationInput>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state.organization_service.create(&admin.id, input).await?;

    Ok(ApiResponse::ok(org))
}

/// Edit an organization.
async fn update(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateOrganizationInput>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state.organization_service.update(input).await?;

    Ok(ApiResponse::ok(org))
}

async fn approve(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<OrganizationIdRequest>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state
        .organization_service
        .approve(&admin.id, &req.organization_id)
        .await?;

    Ok(ApiResponse::ok(org))
}

async fn reject(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<OrganizationIdRequest>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state
        .organization_service
        .reject(&admin.id, &req.organization_id)
        .await?;

    Ok(ApiResponse::ok(org))
}

/// Delete an organization with no members, cleaning up what references it.
async fn delete(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteOrganizationInput>,
) -> AppResult<ApiResponse<DeletionReport>> {
    tracing::info!(admin_id = %admin.id, organization_id = %input.organization_id, "Organization delete requested");
    let report = state.organization_deletion_service.delete(input).await?;

    Ok(ApiResponse::ok(report))
}

/// Flip beta mode.
async fn beta(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<OrganizationIdRequest>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state
        .organization_service
        .toggle_beta(&admin.id, &req.organization_id)
        .await?;

    Ok(ApiResponse::ok(org))
}

async fn assign_leader(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<AssignLeaderInput>,
) -> AppResult<ApiResponse<profile::Model>> {
    let leader = state.organization_service.assign_leader(input).await?;

    Ok(ApiResponse::ok(leader))
}

/// Profiles eligible for leadership of an organization.
async fn leader_candidates(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<OrganizationIdRequest>,
) -> AppResult<ApiResponse<Vec<profile::Model>>> {
    let candidates = state
        .organization_service
        .leader_candidates(&req.organization_id)
        .await?;

    Ok(ApiResponse::ok(candidates))
}

/// Hierarchy listing in display order.
async fn tree(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<TreeInput>,
) -> AppResult<ApiResponse<Vec<OrganizationTreeRow>>> {
    let rows = state.organization_service.tree(input).await?;

    Ok(ApiResponse::ok(rows))
}

async fn show(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<OrganizationIdRequest>,
) -> AppResult<ApiResponse<OrganizationDetail>> {
    let detail = state
        .organization_service
        .detail(&req.organization_id)
        .await?;

    Ok(ApiResponse::ok(detail))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/approve", post(approve))
        .route("/reject", post(reject))
        .route("/delete", post(delete))
        .route("/beta", post(beta))
        .route("/assign-leader", post(assign_leader))
        .route("/leader-candidates", post(leader_candidates))
        .route("/tree", post(tree))
        .route("/show", post(show))
}
