//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lessonspark_core::{OrganizationDeletionService, OrganizationService, TransferRequestService};
use lessonspark_db::repositories::ProfileRepository;

/// Header carrying the user id verified by the upstream auth gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub organization_service: OrganizationService,
    pub organization_deletion_service: OrganizationDeletionService,
    pub transfer_request_service: TransferRequestService,
    pub profile_repo: ProfileRepository,
}

/// Authentication middleware.
///
/// Resolves the gateway-supplied user id to a profile and stores it in the
/// request extensions. Requests without a known profile continue
/// unauthenticated; extractors decide whether that is acceptable. A failed
/// lookup ends the request with a server error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    if let Some(user_id) = user_id {
        match state.profile_repo.find_by_id(&user_id).await {
            Ok(Some(profile)) => {
                req.extensions_mut().insert(profile);
            }
            Ok(None) => tracing::debug!(user_id = %user_id, "Unknown user id from gateway"),
            Err(e) => {
                tracing::warn!(user_id = %user_id, "Failed to load profile");
                return e.into_response();
            }
        }
    }

    next.run(req).await
}
