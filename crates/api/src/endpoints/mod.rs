//! API endpoints.

mod admin_organizations;
mod admin_transfer_requests;
mod health;
mod organizations;
mod transfer_requests;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/admin/organizations", admin_organizations::router())
        .nest("/admin/transfer-requests", admin_transfer_requests::router())
        .nest("/organizations", organizations::router())
        .nest("/transfer-requests", transfer_requests::router())
}

const fn default_limit() -> u64 {
    20
}

/// Upper bound for list page sizes.
const MAX_LIMIT: u64 = 100;
