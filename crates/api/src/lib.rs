//! HTTP API layer for lessonspark-rs.
//!
//! - **Endpoints**: organization administration, hierarchy, transfer requests
//! - **Extractors**: authenticated profile, platform admin, organization scope
//! - **Middleware**: gateway identity resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
