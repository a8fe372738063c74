//! lessonspark-rs server entry point.

use std::sync::Arc;

use axum::{Router, middleware};
use lessonspark_api::{AppState, auth_middleware, router as api_router};
use lessonspark_common::Config;
use lessonspark_core::{
    HierarchyPolicy, OrganizationDeletionService, OrganizationService, TransferRequestService,
};
use lessonspark_db::repositories::{
    InviteRepository, OrganizationRepository, ProfileRepository, SharedFocusRepository,
    TransferRequestRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lessonspark=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting lessonspark-rs server...");

    let config = Config::load()?;

    let db = lessonspark_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    lessonspark_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Repositories
    let organization_repo = OrganizationRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let invite_repo = InviteRepository::new(Arc::clone(&db));
    let shared_focus_repo = SharedFocusRepository::new(Arc::clone(&db));
    let transfer_repo = TransferRequestRepository::new(Arc::clone(&db));

    // Services
    let policy = HierarchyPolicy::from_config(&config.hierarchy);
    info!(max_depth = policy.max_depth(), "Organization hierarchy policy loaded");

    let organization_service =
        OrganizationService::new(organization_repo.clone(), profile_repo.clone(), policy);
    let organization_deletion_service = OrganizationDeletionService::new(
        organization_repo.clone(),
        profile_repo.clone(),
        invite_repo,
        shared_focus_repo,
        transfer_repo.clone(),
    );
    let transfer_request_service =
        TransferRequestService::new(transfer_repo, profile_repo.clone(), organization_repo);

    let state = AppState {
        organization_service,
        organization_deletion_service,
        transfer_request_service,
        profile_repo,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
