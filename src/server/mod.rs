//! HTTP surface
//!
//! - `GET /health`
//! - `POST /process-image`
//! - `POST /batch-process`

pub mod handlers;
pub mod state;

pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router with CORS open to every origin and request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/process-image", post(handlers::process_image))
        .route("/batch-process", post(handlers::batch_process))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on `listener` until Ctrl+C
///
/// # Errors
/// - Listener failures
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    let sd_available = state.pipeline.enhancement_available().await;
    tracing::info!(
        %addr,
        backend = %state.config.enhancement_backend,
        backend_url = %state.config.active_backend_url(),
        sd_available,
        "bgstudio listening"
    );
    if !sd_available {
        tracing::warn!("Enhancement service not reachable; requests fall back to the plain composite");
    }
    tracing::info!("Endpoints: GET /health, POST /process-image, POST /batch-process");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
