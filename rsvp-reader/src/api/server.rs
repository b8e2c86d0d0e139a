//! HTTP server setup and routing

use crate::display::BroadcastDisplay;
use crate::engine::ReaderEngine;
use crate::error::{Error, Result};
use crate::library_client::LibraryClient;
use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use rsvp_common::shutdown::shutdown_signal;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub engine: Arc<ReaderEngine>,
    pub state: Arc<SharedState>,
    /// Same display instance the engine writes to
    pub display: Arc<BroadcastDisplay>,
    pub library: LibraryClient,
}

/// Build the router with all routes
pub fn build_router(ctx: AppContext) -> Router {
    use super::{handlers, sse};

    Router::new()
        .route("/health", get(handlers::health))
        // Reader state and text input
        .route("/reader/state", get(handlers::get_state))
        .route("/reader/text", get(handlers::get_text).put(handlers::set_text))
        .route("/reader/display", get(handlers::get_display))
        // Playback control
        .route("/reader/start", post(handlers::start))
        .route("/reader/pause", post(handlers::pause))
        .route("/reader/reset", post(handlers::reset))
        // Rate control
        .route("/reader/rate", post(handlers::set_rate))
        .route("/reader/rate/adjust", post(handlers::adjust_rate))
        .route("/reader/key", post(handlers::key_press))
        // Library
        .route("/reader/library", get(handlers::list_library))
        .route("/reader/library/:id", post(handlers::load_library_text))
        // SSE event stream
        .route("/events", get(sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS so a page served by the library service can call us
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until Ctrl+C / SIGTERM
pub async fn run(ctx: AppContext, port: u16) -> Result<()> {
    let engine = Arc::clone(&ctx.engine);
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    engine.stop();
    Ok(())
}
