//! rsvp-library - preloaded text library service
//!
//! Serves a read-only list of texts that the reader can load, plus the static
//! assets of the reader page.

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub mod api;
pub mod store;

pub use store::LibraryStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LibraryStore>,
}

impl AppState {
    pub fn new(store: LibraryStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build application router
///
/// When `static_dir` is given, unmatched paths are served from it (with
/// `index.html` answering `/`).
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    use axum::routing::get;

    let router = Router::new()
        .route("/library", get(api::list_texts))
        .route("/library/:id", get(api::get_text))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}
