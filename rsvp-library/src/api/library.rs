//! Library lookup endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rsvp_common::TextRecord;
use serde_json::json;
use tracing::debug;

use crate::AppState;

/// GET /library
///
/// Returns every text, content included.
pub async fn list_texts(State(state): State<AppState>) -> Json<Vec<TextRecord>> {
    Json(state.store.list().to_vec())
}

/// GET /library/:id
///
/// Ids that do not parse as integers can never match and get the same 404 as
/// unknown ids.
pub async fn get_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TextRecord>, LibraryError> {
    let text = id
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| state.store.get(id))
        .ok_or_else(|| {
            debug!("No library text for id {:?}", id);
            LibraryError::TextNotFound
        })?;

    Ok(Json(text.clone()))
}

/// Library API errors
#[derive(Debug)]
pub enum LibraryError {
    TextNotFound,
}

impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            LibraryError::TextNotFound => (StatusCode::NOT_FOUND, "Text not found"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
