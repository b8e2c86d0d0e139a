//! HTTP API handlers for rsvp-library

pub mod health;
pub mod library;

pub use health::health_routes;
pub use library::{get_text, list_texts};

use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - connection status heartbeat
pub async fn event_stream() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    rsvp_common::sse::create_heartbeat_sse_stream("rsvp-library")
}
