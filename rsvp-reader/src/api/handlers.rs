//! HTTP request handlers
//!
//! Control surface endpoints for the reader engine.

use crate::api::server::AppContext;
use crate::chunker::HighlightPosition;
use crate::display::DisplayContent;
use crate::engine::{RateChange, ReaderSnapshot, StartOutcome};
use crate::error::Error;
use crate::keyboard::{self, KeyGesture};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rsvp_common::events::ReaderEvent;
use rsvp_common::TextRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    #[serde(flatten)]
    snapshot: ReaderSnapshot,
    /// Live word count of the text input
    text_word_count: usize,
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    text: String,
    word_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetTextRequest {
    text: String,
}

#[derive(Debug, Serialize)]
pub struct WordCountResponse {
    word_count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    /// Played instead of the stored input when present
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    highlight: Option<HighlightPosition>,
    #[serde(default)]
    rate: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    outcome: StartOutcome,
    state: ReaderSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SetRateRequest {
    rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRateRequest {
    delta: i32,
    #[serde(default)]
    shift: bool,
}

#[derive(Debug, Serialize)]
pub struct AdjustRateResponse {
    /// False when the request was ignored (no modifier or unknown key)
    applied: bool,
    rate: u32,
}

#[derive(Debug, Serialize)]
pub struct LoadTextResponse {
    id: i64,
    title: String,
    word_count: usize,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::EmptyText | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::TextNotFound(_) => StatusCode::NOT_FOUND,
            Error::Library(_) => StatusCode::BAD_GATEWAY,
            Error::Http(_) | Error::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn announce_rate(ctx: &AppContext, change: RateChange) {
    if change.changed() {
        ctx.state.bus.emit_lossy(ReaderEvent::RateChanged {
            old_rate: change.old_rate,
            new_rate: change.new_rate,
            timestamp: Utc::now(),
        });
    }
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "rsvp-reader".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Reader State & Text Input
// ============================================================================

/// GET /reader/state
pub async fn get_state(State(ctx): State<AppContext>) -> Json<StateResponse> {
    Json(StateResponse {
        snapshot: ctx.engine.snapshot(),
        text_word_count: ctx.state.word_count().await,
    })
}

/// GET /reader/text
pub async fn get_text(State(ctx): State<AppContext>) -> Json<TextResponse> {
    let text = ctx.state.text().await;
    let word_count = crate::chunker::word_count(&text);
    Json(TextResponse { text, word_count })
}

/// PUT /reader/text - replace the text input; playback is unaffected
pub async fn set_text(
    State(ctx): State<AppContext>,
    Json(req): Json<SetTextRequest>,
) -> Json<WordCountResponse> {
    let word_count = ctx.state.set_text(req.text, None).await;
    Json(WordCountResponse { word_count })
}

/// GET /reader/display - content most recently shown
pub async fn get_display(State(ctx): State<AppContext>) -> Json<DisplayContent> {
    Json(ctx.display.current())
}

// ============================================================================
// Playback Control
// ============================================================================

/// POST /reader/start
///
/// An empty body plays the stored text input; a body that does not parse as a
/// start request is rejected with 400. Blank text is rejected with 400 and
/// leaves every piece of state untouched. Supplied text replaces the stored
/// input only when it is actually chunked: a resume or an already running
/// reader keeps the input that is playing.
pub async fn start(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<Json<StartResponse>, Error> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        serde_json::from_slice::<StartRequest>(&body).map_err(|e| {
            info!("Start rejected: malformed body: {}", e);
            Error::InvalidRequest(e.to_string())
        })?
    };

    let (text, supplied) = match req.text {
        Some(text) => (text, true),
        None => (ctx.state.text().await, false),
    };

    let old_rate = ctx.engine.rate();
    let outcome = ctx
        .engine
        .start(&text, req.highlight.unwrap_or_default(), req.rate)
        .map_err(|e| {
            info!("Start rejected: {}", e);
            e
        })?;

    if supplied && outcome == StartOutcome::Started {
        ctx.state.set_text(text, None).await;
    }

    let state = ctx.engine.snapshot();
    announce_rate(
        &ctx,
        RateChange {
            old_rate,
            new_rate: state.rate,
        },
    );

    Ok(Json(StartResponse { outcome, state }))
}

/// POST /reader/pause
pub async fn pause(State(ctx): State<AppContext>) -> Json<ReaderSnapshot> {
    ctx.engine.stop();
    Json(ctx.engine.snapshot())
}

/// POST /reader/reset
pub async fn reset(State(ctx): State<AppContext>) -> Json<ReaderSnapshot> {
    ctx.engine.reset();
    Json(ctx.engine.snapshot())
}

// ============================================================================
// Rate Control
// ============================================================================

/// POST /reader/rate - slider value, clamped into bounds
pub async fn set_rate(
    State(ctx): State<AppContext>,
    Json(req): Json<SetRateRequest>,
) -> Json<RateChange> {
    let change = ctx.engine.set_rate(req.rate);
    announce_rate(&ctx, change);
    Json(change)
}

/// POST /reader/rate/adjust - relative change, ignored without shift
pub async fn adjust_rate(
    State(ctx): State<AppContext>,
    Json(req): Json<AdjustRateRequest>,
) -> Json<AdjustRateResponse> {
    apply_delta(&ctx, Some(req.delta), req.shift)
}

/// POST /reader/key - keyboard gesture
pub async fn key_press(
    State(ctx): State<AppContext>,
    Json(gesture): Json<KeyGesture>,
) -> Json<AdjustRateResponse> {
    let delta = keyboard::rate_delta(&gesture.key, ctx.engine.bounds().step);
    apply_delta(&ctx, delta, gesture.shift)
}

fn apply_delta(ctx: &AppContext, delta: Option<i32>, shift: bool) -> Json<AdjustRateResponse> {
    match delta.and_then(|delta| ctx.engine.adjust_rate(delta, shift)) {
        Some(change) => {
            announce_rate(ctx, change);
            Json(AdjustRateResponse {
                applied: true,
                rate: change.new_rate,
            })
        }
        None => Json(AdjustRateResponse {
            applied: false,
            rate: ctx.engine.rate(),
        }),
    }
}

// ============================================================================
// Library
// ============================================================================

/// GET /reader/library - titles available from the library service
pub async fn list_library(State(ctx): State<AppContext>) -> Result<Json<Vec<TextRecord>>, Error> {
    let texts = ctx.library.list().await?;
    Ok(Json(texts))
}

/// POST /reader/library/:id - load a text into the text input
///
/// Never starts playback. On failure the text input and the engine are left
/// as they were.
pub async fn load_library_text(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<LoadTextResponse>, Error> {
    let record = ctx.library.get(id).await.map_err(|e| {
        warn!("Could not load library text {}: {}", id, e);
        e
    })?;

    info!("Loaded library text {} ({})", record.id, record.title);
    let word_count = ctx
        .state
        .set_text(record.content, Some(record.title.clone()))
        .await;

    Ok(Json(LoadTextResponse {
        id: record.id,
        title: record.title,
        word_count,
    }))
}
