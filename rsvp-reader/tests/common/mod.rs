//! Shared helpers for rsvp-reader integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use rsvp_common::events::EventBus;
use rsvp_reader::api::AppContext;
use rsvp_reader::display::BroadcastDisplay;
use rsvp_reader::engine::{EngineConfig, RateBounds, ReaderEngine};
use rsvp_reader::library_client::LibraryClient;
use rsvp_reader::scheduler::Scheduler;
use rsvp_reader::SharedState;
use serde_json::Value;
use std::sync::Arc;

pub const PLACEHOLDER: &str = "Text will appear here";

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        default_rate: 300,
        bounds: RateBounds::new(50, 1000, 50),
        placeholder: PLACEHOLDER.to_string(),
    }
}

/// Test helper: Wire a full reader context on the given scheduler
pub fn context(scheduler: Arc<dyn Scheduler>, library_url: &str) -> AppContext {
    let bus = EventBus::default();
    let display = Arc::new(BroadcastDisplay::new(bus.clone(), PLACEHOLDER));
    let engine = Arc::new(ReaderEngine::new(engine_config(), scheduler, display.clone()));

    AppContext {
        engine,
        state: Arc::new(SharedState::new(bus)),
        display,
        library: LibraryClient::new(library_url).expect("Should build library client"),
    }
}

/// Base URL of a port nothing listens on
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
