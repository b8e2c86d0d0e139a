//! # RSVP Reader Library (rsvp-reader)
//!
//! Word presentation engine for rapid serial visual presentation.
//!
//! **Purpose:** Split pasted text into emphasized word chunks, show them one at
//! a time at a configurable rate, and expose start/pause/reset/rate controls
//! over HTTP with an SSE stream feeding the display.
//!
//! **Architecture:** pure chunker → engine (state machine on an injected
//! scheduler) → display collaborator → axum API

pub mod api;
pub mod chunker;
pub mod display;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod library_client;
pub mod scheduler;
pub mod state;

pub use error::{Error, Result};
pub use state::SharedState;
