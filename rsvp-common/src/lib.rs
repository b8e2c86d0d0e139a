//! # RSVP Common Library
//!
//! Shared code for the RSVP reader services including:
//! - Error types
//! - Configuration loading (TOML + compiled defaults)
//! - Event types (ReaderEvent enum) and the EventBus
//! - Library text records
//! - SSE helpers and graceful shutdown

pub mod config;
pub mod error;
pub mod events;
pub mod library;
pub mod shutdown;
pub mod sse;

pub use error::{Error, Result};
pub use library::TextRecord;
