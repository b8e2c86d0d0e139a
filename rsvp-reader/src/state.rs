//! Shared service state
//!
//! Holds the control surface's text input next to the event bus. Playback
//! state itself is owned by the engine and never stored here.

use crate::chunker::word_count;
use chrono::Utc;
use rsvp_common::events::{EventBus, ReaderEvent};
use tokio::sync::RwLock;

/// State shared by all HTTP handlers
pub struct SharedState {
    /// Current contents of the text input
    text: RwLock<String>,

    /// Event broadcaster for SSE
    pub bus: EventBus,
}

impl SharedState {
    pub fn new(bus: EventBus) -> Self {
        Self {
            text: RwLock::new(String::new()),
            bus,
        }
    }

    pub async fn text(&self) -> String {
        self.text.read().await.clone()
    }

    /// Replace the text input, returning its word count
    ///
    /// `title` is set when the text came from the library.
    pub async fn set_text(&self, text: String, title: Option<String>) -> usize {
        let count = word_count(&text);
        *self.text.write().await = text;
        self.bus.emit_lossy(ReaderEvent::TextLoaded {
            title,
            word_count: count,
            timestamp: Utc::now(),
        });
        count
    }

    pub async fn word_count(&self) -> usize {
        word_count(&self.text.read().await)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}
