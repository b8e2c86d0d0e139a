//! Display collaborator
//!
//! The engine pushes rendered words into a [`WordDisplay`]. Implementations
//! must be quick and must not call back into the engine: they run while the
//! engine holds its state lock.

use crate::chunker::WordChunk;
use chrono::Utc;
use rsvp_common::events::{EventBus, ReaderEvent, ReaderStatus};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Surface showing one word at a time
pub trait WordDisplay: Send + Sync {
    /// Replace the shown content with `chunk`
    fn show_word(&self, index: usize, total: usize, chunk: &WordChunk);

    /// Replace the shown content with the reset placeholder
    fn show_placeholder(&self, text: &str);

    /// Engine moved between Idle and Running
    fn status_changed(&self, _old: ReaderStatus, _new: ReaderStatus, _cursor: usize) {}
}

/// Content currently on the display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayContent {
    Placeholder {
        text: String,
    },
    Word {
        index: usize,
        total: usize,
        markup: String,
    },
}

/// Display that keeps the latest content and broadcasts every update
///
/// Browser clients follow along through the `/events` SSE stream; a single
/// most-recent value is kept for clients that poll.
pub struct BroadcastDisplay {
    bus: EventBus,
    current: RwLock<DisplayContent>,
}

impl BroadcastDisplay {
    pub fn new(bus: EventBus, placeholder: &str) -> Self {
        Self {
            bus,
            current: RwLock::new(DisplayContent::Placeholder {
                text: placeholder.to_string(),
            }),
        }
    }

    /// Content most recently written
    pub fn current(&self) -> DisplayContent {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, content: DisplayContent) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = content;
    }
}

impl WordDisplay for BroadcastDisplay {
    fn show_word(&self, index: usize, total: usize, chunk: &WordChunk) {
        self.replace(DisplayContent::Word {
            index,
            total,
            markup: chunk.markup().to_string(),
        });
        self.bus.emit_lossy(ReaderEvent::WordShown {
            index,
            total,
            markup: chunk.markup().to_string(),
            timestamp: Utc::now(),
        });
    }

    fn show_placeholder(&self, text: &str) {
        self.replace(DisplayContent::Placeholder {
            text: text.to_string(),
        });
        self.bus.emit_lossy(ReaderEvent::PlaceholderShown {
            text: text.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn status_changed(&self, old: ReaderStatus, new: ReaderStatus, cursor: usize) {
        debug!("Reader status {} -> {} at word {}", old, new, cursor);
        self.bus.emit_lossy(ReaderEvent::StatusChanged {
            old_status: old,
            new_status: new,
            cursor,
            timestamp: Utc::now(),
        });
    }
}
