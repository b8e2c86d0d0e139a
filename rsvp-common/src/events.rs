//! Event types for the reader event system
//!
//! Events are broadcast via [`EventBus`] and serialized for SSE transmission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Reader engine status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReaderStatus {
    /// No timer active (never started, paused, reset, or finished)
    Idle,
    /// Timer active, words advancing
    Running,
}

impl std::fmt::Display for ReaderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderStatus::Idle => write!(f, "idle"),
            ReaderStatus::Running => write!(f, "running"),
        }
    }
}

/// Reader event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReaderEvent {
    /// Display replaced its content with the next word
    ///
    /// Emitted once per tick while running, so at high rates several times
    /// per second. Subscribers that lag simply skip to the most recent word.
    WordShown {
        /// Position of the word in the sequence (0-based)
        index: usize,
        /// Sequence length
        total: usize,
        /// Rendered word markup
        markup: String,
        timestamp: DateTime<Utc>,
    },

    /// Display reverted to its placeholder content (reset)
    PlaceholderShown {
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// Engine moved between Idle and Running
    StatusChanged {
        old_status: ReaderStatus,
        new_status: ReaderStatus,
        /// Cursor at the time of the transition
        cursor: usize,
        timestamp: DateTime<Utc>,
    },

    /// Reading rate changed (slider or keyboard gesture)
    RateChanged {
        old_rate: u32,
        new_rate: u32,
        timestamp: DateTime<Utc>,
    },

    /// Text input replaced (typed or loaded from the library)
    TextLoaded {
        /// Library title when loaded from the library
        title: Option<String>,
        word_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl ReaderEvent {
    /// SSE `event:` field for this event
    pub fn event_type(&self) -> &'static str {
        match self {
            ReaderEvent::WordShown { .. } => "WordShown",
            ReaderEvent::PlaceholderShown { .. } => "PlaceholderShown",
            ReaderEvent::StatusChanged { .. } => "StatusChanged",
            ReaderEvent::RateChanged { .. } => "RateChanged",
            ReaderEvent::TextLoaded { .. } => "TextLoaded",
        }
    }
}

/// Broadcast channel for reader events
///
/// Cloning the bus shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReaderEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ReaderEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the case where nobody is listening
    pub fn emit_lossy(&self, event: ReaderEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ReaderEvent::StatusChanged {
            old_status: ReaderStatus::Idle,
            new_status: ReaderStatus::Running,
            cursor: 0,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StatusChanged");
        assert_eq!(json["old_status"], "idle");
        assert_eq!(json["new_status"], "running");
        assert_eq!(event.event_type(), "StatusChanged");
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit_lossy(ReaderEvent::PlaceholderShown {
            text: "Text will appear here".to_string(),
            timestamp: Utc::now(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        for index in 0..3 {
            bus.emit_lossy(ReaderEvent::WordShown {
                index,
                total: 3,
                markup: format!("w{}", index),
                timestamp: Utc::now(),
            });
        }

        for expected in 0..3 {
            match rx.recv().await.unwrap() {
                ReaderEvent::WordShown { index, .. } => assert_eq!(index, expected),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }
}
