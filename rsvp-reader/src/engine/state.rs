//! Playback state and rate arithmetic

use crate::chunker::{ChunkSequence, HighlightPosition};
use rsvp_common::config::ReaderConfig;
use rsvp_common::events::ReaderStatus;
use serde::Serialize;
use std::time::Duration;

/// Microseconds per minute, the numerator of the tick period
const MICROS_PER_MINUTE: u64 = 60_000_000;

/// Tick period for a rate in words per minute
///
/// A rate of zero is treated as 1 WPM.
pub fn tick_period(rate: u32) -> Duration {
    Duration::from_micros(MICROS_PER_MINUTE / u64::from(rate.max(1)))
}

/// Selectable rate range and keyboard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateBounds {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl RateBounds {
    /// Bounds with `min` and `max` put in order and `min` raised to at least 1
    pub fn new(min: u32, max: u32, step: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min: min.max(1),
            max: max.max(1),
            step,
        }
    }

    /// Clamp an arbitrary (possibly negative) rate into range
    pub fn clamp(&self, rate: i64) -> u32 {
        rate.clamp(i64::from(self.min), i64::from(self.max)) as u32
    }
}

impl Default for RateBounds {
    fn default() -> Self {
        Self::from(&ReaderConfig::default())
    }
}

impl From<&ReaderConfig> for RateBounds {
    fn from(config: &ReaderConfig) -> Self {
        Self::new(config.min_rate, config.max_rate, config.rate_step)
    }
}

/// Mutable playback state owned by the engine
///
/// Invariants:
/// - `cursor <= sequence.len()`
/// - `running` is true exactly while the engine holds a timer
#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub sequence: ChunkSequence,
    pub cursor: usize,
    pub rate: u32,
    pub running: bool,
    pub highlight: HighlightPosition,
}

impl PlaybackState {
    pub fn new(rate: u32) -> Self {
        Self {
            sequence: ChunkSequence::empty(),
            cursor: 0,
            rate,
            running: false,
            highlight: HighlightPosition::default(),
        }
    }

    pub fn status(&self) -> ReaderStatus {
        if self.running {
            ReaderStatus::Running
        } else {
            ReaderStatus::Idle
        }
    }

    /// True when no partially read sequence exists
    ///
    /// Both the empty state (initial or after reset) and a fully read
    /// sequence count as fresh: the next start rebuilds from the text.
    pub fn is_fresh(&self) -> bool {
        self.sequence.is_empty() || self.cursor >= self.sequence.len()
    }
}

/// Read-only view of the engine for the control surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderSnapshot {
    pub status: ReaderStatus,
    pub cursor: usize,
    pub total: usize,
    pub rate: u32,
    pub bounds: RateBounds,
    pub highlight: HighlightPosition,
    pub period_ms: u64,
}

/// What a start request did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// Text was chunked and reading began at the first word
    Started,
    /// A paused sequence continued from its cursor
    Resumed,
    /// Engine was already running; nothing changed
    AlreadyRunning,
}

/// Rate before and after a rate request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateChange {
    pub old_rate: u32,
    pub new_rate: u32,
}

impl RateChange {
    pub fn changed(&self) -> bool {
        self.old_rate != self.new_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_period_from_rate() {
        assert_eq!(tick_period(300), Duration::from_millis(200));
        assert_eq!(tick_period(60), Duration::from_secs(1));
        assert_eq!(tick_period(350), Duration::from_micros(171_428));
    }

    #[test]
    fn test_tick_period_zero_rate_is_one_wpm() {
        assert_eq!(tick_period(0), Duration::from_secs(60));
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = RateBounds::new(50, 1000, 50);
        assert_eq!(bounds.clamp(1050), 1000);
        assert_eq!(bounds.clamp(-100), 50);
        assert_eq!(bounds.clamp(450), 450);
    }

    #[test]
    fn test_bounds_normalized() {
        let bounds = RateBounds::new(900, 0, 50);
        assert_eq!(bounds.min, 1);
        assert_eq!(bounds.max, 900);
    }

    #[test]
    fn test_new_state_is_idle_and_fresh() {
        let state = PlaybackState::new(300);
        assert_eq!(state.status(), ReaderStatus::Idle);
        assert_eq!(state.cursor, 0);
        assert!(state.is_fresh());
    }
}
