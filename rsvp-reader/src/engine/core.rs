//! Reader engine: word presentation state machine
//!
//! ```text
//!            start (fresh: chunk text)
//!   Idle ──────────────────────────────▶ Running
//!    ▲  ◀──────────────────────────────   │  │
//!    │     stop / reset / last word shown │  │ set_rate / adjust_rate
//!    │                                    │  └─▶ reschedule at cursor
//!    └── start (paused mid-text: resume) ─┘
//! ```
//!
//! All state lives behind one mutex. Every timer is tagged with a generation
//! number; cancelling bumps the generation under the lock, so a tick that was
//! already in flight when `stop` returned finds a stale generation and does
//! nothing.

use super::state::{
    tick_period, PlaybackState, RateBounds, RateChange, ReaderSnapshot, StartOutcome,
};
use crate::chunker::{self, ChunkSequence, Emphasis, HighlightPosition, TagEmphasis};
use crate::display::WordDisplay;
use crate::error::{Error, Result};
use crate::scheduler::{Scheduler, TaskHandle};
use rsvp_common::config::{ReaderConfig, DEFAULT_PLACEHOLDER};
use rsvp_common::events::ReaderStatus;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info};

/// Engine tunables
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub default_rate: u32,
    pub bounds: RateBounds,
    pub placeholder: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&ReaderConfig::default())
    }
}

impl From<&ReaderConfig> for EngineConfig {
    fn from(config: &ReaderConfig) -> Self {
        let bounds = RateBounds::from(config);
        Self {
            default_rate: bounds.clamp(i64::from(config.default_rate)),
            bounds,
            placeholder: config.placeholder.clone(),
        }
    }
}

struct EngineInner {
    state: PlaybackState,
    timer: Option<TaskHandle>,
    generation: u64,
}

impl EngineInner {
    /// Drop the active timer, invalidating any tick already in flight
    fn cancel_timer(&mut self) {
        self.timer = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

fn lock(inner: &Mutex<EngineInner>) -> MutexGuard<'_, EngineInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Word presentation engine for one reading session
pub struct ReaderEngine {
    inner: Arc<Mutex<EngineInner>>,
    scheduler: Arc<dyn Scheduler>,
    display: Arc<dyn WordDisplay>,
    emphasis: Arc<dyn Emphasis>,
    bounds: RateBounds,
    placeholder: String,
}

impl ReaderEngine {
    pub fn new(
        config: EngineConfig,
        scheduler: Arc<dyn Scheduler>,
        display: Arc<dyn WordDisplay>,
    ) -> Self {
        Self::with_emphasis(config, scheduler, display, Arc::new(TagEmphasis::default()))
    }

    /// Engine rendering emphasis with a custom strategy
    pub fn with_emphasis(
        config: EngineConfig,
        scheduler: Arc<dyn Scheduler>,
        display: Arc<dyn WordDisplay>,
        emphasis: Arc<dyn Emphasis>,
    ) -> Self {
        let rate = config.bounds.clamp(i64::from(config.default_rate));
        let placeholder = if config.placeholder.is_empty() {
            DEFAULT_PLACEHOLDER.to_string()
        } else {
            config.placeholder
        };

        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                state: PlaybackState::new(rate),
                timer: None,
                generation: 0,
            })),
            scheduler,
            display,
            emphasis,
            bounds: config.bounds,
            placeholder,
        }
    }

    pub fn bounds(&self) -> RateBounds {
        self.bounds
    }

    /// Begin or resume reading
    ///
    /// Blank `text` is rejected before anything changes. While running this is
    /// a no-op. A paused, partially read sequence resumes from its cursor and
    /// `text`/`highlight` are ignored; otherwise `text` is chunked afresh.
    /// `rate`, when given, is clamped and applied before the timer starts.
    pub fn start(
        &self,
        text: &str,
        highlight: HighlightPosition,
        rate: Option<u32>,
    ) -> Result<StartOutcome> {
        if chunker::word_count(text) == 0 {
            return Err(Error::EmptyText);
        }

        let mut inner = lock(&self.inner);
        if inner.state.running {
            debug!("Start ignored: already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        if let Some(rate) = rate {
            inner.state.rate = self.bounds.clamp(i64::from(rate));
        }

        let outcome = if inner.state.is_fresh() {
            inner.state.sequence = chunker::chunk(text, highlight, self.emphasis.as_ref());
            inner.state.cursor = 0;
            inner.state.highlight = highlight;
            info!(
                "Starting: {} words at {} WPM ({} highlight)",
                inner.state.sequence.len(),
                inner.state.rate,
                highlight
            );
            StartOutcome::Started
        } else {
            info!(
                "Resuming at word {}/{} at {} WPM",
                inner.state.cursor,
                inner.state.sequence.len(),
                inner.state.rate
            );
            StartOutcome::Resumed
        };

        self.schedule(&mut inner);
        inner.state.running = true;
        self.display
            .status_changed(ReaderStatus::Idle, ReaderStatus::Running, inner.state.cursor);

        Ok(outcome)
    }

    /// Pause, keeping the sequence and cursor
    ///
    /// Returns false when the engine was not running.
    pub fn stop(&self) -> bool {
        let mut inner = lock(&self.inner);
        if !inner.state.running {
            return false;
        }

        inner.cancel_timer();
        inner.state.running = false;
        info!("Paused at word {}/{}", inner.state.cursor, inner.state.sequence.len());
        self.display
            .status_changed(ReaderStatus::Running, ReaderStatus::Idle, inner.state.cursor);
        true
    }

    /// Stop and discard the sequence, returning the display to its placeholder
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        let was_running = inner.state.running;

        inner.cancel_timer();
        inner.state.running = false;
        inner.state.cursor = 0;
        inner.state.sequence = ChunkSequence::empty();

        self.display.show_placeholder(&self.placeholder);
        if was_running {
            self.display.status_changed(ReaderStatus::Running, ReaderStatus::Idle, 0);
        }
        info!("Reset");
    }

    /// Keyboard-style rate nudge, applied only when `modifier` is held
    ///
    /// Returns `None` when the request was filtered out.
    pub fn adjust_rate(&self, delta: i32, modifier: bool) -> Option<RateChange> {
        if !modifier {
            return None;
        }

        let mut inner = lock(&self.inner);
        let target = i64::from(inner.state.rate) + i64::from(delta);
        Some(self.apply_rate(&mut inner, target))
    }

    /// Set the rate directly (slider), clamped into bounds
    pub fn set_rate(&self, rate: u32) -> RateChange {
        let mut inner = lock(&self.inner);
        self.apply_rate(&mut inner, i64::from(rate))
    }

    pub fn rate(&self) -> u32 {
        lock(&self.inner).state.rate
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner).state.running
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        let inner = lock(&self.inner);
        ReaderSnapshot {
            status: inner.state.status(),
            cursor: inner.state.cursor,
            total: inner.state.sequence.len(),
            rate: inner.state.rate,
            bounds: self.bounds,
            highlight: inner.state.highlight,
            period_ms: tick_period(inner.state.rate).as_millis() as u64,
        }
    }

    fn apply_rate(&self, inner: &mut EngineInner, target: i64) -> RateChange {
        let change = RateChange {
            old_rate: inner.state.rate,
            new_rate: self.bounds.clamp(target),
        };
        inner.state.rate = change.new_rate;

        if change.changed() {
            debug!("Rate {} -> {} WPM", change.old_rate, change.new_rate);
            if inner.state.running {
                // Continue from the current cursor at the new period
                self.schedule(inner);
            }
        }
        change
    }

    /// Replace any active timer with one at the current rate
    fn schedule(&self, inner: &mut EngineInner) {
        inner.cancel_timer();
        let generation = inner.generation;
        let period = tick_period(inner.state.rate);

        let weak: Weak<Mutex<EngineInner>> = Arc::downgrade(&self.inner);
        let display = Arc::clone(&self.display);
        let handle = self.scheduler.schedule_repeating(
            period,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    tick(&shared, generation, display.as_ref());
                }
            }),
        );

        debug!("Scheduled tick every {:?} (generation {})", period, generation);
        inner.timer = Some(handle);
    }
}

impl Drop for ReaderEngine {
    fn drop(&mut self) {
        lock(&self.inner).cancel_timer();
    }
}

/// Advance one word; stops automatically once the last word is shown
fn tick(shared: &Mutex<EngineInner>, generation: u64, display: &dyn WordDisplay) {
    let mut guard = lock(shared);
    let inner = &mut *guard;
    if inner.generation != generation || !inner.state.running {
        return;
    }

    let state = &mut inner.state;
    let total = state.sequence.len();
    if let Some(chunk) = state.sequence.get(state.cursor) {
        display.show_word(state.cursor, total, chunk);
        state.cursor += 1;
    }

    if state.cursor >= total {
        state.running = false;
        let cursor = state.cursor;
        inner.cancel_timer();
        info!("Finished: all {} words shown", total);
        display.status_changed(ReaderStatus::Running, ReaderStatus::Idle, cursor);
    }
}
