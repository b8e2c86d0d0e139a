//! Engine state machine tests on a simulated clock

use super::*;
use crate::chunker::{HighlightPosition, WordChunk};
use crate::display::WordDisplay;
use crate::error::Error;
use crate::scheduler::ManualScheduler;
use rsvp_common::events::ReaderStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Shown {
    Word(usize, String),
    Placeholder(String),
    Status(ReaderStatus, ReaderStatus),
}

#[derive(Default)]
struct RecordingDisplay {
    log: Mutex<Vec<Shown>>,
}

impl RecordingDisplay {
    fn words(&self) -> Vec<(usize, String)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Shown::Word(i, w) => Some((*i, w.clone())),
                _ => None,
            })
            .collect()
    }

    fn entries(&self) -> Vec<Shown> {
        self.log.lock().unwrap().clone()
    }
}

impl WordDisplay for RecordingDisplay {
    fn show_word(&self, index: usize, _total: usize, chunk: &WordChunk) {
        self.log
            .lock()
            .unwrap()
            .push(Shown::Word(index, chunk.word().to_string()));
    }

    fn show_placeholder(&self, text: &str) {
        self.log.lock().unwrap().push(Shown::Placeholder(text.to_string()));
    }

    fn status_changed(&self, old: ReaderStatus, new: ReaderStatus, _cursor: usize) {
        self.log.lock().unwrap().push(Shown::Status(old, new));
    }
}

struct Fixture {
    engine: ReaderEngine,
    clock: ManualScheduler,
    display: Arc<RecordingDisplay>,
}

fn fixture() -> Fixture {
    let clock = ManualScheduler::new();
    let display = Arc::new(RecordingDisplay::default());
    let engine = ReaderEngine::new(
        EngineConfig {
            default_rate: 300,
            bounds: RateBounds::new(50, 1000, 50),
            placeholder: "Text will appear here".to_string(),
        },
        Arc::new(clock.clone()),
        display.clone(),
    );
    Fixture {
        engine,
        clock,
        display,
    }
}

const TEXT: &str = "one two three four five";
const PERIOD_300: Duration = Duration::from_millis(200);

#[test]
fn test_initial_state() {
    let f = fixture();
    let snapshot = f.engine.snapshot();

    assert_eq!(snapshot.status, ReaderStatus::Idle);
    assert_eq!(snapshot.cursor, 0);
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.rate, 300);
    assert_eq!(snapshot.period_ms, 200);
    assert_eq!(f.clock.active_tasks(), 0);
}

#[test]
fn test_blank_text_rejected_without_mutation() {
    let f = fixture();

    for text in ["", "   ", "\n\t", "\u{FEFF}"] {
        let result = f.engine.start(text, HighlightPosition::First, Some(600));
        assert!(matches!(result, Err(Error::EmptyText)));
    }

    assert!(!f.engine.is_running());
    assert_eq!(f.engine.rate(), 300);
    assert_eq!(f.clock.active_tasks(), 0);
    assert!(f.display.entries().is_empty());
}

#[test]
fn test_words_advance_one_per_period() {
    let f = fixture();
    let outcome = f.engine.start(TEXT, HighlightPosition::First, None).unwrap();
    assert_eq!(outcome, StartOutcome::Started);

    f.clock.advance(Duration::from_millis(199));
    assert!(f.display.words().is_empty());

    f.clock.advance(Duration::from_millis(1));
    assert_eq!(f.display.words(), vec![(0, "one".to_string())]);

    f.clock.advance(PERIOD_300 * 2);
    assert_eq!(f.engine.snapshot().cursor, 3);
}

#[test]
fn test_double_start_keeps_single_timer() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, None).unwrap();
    let second = f.engine.start(TEXT, HighlightPosition::First, None).unwrap();

    assert_eq!(second, StartOutcome::AlreadyRunning);
    assert_eq!(f.clock.active_tasks(), 1);

    f.clock.advance(PERIOD_300 * 2);
    assert_eq!(f.engine.snapshot().cursor, 2);
}

#[test]
fn test_auto_stop_after_last_word() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, None).unwrap();

    f.clock.advance(PERIOD_300 * 4);
    assert!(f.engine.is_running());

    f.clock.advance(PERIOD_300);
    assert!(!f.engine.is_running());
    assert_eq!(f.clock.active_tasks(), 0);
    assert_eq!(f.engine.snapshot().cursor, 5);

    f.clock.advance(PERIOD_300 * 10);
    let words: Vec<String> = f.display.words().into_iter().map(|(_, w)| w).collect();
    assert_eq!(words, vec!["one", "two", "three", "four", "five"]);
    assert_eq!(
        f.display.entries().last(),
        Some(&Shown::Status(ReaderStatus::Running, ReaderStatus::Idle))
    );
}

#[test]
fn test_pause_preserves_progress_and_resume_continues() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, None).unwrap();
    f.clock.advance(PERIOD_300 * 2);

    assert!(f.engine.stop());
    assert_eq!(f.clock.active_tasks(), 0);
    f.clock.advance(PERIOD_300 * 5);
    assert_eq!(f.engine.snapshot().cursor, 2);

    // Different text is ignored on resume
    let outcome = f.engine.start("other words entirely", HighlightPosition::Middle, None).unwrap();
    assert_eq!(outcome, StartOutcome::Resumed);
    assert_eq!(f.engine.snapshot().highlight, HighlightPosition::First);

    f.clock.advance(PERIOD_300);
    assert_eq!(f.display.words().last(), Some(&(2, "three".to_string())));
}

#[test]
fn test_stop_when_idle_is_noop() {
    let f = fixture();
    assert!(!f.engine.stop());
    assert!(f.display.entries().is_empty());
}

#[test]
fn test_reset_clears_state() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, None).unwrap();
    f.clock.advance(PERIOD_300 * 3);

    f.engine.reset();

    let snapshot = f.engine.snapshot();
    assert_eq!(snapshot.status, ReaderStatus::Idle);
    assert_eq!(snapshot.cursor, 0);
    assert_eq!(snapshot.total, 0);
    assert_eq!(f.clock.active_tasks(), 0);
    assert!(f
        .display
        .entries()
        .contains(&Shown::Placeholder("Text will appear here".to_string())));

    f.clock.advance(PERIOD_300 * 3);
    assert_eq!(f.display.words().len(), 3);

    assert!(matches!(
        f.engine.start("  ", HighlightPosition::First, None),
        Err(Error::EmptyText)
    ));
    let outcome = f.engine.start("fresh text", HighlightPosition::First, None).unwrap();
    assert_eq!(outcome, StartOutcome::Started);
    assert_eq!(f.engine.snapshot().total, 2);
}

#[test]
fn test_start_after_finish_rebuilds() {
    let f = fixture();
    f.engine.start("a b", HighlightPosition::First, None).unwrap();
    f.clock.advance(PERIOD_300 * 2);
    assert!(!f.engine.is_running());

    let outcome = f.engine.start("c d e", HighlightPosition::Middle, None).unwrap();
    assert_eq!(outcome, StartOutcome::Started);
    assert_eq!(f.engine.snapshot().total, 3);
    assert_eq!(f.engine.snapshot().cursor, 0);
}

#[test]
fn test_adjust_rate_requires_modifier() {
    let f = fixture();
    assert_eq!(f.engine.adjust_rate(50, false), None);
    assert_eq!(f.engine.rate(), 300);

    let change = f.engine.adjust_rate(50, true).unwrap();
    assert_eq!(change.old_rate, 300);
    assert_eq!(change.new_rate, 350);
}

#[test]
fn test_adjust_rate_clamps_at_bounds() {
    let f = fixture();
    f.engine.set_rate(1000);
    for _ in 0..3 {
        let change = f.engine.adjust_rate(50, true).unwrap();
        assert_eq!(change.new_rate, 1000);
        assert!(!change.changed());
    }

    f.engine.set_rate(50);
    for _ in 0..3 {
        assert_eq!(f.engine.adjust_rate(-50, true).unwrap().new_rate, 50);
    }
}

#[test]
fn test_set_rate_clamps() {
    let f = fixture();
    assert_eq!(f.engine.set_rate(5000).new_rate, 1000);
    assert_eq!(f.engine.set_rate(0).new_rate, 50);
}

#[test]
fn test_start_with_rate_applies_clamped_rate() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, Some(10_000)).unwrap();
    assert_eq!(f.engine.rate(), 1000);
    assert_eq!(f.engine.snapshot().period_ms, 60);
}

#[test]
fn test_rate_change_while_running_reschedules_from_cursor() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, None).unwrap();
    f.clock.advance(PERIOD_300 * 2);
    assert_eq!(f.engine.snapshot().cursor, 2);

    // 600 WPM -> 100ms period, phase restarts at the change
    f.engine.set_rate(600);
    assert_eq!(f.clock.active_tasks(), 1);

    f.clock.advance(Duration::from_millis(99));
    assert_eq!(f.display.words().len(), 2);

    f.clock.advance(Duration::from_millis(1));
    assert_eq!(f.display.words().last(), Some(&(2, "three".to_string())));

    f.clock.advance(Duration::from_millis(100));
    assert_eq!(f.display.words().last(), Some(&(3, "four".to_string())));
}

#[test]
fn test_unchanged_rate_does_not_reschedule() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, None).unwrap();
    f.clock.advance(Duration::from_millis(150));

    f.engine.set_rate(300);
    f.clock.advance(Duration::from_millis(50));
    assert_eq!(f.display.words().len(), 1);
}

#[test]
fn test_rate_change_while_idle_only_updates_rate() {
    let f = fixture();
    f.engine.adjust_rate(-50, true);
    assert_eq!(f.engine.rate(), 250);
    assert_eq!(f.clock.active_tasks(), 0);
    assert!(!f.engine.is_running());
}

#[test]
fn test_status_notifications_follow_transitions() {
    let f = fixture();
    f.engine.start("x y", HighlightPosition::First, None).unwrap();
    f.clock.advance(PERIOD_300);
    f.engine.stop();
    f.engine.start("x y", HighlightPosition::First, None).unwrap();
    f.engine.reset();

    let statuses: Vec<Shown> = f
        .display
        .entries()
        .into_iter()
        .filter(|s| matches!(s, Shown::Status(..)))
        .collect();
    assert_eq!(
        statuses,
        vec![
            Shown::Status(ReaderStatus::Idle, ReaderStatus::Running),
            Shown::Status(ReaderStatus::Running, ReaderStatus::Idle),
            Shown::Status(ReaderStatus::Idle, ReaderStatus::Running),
            Shown::Status(ReaderStatus::Running, ReaderStatus::Idle),
        ]
    );
}

#[test]
fn test_dropping_engine_cancels_timer() {
    let f = fixture();
    f.engine.start(TEXT, HighlightPosition::First, None).unwrap();
    let clock = f.clock.clone();
    drop(f.engine);

    assert_eq!(clock.active_tasks(), 0);
    clock.advance(PERIOD_300 * 5);
    assert!(f.display.words().is_empty());
}

struct Brackets;

impl crate::chunker::Emphasis for Brackets {
    fn emphasize(&self, ch: char, out: &mut String) {
        out.push('[');
        out.push(ch);
        out.push(']');
    }
}

#[test]
fn test_custom_emphasis_renders_displayed_words() {
    use crate::display::{BroadcastDisplay, DisplayContent};
    use rsvp_common::events::EventBus;

    let clock = ManualScheduler::new();
    let display = Arc::new(BroadcastDisplay::new(EventBus::new(8), "ready"));
    let engine = ReaderEngine::with_emphasis(
        EngineConfig::default(),
        Arc::new(clock.clone()),
        display.clone(),
        Arc::new(Brackets),
    );

    engine.start("radar", HighlightPosition::Middle, None).unwrap();
    clock.advance(PERIOD_300);

    assert_eq!(
        display.current(),
        DisplayContent::Word {
            index: 0,
            total: 1,
            markup: "ra[d]ar".to_string(),
        }
    );
}
