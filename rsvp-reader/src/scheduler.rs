//! Cancellable repeating tasks
//!
//! The reader engine never touches a global timer. It asks an injected
//! [`Scheduler`] for a repeating task and keeps the returned [`TaskHandle`];
//! dropping or cancelling the handle stops the task.
//!
//! Two schedulers are provided:
//! - [`TokioScheduler`]: production, backed by `tokio::time::interval`
//! - [`ManualScheduler`]: simulated clock advanced explicitly, for tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

/// Callback run on every period
pub type TickFn = Box<dyn FnMut() + Send + 'static>;

/// Shortest period a scheduler will honour
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Source of repeating tasks
pub trait Scheduler: Send + Sync {
    /// Run `task` every `period`, first run one period from now
    fn schedule_repeating(&self, period: Duration, task: TickFn) -> TaskHandle;
}

/// Ownership of one scheduled task
///
/// Cancellation is idempotent and happens on drop, so replacing or clearing
/// the handle is enough to stop the task.
#[derive(Debug)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Stop the task; no further runs start after this returns
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tokio scheduler
// ============================================================================

/// Scheduler spawning one tokio task per repeating timer
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime of the calling task
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, mut task: TickFn) -> TaskHandle {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let join = self.handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            // Late ticks shift the schedule instead of bursting to catch up
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                task();
            }
            trace!("Repeating task finished");
        });

        TaskHandle::new(cancelled, Some(join.abort_handle()))
    }
}

// ============================================================================
// Manual scheduler
// ============================================================================

/// Scheduler driven by a simulated clock
///
/// Time only moves when [`ManualScheduler::advance`] is called; due tasks run
/// synchronously on the caller's thread in due-time order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    tasks: Vec<ManualTask>,
}

struct ManualTask {
    id: u64,
    period: Duration,
    next_due: Duration,
    cancelled: Arc<AtomicBool>,
    // Taken out while the task runs so the clock lock is not held
    task: Option<TickFn>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn clock(&self) -> MutexGuard<'_, ManualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulated time elapsed since creation
    pub fn now(&self) -> Duration {
        self.clock().now
    }

    /// Number of scheduled tasks that have not been cancelled
    pub fn active_tasks(&self) -> usize {
        self.clock()
            .tasks
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::Acquire))
            .count()
    }

    /// Move the clock forward, running every task that falls due
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;

        loop {
            let (id, task) = {
                let mut clock = self.clock();
                clock.tasks.retain(|t| !t.cancelled.load(Ordering::Acquire));

                let next = clock
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.task.is_some() && t.next_due <= target)
                    .min_by_key(|(_, t)| (t.next_due, t.id))
                    .map(|(index, _)| index);

                let Some(index) = next else {
                    clock.now = target;
                    break;
                };

                let entry = &mut clock.tasks[index];
                let due = entry.next_due;
                entry.next_due += entry.period;
                let id = entry.id;
                let task = entry.task.take();
                clock.now = due;
                (id, task)
            };

            if let Some(mut task) = task {
                task();
                let mut clock = self.clock();
                if let Some(entry) = clock.tasks.iter_mut().find(|t| t.id == id) {
                    entry.task = Some(task);
                }
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, task: TickFn) -> TaskHandle {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut clock = self.clock();
        let id = clock.next_id;
        clock.next_id += 1;
        let next_due = clock.now + period;
        clock.tasks.push(ManualTask {
            id,
            period,
            next_due,
            cancelled: Arc::clone(&cancelled),
            task: Some(task),
        });

        TaskHandle::new(cancelled, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_task(counter: &Arc<AtomicUsize>) -> TickFn {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_manual_runs_once_per_period() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _handle = scheduler.schedule_repeating(Duration::from_millis(200), counter_task(&count));

        scheduler.advance(Duration::from_millis(199));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        scheduler.advance(Duration::from_millis(1000));
        assert_eq!(count.load(Ordering::SeqCst), 6);
        assert_eq!(scheduler.now(), Duration::from_millis(1200));
    }

    #[test]
    fn test_manual_cancel_stops_runs() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule_repeating(Duration::from_millis(100), counter_task(&count));

        scheduler.advance(Duration::from_millis(250));
        handle.cancel();
        scheduler.advance(Duration::from_millis(1000));

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_manual_drop_cancels() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule_repeating(Duration::from_millis(100), counter_task(&count));
        assert_eq!(scheduler.active_tasks(), 1);

        drop(handle);
        scheduler.advance(Duration::from_millis(500));

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_manual_task_may_schedule_from_inside() {
        let scheduler = ManualScheduler::new();
        let inner_handles = Arc::new(Mutex::new(Vec::new()));

        let sched = scheduler.clone();
        let handles = Arc::clone(&inner_handles);
        let _outer = scheduler.schedule_repeating(
            Duration::from_millis(100),
            Box::new(move || {
                let handle = sched.schedule_repeating(Duration::from_millis(50), Box::new(|| {}));
                handles.lock().unwrap().push(handle);
            }),
        );

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(scheduler.active_tasks(), 2);
    }

    #[test]
    fn test_zero_period_is_raised_to_minimum() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _handle = scheduler.schedule_repeating(Duration::ZERO, counter_task(&count));

        scheduler.advance(Duration::from_millis(5));
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_ticks_on_period() {
        let scheduler = TokioScheduler::current();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule_repeating(Duration::from_millis(200), counter_task(&count));

        tokio::time::sleep(Duration::from_millis(650)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(handle.is_cancelled());
    }
}
