//! One-shot timers with explicit cancellation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::warn;

use crate::clock::{Clock, ManualClock};
use crate::config::millis;

/// Work run when a timer fires.
pub type TimerTask = Box<dyn FnOnce() + Send>;

/// Cancel handle for a scheduled task. Clones refer to the same timer.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    /// Create a live handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prevent the task from running. Idempotent; a no-op after it fired.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs a task once after a delay.
pub trait Scheduler: Send + Sync {
    /// Run `task` after `delay` unless the returned handle is cancelled first.
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Scheduler that sleeps on a dedicated thread per timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle::new();
        let timer = handle.clone();

        let spawned = thread::Builder::new()
            .name("geotag-timer".to_owned())
            .spawn(move || {
                futures::executor::block_on(futures_timer::Delay::new(delay));
                if !timer.is_cancelled() {
                    task();
                }
            });

        if let Err(err) = spawned {
            warn!("failed to spawn timer thread, timer will not fire: {err}");
            handle.cancel();
        }
        handle
    }
}

struct PendingTimer {
    due_ms: u64,
    handle: TimerHandle,
    task: TimerTask,
}

/// Scheduler driven by a [`ManualClock`]; timers fire from [`fire_due`](Self::fire_due).
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: ManualClock,
    pending: Arc<Mutex<Vec<PendingTimer>>>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now_ms", &self.clock.now_ms())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl ManualScheduler {
    /// Create a scheduler that reads `clock` for due times.
    #[must_use]
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            pending: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PendingTimer>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Timers neither fired nor cancelled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|timer| !timer.handle.is_cancelled())
            .count()
    }

    /// Run every live timer due at the clock's current time, earliest first.
    /// Returns how many ran.
    pub fn fire_due(&self) -> usize {
        let now = self.clock.now_ms();
        let mut due = {
            let mut pending = self.lock();
            pending.retain(|timer| !timer.handle.is_cancelled());
            let (due, later): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|timer| timer.due_ms <= now);
            *pending = later;
            due
        };
        due.sort_by_key(|timer| timer.due_ms);

        let mut fired = 0;
        for timer in due {
            // A task that ran earlier in this batch may have cancelled this one.
            if !timer.handle.is_cancelled() {
                (timer.task)();
                fired += 1;
            }
        }
        fired
    }

    /// Advance the clock and fire whatever became due.
    pub fn advance(&self, by: Duration) -> usize {
        self.clock.advance(by);
        self.fire_due()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle::new();
        self.lock().push(PendingTimer {
            due_ms: self.clock.now_ms().saturating_add(millis(delay)),
            handle: handle.clone(),
            task,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_task(counter: &Arc<AtomicUsize>) -> TimerTask {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_manual_timer_fires_when_due() {
        let scheduler = ManualScheduler::new(ManualClock::new(0));
        let counter = Arc::new(AtomicUsize::new(0));
        scheduler.schedule_once(Duration::from_secs(60), counter_task(&counter));

        assert_eq!(scheduler.advance(Duration::from_secs(59)), 0);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.advance(Duration::from_secs(1)), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let scheduler = ManualScheduler::new(ManualClock::new(0));
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule_once(Duration::from_secs(1), counter_task(&counter));
        handle.cancel();
        handle.cancel();

        assert_eq!(scheduler.advance(Duration::from_secs(5)), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_thread_scheduler_fires() {
        let (tx, rx) = std::sync::mpsc::channel();
        ThreadScheduler.schedule_once(
            Duration::from_millis(10),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_thread_scheduler_respects_cancel() {
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = ThreadScheduler.schedule_once(
            Duration::from_millis(50),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        handle.cancel();
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }
}
