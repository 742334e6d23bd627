//! Timer scheduling.
//!
//! Timers are the only suspension mechanism in the behavior layer: a step
//! schedules its own continuation and returns. Everything runs on one thread,
//! so shared state is `Rc`/`RefCell` and tasks are plain `FnOnce` boxes.
//!
//! - [`Scheduler`] is the host seam (`window.setTimeout` in the browser).
//! - [`ManualScheduler`] is a virtual clock that only moves when told to,
//!   which makes every timed behavior testable without real time passing.
//! - [`Debouncer`] collapses bursts of calls into one delayed action.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Host timer facility.
pub trait Scheduler {
    /// Runs `task` once after `delay_ms` milliseconds.
    fn schedule(&self, delay_ms: u64, task: Task) -> TimerId;

    /// Cancels a pending task. Unknown or already-run ids are ignored.
    fn cancel(&self, id: TimerId);

    /// Current time in milliseconds on this scheduler's clock.
    fn now_ms(&self) -> u64;
}

// =============================================================================
// MANUAL SCHEDULER
// =============================================================================

#[derive(Default)]
struct ManualQueue {
    now: u64,
    next_seq: u64,
    /// Keyed by (due time, insertion sequence) so equal deadlines run FIFO.
    tasks: BTreeMap<(u64, u64), Task>,
}

/// Virtual-clock scheduler.
///
/// Clones share the same clock and queue. Tasks may schedule further tasks
/// while running; those run in the same `advance` call if they fall due
/// before its target time.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    /// Creates a scheduler with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.borrow().tasks.keys().next().map(|(due, _)| *due)
    }

    /// Moves the clock forward by `ms`, running every task that falls due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.queue.borrow().now.saturating_add(ms);
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        self.queue.borrow_mut().now = target;
        ran
    }

    /// Jumps the clock to the earliest pending task and runs it.
    ///
    /// Returns false if nothing was pending.
    pub fn run_next(&self) -> bool {
        match self.pop_due(u64::MAX) {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Removes the earliest task due at or before `target`, advancing the
    /// clock to its deadline. The borrow is released before the task runs.
    fn pop_due(&self, target: u64) -> Option<Task> {
        let mut queue = self.queue.borrow_mut();
        let key = *queue.tasks.keys().next()?;
        if key.0 > target {
            return None;
        }
        queue.now = queue.now.max(key.0);
        queue.tasks.remove(&key)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u64, task: Task) -> TimerId {
        let mut queue = self.queue.borrow_mut();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        let due = queue.now.saturating_add(delay_ms);
        queue.tasks.insert((due, seq), task);
        TimerId(seq)
    }

    fn cancel(&self, id: TimerId) {
        self.queue
            .borrow_mut()
            .tasks
            .retain(|(_, seq), _| *seq != id.0);
    }

    fn now_ms(&self) -> u64 {
        self.queue.borrow().now
    }
}

// =============================================================================
// DEBOUNCER
// =============================================================================

/// Runs an action only after `wait_ms` of quiet.
///
/// Each call cancels the previously scheduled action, so a burst of scroll
/// events produces a single update.
pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    wait_ms: u64,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl Debouncer {
    pub fn new(scheduler: Rc<dyn Scheduler>, wait_ms: u64) -> Self {
        Self {
            scheduler,
            wait_ms,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Schedules `action`, replacing any action still waiting.
    pub fn call(&self, action: impl FnOnce() + 'static) {
        self.cancel();
        let pending = Rc::clone(&self.pending);
        let id = self.scheduler.schedule(
            self.wait_ms,
            Box::new(move || {
                pending.set(None);
                action();
            }),
        );
        self.pending.set(Some(id));
    }

    /// Drops the waiting action, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }

    /// True while an action is waiting to run.
    pub fn is_pending(&self) -> bool {
        let id = self.pending.get();
        id.is_some()
    }
}
