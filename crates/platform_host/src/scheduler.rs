//! Timer scheduling contracts with explicit cancellation handles.
//!
//! Runtime controllers register one-shot and periodic tasks through [`TaskScheduler`] and keep
//! the returned [`TaskHandle`] so they can cancel on unmount. [`ManualScheduler`] drives the same
//! contract from a virtual clock for tests.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::time::Clock;

/// Cancellation handle for a scheduled task.
///
/// Dropping the handle leaves the task scheduled; call [`Self::cancel`] to clear it.
pub struct TaskHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TaskHandle {
    /// Wraps the host-specific cancellation routine.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Clears the task. Cancelling a task that already fired is a no-op.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Host timer facility.
pub trait TaskScheduler {
    /// Runs `task` once after `delay_ms`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host has no timer capability.
    fn schedule_once(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> Result<TaskHandle, String>;

    /// Runs `task` every `period_ms` until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error when the host has no timer capability.
    fn schedule_repeating(
        &self,
        period_ms: u64,
        task: Box<dyn FnMut()>,
    ) -> Result<TaskHandle, String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Scheduler for hosts without timers. Every registration fails.
pub struct NoopTaskScheduler;

impl TaskScheduler for NoopTaskScheduler {
    fn schedule_once(
        &self,
        _delay_ms: u64,
        _task: Box<dyn FnOnce()>,
    ) -> Result<TaskHandle, String> {
        Err("timers are unavailable on this host".to_string())
    }

    fn schedule_repeating(
        &self,
        _period_ms: u64,
        _task: Box<dyn FnMut()>,
    ) -> Result<TaskHandle, String> {
        Err("timers are unavailable on this host".to_string())
    }
}

enum ManualTask {
    Once(Box<dyn FnOnce()>),
    Repeating(Box<dyn FnMut()>),
}

struct ManualEntry {
    id: u64,
    due_ms: u64,
    period_ms: u64,
    task: ManualTask,
}

#[derive(Default)]
struct ManualInner {
    now_ms: u64,
    next_id: u64,
    entries: Vec<ManualEntry>,
    running: Option<u64>,
    running_cancelled: bool,
}

#[derive(Clone, Default)]
/// Deterministic scheduler and clock driven by [`Self::advance`].
///
/// Tasks fire in due-time order (registration order breaks ties) and the clock reads the due time
/// of the task being run, so callbacks observe the instant they were scheduled for.
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    /// Creates a scheduler whose clock starts at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        let scheduler = Self::default();
        scheduler.inner.borrow_mut().now_ms = now_ms;
        scheduler
    }

    /// Number of tasks still registered.
    pub fn pending_tasks(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Moves the clock forward by `ms`, firing every task that comes due on the way.
    pub fn advance(&self, ms: u64) {
        let target = self.inner.borrow().now_ms.saturating_add(ms);
        loop {
            let entry = {
                let mut inner = self.inner.borrow_mut();
                let next = inner
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due_ms <= target)
                    .min_by_key(|(_, entry)| (entry.due_ms, entry.id))
                    .map(|(index, _)| index);
                let Some(index) = next else {
                    break;
                };
                let entry = inner.entries.remove(index);
                inner.now_ms = inner.now_ms.max(entry.due_ms);
                inner.running = Some(entry.id);
                inner.running_cancelled = false;
                entry
            };

            let ManualEntry {
                id,
                due_ms,
                period_ms,
                task,
            } = entry;
            match task {
                ManualTask::Once(task) => {
                    task();
                    self.inner.borrow_mut().running = None;
                }
                ManualTask::Repeating(mut task) => {
                    task();
                    let mut inner = self.inner.borrow_mut();
                    inner.running = None;
                    if !inner.running_cancelled {
                        inner.entries.push(ManualEntry {
                            id,
                            due_ms: due_ms + period_ms,
                            period_ms,
                            task: ManualTask::Repeating(task),
                        });
                    }
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.now_ms = inner.now_ms.max(target);
    }

    fn register(&self, delay_ms: u64, period_ms: u64, task: ManualTask) -> TaskHandle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let due_ms = inner.now_ms.saturating_add(delay_ms);
            inner.entries.push(ManualEntry {
                id,
                due_ms,
                period_ms,
                task,
            });
            id
        };
        let inner: Weak<RefCell<ManualInner>> = Rc::downgrade(&self.inner);
        TaskHandle::new(move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut inner = inner.borrow_mut();
            inner.entries.retain(|entry| entry.id != id);
            if inner.running == Some(id) {
                inner.running_cancelled = true;
            }
        })
    }
}

impl TaskScheduler for ManualScheduler {
    fn schedule_once(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> Result<TaskHandle, String> {
        Ok(self.register(delay_ms, 0, ManualTask::Once(task)))
    }

    fn schedule_repeating(
        &self,
        period_ms: u64,
        task: Box<dyn FnMut()>,
    ) -> Result<TaskHandle, String> {
        let period_ms = period_ms.max(1);
        Ok(self.register(period_ms, period_ms, ManualTask::Repeating(task)))
    }
}

impl Clock for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }
}
