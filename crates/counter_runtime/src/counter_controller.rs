//! Counter controller: runs the counter reducer and owns the pulse reset timers.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use leptos::logging;
use platform_host::{TaskHandle, TaskScheduler};

use crate::{
    counter::{reduce_counter, CounterAction, CounterEffect, CounterState},
    host::StateListener,
};

struct CounterInner {
    state: RefCell<CounterState>,
    scheduler: Rc<dyn TaskScheduler>,
    pulse_duration_ms: u64,
    listener: StateListener<CounterState>,
    pending_resets: RefCell<BTreeMap<u64, TaskHandle>>,
}

#[derive(Clone)]
/// Shared handle to the counter and its pulse window.
pub struct CounterController {
    inner: Rc<CounterInner>,
}

impl CounterController {
    /// Creates a controller starting at zero.
    pub fn new(
        scheduler: Rc<dyn TaskScheduler>,
        pulse_duration_ms: u64,
        listener: StateListener<CounterState>,
    ) -> Self {
        Self {
            inner: Rc::new(CounterInner {
                state: RefCell::new(CounterState::default()),
                scheduler,
                pulse_duration_ms,
                listener,
                pending_resets: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> CounterState {
        *self.inner.state.borrow()
    }

    /// Adds one.
    pub fn increment(&self) {
        self.dispatch(CounterAction::Increment);
    }

    /// Subtracts one, clamped at zero.
    pub fn decrement(&self) {
        self.dispatch(CounterAction::Decrement);
    }

    /// Sets the count to zero.
    pub fn reset(&self) {
        self.dispatch(CounterAction::Reset);
    }

    /// Cancels outstanding pulse timers.
    pub fn unmount(&self) {
        let pending = std::mem::take(&mut *self.inner.pending_resets.borrow_mut());
        for (_, handle) in pending {
            handle.cancel();
        }
    }

    fn dispatch(&self, action: CounterAction) {
        let (snapshot, effects) = {
            let mut state = self.inner.state.borrow_mut();
            let effects = reduce_counter(&mut state, action);
            (*state, effects)
        };
        (self.inner.listener)(&snapshot);

        for effect in effects {
            match effect {
                CounterEffect::SchedulePulseReset { generation } => {
                    self.schedule_pulse_reset(generation);
                }
            }
        }
    }

    fn schedule_pulse_reset(&self, generation: u64) {
        let weak: Weak<CounterInner> = Rc::downgrade(&self.inner);
        let scheduled = self.inner.scheduler.schedule_once(
            self.inner.pulse_duration_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.pending_resets.borrow_mut().remove(&generation);
                    CounterController { inner }
                        .dispatch(CounterAction::PulseElapsed { generation });
                }
            }),
        );
        match scheduled {
            Ok(handle) => {
                self.inner
                    .pending_resets
                    .borrow_mut()
                    .insert(generation, handle);
            }
            Err(err) => {
                logging::warn!("pulse reset timer unavailable: {err}");
                self.dispatch(CounterAction::PulseElapsed { generation });
            }
        }
    }
}
