//! Host wiring for the widget runtime: browser service bundle, timers, and task spawning.

use std::{cell::RefCell, rc::Rc, time::Duration};

use futures::future::LocalBoxFuture;
use leptos::{set_interval_with_handle, set_timeout_with_handle, spawn_local};
use platform_host::{HostServices, SystemClock, TaskHandle, TaskScheduler};
use platform_host_web::{color_scheme_service, document_surface, prefs_store};

/// Observer notified with a snapshot after every state change.
pub type StateListener<T> = Rc<dyn Fn(&T)>;

/// Runs a local future to completion on the host event loop.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// Longest delay browser timers accept (a signed 32-bit millisecond count).
pub const MAX_TIMER_DELAY_MS: u64 = i32::MAX as u64;

fn timer_duration(ms: u64) -> Duration {
    Duration::from_millis(ms.min(MAX_TIMER_DELAY_MS))
}

#[derive(Debug, Clone, Copy, Default)]
/// [`TaskScheduler`] backed by the browser timer functions Leptos wraps.
pub struct LeptosTaskScheduler;

impl TaskScheduler for LeptosTaskScheduler {
    fn schedule_once(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> Result<TaskHandle, String> {
        let handle = set_timeout_with_handle(task, timer_duration(delay_ms))
            .map_err(|e| format!("setTimeout failed: {e:?}"))?;
        Ok(TaskHandle::new(move || handle.clear()))
    }

    fn schedule_repeating(
        &self,
        period_ms: u64,
        task: Box<dyn FnMut()>,
    ) -> Result<TaskHandle, String> {
        let task = RefCell::new(task);
        let handle = set_interval_with_handle(
            move || (task.borrow_mut())(),
            timer_duration(period_ms),
        )
        .map_err(|e| format!("setInterval failed: {e:?}"))?;
        Ok(TaskHandle::new(move || handle.clear()))
    }
}

/// Browser host bundle: `localStorage`, `matchMedia`, the document root, and browser timers.
pub fn browser_host_services() -> HostServices {
    HostServices {
        prefs: Rc::new(prefs_store()),
        color_scheme: Rc::new(color_scheme_service()),
        surface: Rc::new(document_surface()),
        scheduler: Rc::new(LeptosTaskScheduler),
        clock: Rc::new(SystemClock),
    }
}

/// Spawner running futures on the Leptos local executor.
pub fn leptos_spawner() -> Spawner {
    Rc::new(|future: LocalBoxFuture<'static, ()>| spawn_local(future))
}
