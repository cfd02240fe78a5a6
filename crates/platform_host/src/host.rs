//! Shared host-bundle model for browser and test runtime composition.

use std::rc::Rc;

use crate::{
    ColorSchemeService, DocumentSurface, ManualScheduler, MemoryColorSchemeService,
    MemoryDocumentSurface, MemoryPrefsStore, NoopColorSchemeService, NoopDocumentSurface,
    NoopPrefsStore, NoopTaskScheduler, PrefsStore, SystemClock, TaskScheduler, ThemePreference,
    time::Clock,
};

/// Runtime-selected host service bundle injected into the counter runtime.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `counter_runtime`, which keeps the widget logic decoupled from browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Lightweight preference store holding the persisted theme.
    pub prefs: Rc<dyn PrefsStore>,
    /// OS color-scheme preference notifier.
    pub color_scheme: Rc<dyn ColorSchemeService>,
    /// Document root styling surface.
    pub surface: Rc<dyn DocumentSurface>,
    /// Timer facility.
    pub scheduler: Rc<dyn TaskScheduler>,
    /// Millisecond clock.
    pub clock: Rc<dyn Clock>,
}

impl HostServices {
    /// Bundle with no capabilities: nothing persists, no timers fire, no system preference.
    pub fn unavailable() -> Self {
        Self {
            prefs: Rc::new(NoopPrefsStore),
            color_scheme: Rc::new(NoopColorSchemeService),
            surface: Rc::new(NoopDocumentSurface),
            scheduler: Rc::new(NoopTaskScheduler),
            clock: Rc::new(SystemClock),
        }
    }
}

/// In-memory host bundle with handles kept for driving and inspecting it from tests.
#[derive(Clone)]
pub struct MemoryHost {
    /// Shared preference store.
    pub prefs: MemoryPrefsStore,
    /// Caller-driven color-scheme notifier.
    pub color_scheme: MemoryColorSchemeService,
    /// Recording document surface.
    pub surface: MemoryDocumentSurface,
    /// Virtual clock and scheduler.
    pub scheduler: ManualScheduler,
}

impl MemoryHost {
    /// Creates an in-memory host reporting `system` as the OS preference, clock at `now_ms`.
    pub fn new(system: ThemePreference, now_ms: u64) -> Self {
        Self {
            prefs: MemoryPrefsStore::default(),
            color_scheme: MemoryColorSchemeService::new(system),
            surface: MemoryDocumentSurface::default(),
            scheduler: ManualScheduler::starting_at(now_ms),
        }
    }

    /// Builds the trait-object bundle sharing this host's state.
    pub fn services(&self) -> HostServices {
        HostServices {
            prefs: Rc::new(self.prefs.clone()),
            color_scheme: Rc::new(self.color_scheme.clone()),
            surface: Rc::new(self.surface.clone()),
            scheduler: Rc::new(self.scheduler.clone()),
            clock: Rc::new(self.scheduler.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_host_services_share_state_with_handles() {
        let host = MemoryHost::new(ThemePreference::Light, 42);
        let services = host.services();

        block_on(services.prefs.save_pref("k", "dark")).expect("save");
        assert_eq!(host.prefs.peek("k"), Some("dark".to_string()));
        assert_eq!(services.clock.now_ms(), 42);
        assert_eq!(services.color_scheme.prefers_dark(), Ok(false));

        host.scheduler.advance(8);
        assert_eq!(services.clock.now_ms(), 50);
    }

    #[test]
    fn unavailable_host_degrades_every_capability() {
        let services = HostServices::unavailable();
        assert!(services.color_scheme.prefers_dark().is_err());
        assert!(services.scheduler.schedule_once(1, Box::new(|| {})).is_err());
        assert_eq!(services.surface.css_custom_property("--max-emojis"), None);
    }
}
