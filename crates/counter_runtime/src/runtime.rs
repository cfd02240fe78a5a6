//! Widget runtime: the three controllers wired together over one host bundle.
//!
//! Counter changes flow into the particle manager (count-change bursts); the theme resolver is
//! independent and driven by mount-time initialization plus system-preference notifications.

use std::rc::Rc;

use platform_host::HostServices;

use crate::{
    config::WidgetConfig,
    counter::CounterState,
    counter_controller::CounterController,
    host::{Spawner, StateListener},
    particle_manager::EmojiParticleManager,
    particles::{ParticleField, RandomSource},
    shortcuts::{shortcut_for_key, WidgetShortcut},
    theme::ThemeState,
    theme_resolver::ThemeResolver,
};

/// Snapshot observers for each controller.
pub struct WidgetListeners {
    /// Called after every counter change.
    pub counter: StateListener<CounterState>,
    /// Called after every particle field change.
    pub particles: StateListener<ParticleField>,
    /// Called after every theme change.
    pub theme: StateListener<ThemeState>,
}

impl WidgetListeners {
    /// Listeners that ignore every notification.
    pub fn silent() -> Self {
        Self {
            counter: Rc::new(|_: &CounterState| {}),
            particles: Rc::new(|_: &ParticleField| {}),
            theme: Rc::new(|_: &ThemeState| {}),
        }
    }
}

#[derive(Clone)]
/// Counter, particle manager, and theme resolver sharing one host bundle.
pub struct WidgetRuntime {
    counter: CounterController,
    particles: EmojiParticleManager,
    theme: ThemeResolver,
    spawner: Spawner,
}

impl WidgetRuntime {
    /// Wires the controllers. No timers or subscriptions are registered until [`Self::mount`].
    pub fn new(
        services: &HostServices,
        config: WidgetConfig,
        rng: Box<dyn RandomSource>,
        spawner: Spawner,
        listeners: WidgetListeners,
    ) -> Self {
        let particles =
            EmojiParticleManager::new(services, config.clone(), rng, listeners.particles);
        let counter_listener = {
            let particles = particles.clone();
            let forward = listeners.counter;
            Rc::new(move |state: &CounterState| {
                forward(state);
                particles.observe_count(state.count);
            })
        };
        let counter = CounterController::new(
            services.scheduler.clone(),
            config.pulse_duration_ms,
            counter_listener,
        );
        let theme = ThemeResolver::new(services, config.theme_storage_key, listeners.theme);
        Self {
            counter,
            particles,
            theme,
            spawner,
        }
    }

    /// Counter controller.
    pub fn counter(&self) -> &CounterController {
        &self.counter
    }

    /// Particle manager.
    pub fn particles(&self) -> &EmojiParticleManager {
        &self.particles
    }

    /// Theme resolver.
    pub fn theme(&self) -> &ThemeResolver {
        &self.theme
    }

    /// Starts particle timers, subscribes to the system preference, and resolves the theme.
    pub fn mount(&self) {
        self.particles.mount();
        self.particles.observe_count(self.counter.state().count);
        self.theme.mount(self.spawner.clone());
        let theme = self.theme.clone();
        (self.spawner)(Box::pin(async move {
            theme.initialize().await;
        }));
    }

    /// Cancels every timer and detaches the system-preference subscription.
    pub fn unmount(&self) {
        self.counter.unmount();
        self.particles.unmount();
        self.theme.unmount();
    }

    /// Runs the operation bound to `shortcut`.
    pub fn handle_shortcut(&self, shortcut: WidgetShortcut) {
        match shortcut {
            WidgetShortcut::Increment => self.counter.increment(),
            WidgetShortcut::Decrement => self.counter.decrement(),
            WidgetShortcut::Reset => self.counter.reset(),
            WidgetShortcut::ToggleEmojis => {
                self.particles.toggle_enabled();
            }
        }
    }

    /// Handles a `KeyboardEvent.key` value. Returns whether the key was recognized.
    pub fn handle_key(&self, key: &str) -> bool {
        match shortcut_for_key(key) {
            Some(shortcut) => {
                self.handle_shortcut(shortcut);
                true
            }
            None => false,
        }
    }

    /// Switches to the opposite theme as an explicit choice.
    pub fn toggle_theme(&self) {
        let theme = self.theme.clone();
        (self.spawner)(Box::pin(async move {
            theme.toggle_theme().await;
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::{executor::LocalPool, future::LocalBoxFuture, task::LocalSpawnExt};
    use platform_host::{MemoryHost, ThemePreference};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::THEME_STORAGE_KEY, particles::tests::ScriptedRandom};

    fn pool_spawner(pool: &LocalPool) -> Spawner {
        let spawner = pool.spawner();
        Rc::new(move |future: LocalBoxFuture<'static, ()>| {
            spawner.spawn_local(future).expect("spawn on local pool");
        })
    }

    fn runtime(host: &MemoryHost, pool: &LocalPool) -> WidgetRuntime {
        WidgetRuntime::new(
            &host.services(),
            WidgetConfig::default(),
            Box::new(ScriptedRandom::new(vec![0.5], 7)),
            pool_spawner(pool),
            WidgetListeners::silent(),
        )
    }

    #[test]
    fn keyboard_drives_the_counter() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let pool = LocalPool::new();
        let widget = runtime(&host, &pool);

        for _ in 0..3 {
            assert!(widget.handle_key("ArrowUp"));
        }
        assert_eq!(widget.counter().state().count, 3);
        assert!(widget.handle_key("R"));
        assert_eq!(widget.counter().state().count, 0);
        assert!(widget.handle_key("ArrowDown"));
        assert_eq!(widget.counter().state().count, 0);
        assert!(!widget.handle_key("x"));
    }

    #[test]
    fn count_changes_schedule_staggered_bursts() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let pool = LocalPool::new();
        let widget = runtime(&host, &pool);
        widget.mount();

        widget.handle_key("ArrowUp");
        host.scheduler.advance(0);
        assert_eq!(widget.particles().field().len(), 1);
        host.scheduler.advance(200);
        assert_eq!(widget.particles().field().len(), 3);

        widget.handle_key("ArrowDown");
        widget.handle_key("ArrowDown");
        host.scheduler.advance(200);
        assert_eq!(widget.counter().state().count, 0);
        assert_eq!(widget.particles().field().len(), 6);
    }

    #[test]
    fn emoji_toggle_suppresses_bursts() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let pool = LocalPool::new();
        let widget = runtime(&host, &pool);
        widget.mount();

        assert!(widget.handle_key("e"));
        assert!(!widget.particles().enabled());
        widget.handle_key("ArrowUp");
        host.scheduler.advance(10_000);
        assert!(widget.particles().field().is_empty());

        widget.handle_key("E");
        assert!(widget.particles().enabled());
    }

    #[test]
    fn mount_initializes_theme_and_toggle_persists() {
        let host = MemoryHost::new(ThemePreference::Light, 0);
        let mut pool = LocalPool::new();
        let widget = runtime(&host, &pool);
        widget.mount();
        pool.run_until_stalled();

        let state = widget.theme().state();
        assert!(state.initialized);
        assert!(state.is_light());

        widget.toggle_theme();
        pool.run_until_stalled();
        assert!(widget.theme().state().is_dark());
        assert_eq!(host.prefs.peek(THEME_STORAGE_KEY), Some("dark".to_string()));
    }

    #[test]
    fn listeners_see_every_controller_change() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let mut pool = LocalPool::new();
        let counts = Rc::new(RefCell::new(Vec::new()));
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let listeners = WidgetListeners {
            counter: {
                let counts = counts.clone();
                Rc::new(move |state: &CounterState| counts.borrow_mut().push(state.count))
            },
            particles: {
                let sizes = sizes.clone();
                Rc::new(move |field: &ParticleField| sizes.borrow_mut().push(field.len()))
            },
            theme: Rc::new(|_: &ThemeState| {}),
        };
        let widget = WidgetRuntime::new(
            &host.services(),
            WidgetConfig::default(),
            Box::new(ScriptedRandom::new(vec![0.5], 7)),
            pool_spawner(&pool),
            listeners,
        );
        widget.mount();
        pool.run_until_stalled();

        widget.handle_key("ArrowUp");
        host.scheduler.advance(200);
        assert_eq!(*counts.borrow(), vec![1, 1]);
        assert_eq!(*sizes.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn unmount_clears_every_timer_and_subscription() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let mut pool = LocalPool::new();
        let widget = runtime(&host, &pool);
        widget.mount();
        pool.run_until_stalled();
        widget.handle_key("ArrowUp");
        assert!(host.scheduler.pending_tasks() > 0);
        assert_eq!(host.color_scheme.listener_count(), 1);

        widget.unmount();
        assert_eq!(host.scheduler.pending_tasks(), 0);
        assert_eq!(host.color_scheme.listener_count(), 0);
    }
}
