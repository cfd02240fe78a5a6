//! Runtime provider and context wiring for the counter widget.
//!
//! This module owns the long-lived [`WidgetRuntime`], mirrors controller snapshots into reactive
//! signals, and ties timer/subscription lifetimes to the provider's reactive owner. UI
//! composition stays in [`crate::components`].

use std::rc::Rc;

use leptos::*;
use platform_host::HostServices;

use crate::{
    config::WidgetConfig,
    counter::CounterState,
    host::{browser_host_services, leptos_spawner},
    particles::{ParticleField, ParticleId},
    runtime::{WidgetListeners, WidgetRuntime},
    shortcuts::WidgetShortcut,
    theme::ThemeState,
};

#[derive(Clone, Copy)]
/// Leptos context for reading widget state and invoking widget operations.
pub struct WidgetRuntimeContext {
    /// Controllers behind the widget.
    pub runtime: StoredValue<WidgetRuntime>,
    /// Reactive counter snapshot.
    pub counter: RwSignal<CounterState>,
    /// Reactive particle field snapshot.
    pub particles: RwSignal<ParticleField>,
    /// Reactive theme snapshot.
    pub theme: RwSignal<ThemeState>,
}

impl WidgetRuntimeContext {
    /// Adds one to the count.
    pub fn increment(&self) {
        self.runtime.with_value(|runtime| runtime.counter().increment());
    }

    /// Subtracts one from the count, clamped at zero.
    pub fn decrement(&self) {
        self.runtime.with_value(|runtime| runtime.counter().decrement());
    }

    /// Sets the count to zero.
    pub fn reset(&self) {
        self.runtime.with_value(|runtime| runtime.counter().reset());
    }

    /// Flips emoji spawning.
    pub fn toggle_emojis(&self) {
        self.runtime
            .with_value(|runtime| runtime.handle_shortcut(WidgetShortcut::ToggleEmojis));
    }

    /// Switches to the opposite theme and persists the choice.
    pub fn toggle_theme(&self) {
        self.runtime.with_value(WidgetRuntime::toggle_theme);
    }

    /// Removes a clicked particle.
    pub fn remove_particle(&self, id: ParticleId) {
        self.runtime.with_value(|runtime| {
            runtime.particles().remove_particle(id);
        });
    }

    /// Handles a `KeyboardEvent.key` value. Returns whether the key was recognized.
    pub fn handle_key(&self, key: &str) -> bool {
        self.runtime.with_value(|runtime| runtime.handle_key(key))
    }
}

#[component]
/// Provides [`WidgetRuntimeContext`] to descendant components and starts the widget timers.
pub fn WidgetProvider(
    /// Injected host bundle; defaults to the browser services.
    #[prop(optional)]
    host_services: Option<HostServices>,
    /// Timing/size overrides; defaults to [`WidgetConfig::default`].
    #[prop(optional)]
    config: Option<WidgetConfig>,
    children: Children,
) -> impl IntoView {
    let services = host_services.unwrap_or_else(browser_host_services);
    let config = config.unwrap_or_default();

    let counter = create_rw_signal(CounterState::default());
    let particles = create_rw_signal(ParticleField::default());
    let theme = create_rw_signal(ThemeState::default());

    let listeners = WidgetListeners {
        counter: Rc::new(move |state: &CounterState| counter.set(*state)),
        particles: Rc::new(move |field: &ParticleField| particles.set(field.clone())),
        theme: Rc::new(move |state: &ThemeState| theme.set(*state)),
    };
    let widget = WidgetRuntime::new(
        &services,
        config,
        Box::new(fastrand::Rng::new()),
        leptos_spawner(),
        listeners,
    );
    theme.set(widget.theme().state());

    widget.mount();
    let mounted = widget.clone();
    on_cleanup(move || mounted.unmount());

    let runtime = WidgetRuntimeContext {
        runtime: store_value(widget),
        counter,
        particles,
        theme,
    };
    provide_context(runtime);

    children().into_view()
}

/// Returns the current [`WidgetRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`WidgetProvider`].
pub fn use_widget_runtime() -> WidgetRuntimeContext {
    use_context::<WidgetRuntimeContext>().expect("WidgetRuntimeContext not provided")
}
