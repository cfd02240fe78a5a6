//! Counter widget runtime: counter pulse, emoji particles, theme resolution, and the Leptos UI.

pub mod components;
pub mod config;
pub mod counter;
pub mod counter_controller;
pub mod host;
pub mod particle_manager;
pub mod particles;
pub mod runtime;
mod runtime_context;
pub mod shortcuts;
pub mod theme;
pub mod theme_resolver;

pub use components::{use_widget_runtime, CounterWidget, WidgetProvider, WidgetRuntimeContext};
pub use config::{WidgetConfig, CONFIG_DATA_ATTRIBUTE, MAX_PARTICLES_PROPERTY, THEME_STORAGE_KEY};
pub use counter::{reduce_counter, CounterAction, CounterEffect, CounterState};
pub use counter_controller::CounterController;
pub use host::{browser_host_services, leptos_spawner, LeptosTaskScheduler, Spawner, StateListener};
pub use particle_manager::EmojiParticleManager;
pub use particles::{Particle, ParticleField, ParticleId, RandomSource};
pub use runtime::{WidgetListeners, WidgetRuntime};
pub use shortcuts::{shortcut_for_key, WidgetShortcut};
pub use theme::{reduce_theme, ThemeAction, ThemeEffect, ThemeError, ThemeState};
pub use theme_resolver::ThemeResolver;
