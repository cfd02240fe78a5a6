//! Typed host-domain contracts and shared models used across the counter runtime and browser
//! adapters.
//!
//! This crate is the API-first boundary for platform services. It exposes the preference store,
//! color-scheme notifier, document styling surface, clock, and task scheduler contracts, while
//! concrete browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod appearance;
pub mod host;
pub mod scheduler;
pub mod storage;
pub mod time;

pub use appearance::{
    ColorSchemeService, ColorSchemeSubscription, DocumentSurface, MemoryColorSchemeService,
    MemoryDocumentSurface, NoopColorSchemeService, NoopDocumentSurface, RootThemeMarkers,
    ThemePreference, DARK_THEME_CLASS, LIGHT_THEME_CLASS, THEME_DATA_ATTRIBUTE,
};
pub use host::{HostServices, MemoryHost};
pub use scheduler::{ManualScheduler, NoopTaskScheduler, TaskHandle, TaskScheduler};
pub use storage::prefs::{MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture};
pub use time::{unix_time_ms_now, Clock, SystemClock};
