//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate is the concrete browser-side wiring layer for the theme preference store
//! (`localStorage`), the `prefers-color-scheme` notifier (`matchMedia`), and the document root
//! styling surface. Every adapter compiles on non-wasm targets and degrades to the same
//! behavior as the `platform_host` no-op services there.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Concrete adapter factories for runtime wiring.
pub mod adapters;
pub mod color_scheme;
pub mod storage;
pub mod surface;

pub use adapters::{color_scheme_service, document_surface, prefs_store};
pub use color_scheme::{WebColorSchemeService, DARK_SCHEME_QUERY};
pub use storage::local_prefs::WebPrefsStore;
pub use surface::{body_attribute, WebDocumentSurface};
