use crate::{WebColorSchemeService, WebDocumentSurface, WebPrefsStore};

/// Returns the browser preference store.
pub fn prefs_store() -> WebPrefsStore {
    WebPrefsStore
}

/// Returns the browser `prefers-color-scheme` notifier.
pub fn color_scheme_service() -> WebColorSchemeService {
    WebColorSchemeService
}

/// Returns the browser document surface.
pub fn document_surface() -> WebDocumentSurface {
    WebDocumentSurface
}
