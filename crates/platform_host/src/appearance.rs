//! Color-scheme models plus the notifier and document-surface contracts used by the theme
//! resolver.

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashMap},
    rc::Rc,
};

/// Root attribute set while the light theme is active.
pub const THEME_DATA_ATTRIBUTE: &str = "data-theme";
/// Root class marking the dark theme.
pub const DARK_THEME_CLASS: &str = "dark-theme";
/// Root class marking the light theme.
pub const LIGHT_THEME_CLASS: &str = "light-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Two-valued color theme used for both explicit user choices and OS-reported preferences.
pub enum ThemePreference {
    /// Dark color scheme. Also the default when no host preference is observable.
    #[default]
    Dark,
    /// Light color scheme.
    Light,
}

impl ThemePreference {
    /// Returns the stable token persisted in preference storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Parses a persisted token. Only the exact lowercase tokens are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Maps a `prefers-color-scheme: dark` match result to a preference.
    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Returns the other theme.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Returns the document-root markers that reflect this theme.
    pub const fn root_markers(self) -> RootThemeMarkers {
        match self {
            Self::Light => RootThemeMarkers {
                data_theme: Some("light"),
                add_class: LIGHT_THEME_CLASS,
                remove_class: DARK_THEME_CLASS,
            },
            Self::Dark => RootThemeMarkers {
                data_theme: None,
                add_class: DARK_THEME_CLASS,
                remove_class: LIGHT_THEME_CLASS,
            },
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Attribute and class changes a surface applies to the document root for one theme.
pub struct RootThemeMarkers {
    /// Value for [`THEME_DATA_ATTRIBUTE`]; `None` removes the attribute.
    pub data_theme: Option<&'static str>,
    /// Class to add.
    pub add_class: &'static str,
    /// Class to remove.
    pub remove_class: &'static str,
}

/// Live registration returned by [`ColorSchemeService::subscribe`].
///
/// Dropping the value keeps the listener registered; call [`Self::unsubscribe`] to detach.
pub struct ColorSchemeSubscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl ColorSchemeSubscription {
    /// Wraps the host-specific detach routine.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Subscription with nothing to detach.
    pub fn inert() -> Self {
        Self { detach: None }
    }

    /// Removes the listener from the host notifier.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for ColorSchemeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorSchemeSubscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Host notifier for the OS-level `prefers-color-scheme` signal.
pub trait ColorSchemeService {
    /// Returns whether the host currently prefers a dark color scheme.
    ///
    /// # Errors
    ///
    /// Returns an error when the media-query capability is unavailable.
    fn prefers_dark(&self) -> Result<bool, String>;

    /// Registers `listener` for preference changes. The listener receives the new
    /// "prefers dark" value.
    ///
    /// # Errors
    ///
    /// Returns an error when change notifications cannot be registered.
    fn subscribe(&self, listener: Rc<dyn Fn(bool)>) -> Result<ColorSchemeSubscription, String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Notifier for hosts without a media-query capability.
pub struct NoopColorSchemeService;

impl ColorSchemeService for NoopColorSchemeService {
    fn prefers_dark(&self) -> Result<bool, String> {
        Err("prefers-color-scheme is unavailable on this host".to_string())
    }

    fn subscribe(&self, _listener: Rc<dyn Fn(bool)>) -> Result<ColorSchemeSubscription, String> {
        Ok(ColorSchemeSubscription::inert())
    }
}

#[derive(Default)]
struct MemoryColorSchemeInner {
    prefers_dark: Option<bool>,
    next_listener_id: u64,
    listeners: Vec<(u64, Rc<dyn Fn(bool)>)>,
}

#[derive(Clone, Default)]
/// In-memory notifier whose preference is driven by the caller.
///
/// A notifier built with [`Default`] behaves as an unavailable capability until
/// [`Self::set_prefers_dark`] is called.
pub struct MemoryColorSchemeService {
    inner: Rc<RefCell<MemoryColorSchemeInner>>,
}

impl MemoryColorSchemeService {
    /// Creates a notifier reporting `preference`.
    pub fn new(preference: ThemePreference) -> Self {
        let service = Self::default();
        service.inner.borrow_mut().prefers_dark = Some(preference == ThemePreference::Dark);
        service
    }

    /// Updates the reported preference and notifies every registered listener.
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        let listeners: Vec<Rc<dyn Fn(bool)>> = {
            let mut inner = self.inner.borrow_mut();
            inner.prefers_dark = Some(prefers_dark);
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(prefers_dark);
        }
    }

    /// Returns the number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl ColorSchemeService for MemoryColorSchemeService {
    fn prefers_dark(&self) -> Result<bool, String> {
        self.inner
            .borrow()
            .prefers_dark
            .ok_or_else(|| "prefers-color-scheme is unavailable".to_string())
    }

    fn subscribe(&self, listener: Rc<dyn Fn(bool)>) -> Result<ColorSchemeSubscription, String> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, listener));
            id
        };
        let inner = Rc::downgrade(&self.inner);
        Ok(ColorSchemeSubscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        }))
    }
}

/// Document styling surface: theme markers on the root element and computed styling values.
pub trait DocumentSurface {
    /// Applies the root attribute/class markers for `theme`.
    ///
    /// # Errors
    ///
    /// Returns an error when no document root is available.
    fn apply_theme(&self, theme: ThemePreference) -> Result<(), String>;

    /// Reads a computed CSS custom property (for example `--max-emojis`) from the document root.
    fn css_custom_property(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Surface for hosts without a document.
pub struct NoopDocumentSurface;

impl DocumentSurface for NoopDocumentSurface {
    fn apply_theme(&self, _theme: ThemePreference) -> Result<(), String> {
        Ok(())
    }

    fn css_custom_property(&self, _name: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Default)]
struct MemoryDocumentInner {
    data_theme: Option<String>,
    classes: BTreeSet<String>,
    custom_properties: HashMap<String, String>,
    applied: Vec<ThemePreference>,
}

#[derive(Debug, Clone, Default)]
/// In-memory document root recording theme markers and serving custom properties.
pub struct MemoryDocumentSurface {
    inner: Rc<RefCell<MemoryDocumentInner>>,
}

impl MemoryDocumentSurface {
    /// Sets a custom property value returned by [`DocumentSurface::css_custom_property`].
    pub fn set_custom_property(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .custom_properties
            .insert(name.to_string(), value.to_string());
    }

    /// Current `data-theme` attribute value.
    pub fn data_theme(&self) -> Option<String> {
        self.inner.borrow().data_theme.clone()
    }

    /// Returns whether the root currently carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.inner.borrow().classes.contains(class)
    }

    /// Every theme applied so far, in order.
    pub fn applied_themes(&self) -> Vec<ThemePreference> {
        self.inner.borrow().applied.clone()
    }
}

impl DocumentSurface for MemoryDocumentSurface {
    fn apply_theme(&self, theme: ThemePreference) -> Result<(), String> {
        let markers = theme.root_markers();
        let mut inner = self.inner.borrow_mut();
        inner.data_theme = markers.data_theme.map(str::to_string);
        inner.classes.remove(markers.remove_class);
        inner.classes.insert(markers.add_class.to_string());
        inner.applied.push(theme);
        Ok(())
    }

    fn css_custom_property(&self, name: &str) -> Option<String> {
        self.inner.borrow().custom_properties.get(name).cloned()
    }
}
