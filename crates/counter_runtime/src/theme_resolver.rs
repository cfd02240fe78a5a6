//! Theme resolver: initial resolution, explicit choices, and live system-preference tracking.
//!
//! All host access (preference store, media query, document root) is absorbed here. Failures are
//! logged and degrade to in-memory behavior; nothing propagates to the caller except
//! [`ThemeError::InvalidTheme`] for out-of-range names, which is also logged.

use std::{cell::RefCell, rc::Rc};

use leptos::logging;
use platform_host::{
    ColorSchemeService, ColorSchemeSubscription, DocumentSurface, HostServices, PrefsStore,
    ThemePreference,
};

use crate::{
    host::{Spawner, StateListener},
    theme::{reduce_theme, resolve_initial, ThemeAction, ThemeEffect, ThemeError, ThemeState},
};

struct ResolverInner {
    state: RefCell<ThemeState>,
    prefs: Rc<dyn PrefsStore>,
    color_scheme: Rc<dyn ColorSchemeService>,
    surface: Rc<dyn DocumentSurface>,
    storage_key: String,
    listener: StateListener<ThemeState>,
    subscription: RefCell<Option<ColorSchemeSubscription>>,
}

#[derive(Clone)]
/// Shared handle to the effective theme.
pub struct ThemeResolver {
    inner: Rc<ResolverInner>,
}

impl ThemeResolver {
    /// Creates a resolver, reading the current system preference once.
    pub fn new(
        services: &HostServices,
        storage_key: impl Into<String>,
        listener: StateListener<ThemeState>,
    ) -> Self {
        let system = read_system_preference(services.color_scheme.as_ref());
        Self {
            inner: Rc::new(ResolverInner {
                state: RefCell::new(ThemeState::new(system)),
                prefs: services.prefs.clone(),
                color_scheme: services.color_scheme.clone(),
                surface: services.surface.clone(),
                storage_key: storage_key.into(),
                listener,
                subscription: RefCell::new(None),
            }),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> ThemeState {
        *self.inner.state.borrow()
    }

    /// Persisted theme if present and valid, otherwise the current system preference.
    pub async fn resolve_initial(&self) -> ThemePreference {
        let system = read_system_preference(self.inner.color_scheme.as_ref());
        match self.inner.prefs.load_pref(&self.inner.storage_key).await {
            Ok(persisted) => resolve_initial(persisted.as_deref(), system),
            Err(err) => {
                logging::warn!("failed to read theme preference: {err}");
                system
            }
        }
    }

    /// Resolves, applies, and marks the resolver initialized.
    pub async fn initialize(&self) {
        let resolved = self.resolve_initial().await;
        let _ = self.dispatch(ThemeAction::Initialize { resolved }).await;
    }

    /// Applies and persists an explicit choice.
    pub async fn set_theme(&self, theme: ThemePreference) {
        let _ = self.dispatch(ThemeAction::SetTheme(theme)).await;
    }

    /// Applies and persists an explicit choice given by name.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::InvalidTheme`] when `raw` is neither `dark` nor `light`; the theme is
    /// left unchanged. The returned error is the value logged as the warning, so its `Display`
    /// output (`invalid theme: <raw>`) is exactly the recorded message.
    pub async fn set_theme_named(&self, raw: &str) -> Result<(), ThemeError> {
        self.dispatch(ThemeAction::SetThemeNamed(raw.to_string()))
            .await
    }

    /// Switches to the opposite theme as an explicit choice.
    pub async fn toggle_theme(&self) {
        let _ = self.dispatch(ThemeAction::ToggleTheme).await;
    }

    /// Records a new system preference and follows it unless an explicit choice is persisted.
    ///
    /// Only a stored `dark`/`light` token counts as an explicit choice; empty or unknown values
    /// are ignored the same way initial resolution ignores them.
    pub async fn handle_system_change(&self, prefers_dark: bool) {
        let preference = ThemePreference::from_prefers_dark(prefers_dark);
        let pinned = match self.inner.prefs.load_pref(&self.inner.storage_key).await {
            Ok(persisted) => persisted
                .as_deref()
                .and_then(ThemePreference::parse)
                .is_some(),
            Err(err) => {
                logging::warn!("failed to read theme preference: {err}");
                false
            }
        };
        let _ = self
            .dispatch(ThemeAction::SystemPreferenceChanged { preference, pinned })
            .await;
    }

    /// Subscribes to system-preference changes; each change is handled on `spawner`.
    pub fn mount(&self, spawner: Spawner) {
        if self.inner.subscription.borrow().is_some() {
            return;
        }
        let resolver = Rc::downgrade(&self.inner);
        let listener = Rc::new(move |prefers_dark: bool| {
            let Some(inner) = resolver.upgrade() else {
                return;
            };
            let resolver = ThemeResolver { inner };
            spawner(Box::pin(async move {
                resolver.handle_system_change(prefers_dark).await;
            }));
        });
        match self.inner.color_scheme.subscribe(listener) {
            Ok(subscription) => *self.inner.subscription.borrow_mut() = Some(subscription),
            Err(err) => logging::warn!("failed to observe system color scheme: {err}"),
        }
    }

    /// Detaches the system-preference subscription.
    pub fn unmount(&self) {
        if let Some(subscription) = self.inner.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
    }

    async fn dispatch(&self, action: ThemeAction) -> Result<(), ThemeError> {
        let result = {
            let mut state = self.inner.state.borrow_mut();
            reduce_theme(&mut state, action).map(|effects| (*state, effects))
        };
        let (snapshot, effects) = match result {
            Ok(applied) => applied,
            Err(err) => {
                logging::warn!("{err}");
                return Err(err);
            }
        };
        (self.inner.listener)(&snapshot);

        for effect in effects {
            match effect {
                ThemeEffect::Apply(theme) => {
                    if let Err(err) = self.inner.surface.apply_theme(theme) {
                        logging::warn!("failed to apply theme `{theme}`: {err}");
                    }
                }
                ThemeEffect::Persist(theme) => {
                    if let Err(err) = self
                        .inner
                        .prefs
                        .save_pref(&self.inner.storage_key, theme.as_str())
                        .await
                    {
                        logging::warn!("failed to save theme preference: {err}");
                    }
                }
            }
        }
        Ok(())
    }
}

fn read_system_preference(service: &dyn ColorSchemeService) -> ThemePreference {
    match service.prefers_dark() {
        Ok(prefers_dark) => ThemePreference::from_prefers_dark(prefers_dark),
        Err(_) => ThemePreference::Dark,
    }
}
