//! Theme resolution state and reducer.

use platform_host::ThemePreference;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Effective theme plus the last observed system preference.
pub struct ThemeState {
    /// Theme applied to the document.
    pub theme: ThemePreference,
    /// Last OS-reported preference.
    pub system_preference: ThemePreference,
    /// Set once the initial resolution has been applied.
    pub initialized: bool,
}

impl ThemeState {
    /// Pre-initialization state for a host reporting `system_preference`.
    pub fn new(system_preference: ThemePreference) -> Self {
        Self {
            theme: ThemePreference::Dark,
            system_preference,
            initialized: false,
        }
    }

    /// Whether the effective theme is dark.
    pub fn is_dark(&self) -> bool {
        self.theme == ThemePreference::Dark
    }

    /// Whether the effective theme is light.
    pub fn is_light(&self) -> bool {
        self.theme == ThemePreference::Light
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(ThemePreference::Dark)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors returned by [`reduce_theme`].
pub enum ThemeError {
    /// A theme value outside `dark`/`light` was requested.
    #[error("invalid theme: {0}")]
    InvalidTheme(String),
}

/// Parses a requested theme name.
///
/// # Errors
///
/// Returns [`ThemeError::InvalidTheme`] for anything other than `dark` or `light`.
pub fn parse_theme(raw: &str) -> Result<ThemePreference, ThemeError> {
    ThemePreference::parse(raw).ok_or_else(|| ThemeError::InvalidTheme(raw.to_string()))
}

/// Picks the initial theme: a valid persisted value wins, otherwise the system preference.
pub fn resolve_initial(persisted: Option<&str>, system: ThemePreference) -> ThemePreference {
    persisted.and_then(ThemePreference::parse).unwrap_or(system)
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Actions accepted by [`reduce_theme`].
pub enum ThemeAction {
    /// Apply the initial resolution and mark the resolver initialized.
    Initialize {
        /// Result of [`resolve_initial`].
        resolved: ThemePreference,
    },
    /// Explicit user choice.
    SetTheme(ThemePreference),
    /// Explicit user choice by name; validated before use.
    SetThemeNamed(String),
    /// Explicit switch to the opposite theme.
    ToggleTheme,
    /// The OS preference changed.
    SystemPreferenceChanged {
        /// New OS preference.
        preference: ThemePreference,
        /// Whether an explicit choice is currently persisted.
        pinned: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_theme`].
pub enum ThemeEffect {
    /// Write the theme markers onto the document root.
    Apply(ThemePreference),
    /// Persist the theme as the explicit choice.
    Persist(ThemePreference),
}

fn choose(state: &mut ThemeState, theme: ThemePreference) -> Vec<ThemeEffect> {
    state.theme = theme;
    vec![ThemeEffect::Apply(theme), ThemeEffect::Persist(theme)]
}

/// Applies `action` to `state` and returns the side effects to run.
///
/// System-driven changes apply without persisting, so an unpinned theme keeps tracking the OS.
///
/// # Errors
///
/// Returns [`ThemeError::InvalidTheme`] for an unknown theme name; `state` is left untouched.
pub fn reduce_theme(
    state: &mut ThemeState,
    action: ThemeAction,
) -> Result<Vec<ThemeEffect>, ThemeError> {
    let effects = match action {
        ThemeAction::Initialize { resolved } => {
            state.theme = resolved;
            state.initialized = true;
            vec![ThemeEffect::Apply(resolved)]
        }
        ThemeAction::SetTheme(theme) => choose(state, theme),
        ThemeAction::SetThemeNamed(raw) => choose(state, parse_theme(&raw)?),
        ThemeAction::ToggleTheme => {
            let next = state.theme.opposite();
            choose(state, next)
        }
        ThemeAction::SystemPreferenceChanged { preference, pinned } => {
            state.system_preference = preference;
            if pinned {
                Vec::new()
            } else {
                state.theme = preference;
                vec![ThemeEffect::Apply(preference)]
            }
        }
    };
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn initial_resolution_prefers_valid_persisted_value() {
        assert_eq!(
            resolve_initial(None, ThemePreference::Light),
            ThemePreference::Light
        );
        assert_eq!(
            resolve_initial(Some("dark"), ThemePreference::Light),
            ThemePreference::Dark
        );
        assert_eq!(
            resolve_initial(Some("sepia"), ThemePreference::Light),
            ThemePreference::Light
        );
    }

    #[test]
    fn initialize_applies_without_persisting() {
        let mut state = ThemeState::new(ThemePreference::Light);
        let effects = reduce_theme(
            &mut state,
            ThemeAction::Initialize {
                resolved: ThemePreference::Light,
            },
        )
        .expect("initialize");

        assert!(state.initialized);
        assert!(state.is_light());
        assert_eq!(effects, vec![ThemeEffect::Apply(ThemePreference::Light)]);
    }

    #[test]
    fn explicit_choice_applies_and_persists() {
        let mut state = ThemeState::default();
        let effects =
            reduce_theme(&mut state, ThemeAction::SetThemeNamed("light".to_string()))
                .expect("set theme");
        assert_eq!(
            effects,
            vec![
                ThemeEffect::Apply(ThemePreference::Light),
                ThemeEffect::Persist(ThemePreference::Light)
            ]
        );

        let effects = reduce_theme(&mut state, ThemeAction::ToggleTheme).expect("toggle");
        assert!(state.is_dark());
        assert_eq!(effects[1], ThemeEffect::Persist(ThemePreference::Dark));
    }

    #[test]
    fn invalid_theme_name_leaves_state_unchanged() {
        let mut state = ThemeState::default();
        let before = state;
        let err = reduce_theme(&mut state, ThemeAction::SetThemeNamed("purple".to_string()))
            .expect_err("invalid theme");

        assert_eq!(err, ThemeError::InvalidTheme("purple".to_string()));
        assert_eq!(err.to_string(), "invalid theme: purple");
        assert_eq!(state, before);
    }

    #[test]
    fn system_change_tracks_only_while_unpinned() {
        let mut state = ThemeState::new(ThemePreference::Light);
        let _ = reduce_theme(
            &mut state,
            ThemeAction::Initialize {
                resolved: ThemePreference::Light,
            },
        );

        let effects = reduce_theme(
            &mut state,
            ThemeAction::SystemPreferenceChanged {
                preference: ThemePreference::Dark,
                pinned: false,
            },
        )
        .expect("system change");
        assert!(state.is_dark());
        assert_eq!(effects, vec![ThemeEffect::Apply(ThemePreference::Dark)]);

        let effects = reduce_theme(
            &mut state,
            ThemeAction::SystemPreferenceChanged {
                preference: ThemePreference::Light,
                pinned: true,
            },
        )
        .expect("system change");
        assert!(effects.is_empty());
        assert!(state.is_dark());
        assert_eq!(state.system_preference, ThemePreference::Light);
    }
}
