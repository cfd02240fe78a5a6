//! Widget timing and sizing configuration.

use leptos::logging;
use serde::Deserialize;

/// `localStorage` key holding the explicit theme choice.
pub const THEME_STORAGE_KEY: &str = "counter-app-theme";
/// CSS custom property that may override the particle capacity.
pub const MAX_PARTICLES_PROPERTY: &str = "--max-emojis";
/// `<body>` attribute carrying an optional JSON [`WidgetConfig`] override.
pub const CONFIG_DATA_ATTRIBUTE: &str = "data-widget-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Constants driving the counter pulse, particle lifecycle, and theme persistence.
pub struct WidgetConfig {
    /// Length of the pulse window after each counter mutation.
    pub pulse_duration_ms: u64,
    /// Period of the ambient spawn timer.
    pub ambient_spawn_interval_ms: u64,
    /// Chance that one ambient tick spawns a particle.
    pub ambient_spawn_probability: f64,
    /// Period of the age sweep.
    pub sweep_interval_ms: u64,
    /// Particles older than this are removed by the sweep.
    pub max_particle_age_ms: u64,
    /// Capacity used when [`MAX_PARTICLES_PROPERTY`] is absent or unusable.
    pub default_max_particles: usize,
    /// Particles spawned per counter change.
    pub burst_size: usize,
    /// Delay between successive particles of one burst.
    pub burst_stagger_ms: u64,
    /// Preference key for the persisted theme.
    pub theme_storage_key: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            pulse_duration_ms: 200,
            ambient_spawn_interval_ms: 2_000,
            ambient_spawn_probability: 0.3,
            sweep_interval_ms: 5_000,
            max_particle_age_ms: 30_000,
            default_max_particles: 25,
            burst_size: 3,
            burst_stagger_ms: 100,
            theme_storage_key: THEME_STORAGE_KEY.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Parses an optional JSON override, keeping defaults for omitted fields.
    ///
    /// Malformed JSON is logged and ignored.
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(raw) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                logging::warn!("invalid widget config, using defaults: {err}");
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if !self.ambient_spawn_probability.is_finite() {
            self.ambient_spawn_probability = Self::default().ambient_spawn_probability;
        }
        self.ambient_spawn_probability = self.ambient_spawn_probability.clamp(0.0, 1.0);
        self.default_max_particles = self.default_max_particles.max(1);
        self.ambient_spawn_interval_ms = self.ambient_spawn_interval_ms.max(1);
        self.sweep_interval_ms = self.sweep_interval_ms.max(1);
        if self.theme_storage_key.trim().is_empty() {
            self.theme_storage_key = THEME_STORAGE_KEY.to_string();
        }
        self
    }
}

/// Resolves the particle capacity from the styling-layer value, falling back to `default`.
pub fn resolve_capacity(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|capacity| *capacity > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_or_blank_config_uses_defaults() {
        assert_eq!(WidgetConfig::from_json_or_default(None), WidgetConfig::default());
        assert_eq!(
            WidgetConfig::from_json_or_default(Some("  ")),
            WidgetConfig::default()
        );
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config = WidgetConfig::from_json_or_default(Some(
            r#"{"burstSize": 5, "defaultMaxParticles": 40}"#,
        ));
        assert_eq!(config.burst_size, 5);
        assert_eq!(config.default_max_particles, 40);
        assert_eq!(config.pulse_duration_ms, 200);
        assert_eq!(config.theme_storage_key, THEME_STORAGE_KEY);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        assert_eq!(
            WidgetConfig::from_json_or_default(Some("{burstSize: five")),
            WidgetConfig::default()
        );
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = WidgetConfig::from_json_or_default(Some(
            r#"{"ambientSpawnProbability": 4.0, "defaultMaxParticles": 0, "themeStorageKey": ""}"#,
        ));
        assert_eq!(config.ambient_spawn_probability, 1.0);
        assert_eq!(config.default_max_particles, 1);
        assert_eq!(config.theme_storage_key, THEME_STORAGE_KEY);
    }

    #[test]
    fn capacity_falls_back_when_styling_value_is_unusable() {
        assert_eq!(resolve_capacity(Some(" 12 "), 25), 12);
        assert_eq!(resolve_capacity(None, 25), 25);
        assert_eq!(resolve_capacity(Some(""), 25), 25);
        assert_eq!(resolve_capacity(Some("lots"), 25), 25);
        assert_eq!(resolve_capacity(Some("0"), 25), 25);
        assert_eq!(resolve_capacity(Some("-3"), 25), 25);
    }
}
