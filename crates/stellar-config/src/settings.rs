//! Settings structs with renderer defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level renderer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Magnitude limits and brightness mapping.
    pub photometry: PhotometrySettings,
    /// Orbit path and label detail.
    pub detail: DetailOptions,
    /// Observer/camera defaults.
    pub observer: ObserverSettings,
    /// Debug/development settings.
    pub debug: DebugSettings,
}

/// Magnitude limits and the mapping from magnitudes to brightness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhotometrySettings {
    /// Scale magnitude limits with the field of view.
    pub auto_mag: bool,
    /// Faintest star magnitude rendered at a 45 degree field of view,
    /// when `auto_mag` is on.
    pub faintest_auto_mag_45deg: f64,
    /// Magnitude at which stars saturate to full brightness, at night,
    /// at a 45 degree field of view.
    pub saturation_mag_night: f64,
    /// Faintest star magnitude when `auto_mag` is off.
    pub faintest_mag: f64,
    /// Faintest solar-system body rendered as a point.
    pub faintest_planet_mag: f64,
    /// Ambient light level (0.0 - 1.0).
    pub ambient: f32,
    /// Tint illumination by stellar temperature.
    pub tinted_illumination: bool,
}

impl Default for PhotometrySettings {
    fn default() -> Self {
        Self {
            auto_mag: true,
            faintest_auto_mag_45deg: 8.5,
            saturation_mag_night: 1.0,
            faintest_mag: 6.0,
            faintest_planet_mag: 6.0,
            ambient: 0.1,
            tinted_illumination: false,
        }
    }
}

/// Orbit path and label detail options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetailOptions {
    /// Samples per orbital period when plotting orbit paths.
    pub orbit_path_sample_points: usize,
    /// How far past the current time the orbit window extends, as a
    /// fraction of the period.
    pub orbit_window_end: f64,
    /// Orbit window length in periods.
    pub orbit_periods_shown: f64,
    /// Fraction of the orbit window over which the trail fades in
    /// (0.0 disables fading).
    pub linear_fade_fraction: f64,
    /// Smallest projected orbit size, in pixels, worth drawing.
    pub min_orbit_size: f64,
    /// Smallest projected orbit size, in pixels, at which a body gets a
    /// label.
    pub min_orbit_size_for_label: f64,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            orbit_path_sample_points: 100,
            orbit_window_end: 0.5,
            orbit_periods_shown: 1.0,
            linear_fade_fraction: 0.0,
            min_orbit_size: 2.0,
            min_orbit_size_for_label: 20.0,
        }
    }
}

/// Observer/camera defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObserverSettings {
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
    /// Search radius for nearby stars, in light-years.
    pub near_star_radius_ly: f64,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            near_star_radius_ly: 1.0,
        }
    }
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugSettings {
    /// Log level override (e.g. "debug", "info", "warn").
    pub log_level: String,
    /// Log per-frame depth partition summaries.
    pub log_depth_partitions: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_depth_partitions: false,
        }
    }
}

/// Platform settings directory for the renderer, when one exists.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stellar"))
}

impl Settings {
    /// Load settings from the given directory, or create a default
    /// settings file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join("settings.ron");

        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(ConfigError::Read)?;
            let settings: Settings = ron::from_str(&contents).map_err(ConfigError::Parse)?;
            log::info!("Loaded settings from {}", path.display());
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save(config_dir)?;
            log::info!("Created default settings at {}", path.display());
            Ok(settings)
        }
    }

    /// Save settings to the given directory as `settings.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;

        let path = config_dir.join("settings.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_settings)` if the file changed,
    /// `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = config_dir.join("settings.ron");
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::Read)?;
        let new_settings: Settings = ron::from_str(&contents).map_err(ConfigError::Parse)?;

        if &new_settings != self {
            log::info!("Settings reloaded with changes");
            Ok(Some(new_settings))
        } else {
            Ok(None)
        }
    }
}
