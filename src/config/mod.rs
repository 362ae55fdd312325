//! Configuration file support for penflow.
//!
//! This module handles loading and validating input settings from the configuration file
//! located at `~/.config/penflow/config.toml`. Settings include pressure handling,
//! the tap filter, stylus quirks, touch gestures, palm rejection and button bindings.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{DeviceClassOption, TouchDisableMethod};
pub use types::{
    ButtonBinding, ButtonsConfig, HandRecognitionConfig, PressureConfig, StylusConfig,
    TapFilterConfig, TouchConfig, WindowConfig,
};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all input settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [pressure]
/// inference = true
/// multiplier = 1.2
///
/// [tap_filter]
/// enabled = true
/// max_duration_ms = 150
///
/// [touch]
/// drawing = true
/// zoom_start_threshold = 10.0
///
/// [buttons.mouse_right]
/// tool = "eraser"
///
/// [devices]
/// "Wacom Intuos S Pen" = "pen"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Pressure sensitivity, inference and filtering
    #[serde(default)]
    pub pressure: PressureConfig,

    /// Tap filter thresholds
    #[serde(default)]
    pub tap_filter: TapFilterConfig,

    /// Stylus quirks
    #[serde(default)]
    pub stylus: StylusConfig,

    /// Touchscreen drawing and gestures
    #[serde(default)]
    pub touch: TouchConfig,

    /// Palm rejection
    #[serde(default)]
    pub hand_recognition: HandRecognitionConfig,

    /// Canvas widget behaviour
    #[serde(default)]
    pub window: WindowConfig,

    /// Button to tool bindings
    #[serde(default)]
    pub buttons: ButtonsConfig,

    /// Per-device class overrides keyed by device name
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceClassOption>,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `pressure.multiplier`: 0.1 - 10.0
    /// - `pressure.minimum`: 0.0 - 1.0
    /// - `tap_filter.display_dpi`: 36 - 600
    /// - `tap_filter.max_distance_mm`: 0.0 - 50.0
    /// - `stylus.ignored_events`: 0 - 10
    /// - `touch.zoom_start_threshold`: 0.0 - 100.0
    /// - `hand_recognition.timeout_ms`: at least 500
    pub fn validate_and_clamp(&mut self) {
        if !(0.1..=10.0).contains(&self.pressure.multiplier) {
            log::warn!(
                "Invalid pressure multiplier {:.2}, clamping to 0.1-10.0 range",
                self.pressure.multiplier
            );
            self.pressure.multiplier = self.pressure.multiplier.clamp(0.1, 10.0);
        }

        if !(0.0..=1.0).contains(&self.pressure.minimum) {
            log::warn!(
                "Invalid minimum pressure {:.2}, clamping to 0.0-1.0 range",
                self.pressure.minimum
            );
            self.pressure.minimum = self.pressure.minimum.clamp(0.0, 1.0);
        }

        if !(36..=600).contains(&self.tap_filter.display_dpi) {
            log::warn!(
                "Invalid display_dpi {}, clamping to 36-600 range",
                self.tap_filter.display_dpi
            );
            self.tap_filter.display_dpi = self.tap_filter.display_dpi.clamp(36, 600);
        }

        if !(0.0..=50.0).contains(&self.tap_filter.max_distance_mm) {
            log::warn!(
                "Invalid tap max_distance_mm {:.1}, clamping to 0.0-50.0 range",
                self.tap_filter.max_distance_mm
            );
            self.tap_filter.max_distance_mm = self.tap_filter.max_distance_mm.clamp(0.0, 50.0);
        }

        if self.stylus.ignored_events > 10 {
            log::warn!(
                "Invalid stylus ignored_events {}, clamping to 0-10 range",
                self.stylus.ignored_events
            );
            self.stylus.ignored_events = 10;
        }

        if !(0.0..=100.0).contains(&self.touch.zoom_start_threshold) {
            log::warn!(
                "Invalid zoom_start_threshold {:.1}%, clamping to 0-100% range",
                self.touch.zoom_start_threshold
            );
            self.touch.zoom_start_threshold = self.touch.zoom_start_threshold.clamp(0.0, 100.0);
        }

        if self.hand_recognition.timeout_ms < 500 {
            log::warn!(
                "Hand recognition timeout {}ms is too short, using 500ms",
                self.hand_recognition.timeout_ms
            );
            self.hand_recognition.timeout_ms = 500;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/penflow/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("penflow");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file is missing.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        // Validate and clamp values to acceptable ranges
        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default location.
    ///
    /// Serializes the config to TOML format and writes it to `~/.config/penflow/config.toml`.
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory cannot be created
    /// - The config cannot be serialized to TOML
    /// - The file cannot be written
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Saves the configuration to `config_path`.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = self.to_toml()?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Creates a default configuration file with documentation comments.
    ///
    /// Writes the example config from `config.example.toml` to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A config file already exists at the target path
    /// - The config directory cannot be created
    /// - The file cannot be written
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        // Create directory
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&config_path, EXAMPLE_CONFIG)?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

/// Documented example configuration shipped with the crate.
pub const EXAMPLE_CONFIG: &str = include_str!("../../config.example.toml");
