//! Tunables of the per-tick snapshot loaded from TOML.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// Largest accepted spawn-slot registry capacity.
pub const MAX_ENEMY_CAPACITY: usize = 1 << 16;

/// Errors raised while loading or validating a [`HintsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read hints config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse hints config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value outside its accepted range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending key.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Snapshot tunables. Every key is optional and falls back to its default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HintsConfig {
    /// Fixed capacity of the spawn-slot enemy registry.
    pub enemy_capacity: usize,
    /// Misdirection threshold restored by every clear, in degrees.
    pub misdirection_threshold_degrees: f32,
    /// World units per pathfind grid cell.
    pub pathfind_resolution: f32,
    /// Half side of the square bound used until a producer installs another one.
    pub default_bounds_half_size: f32,
    /// Display half size, in pixels, used to derive the chordal error of new bounds.
    pub screen_half_size: f32,
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            enemy_capacity: 100,
            misdirection_threshold_degrees: 15.0,
            pathfind_resolution: 0.5,
            default_bounds_half_size: 30.0,
            screen_half_size: 300.0,
        }
    }
}

impl HintsConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ENEMY_CAPACITY).contains(&self.enemy_capacity) {
            return Err(ConfigError::Invalid {
                field: "enemy_capacity",
                reason: format!(
                    "expected a value within [1, {MAX_ENEMY_CAPACITY}], got {}",
                    self.enemy_capacity
                ),
            });
        }
        require_positive("pathfind_resolution", self.pathfind_resolution)?;
        require_positive("default_bounds_half_size", self.default_bounds_half_size)?;
        require_positive("screen_half_size", self.screen_half_size)?;
        if !self.misdirection_threshold_degrees.is_finite()
            || !(0.0..=180.0).contains(&self.misdirection_threshold_degrees)
        {
            return Err(ConfigError::Invalid {
                field: "misdirection_threshold_degrees",
                reason: format!(
                    "expected a value within [0, 180], got {}",
                    self.misdirection_threshold_degrees
                ),
            });
        }
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite positive number, got {value}"),
        })
    }
}
