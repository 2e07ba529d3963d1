//! Render configuration.
//!
//! Everything the tracer needs besides the scene itself is passed in
//! through [`RenderConfig`]; there is no process-wide render state.

use crate::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a render configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which estimator a pixel sample uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Connect camera and light paths with shadow rays.
    #[default]
    Bidirectional,
    /// Local shading plus traced mirror reflections at the first hit.
    Direct,
}

/// How the bidirectional estimator builds its normalization sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Evaluate the camera vertex BRDF with the shadow direction of the
    /// previous connection (zero for the very first one).
    #[default]
    Legacy,
    /// Evaluate it with the shadow direction of the connection being made.
    CurrentDirection,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of vertices in a camera path
    pub camera_bounces: u32,
    /// Maximum number of bounces after the emitting vertex of a light path
    pub light_bounces: u32,
    /// Light paths traced from each light per estimate
    pub light_paths_per_light: u32,
    /// Recursion limit for mirror reflections in direct mode
    pub max_reflection_depth: u32,
    /// Color returned when nothing is hit or no estimate is possible
    pub background: Color,
    pub mode: RenderMode,
    pub normalization: Normalization,
    /// Maximum channel value written to PPM output
    pub color_gamut: u32,
    /// Seed for the render's random number generator
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            samples_per_pixel: 16,
            camera_bounces: 2,
            light_bounces: 2,
            light_paths_per_light: 1,
            max_reflection_depth: 3,
            background: Color::ZERO,
            mode: RenderMode::Bidirectional,
            normalization: Normalization::Legacy,
            color_gamut: 255,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations that cannot produce an image.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::Invalid("samples_per_pixel must be at least 1".into()));
        }
        if self.color_gamut == 0 {
            return Err(ConfigError::Invalid("color_gamut must be at least 1".into()));
        }
        Ok(())
    }
}
