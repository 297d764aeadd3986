//! Launch configuration.
//!
//! A [`VisualizerConfig`] supplies the starting parameter values and the
//! window, camera and bloom defaults. It is read once at start-up; nothing is
//! written back while the visualizer runs.
//!
//! Every section is optional in JSON:
//!
//! ```json
//! {
//!   "params": { "particle_count": 250000, "noise": 0.35 },
//!   "window": { "title": "figure8", "width": 1600, "height": 900 },
//!   "bloom": { "threshold": 0.1, "radius": 0.8 }
//! }
//! ```

use crate::error::ConfigError;
use crate::params::Params;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete launch configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub params: Params,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub bloom: BloomConfig,
}

/// Window title and initial logical size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "figure8".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Initial orbit camera placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the orbit target.
    pub distance: f32,
    /// Horizontal angle in radians.
    pub yaw: f32,
    /// Vertical angle in radians.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 5.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees: 60.0,
        }
    }
}

/// Bloom settings that are not live parameters. Strength comes from the
/// brightness parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Luminance above which pixels contribute to bloom.
    pub threshold: f32,
    /// Spread of the blur, 0 to 1.
    pub radius: f32,
    /// Horizontal + vertical blur pairs.
    pub blur_iterations: u32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            radius: 0.8,
            blur_iterations: 4,
        }
    }
}

impl VisualizerConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a configuration from a JSON file. Parameter values are clamped
    /// into their ranges.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.params = config.params.sanitized();
        Ok(config)
    }

    /// Load `path`, falling back to defaults with a warning when it is
    /// missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = VisualizerConfig::from_json("{}").unwrap();
        assert_eq!(config, VisualizerConfig::default());
        assert_eq!(config.params, Params::default());
        assert_eq!(config.camera.distance, 5.0);
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.bloom.threshold, 0.1);
        assert_eq!(config.bloom.radius, 0.8);
    }

    #[test]
    fn test_partial_sections() {
        let config = VisualizerConfig::from_json(
            r#"{ "params": { "particle_count": 2000 }, "window": { "width": 800 } }"#,
        )
        .unwrap();
        assert_eq!(config.params.particle_count, 2000);
        assert_eq!(config.params.noise, Params::default().noise);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn test_params_clamped_on_load() {
        let config = VisualizerConfig::from_json(
            r#"{ "params": { "particle_count": 0, "speed": 10.0, "noise": -1.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.params.particle_count, 100);
        assert_eq!(config.params.speed, 2.0);
        assert_eq!(config.params.noise, 0.0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = VisualizerConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure8.json");

        let mut config = VisualizerConfig::default();
        config.params.particle_count = 4000;
        config.window.title = "demo".into();
        config.save(&path).unwrap();

        assert_eq!(VisualizerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = VisualizerConfig::load_or_default(dir.path().join("nope.json"));
        assert_eq!(config, VisualizerConfig::default());
    }
}
