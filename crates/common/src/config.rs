//! Viewer configuration.
//!
//! Every field has a default so a partial YAML file is valid. The defaults
//! are the constants the viewer has always shipped with.

use crate::types::ClosedRange;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

/// Errors from loading or validating a [`ViewerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sensitivities for mapping device events to directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Radians of rotation per pixel of drag.
    pub rotate_sensitivity: f32,
    /// Camera distance change per unit of wheel delta.
    pub zoom_speed: f32,
    /// Camera pan distance per tick while a direction is held.
    pub move_speed: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            zoom_speed: 0.001,
            move_speed: 0.01,
        }
    }
}

/// Camera placement, limits and projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub initial_position: [f32; 3],
    /// Allowed range of the camera's z coordinate.
    pub distance_range: ClosedRange,
    /// Model pitch is clamped to `[-pitch_limit, pitch_limit]`.
    pub pitch_limit: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_position: [0.0, 0.75, 5.0],
            distance_range: ClosedRange::new(1.0, 20.0),
            pitch_limit: FRAC_PI_2,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn initial_position(&self) -> Vec3 {
        Vec3::from_array(self.initial_position)
    }

    pub fn pitch_range(&self) -> ClosedRange {
        ClosedRange::symmetric(self.pitch_limit)
    }
}

/// Single directional light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Position the light shines from; normalized before use.
    pub direction: [f32; 3],
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [5.0, 5.0, 5.0],
            intensity: 1.0,
        }
    }
}

impl LightConfig {
    pub fn direction(&self) -> Vec3 {
        let dir = Vec3::from_array(self.direction);
        if dir.length_squared() > 0.0 {
            dir.normalize()
        } else {
            Vec3::Y
        }
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub asset_path: PathBuf,
    pub input: InputConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from("./CesiumMan.gltf"),
            input: InputConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !cam.distance_range.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "camera.distance_range [{}, {}] is inverted or not finite",
                cam.distance_range.min, cam.distance_range.max
            )));
        }
        if !(cam.pitch_limit.is_finite() && cam.pitch_limit >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.pitch_limit must be non-negative, got {}",
                cam.pitch_limit
            )));
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        let input = &self.input;
        for (name, value) in [
            ("input.rotate_sensitivity", input.rotate_sensitivity),
            ("input.zoom_speed", input.zoom_speed),
            ("input.move_speed", input.move_speed),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_constants() {
        let config = ViewerConfig::default();
        assert_eq!(config.input.rotate_sensitivity, 0.005);
        assert_eq!(config.input.zoom_speed, 0.001);
        assert_eq!(config.input.move_speed, 0.01);
        assert_eq!(config.camera.initial_position(), Vec3::new(0.0, 0.75, 5.0));
        assert_eq!(config.camera.distance_range, ClosedRange::new(1.0, 20.0));
        assert_eq!(config.camera.pitch_limit, FRAC_PI_2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ViewerConfig::from_yaml("input:\n  move_speed: 0.05\n").unwrap();
        assert_eq!(config.input.move_speed, 0.05);
        assert_eq!(config.input.zoom_speed, 0.001);
        assert_eq!(config.camera.fov_degrees, 75.0);
    }

    #[test]
    fn inverted_range_rejected() {
        let yaml = "camera:\n  distance_range:\n    min: 20.0\n    max: 1.0\n";
        let err = ViewerConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_positive_speed_rejected() {
        let err = ViewerConfig::from_yaml("input:\n  zoom_speed: 0.0\n").unwrap_err();
        assert!(err.to_string().contains("input.zoom_speed"));
    }

    #[test]
    fn load_from_file_round_trip() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut config = ViewerConfig::default();
        config.asset_path = PathBuf::from("models/fox.gltf");
        std::fs::write(tmp.path(), config.to_yaml().unwrap()).unwrap();

        let loaded = ViewerConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn light_direction_is_normalized() {
        let dir = LightConfig::default().direction();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir.x - dir.y).abs() < 1e-6);
    }
}
