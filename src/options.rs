//! Centralized viewer configuration with TOML persistence.
//!
//! All sub-structs use `#[serde(default)]` so partial TOML files (e.g.
//! only overriding `[camera]`) work correctly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MiradorError;

/// Camera projection and gesture-sensitivity parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,
    /// World units of pan per pixel of drag.
    pub pan_speed: f32,
    /// World units of offset per wheel unit.
    pub zoom_speed: f32,
    /// World units of sectioning-plane travel per wheel unit.
    pub section_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            znear: 0.001,
            zfar: 1000.0,
            rotate_speed: 0.005,
            pan_speed: 0.005,
            zoom_speed: 0.005,
            section_speed: 0.001,
        }
    }
}

/// Clear and fallback colors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayOptions {
    /// Frame clear color (RGBA).
    pub background: [f32; 4],
    /// Color for meshes without an embedded one.
    pub default_color: [f32; 4],
    /// Color of the sectioning plane quad.
    pub section_color: [f32; 4],
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            background: [0.0, 0.0, 0.0, 0.0],
            default_color: [0.8, 0.8, 0.8, 1.0],
            section_color: [0.35, 0.45, 0.85, 0.5],
        }
    }
}

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ViewerOptions {
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Color options.
    pub display: DisplayOptions,
}

impl ViewerOptions {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::Io`] if the file cannot be read, or
    /// [`MiradorError::OptionsParse`] for malformed TOML.
    pub fn load(path: &Path) -> Result<Self, MiradorError> {
        let content = std::fs::read_to_string(path).map_err(MiradorError::Io)?;
        toml::from_str(&content).map_err(|e| MiradorError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::OptionsParse`] on serialization failure or
    /// [`MiradorError::Io`] on write failure.
    pub fn save(&self, path: &Path) -> Result<(), MiradorError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| MiradorError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(MiradorError::Io)?;
        }
        std::fs::write(path, content).map_err(MiradorError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = ViewerOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: ViewerOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let parsed: ViewerOptions = toml::from_str(
            r#"
            [camera]
            fov_degrees = 60.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.camera.fov_degrees, 60.0);
        assert_eq!(parsed.camera.znear, CameraOptions::default().znear);
        assert_eq!(parsed.display, DisplayOptions::default());
    }
}
