//! Motion and appearance settings
//!
//! Defaults match `consts`. Persisted as JSON: a file on native, LocalStorage
//! on the web.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_RADIUS, RADIUS, RESTITUTION_DIVISOR, SCALE_COEFFICIENT};

/// Errors loading or validating settings
#[derive(Debug)]
pub enum SettingsError {
    /// Settings file could not be read
    Io(std::io::Error),
    /// JSON was malformed
    Parse(serde_json::Error),
    /// A value is out of range
    Invalid(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to read settings: {}", e),
            SettingsError::Parse(e) => write!(f, "Failed to parse settings: {}", e),
            SettingsError::Invalid(msg) => write!(f, "Invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// Tunable motion/appearance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ball radius in pixels (sprite diameter is twice this)
    pub radius: f32,
    /// Amplifies raw displacement into screen pixels
    pub scale_coefficient: f32,
    /// Velocity divisor on each bounce (> 1 loses energy)
    pub restitution_divisor: f32,
    /// Negate the horizontal sensor axis
    pub invert_x: bool,
    /// RGBA color of the generated ball sprite
    pub ball_color: [u8; 4],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radius: RADIUS,
            scale_coefficient: SCALE_COEFFICIENT,
            restitution_divisor: RESTITUTION_DIVISOR,
            invert_x: true,
            ball_color: [255, 140, 40, 255],
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "accball_settings";

    /// Ball sprite diameter in whole pixels
    pub fn diameter(&self) -> u32 {
        (self.radius * 2.0).round() as u32
    }

    /// Reject values the integrator cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SettingsError::Invalid("radius must be positive"));
        }
        if self.radius > MAX_RADIUS {
            return Err(SettingsError::Invalid("radius exceeds the largest sprite size"));
        }
        if !(self.scale_coefficient.is_finite() && self.scale_coefficient > 0.0) {
            return Err(SettingsError::Invalid("scale_coefficient must be positive"));
        }
        if !(self.restitution_divisor.is_finite() && self.restitution_divisor > 0.0) {
            return Err(SettingsError::Invalid("restitution_divisor must be positive"));
        }
        Ok(())
    }

    /// Parse and validate settings JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let settings = Settings::default();
        assert_eq!(settings.radius, 150.0);
        assert_eq!(settings.diameter(), 300);
        assert_eq!(settings.scale_coefficient, 1000.0);
        assert_eq!(settings.restitution_divisor, 1.5);
        assert!(settings.invert_x);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "radius": 40.0, "invert_x": false }"#).unwrap();
        assert_eq!(settings.radius, 40.0);
        assert!(!settings.invert_x);
        assert_eq!(settings.scale_coefficient, SCALE_COEFFICIENT);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            restitution_divisor: 2.0,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Settings::from_json(r#"{ "restitution_divisor": 0.0 }"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "radius": -1.0 }"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json("not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_radius() {
        assert!(matches!(
            Settings::from_json(r#"{ "radius": 40000.0 }"#),
            Err(SettingsError::Invalid(_))
        ));
        let largest = Settings::from_json(r#"{ "radius": 1024.0 }"#).unwrap();
        assert_eq!(largest.diameter(), 2048);
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load_from("/nonexistent/accball.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
