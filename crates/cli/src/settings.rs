use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use facetrail_core::detection::infrastructure::onnx_yolo_detector::DEFAULT_CONFIDENCE;
use facetrail_core::pipeline::session_executor::SessionConfig;
use facetrail_core::shared::constants::{
    APP_DIR_NAME, DEFAULT_ABSENCE_THRESHOLD, DEFAULT_ALERT_POLL_MS, DEFAULT_ALERT_SOUND,
    DEFAULT_CANVAS_OUTPUT, DEFAULT_PLAYER, DEFAULT_RENDER_INTERVAL_MS, DEFAULT_SENSITIVITY,
    DEFAULT_SNAPSHOT_INTERVAL_MS, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH,
};
use facetrail_core::shared::point::SurfaceSize;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Persistent defaults for a session. Missing keys fall back to the
/// built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub surface_width: u32,
    pub surface_height: u32,
    pub sensitivity: f32,
    pub absence_threshold: u32,
    pub render_interval_ms: u64,
    pub alert_poll_ms: u64,
    pub alert_sound: PathBuf,
    pub player: PathBuf,
    /// Extra player arguments, placed before the sound path.
    pub player_args: Vec<String>,
    pub confidence: f64,
    pub canvas_output: PathBuf,
    pub snapshot_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
            sensitivity: DEFAULT_SENSITIVITY,
            absence_threshold: DEFAULT_ABSENCE_THRESHOLD,
            render_interval_ms: DEFAULT_RENDER_INTERVAL_MS,
            alert_poll_ms: DEFAULT_ALERT_POLL_MS,
            alert_sound: PathBuf::from(DEFAULT_ALERT_SOUND),
            player: PathBuf::from(DEFAULT_PLAYER),
            player_args: Vec::new(),
            confidence: DEFAULT_CONFIDENCE,
            canvas_output: PathBuf::from(DEFAULT_CANVAS_OUTPUT),
            snapshot_interval_ms: DEFAULT_SNAPSHOT_INTERVAL_MS,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Loads `explicit` if given, else the per-user settings file if one
    /// exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::config_path().filter(|p| p.is_file()) {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Range checks shared by every mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Surface size must be non-zero, got {}x{}",
                self.surface_width, self.surface_height
            )));
        }
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "Sensitivity must be a positive number, got {}",
                self.sensitivity
            )));
        }
        if self.absence_threshold == 0 {
            return Err(ConfigError::Invalid(
                "Absence threshold must be at least 1 frame".into(),
            ));
        }
        for (name, value) in [
            ("Render interval", self.render_interval_ms),
            ("Alert poll interval", self.alert_poll_ms),
            ("Snapshot interval", self.snapshot_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1 ms")));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::Invalid(format!(
                "Confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        Ok(())
    }

    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.surface_width, self.surface_height)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            surface_size: self.surface_size(),
            sensitivity: self.sensitivity,
            absence_threshold: self.absence_threshold,
            render_interval: Duration::from_millis(self.render_interval_ms),
            alert_poll_interval: Duration::from_millis(self.alert_poll_ms),
            alert_resource: self.alert_sound.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn write(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("settings.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_core_constants() {
        let settings = Settings::default();
        assert_eq!(settings.surface_size(), SurfaceSize::new(640, 480));
        assert_eq!(settings.absence_threshold, 10);
        assert_eq!(settings.session_config(), SessionConfig::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{ "sensitivity": 5.0, "player": "paplay" }"#);

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.sensitivity, 5.0);
        assert_eq!(settings.player, PathBuf::from("paplay"));
        assert!(settings.player_args.is_empty());
        assert_eq!(settings.surface_width, 640);
        assert_eq!(settings.alert_sound, PathBuf::from("alert.wav"));
    }

    #[test]
    fn test_player_args_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{ "player": "aplay", "player_args": ["-q"] }"#);

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.player_args, vec!["-q".to_string()]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{ "absence_threshold": "many" }"#);
        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid settings in"));
    }

    #[test]
    fn test_session_config_carries_values() {
        let settings = Settings {
            surface_width: 800,
            surface_height: 600,
            sensitivity: 2.0,
            absence_threshold: 4,
            render_interval_ms: 20,
            alert_poll_ms: 100,
            alert_sound: PathBuf::from("beep.wav"),
            ..Settings::default()
        };
        let config = settings.session_config();
        assert_eq!(config.surface_size, SurfaceSize::new(800, 600));
        assert_eq!(config.absence_threshold, 4);
        assert_eq!(config.render_interval, Duration::from_millis(20));
        assert_eq!(config.alert_poll_interval, Duration::from_millis(100));
        assert_eq!(config.alert_resource, PathBuf::from("beep.wav"));
    }

    #[rstest]
    #[case::zero_width(Settings { surface_width: 0, ..Settings::default() })]
    #[case::zero_sensitivity(Settings { sensitivity: 0.0, ..Settings::default() })]
    #[case::nan_sensitivity(Settings { sensitivity: f32::NAN, ..Settings::default() })]
    #[case::zero_threshold(Settings { absence_threshold: 0, ..Settings::default() })]
    #[case::zero_render(Settings { render_interval_ms: 0, ..Settings::default() })]
    #[case::zero_poll(Settings { alert_poll_ms: 0, ..Settings::default() })]
    #[case::zero_snapshot(Settings { snapshot_interval_ms: 0, ..Settings::default() })]
    #[case::confidence_high(Settings { confidence: 1.5, ..Settings::default() })]
    fn test_validate_rejects(#[case] settings: Settings) {
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }
}
