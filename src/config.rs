//! Configuration — tempo, key, dispatch, and layout settings from ~/.trkr/config.yaml.
//!
//! One `Config` value is built at startup and passed into the controller;
//! nothing reads configuration from global state afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tempo in beats per minute, used unless the song or the CLI sets one.
    pub tempo: u32,
    /// Key that toggles Editing mode.
    pub edit_key: char,
    /// Upper bound on generator calls running at the same time.
    pub max_in_flight: usize,
    /// Log file path; defaults to `<tmp>/trkr.log`.
    pub log_file: Option<PathBuf>,
    /// Name of a builtin theme.
    pub theme: Option<String>,
    pub view: ViewConfig,
}

/// Pattern layout on the render surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub origin_x: u16,
    pub origin_y: u16,
    /// Width of the note and velocity fields (right-aligned).
    pub field_width: usize,
    /// Drawn between note and velocity.
    pub event_delimiter: String,
    /// Drawn after each track column.
    pub track_delimiter: String,
    /// Drawn in place of a number for empty cells.
    pub placeholder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tempo: 120,
            edit_key: 'e',
            max_in_flight: 64,
            log_file: None,
            theme: None,
            view: ViewConfig::default(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            origin_x: 4,
            origin_y: 2,
            field_width: 4,
            event_delimiter: " \u{00B7}".to_string(),
            track_delimiter: " | ".to_string(),
            placeholder: "--".to_string(),
        }
    }
}

/// Default config path (~/.trkr/config.yaml).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".trkr").join("config.yaml"))
}

impl Config {
    /// Load from the default path; a missing file yields defaults.
    pub fn load() -> Result<Self, TrackerError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. The file must exist and parse.
    pub fn load_from(path: &Path) -> Result<Self, TrackerError> {
        let content = std::fs::read_to_string(path).map_err(|e| TrackerError::io(path, e))?;
        let config = Self::parse(&content).map_err(|e| TrackerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Reject values that cannot run.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.tempo == 0 {
            return Err(TrackerError::InvalidTempo(self.tempo));
        }
        Ok(())
    }

    /// Log file to use when none is given on the command line.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("trkr.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.tempo, 120);
        assert_eq!(config.edit_key, 'e');
        assert_eq!(config.view.field_width, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = Config::parse("tempo: 90\nview:\n  origin_x: 1\n").unwrap();
        assert_eq!(config.tempo, 90);
        assert_eq!(config.view.origin_x, 1);
        assert_eq!(config.view.origin_y, 2);
        assert_eq!(config.max_in_flight, 64);
    }

    #[test]
    fn zero_tempo_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tempo: 0").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(TrackerError::InvalidTempo(0))
        ));
    }

    #[test]
    fn bad_yaml_is_a_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tempo: [fast]").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(TrackerError::Config { .. })
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let result = Config::load_from(Path::new("/nonexistent/trkr/config.yaml"));
        assert!(matches!(result, Err(TrackerError::Io { .. })));
    }

    #[test]
    fn log_path_defaults_to_tmp() {
        let config = Config::default();
        assert!(config.log_path().ends_with("trkr.log"));
    }
}
