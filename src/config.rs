use crate::playback::PlaybackConfig;
use crate::simulation::SimulationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// How telemetry is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human readable status line
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_interval_ms: u64,
    pub animation_duration_ms: u64,
    pub frame_interval_ms: u64,
    pub autoplay: bool,
    pub output: OutputMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            animation_duration_ms: 1000,
            frame_interval_ms: 16,
            autoplay: false,
            output: OutputMode::Text,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("route-replay").join("settings.json"))
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => path,
            None => return Self::default(),
        };

        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        let loaded = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| {
                serde_json::from_str::<Settings>(&contents).map_err(anyhow::Error::from)
            });
        match loaded {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .context("No configuration directory available")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            playback: PlaybackConfig {
                tick_interval: Duration::from_millis(self.tick_interval_ms),
            },
            animation_duration: Duration::from_millis(self.animation_duration_ms),
            frame_interval: Duration::from_millis(self.frame_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("nope.json")));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"tick_interval_ms": 500, "output": "json"}"#).unwrap();

        let settings = Settings::load(Some(&path));
        assert_eq!(settings.tick_interval_ms, 500);
        assert_eq!(settings.output, OutputMode::Json);
        assert_eq!(settings.frame_interval_ms, 16);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(Some(&path)), Settings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            autoplay: true,
            animation_duration_ms: 750,
            ..Settings::default()
        };

        assert_eq!(settings.save(Some(&path)).unwrap(), path);
        assert_eq!(Settings::load(Some(&path)), settings);
    }

    #[test]
    fn test_simulation_config() {
        let config = Settings::default().simulation_config();
        assert_eq!(config.playback.tick_interval, Duration::from_millis(2000));
        assert_eq!(config.animation_duration, Duration::from_millis(1000));
        assert_eq!(config.frame_interval, Duration::from_millis(16));
    }
}
