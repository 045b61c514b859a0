//! Configuration for robodash.
//!
//! Loaded from, in order of precedence (highest first):
//! 1. Environment variables prefixed with `ROBODASH_` (`ROBODASH_TIMER__DEFAULT_SECONDS=90`)
//! 2. TOML file at `~/.config/robodash/config.toml`
//! 3. Defaults

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::repository::default_data_dir;

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = "robodash";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub timer: TimerConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to `~/.robodash`.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub default_seconds: u32,
}

/// Logical drawing area for bar charts. Surfaces scale it to whatever they
/// actually have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    /// Most recent dates shown in date-based charts.
    pub max_points: usize,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_seconds: 120,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            padding: 60.0,
            max_points: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let config_file = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROBODASH_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timer.default_seconds == 0 {
            return Err(Error::ConfigValidation {
                message: "timer.default_seconds must be greater than 0".to_string(),
            });
        }

        let chart = &self.chart;
        if chart.padding < 0.0
            || chart.padding * 2.0 >= chart.width
            || chart.padding * 2.0 >= chart.height
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "chart.padding ({}) leaves no drawing area in {}x{}",
                    chart.padding, chart.width, chart.height
                ),
            });
        }

        if chart.max_points == 0 {
            return Err(Error::ConfigValidation {
                message: "chart.max_points must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timer.default_seconds, 120);
        assert_eq!(config.chart.max_points, 10);
    }

    #[test]
    fn test_zero_timer_rejected() {
        let mut config = Config::default();
        config.timer.default_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_padding_larger_than_area_rejected() {
        let mut config = Config::default();
        config.chart.padding = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[timer]\ndefault_seconds = 90\n\n[chart]\nmax_points = 5").unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.timer.default_seconds, 90);
        assert_eq!(config.chart.max_points, 5);
        assert_eq!(config.chart.width, 600.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let config = Config::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.timer.default_seconds, 120);
    }
}
