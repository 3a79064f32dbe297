//! Runner configuration.
//!
//! Loaded from `townsfolk.toml`; a missing or broken file falls back to
//! defaults with a warning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use townsfolk_common::TownsfolkError;
use townsfolk_sim::SimConfig;

/// Configuration file name.
pub const CONFIG_FILE: &str = "townsfolk.toml";

/// Errors raised by strict configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for this config
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be encoded
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<ConfigError> for TownsfolkError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other.to_string()),
        }
    }
}

/// Runner configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Run Settings ===
    /// Number of ticks to run
    pub ticks: u32,
    /// Real seconds per tick
    pub dt: f32,
    /// Optional RON schedule table replacing the built-in one
    pub schedule_path: Option<PathBuf>,
    /// Where to write a JSON snapshot after the run
    pub snapshot_path: Option<PathBuf>,

    // === Demo Settings ===
    /// Spawn the default valley population
    pub spawn_population: bool,
    /// Whether the scripted player steals at the market
    pub commit_theft: bool,
    /// Tick at which the theft happens
    pub theft_tick: u32,
    /// Pay off the bounty when the run ends
    pub pay_bounty: bool,
    /// Log every event instead of a summary
    pub log_events: bool,

    // === Simulation ===
    /// Simulation parameters
    pub sim: SimConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks: 3600,
            dt: 1.0 / 60.0,
            schedule_path: None,
            snapshot_path: None,

            spawn_population: true,
            commit_theft: true,
            theft_tick: 1200,
            pay_bounty: true,
            log_events: false,

            sim: SimConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a path.
    /// Returns defaults if the file is missing or invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::load_strict(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Loads configuration from a path, reporting every failure.
    pub fn load_strict<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut contents = String::new();
        fs::File::open(path)?.read_to_string(&mut contents)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to a path, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamps values to usable ranges.
    pub fn validate(&mut self) {
        if !(self.dt > 0.0 && self.dt <= 1.0) {
            warn!(dt = self.dt, "tick length out of range, using 1/60 s");
            self.dt = 1.0 / 60.0;
        }
        self.sim.validate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.ticks, 3600);
        assert!(config.spawn_population);
        assert_eq!(config.sim.time_scale, 2.0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.dt = 0.0;
        config.sim.cell_size = -1.0;
        config.validate();
        assert!((config.dt - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(config.sim.cell_size, 128.0);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.ticks = 42;
        config.commit_theft = false;
        config.sim.seed = 12345;
        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/townsfolk.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_partial_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "ticks = 10\n\n[sim]\nseed = 9\n").expect("write config");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.ticks, 10);
        assert_eq!(config.sim.seed, 9);
        assert_eq!(config.sim.near_range, 600.0);
    }

    #[test]
    fn test_config_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "ticks = \"many\"").expect("write config");

        assert!(matches!(
            EngineConfig::load_strict(&config_path),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }
}
