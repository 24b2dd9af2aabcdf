//! Configuration for calab runs.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::batch::BatchParams;
use crate::error::{Error, Result};
use crate::history::Retention;
use crate::registry::{registry, AutomatonOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub automaton: AutomatonConfig,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Which automaton to build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatonConfig {
    /// Registry name, e.g. `game_of_life`
    pub variant: String,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub options: AutomatonOptions,
}

/// Engine timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Milliseconds between steps
    pub speed_ms: u64,
    /// Steps per run (None = until stopped)
    #[serde(default)]
    pub max_generations: Option<u64>,
    /// How long `stop()` waits for the worker
    pub join_timeout_ms: u64,
}

/// Snapshot retention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Snapshots kept per automaton (0 = unbounded)
    pub max_snapshots: usize,
    /// Generations between snapshots during a run (0 = never)
    pub snapshot_interval: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Generations between statistics log lines
    pub stats_interval: u64,
    /// Generations between checkpoints (0 = final checkpoint only)
    pub checkpoint_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

/// Parameter sweep settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Steps per parameter set
    pub num_steps: u64,
    #[serde(default)]
    pub parameter_sets: Vec<BatchParams>,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            variant: "game_of_life".to_string(),
            width: 100,
            height: 100,
            options: AutomatonOptions::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_ms: 50,
            max_generations: None,
            join_timeout_ms: 2000,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: 100,
            snapshot_interval: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 50,
            checkpoint_interval: 0,
            log_level: "info".to_string(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_steps: 100,
            parameter_sets: Vec::new(),
        }
    }
}

impl HistoryConfig {
    pub fn retention(&self) -> Retention {
        match self.max_snapshots {
            0 => Retention::Unbounded,
            n => Retention::KeepLast(n),
        }
    }
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::Config(msg));

        if self.automaton.width == 0 || self.automaton.height == 0 {
            return invalid("automaton width and height must be > 0".to_string());
        }
        if !registry().contains(&self.automaton.variant) {
            return invalid(format!("unknown variant '{}'", self.automaton.variant));
        }
        if self.simulation.speed_ms == 0 {
            return invalid("speed_ms must be > 0".to_string());
        }
        if self.simulation.join_timeout_ms == 0 {
            return invalid("join_timeout_ms must be > 0".to_string());
        }
        if !LOG_LEVELS.contains(&self.logging.log_level.to_lowercase().as_str()) {
            return invalid(format!("unknown log level '{}'", self.logging.log_level));
        }
        for params in &self.batch.parameter_sets {
            if !registry().contains(&params.variant) {
                return invalid(format!("batch: unknown variant '{}'", params.variant));
            }
            if params.width == 0 || params.height == 0 {
                return invalid(format!("batch: {} has a zero dimension", params.variant));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calab.yaml");

        let mut config = Config::default();
        config.automaton.variant = "cyclic_ca".to_string();
        config.automaton.options = AutomatonOptions::new().with_cyclic(8, 2);
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.automaton.variant, "cyclic_ca");
        assert_eq!(loaded.automaton.options.num_states, Some(8));
        assert_eq!(loaded.simulation.speed_ms, 50);
    }

    #[test]
    fn test_optional_sections() {
        let yaml = "
automaton:
  variant: wireworld
  width: 64
  height: 32
simulation:
  speed_ms: 10
  join_timeout_ms: 500
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.retention(), Retention::KeepLast(100));
        assert_eq!(config.logging.log_level, "info");
        assert!(config.batch.parameter_sets.is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.automaton.variant = "von_neumann".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.logging.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.automaton.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unbounded_history() {
        let history = HistoryConfig {
            max_snapshots: 0,
            snapshot_interval: 0,
        };
        assert_eq!(history.retention(), Retention::Unbounded);
    }
}
