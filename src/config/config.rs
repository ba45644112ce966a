// src/config/config.rs
use crate::miner::scheduler::{DEFAULT_CHUNK_SIZE, DEFAULT_WAVE_FACTOR, ResultOrder, SchedulerConfig};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the miner
///
/// Contains the hash function, worker pool sizing, and progress
/// reporting settings applied to every session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Hash function to use (e.g., "keccak256", "sha3-256")
    #[serde(default)]
    pub algorithm: AlgorithmType,

    /// Number of worker threads to use for mining
    /// (0 = number of CPU cores)
    #[serde(default)]
    pub worker_threads: usize,

    /// Counters each worker scans per chunk
    /// (default: 1000)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Chunks per worker dispatched in one wave
    /// (default: 10)
    #[serde(default = "default_wave_factor")]
    pub wave_factor: u64,

    /// Which solution a wave reports when several chunks hold one
    #[serde(default)]
    pub result_order: ResultOrder,

    /// Seconds between progress lines (0 = no progress reporting)
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_wave_factor() -> u64 {
    DEFAULT_WAVE_FACTOR
}

fn default_report_interval() -> u64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Config {
            algorithm: AlgorithmType::default(),
            worker_threads: 0,
            chunk_size: default_chunk_size(),
            wave_factor: default_wave_factor(),
            result_order: ResultOrder::default(),
            report_interval_secs: default_report_interval(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(MinerError)` - If file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::parse(&config_str)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates configuration text
    pub fn parse(config_str: &str) -> Result<Self, MinerError> {
        let config: Config = toml::from_str(config_str)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the scheduler cannot run with, including waves of
    /// more than `MAX_WAVE_CHUNKS` chunks
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.chunk_size == 0 {
            return Err(MinerError::ConfigError("chunk_size must be >= 1".into()));
        }
        if self.wave_factor == 0 {
            return Err(MinerError::ConfigError("wave_factor must be >= 1".into()));
        }
        self.scheduler_config().validate()
    }

    /// Worker count with `0` resolved to the available parallelism
    pub fn effective_workers(&self) -> usize {
        match self.worker_threads {
            0 => num_cpus::get(),
            n => n,
        }
    }

    /// Scheduler settings derived from this configuration
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            chunk_size: self.chunk_size,
            worker_count: self.effective_workers(),
            wave_factor: self.wave_factor,
            result_order: self.result_order,
        }
    }

    /// Progress interval, `None` when reporting is disabled
    pub fn report_interval(&self) -> Option<Duration> {
        match self.report_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Keccak Miner Configuration\n\n");
        template.push_str("# Supported algorithms: keccak256, sha3-256\n");
        template.push_str("algorithm = \"keccak256\"\n");
        template.push_str("# Number of worker threads (0 = auto-detect)\n");
        template.push_str("worker_threads = 0\n");
        template.push_str("# Counters scanned per chunk; smaller chunks cancel faster\n");
        template.push_str("chunk_size = 1000\n");
        template.push_str("# Chunks per worker dispatched between cancellation checks\n");
        template.push_str("wave_factor = 10\n");
        template.push_str("# Winning chunk in a wave: \"submission\" or \"completion\"\n");
        template.push_str("result_order = \"submission\"\n");
        template.push_str("# Seconds between progress lines (0 = disabled)\n");
        template.push_str("report_interval_secs = 1\n");
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let config = Config::parse(&Config::generate_template()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = Config::parse("worker_threads = 3\nresult_order = \"completion\"\n").unwrap();
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.result_order, ResultOrder::Completion);
        assert_eq!(config.report_interval(), Some(Duration::from_secs(1)));
        assert_eq!(config.scheduler_config().worker_count, 3);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(matches!(
            Config::parse("chunk_size = 0"),
            Err(MinerError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_oversized_waves() {
        let result = Config::parse("chunk_size = 1\nworker_threads = 2\nwave_factor = 1000000000000\n");
        assert!(matches!(result, Err(MinerError::ConfigError(_))));

        let widest = Config::parse("worker_threads = 64\nwave_factor = 1024\n").unwrap();
        assert_eq!(widest.scheduler_config().wave_chunks(), Some(65_536));
        assert!(Config::parse("worker_threads = 64\nwave_factor = 1025\n").is_err());
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(Config::parse("algorithm = \"scrypt\"").is_err());
    }

    #[test]
    fn zero_workers_means_all_cores() {
        let config = Config::default();
        assert_eq!(config.effective_workers(), num_cpus::get());
        let headless = Config {
            report_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(headless.report_interval(), None);
    }
}
