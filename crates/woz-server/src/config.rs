//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// File holding the frequent-response collection, relative to the data dir.
pub const FREQUENT_RESPONSES_FILE: &str = "frequent_responses.json";

/// File holding the task-classification collection, relative to the data dir.
pub const TASK_CLASSIFICATIONS_FILE: &str = "task_classifications.json";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Directory holding the collection files.
    pub data_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Frames buffered per relay endpoint before new frames are dropped.
    pub relay_queue: usize,
    /// Log file written next to stdout output. `None` disables it.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `WOZ_ADDR` | Server bind address | `0.0.0.0:8000` |
    /// | `WOZ_DATA_DIR` | Directory for the JSON collection files | `.` |
    /// | `WOZ_STATIC_DIR` | Directory served under `/static` | `static` |
    /// | `WOZ_RELAY_QUEUE` | Frames buffered per relay endpoint | `64` |
    /// | `WOZ_LOG_FILE` | Log file path, empty to disable; startup fails if it cannot be opened | `wizard_of_oz.log` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("WOZ_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let data_dir = lookup("WOZ_DATA_DIR").unwrap_or_else(|| ".".to_string());
        let static_dir = lookup("WOZ_STATIC_DIR").unwrap_or_else(|| "static".to_string());

        let relay_queue = match lookup("WOZ_RELAY_QUEUE") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::InvalidRelayQueue(value))?,
            None => 64,
        };

        let log_file = match lookup("WOZ_LOG_FILE") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(PathBuf::from(value)),
            None => Some(PathBuf::from("wizard_of_oz.log")),
        };

        Ok(Self {
            addr,
            data_dir: PathBuf::from(data_dir),
            static_dir: PathBuf::from(static_dir),
            relay_queue,
            log_file,
        })
    }

    pub fn frequent_responses_path(&self) -> PathBuf {
        self.data_dir.join(FREQUENT_RESPONSES_FILE)
    }

    pub fn task_classifications_path(&self) -> PathBuf {
        self.data_dir.join(TASK_CLASSIFICATIONS_FILE)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid WOZ_ADDR format")]
    InvalidAddr,

    #[error("WOZ_RELAY_QUEUE must be a positive integer, got {0:?}")]
    InvalidRelayQueue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.relay_queue, 64);
        assert_eq!(
            config.frequent_responses_path(),
            PathBuf::from("./frequent_responses.json")
        );
        assert_eq!(config.log_file, Some(PathBuf::from("wizard_of_oz.log")));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("WOZ_ADDR", "127.0.0.1:9000"),
            ("WOZ_DATA_DIR", "/var/lib/woz"),
            ("WOZ_RELAY_QUEUE", "8"),
            ("WOZ_LOG_FILE", ""),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(
            config.task_classifications_path(),
            PathBuf::from("/var/lib/woz/task_classifications.json")
        );
        assert_eq!(config.relay_queue, 8);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("WOZ_ADDR", "not an addr")]),
            Err(ConfigError::InvalidAddr)
        ));
        assert!(matches!(
            config_from(&[("WOZ_RELAY_QUEUE", "0")]),
            Err(ConfigError::InvalidRelayQueue(_))
        ));
    }
}
