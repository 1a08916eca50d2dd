//! Configuration loading for postview.
//!
//! Configuration is loaded from a TOML file (default: `postview.toml` in the
//! data directory). Every table and field is optional.

use post_cache::CacheConfig;
use post_client::RemoteConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the data directory.
pub const DEFAULT_CONFIG_FILE: &str = "postview.toml";

/// Root configuration for postview.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote source configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset (default: info).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `explicit` if given, else `postview.toml` in `data_dir` if it
    /// exists, else the built-in defaults.
    pub fn load(explicit: Option<&Path>, data_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_path = data_dir.join(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.remote.base_url, "https://jsonplaceholder.typicode.com/");
        assert_eq!(config.remote.request_timeout_ms, 15_000);
        assert_eq!(config.cache.database, PathBuf::from("posts.db"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
            [remote]
            base_url = "http://localhost:3000/"
            connect_timeout_ms = 1000

            [cache]
            database = "/var/lib/postview/cache.db"

            [log]
            level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.remote.base_url, "http://localhost:3000/");
        assert_eq!(config.remote.connect_timeout_ms, 1000);
        assert_eq!(config.remote.socket_timeout_ms, 15_000);
        assert_eq!(
            config.cache.database,
            PathBuf::from("/var/lib/postview/cache.db")
        );
        assert_eq!(config.cache.max_connections, 4);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn load_prefers_explicit_path() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[log]\nlevel = \"warn\"").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[log]\nlevel = \"trace\"").unwrap();

        let config = Config::load(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.log.level, "trace");

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn missing_default_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn missing_explicit_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[remote\nbase_url = ").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().starts_with("failed to parse config file"));
    }
}
