//! Cache configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Cache configuration (`[cache]` table of the config file).
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: PathBuf,
    /// Maximum pooled connections (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("posts.db")
}

fn default_max_connections() -> u32 {
    4
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl CacheConfig {
    /// Resolve a relative database path against `dir`.
    pub fn resolve_in(mut self, dir: &std::path::Path) -> Self {
        if self.database.is_relative() {
            self.database = dir.join(&self.database);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.database, PathBuf::from("posts.db"));
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: CacheConfig = toml::from_str("max_connections = 2").unwrap();
        assert_eq!(config.database, PathBuf::from("posts.db"));
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn resolve_in_only_touches_relative_paths() {
        let dir = std::path::Path::new("/data");
        let relative = CacheConfig::default().resolve_in(dir);
        assert_eq!(relative.database, PathBuf::from("/data/posts.db"));

        let absolute = CacheConfig {
            database: PathBuf::from("/var/cache/posts.db"),
            ..CacheConfig::default()
        }
        .resolve_in(dir);
        assert_eq!(absolute.database, PathBuf::from("/var/cache/posts.db"));
    }
}
