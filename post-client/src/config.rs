//! Remote source configuration.

use serde::Deserialize;
use std::time::Duration;

/// Remote source configuration (`[remote]` table of the config file).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteConfig {
    /// Base endpoint the `posts` paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Time allowed to establish a connection (default: 15000).
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Time allowed between reads on the socket (default: 15000).
    #[serde(default = "default_timeout_ms")]
    pub socket_timeout_ms: u64,
    /// Time allowed for a whole request, body included (default: 15000).
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Default for each of the three timeouts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com/".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_ms: default_timeout_ms(),
            socket_timeout_ms: default_timeout_ms(),
            request_timeout_ms: default_timeout_ms(),
        }
    }
}

impl RemoteConfig {
    /// Point at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set all three timeouts to the same value.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_connect_timeout(timeout)
            .with_socket_timeout(timeout)
            .with_request_timeout(timeout)
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the socket read timeout.
    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the overall request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Socket read timeout as a `Duration`.
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    /// Overall request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fifteen_seconds() {
        let config = RemoteConfig::default();
        assert_eq!(config.base_url, "https://jsonplaceholder.typicode.com/");
        assert_eq!(config.connect_timeout(), Duration::from_secs(15));
        assert_eq!(config.socket_timeout(), Duration::from_secs(15));
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config: RemoteConfig = toml::from_str(
            r#"
            base_url = "http://localhost:3000/"
            socket_timeout_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:3000/");
        assert_eq!(config.socket_timeout(), Duration::from_millis(500));
        assert_eq!(config.connect_timeout_ms, 15_000);
        assert_eq!(config.request_timeout_ms, 15_000);
    }

    #[test]
    fn with_timeout_sets_all_three() {
        let config = RemoteConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(config.connect_timeout_ms, 250);
        assert_eq!(config.socket_timeout_ms, 250);
        assert_eq!(config.request_timeout_ms, 250);
    }

    #[test]
    fn individual_setters() {
        let config = RemoteConfig::default()
            .with_base_url("http://127.0.0.1:9/")
            .with_connect_timeout(Duration::from_secs(1));
        assert_eq!(config.base_url, "http://127.0.0.1:9/");
        assert_eq!(config.connect_timeout_ms, 1_000);
        assert_eq!(config.request_timeout_ms, 15_000);
    }
}
