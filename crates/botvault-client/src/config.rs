//! Client configuration.

use std::time::Duration;

use botvault_core::ChatSettings;
use botvault_core::settings::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_MS};

/// Path of the chat endpoint, relative to the base URL.
pub const CHAT_PATH: &str = "api/chat";

/// Path of the model catalog endpoint, relative to the base URL.
pub const TAGS_PATH: &str = "api/tags";

/// Connection settings for an Ollama server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:11434` or a proxy prefix like
    /// `http://lan-host:4311/ollama`.
    pub base_url: String,
    /// End-to-end timeout for connection plus response headers.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            request_timeout: settings.request_timeout(),
        }
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ClientConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.endpoint(CHAT_PATH), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_endpoint_keeps_proxy_prefix() {
        let config = ClientConfig {
            base_url: "http://192.168.1.20:4311/ollama".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.endpoint(TAGS_PATH), "http://192.168.1.20:4311/ollama/api/tags");
    }

    #[test]
    fn test_from_settings_copies_timeout() {
        let settings = ChatSettings {
            request_timeout_ms: 5_000,
            ..ChatSettings::with_defaults()
        };
        assert_eq!(
            ClientConfig::from_settings(&settings).request_timeout,
            Duration::from_secs(5)
        );
    }
}
