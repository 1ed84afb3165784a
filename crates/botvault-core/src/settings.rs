//! Chat settings and validation.
//!
//! Pure configuration values; adapters decide where they come from
//! (flags, environment, files).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Ollama endpoint when running on the same machine.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Model selected when the catalog offers it.
pub const DEFAULT_MODEL: &str = "gemma3:4b";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// How long the server may keep the model loaded between requests.
pub const DEFAULT_KEEP_ALIVE: &str = "10m";

/// Connection plus first-byte timeout for every request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Minimum time between two renders of a streaming response.
pub const DEFAULT_MIN_RENDER_INTERVAL_MS: u64 = 100;

/// Cadence of paint opportunities while a render is pending.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Settings for a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Base URL of the Ollama server (no trailing path).
    pub base_url: String,

    /// Model name sent with every chat request.
    pub model: String,

    /// Sampling temperature (0.0-2.0).
    pub temperature: f32,

    /// Whether to request a streamed (NDJSON) response.
    pub stream: bool,

    /// `keep_alive` value forwarded to the server.
    pub keep_alive: String,

    /// Timeout covering connection and first response byte, in milliseconds.
    pub request_timeout_ms: u64,

    /// Minimum interval between streaming renders, in milliseconds.
    pub min_render_interval_ms: u64,

    /// Paint-opportunity cadence, in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ChatSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            stream: true,
            keep_alive: DEFAULT_KEEP_ALIVE.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            min_render_interval_ms: DEFAULT_MIN_RENDER_INTERVAL_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub const fn min_render_interval(&self) -> Duration {
        Duration::from_millis(self.min_render_interval_ms)
    }

    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Errors that can occur during settings validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("Base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("Model name cannot be empty")]
    EmptyModel,

    #[error("Temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Frame interval must be greater than zero")]
    ZeroFrameInterval,
}

/// Validate settings values.
pub fn validate_settings(settings: &ChatSettings) -> Result<(), SettingsError> {
    let url = settings.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SettingsError::InvalidBaseUrl(settings.base_url.clone()));
    }

    if settings.model.trim().is_empty() {
        return Err(SettingsError::EmptyModel);
    }

    if !(0.0..=2.0).contains(&settings.temperature) {
        return Err(SettingsError::InvalidTemperature(settings.temperature));
    }

    if settings.request_timeout_ms == 0 {
        return Err(SettingsError::ZeroTimeout);
    }

    if settings.frame_interval_ms == 0 {
        return Err(SettingsError::ZeroFrameInterval);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ChatSettings::with_defaults();
        assert!(validate_settings(&settings).is_ok());
        assert_eq!(settings.request_timeout(), Duration::from_secs(120));
        assert_eq!(settings.min_render_interval(), Duration::from_millis(100));
        assert!(settings.stream);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let settings = ChatSettings {
            base_url: "localhost:11434".to_string(),
            ..ChatSettings::with_defaults()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let settings = ChatSettings {
            temperature: 2.5,
            ..ChatSettings::with_defaults()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidTemperature(2.5))
        );
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let settings = ChatSettings {
            request_timeout_ms: 0,
            ..ChatSettings::with_defaults()
        };
        assert_eq!(validate_settings(&settings), Err(SettingsError::ZeroTimeout));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: ChatSettings = serde_json::from_str(r#"{"model": "llama3.2"}"#).unwrap();
        assert_eq!(settings.model, "llama3.2");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.keep_alive, DEFAULT_KEEP_ALIVE);
    }
}
