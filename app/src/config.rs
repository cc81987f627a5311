//! Application configuration
//!
//! Loads configuration from environment variables with sensible defaults
//! for local development.

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway connection settings
    pub gateway: GatewayConfig,
    /// Log filter directive (`RUST_LOG` syntax)
    pub log_level: String,
}

/// Gateway connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the hosted gateway
    pub url: String,
    /// Public API key used before a session is opened
    pub anon_key: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// - `GATEWAY_URL`: gateway base URL (default: `http://localhost:54321`)
    /// - `GATEWAY_ANON_KEY`: public API key (default: empty)
    /// - `LOG_LEVEL`: log filter (default: `boxoffice=info`)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            gateway: GatewayConfig {
                url: std::env::var("GATEWAY_URL")
                    .unwrap_or_else(|_| "http://localhost:54321".to_string()),
                anon_key: std::env::var("GATEWAY_ANON_KEY").unwrap_or_default(),
            },
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "boxoffice=info".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_env();
        assert!(!config.gateway.url.is_empty());
        assert!(!config.log_level.is_empty());
    }
}
