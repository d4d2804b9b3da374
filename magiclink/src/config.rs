//! Configuration module for environment variable parsing.
//!
//! The only environment-driven behavior is the text-rewrite collaborator:
//! its credential, model and HTTP settings.

use std::env;
use tracing::warn;

pub const DEFAULT_REWRITE_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_REWRITE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Rewrite collaborator configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the rewrite service; `None` disables rewriting
    pub api_key: Option<String>,

    /// Model name used for rewrites and subject suggestions
    pub rewrite_model: String,

    /// Base URL of the generative language API
    pub rewrite_api_base: String,

    /// Sampling temperature for rewrites (0.0 - 2.0)
    pub rewrite_temperature: f64,

    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            rewrite_model: DEFAULT_REWRITE_MODEL.to_string(),
            rewrite_api_base: DEFAULT_REWRITE_API_BASE.to_string(),
            rewrite_temperature: 0.7,
            request_timeout_ms: 15000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            api_key: env::var("API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            rewrite_model: env::var("REWRITE_MODEL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.rewrite_model),

            rewrite_api_base: env::var("REWRITE_API_BASE")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.rewrite_api_base),

            rewrite_temperature: parse_temperature(
                "REWRITE_TEMPERATURE",
                defaults.rewrite_temperature,
            ),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    /// Whether a credential for the rewrite collaborator is present.
    pub fn rewrite_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Parse a temperature in `0.0..=2.0`, falling back to `default`.
fn parse_temperature(name: &str, default: f64) -> f64 {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse::<f64>() {
        Ok(t) if (0.0..=2.0).contains(&t) => t,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid temperature, using default");
            default
        }
    }
}
