//! Configuration management for the `Skycast` assistant
//!
//! Settings are loaded from environment variables at startup and validated
//! once; missing credentials are fatal there, never per request.

use crate::SkycastError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Root configuration structure for the `Skycast` assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather provider configuration
    pub weather: WeatherConfig,
    /// Language-model API configuration
    pub llm: LlmConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Weather provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Weather provider API key
    pub api_key: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,
    /// Base URL for the weather data API
    #[serde(default = "default_data_base_url")]
    pub data_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
}

/// Language-model API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the chat-completions endpoint
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind on
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_data_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_port() -> u16 {
    8080
}

fn env_or(key: &str, fallback: fn() -> String) -> String {
    env::var(key).unwrap_or_else(|_| fallback())
}

fn env_parsed<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

impl AppConfig {
    /// Load configuration from environment variables with `SKYCAST_` prefix
    pub fn from_env() -> Result<Self> {
        let config = Self {
            weather: WeatherConfig {
                api_key: env::var("SKYCAST_WEATHER_API_KEY").unwrap_or_default(),
                geo_base_url: env_or("SKYCAST_GEO_BASE_URL", default_geo_base_url),
                data_base_url: env_or("SKYCAST_WEATHER_BASE_URL", default_data_base_url),
                timeout_seconds: env_parsed(
                    "SKYCAST_WEATHER_TIMEOUT_SECONDS",
                    default_weather_timeout(),
                ),
                max_retries: env_parsed("SKYCAST_WEATHER_MAX_RETRIES", default_weather_max_retries()),
            },
            llm: LlmConfig {
                api_key: env::var("SKYCAST_LLM_API_KEY").unwrap_or_default(),
                base_url: env_or("SKYCAST_LLM_BASE_URL", default_llm_base_url),
                model: env_or("SKYCAST_LLM_MODEL", default_llm_model),
            },
            server: ServerConfig {
                port: env_parsed("SKYCAST_PORT", default_port()),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_urls()?;
        Ok(())
    }

    /// Validate API keys and credentials
    fn validate_api_keys(&self) -> Result<()> {
        if self.weather.api_key.is_empty() {
            return Err(SkycastError::config(
                "Weather API key is required. Set SKYCAST_WEATHER_API_KEY.",
            )
            .into());
        }

        if self.weather.api_key.len() < 8 {
            return Err(SkycastError::config(
                "Weather API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        if self.llm.api_key.is_empty() {
            return Err(
                SkycastError::config("LLM API key is required. Set SKYCAST_LLM_API_KEY.").into(),
            );
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(SkycastError::config(
                "Weather API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.weather.max_retries > 10 {
            return Err(SkycastError::config("Weather API max retries cannot exceed 10").into());
        }

        Ok(())
    }

    /// Validate URL configuration values
    fn validate_urls(&self) -> Result<()> {
        for (label, url) in [
            ("Geocoding base URL", &self.weather.geo_base_url),
            ("Weather base URL", &self.weather.data_base_url),
            ("LLM base URL", &self.llm.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkycastError::config(format!(
                    "{label} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
