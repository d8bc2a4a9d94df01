//! Error types and handling for the `Skycast` assistant

use thiserror::Error;

/// Main error type for the `Skycast` assistant
#[derive(Error, Debug)]
pub enum SkycastError {
    /// Configuration-related errors (fatal at startup)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Geocoding produced zero results for the requested place
    #[error("Location not found: {location}")]
    LocationNotFound { location: String },

    /// Upstream weather provider returned a non-success response
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Caller-side request validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl SkycastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(location: S) -> Self {
        Self::LocationNotFound {
            location: location.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    ///
    /// Raw provider and configuration details are never shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::Config { .. } => {
                "The assistant is not configured correctly. Please check the service credentials."
                    .to_string()
            }
            SkycastError::LocationNotFound { location } => {
                format!(
                    "I couldn't find a place called \"{location}\". Could you double-check the spelling?"
                )
            }
            SkycastError::Provider { .. } => {
                "I couldn't reach the weather service just now. Please try again in a moment."
                    .to_string()
            }
            SkycastError::Validation { message } => {
                format!("Invalid request: {message}")
            }
        }
    }
}

impl From<reqwest::Error> for SkycastError {
    fn from(err: reqwest::Error) -> Self {
        SkycastError::provider(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for SkycastError {
    fn from(err: reqwest_middleware::Error) -> Self {
        SkycastError::provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = SkycastError::config("missing API key");
        assert!(matches!(config_err, SkycastError::Config { .. }));

        let not_found = SkycastError::location_not_found("Atlantis");
        assert!(matches!(not_found, SkycastError::LocationNotFound { .. }));

        let provider_err = SkycastError::provider("502 from upstream");
        assert!(matches!(provider_err, SkycastError::Provider { .. }));
    }

    #[test]
    fn test_user_messages() {
        let not_found = SkycastError::location_not_found("Atlantis");
        assert!(not_found.user_message().contains("Atlantis"));

        let provider_err = SkycastError::provider("secret upstream detail");
        let message = provider_err.user_message();
        assert!(!message.contains("secret upstream detail"));
        assert!(message.contains("weather service"));

        let validation_err = SkycastError::validation("messages must not be empty");
        assert!(
            validation_err
                .user_message()
                .contains("messages must not be empty")
        );
    }
}
