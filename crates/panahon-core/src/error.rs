//! Application-level error types.
//!
//! Lookup failures (geolocation, geocoding, forecast) never reach this level:
//! they are turned into status messages inside the widget. What remains here
//! are the errors that stop the program from starting or drawing.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a terminal-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for printing before exit.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Terminal(_) => "The terminal could not be set up. Try a different terminal.",
            AppError::Runtime(_) => "Failed to start background workers.",
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration file unreadable: {0}")]
    Unreadable(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::Unreadable(_) => {
                "Configuration file could not be read. Check the path and permissions."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_lifts_into_app_error() {
        let err: AppError = ConfigError::Invalid("geocoding.base_url".into()).into();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_message_shown_for_app_error() {
        let err = AppError::Config(ConfigError::Invalid("x".into()));
        assert_eq!(err.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = AppError::Terminal("raw mode".into());
        assert!(err.to_string().contains("raw mode"));
        assert!(!err.user_message().is_empty());
    }
}
