use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("FCM request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Device token is no longer registered")]
    InvalidToken,

    #[error("FCM rejected the message with status {status}: {message}")]
    PushRejected {
        status: u16,
        message: String,
        retryable: bool,
        /// Server-requested wait from the `Retry-After` header.
        retry_after: Option<Duration>,
    },
}

impl NotifyError {
    /// Whether sending the same message again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotifyError::HttpError(e) => e.is_timeout() || e.is_connect(),
            NotifyError::PushRejected { retryable, .. } => *retryable,
            _ => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            NotifyError::PushRejected { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NotifyError::InvalidToken => ErrorSeverity::Low,
            NotifyError::HttpError(_) | NotifyError::PushRejected { .. } => ErrorSeverity::Medium,
            NotifyError::SerializationError(_) => ErrorSeverity::High,
            NotifyError::IoError(_)
            | NotifyError::ConfigError { .. }
            | NotifyError::MissingConfigError { .. }
            | NotifyError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NotifyError::HttpError(_) => "Could not reach the push service".to_string(),
            NotifyError::IoError(e) => format!("File access failed: {}", e),
            NotifyError::SerializationError(_) => "Could not encode the push payload".to_string(),
            NotifyError::ConfigError { message } => format!("Configuration problem: {}", message),
            NotifyError::MissingConfigError { field } => {
                format!("Required setting `{}` is missing", field)
            }
            NotifyError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting `{}` is invalid: {}", field, reason)
            }
            NotifyError::InvalidToken => "The device is no longer registered".to_string(),
            NotifyError::PushRejected { status, message, .. } => {
                format!("Push service refused the message ({}): {}", status, message)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.severity() {
            ErrorSeverity::Low => "Remove the stale device token from the user's devices",
            ErrorSeverity::Medium => "Retry later or check the FCM service status",
            ErrorSeverity::High => "Check the message data for unsupported values",
            ErrorSeverity::Critical => "Fix the configuration file and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
