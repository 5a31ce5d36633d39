//! Directions error types

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the driving and walking directions providers
#[derive(Debug, Error)]
pub enum DirectionsError {
    /// The provider could not be reached
    #[error("Directions provider unreachable: {0}")]
    Unreachable(String),

    /// No answer within the client timeout
    #[error("No answer within {timeout_secs} s")]
    Timeout { timeout_secs: u64 },

    /// The provider answered with an unexpected status
    #[error("Directions provider returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Request quota used up (HTTP 429)
    #[error("Directions request quota exhausted")]
    QuotaExhausted,

    /// The API key is missing or was rejected
    #[error("Missing or rejected API key: {0}")]
    MissingApiKey(String),

    /// The body or its geometry did not have the expected shape
    #[error("Malformed directions response: {0}")]
    MalformedResponse(String),

    /// The provider answered but found no usable route
    #[error("No route: {0}")]
    NoRoute(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl DirectionsError {
    /// Classify a failed send
    pub(crate) fn from_send(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::Unreachable(err.to_string())
        }
    }

    /// Classify a non-success status; `None` for 2xx
    pub(crate) fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            s if s.is_success() => None,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Some(Self::MissingApiKey(format!("HTTP {status}")))
            },
            StatusCode::TOO_MANY_REQUESTS => Some(Self::QuotaExhausted),
            s => Some(Self::HttpStatus { status: s.as_u16() }),
        }
    }
}
