//! Transit error types

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::LatLng;

/// Errors from the transit routing and stop coverage services
#[derive(Debug, Error)]
pub enum TransitError {
    /// The service could not be reached
    #[error("Transit service unreachable: {0}")]
    Unreachable(String),

    /// No answer within the client timeout
    #[error("No answer within {timeout_secs} s")]
    Timeout { timeout_secs: u64 },

    /// The service answered with an unexpected status
    #[error("Transit service returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Request quota used up (HTTP 429)
    #[error("Transit request quota exhausted")]
    QuotaExhausted,

    /// The API key is missing or was rejected
    #[error("Missing or rejected API key: {0}")]
    MissingApiKey(String),

    /// The body did not have the expected shape
    #[error("Malformed transit response: {0}")]
    MalformedResponse(String),

    /// The service found no transit route between the two points
    #[error("No transit route from {from} to {to}")]
    NoRoutesFound { from: LatLng, to: LatLng },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl TransitError {
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
