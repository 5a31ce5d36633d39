//! Tracing subscriber initialization

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Configuration for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "careroute=debug,integration_transit=debug")
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in each event
    #[serde(default = "crate::config::default_true")]
    pub with_location: bool,
}

fn default_log_filter() -> String {
    "careroute=info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            format: LogFormat::Text,
            with_location: true,
        }
    }
}

/// Guard returned by [`init_telemetry`]
///
/// Keep it alive for the duration of the application.
pub struct TelemetryGuard {
    format: LogFormat,
}

impl std::fmt::Debug for TelemetryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryGuard")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        debug!(format = ?self.format, "Telemetry guard dropped");
    }
}

/// Initialize the global tracing subscriber
///
/// # Errors
///
/// Returns [`TelemetryError::Init`] if a global subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// use infrastructure::telemetry::{TelemetryConfig, init_telemetry};
///
/// let _guard = init_telemetry(&TelemetryConfig::default())?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(config.with_location)
        .with_line_number(config.with_location);

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json().flatten_event(true))
            .try_init(),
    }
    .map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(format = ?config.format, filter = %config.log_filter, "Telemetry initialized");
    Ok(TelemetryGuard {
        format: config.format,
    })
}

/// Error type for telemetry initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_filter, "careroute=info");
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.with_location);
    }

    #[test]
    fn test_config_partial_json() {
        let parsed: TelemetryConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(parsed.format, LogFormat::Json);
        assert_eq!(parsed.log_filter, "careroute=info");
        assert!(parsed.with_location);
    }

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig::default();
        // The first call may race with other tests; the second always finds a subscriber.
        let _first = init_telemetry(&config);
        let second = init_telemetry(&config);
        assert!(matches!(second, Err(TelemetryError::Init(_))));
    }
}
