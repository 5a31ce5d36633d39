//! Logging infrastructure
//!
//! Installs a `tracing` subscriber with an env filter and a text or JSON formatter.

mod subscriber;

pub use subscriber::{LogFormat, TelemetryConfig, TelemetryError, TelemetryGuard, init_telemetry};
