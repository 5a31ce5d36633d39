//! Device location port
//!
//! A one-shot position read plus a continuous subscription delivered as a
//! channel of fixes. The subscription lives until its [`WatchHandle`] is
//! cancelled or dropped.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use domain::value_objects::Coordinate;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors reported by the device location provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    /// The user refused location access
    #[error("location permission denied")]
    PermissionDenied,
    /// No position could be determined
    #[error("position unavailable")]
    PositionUnavailable,
    /// No fix within the configured timeout
    #[error("location timeout")]
    Timeout,
}

impl LocationError {
    /// Whether the subscription cannot recover without user action
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}

/// Options for a position subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Prefer GPS over network positioning
    pub high_accuracy: bool,
    /// Oldest cached fix accepted
    pub maximum_age: Duration,
    /// Time allowed per fix before a timeout error
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Releases a position subscription
///
/// Cancelling is idempotent and also happens on drop.
pub struct WatchHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchHandle {
    /// Handle that runs `cancel` exactly once on release
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle with nothing to release
    #[must_use]
    pub const fn detached() -> Self {
        Self { cancel: None }
    }

    /// Release the subscription
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Whether the subscription has been released
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Type alias for the fix stream of a subscription
pub type PositionUpdates = mpsc::UnboundedReceiver<Result<Coordinate, LocationError>>;

/// An active position subscription
#[derive(Debug)]
pub struct PositionWatch {
    /// Fixes and errors in arrival order; closes when the source stops
    pub updates: PositionUpdates,
    /// Release handle
    pub handle: WatchHandle,
}

/// Port for the device location provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationPort: Send + Sync {
    /// Read the current position once
    async fn current_position(&self, options: WatchOptions) -> Result<Coordinate, LocationError>;

    /// Subscribe to continuous position updates
    fn watch(&self, options: WatchOptions) -> PositionWatch;
}
