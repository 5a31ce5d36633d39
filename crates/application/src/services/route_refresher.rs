//! Route refresher - Sequenced driving route updates
//!
//! Every fetch takes a ticket from a monotonically increasing sequencer
//! when it is *issued*. A result is drawn only while its ticket is still the
//! latest one, so the most recently requested route wins even when an
//! older request completes later.

use std::{
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use domain::{Coordinate, Route};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::{DrawHandle, DrivingRouteService, RouteRenderer};
use crate::error::ApplicationError;

/// Sequence number of one route request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteTicket(u64);

impl RouteTicket {
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RouteTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues request tickets and tells whether one is still current
#[derive(Debug, Default)]
pub struct RouteSequencer {
    latest: AtomicU64,
}

impl RouteSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket, superseding all earlier ones
    pub fn issue(&self) -> RouteTicket {
        RouteTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer ticket has been issued
    #[must_use]
    pub fn is_current(&self, ticket: RouteTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersede every outstanding ticket without issuing a usable one
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// Result of one sequenced refresh
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Route fetched and drawn as the active overlay
    Applied {
        ticket: RouteTicket,
        route: Arc<Route>,
        handle: DrawHandle,
    },
    /// A newer request was issued first; result discarded
    Stale { ticket: RouteTicket },
    /// Fetch or draw failed while the request was still current
    Failed {
        ticket: RouteTicket,
        error: ApplicationError,
    },
}

impl RefreshOutcome {
    #[must_use]
    pub const fn ticket(&self) -> RouteTicket {
        match self {
            Self::Applied { ticket, .. } | Self::Stale { ticket } | Self::Failed { ticket, .. } => {
                *ticket
            },
        }
    }

    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Fetches driving routes and draws only the latest requested one
pub struct RouteRefresher {
    driving: Arc<DrivingRouteService>,
    renderer: Arc<RouteRenderer>,
    sequencer: RouteSequencer,
    apply_lock: Mutex<()>,
}

impl fmt::Debug for RouteRefresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRefresher")
            .field("sequencer", &self.sequencer)
            .finish_non_exhaustive()
    }
}

impl RouteRefresher {
    /// Create a refresher drawing through `renderer`
    pub fn new(driving: Arc<DrivingRouteService>, renderer: Arc<RouteRenderer>) -> Self {
        Self {
            driving,
            renderer,
            sequencer: RouteSequencer::new(),
            apply_lock: Mutex::new(()),
        }
    }

    /// Issue a ticket now and return the fetch as a future
    ///
    /// The ticket is taken before this function returns, so request order
    /// is the call order regardless of when the future is polled.
    pub fn begin(
        self: &Arc<Self>,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        let ticket = self.sequencer.issue();
        let this = Arc::clone(self);
        async move { this.resolve(ticket, origin, destination).await }
    }

    /// Issue a ticket now and run the fetch on the runtime
    pub fn spawn_refresh(
        self: &Arc<Self>,
        origin: Coordinate,
        destination: Coordinate,
    ) -> JoinHandle<RefreshOutcome> {
        tokio::spawn(self.begin(origin, destination))
    }

    /// Fetch and apply inline
    pub async fn refresh(&self, origin: Coordinate, destination: Coordinate) -> RefreshOutcome {
        let ticket = self.sequencer.issue();
        self.resolve(ticket, origin, destination).await
    }

    /// Discard every request issued so far
    ///
    /// Holds the apply lock so no draw can slip in between the check and
    /// the invalidation.
    pub fn invalidate(&self) {
        let _guard = self.apply_lock.lock();
        self.sequencer.invalidate();
    }

    /// Draw `route` as the active overlay and discard every pending refresh
    ///
    /// Invalidation and draw happen under the apply lock, so no refresh
    /// issued before this call can replace `route` afterwards.
    ///
    /// # Errors
    ///
    /// Returns `MapSurface` if the surface rejects a primitive.
    #[instrument(skip(self, route), fields(kind = ?route.kind()))]
    pub fn apply(&self, route: &Route) -> Result<DrawHandle, ApplicationError> {
        let _guard = self.apply_lock.lock();
        self.sequencer.invalidate();
        self.renderer.draw(route)
    }

    /// Remove every drawn route and discard every pending refresh
    pub fn clear(&self) {
        let _guard = self.apply_lock.lock();
        self.sequencer.invalidate();
        self.renderer.clear();
    }

    /// Whether `ticket` is still the latest request
    #[must_use]
    pub fn is_current(&self, ticket: RouteTicket) -> bool {
        self.sequencer.is_current(ticket)
    }

    #[instrument(skip(self), fields(ticket = %ticket))]
    async fn resolve(
        &self,
        ticket: RouteTicket,
        origin: Coordinate,
        destination: Coordinate,
    ) -> RefreshOutcome {
        let result = self.driving.route(&origin, &destination).await;

        let _guard = self.apply_lock.lock();
        if !self.sequencer.is_current(ticket) {
            debug!("Discarding stale route response");
            return RefreshOutcome::Stale { ticket };
        }

        let route = match result {
            Ok(route) => Arc::new(route),
            Err(error) => {
                warn!(error = %error, "Route refresh failed");
                return RefreshOutcome::Failed { ticket, error };
            },
        };

        match self.renderer.draw(&route) {
            Ok(handle) => RefreshOutcome::Applied {
                ticket,
                route,
                handle,
            },
            Err(error) => RefreshOutcome::Failed { ticket, error },
        }
    }
}
