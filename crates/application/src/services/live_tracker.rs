//! Live tracker - Follows the user's position and keeps the route current
//!
//! `Idle → Tracking → Idle`. While tracking, every position fix moves the
//! session origin and triggers a sequenced driving route refresh. Results
//! and position errors are published as [`NavigationEvent`]s.

use std::{fmt, sync::Arc};

use domain::{Coordinate, Route, TrackingSession};
use parking_lot::Mutex;
use tokio::{
    sync::{broadcast, mpsc},
    task::{JoinHandle, JoinSet},
};
use tracing::{debug, info, instrument, warn};

use super::{RefreshOutcome, RouteRefresher, RouteRenderer, RouteTicket};
use crate::{
    error::ApplicationError,
    ports::{LocationError, LocationPort, PositionUpdates, WatchHandle, WatchOptions},
};

const EVENT_CAPACITY: usize = 64;

/// Tracker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerState {
    Idle,
    Tracking,
}

/// Why a tracking session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// `stop()` was called
    Requested,
    /// The user denied location access
    PermissionDenied,
    /// The location source closed its stream
    SourceClosed,
}

/// Navigation state published to subscribers
#[derive(Debug, Clone)]
pub enum NavigationEvent {
    /// A newer route is now drawn
    RouteUpdated(Arc<Route>),
    /// The latest route request failed; the previous route stays drawn
    RouteFailed(ApplicationError),
    /// The location source reported an error
    PositionError(LocationError),
    /// Tracking ended
    Stopped(StopReason),
}

enum TrackerCommand {
    Refresh,
}

struct TrackingRun {
    watch: WatchHandle,
    commands: mpsc::UnboundedSender<TrackerCommand>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct TrackerInner {
    generation: u64,
    session: Option<TrackingSession>,
    run: Option<TrackingRun>,
    last_applied: Option<RouteTicket>,
}

/// Keeps the active route in step with the user's live position
pub struct LiveTracker {
    location: Arc<dyn LocationPort>,
    refresher: Arc<RouteRefresher>,
    renderer: Arc<RouteRenderer>,
    options: WatchOptions,
    events: broadcast::Sender<NavigationEvent>,
    inner: Arc<Mutex<TrackerInner>>,
}

impl fmt::Debug for LiveTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveTracker")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl LiveTracker {
    /// Create an idle tracker
    pub fn new(
        location: Arc<dyn LocationPort>,
        refresher: Arc<RouteRefresher>,
        renderer: Arc<RouteRenderer>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            location,
            refresher,
            renderer,
            options: WatchOptions::default(),
            events,
            inner: Arc::new(Mutex::new(TrackerInner::default())),
        }
    }

    /// Use custom subscription options
    #[must_use]
    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Subscribe to navigation events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> TrackerState {
        if self.inner.lock().run.is_some() {
            TrackerState::Tracking
        } else {
            TrackerState::Idle
        }
    }

    /// Snapshot of the running session
    #[must_use]
    pub fn session(&self) -> Option<TrackingSession> {
        self.inner.lock().session.clone()
    }

    /// Start tracking towards `destination`
    ///
    /// A running session is stopped first. The route from `origin` is
    /// fetched right away; later fixes replace it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinate` if either point is out of range.
    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    pub fn start(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<(), ApplicationError> {
        origin.validate()?;
        destination.validate()?;
        self.stop();

        let watch = self.location.watch(self.options);
        let (commands, command_rx) = mpsc::unbounded_channel();

        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.session = Some(TrackingSession::new(origin, destination));
        inner.last_applied = None;

        let worker = TrackingWorker {
            generation: inner.generation,
            refresher: Arc::clone(&self.refresher),
            renderer: Arc::clone(&self.renderer),
            events: self.events.clone(),
            inner: Arc::clone(&self.inner),
            refreshes: JoinSet::new(),
        };
        let task = tokio::spawn(worker.run(watch.updates, command_rx));

        inner.run = Some(TrackingRun {
            watch: watch.handle,
            commands,
            task,
        });
        info!("Tracking started");
        Ok(())
    }

    /// Stop tracking
    ///
    /// The subscription is released immediately and no route requested
    /// before this call is applied afterwards. Safe to call when idle.
    pub fn stop(&self) {
        let run = {
            let mut inner = self.inner.lock();
            inner.session = None;
            inner.run.take()
        };

        let Some(mut run) = run else {
            return;
        };
        run.watch.cancel();
        self.refresher.invalidate();
        run.task.abort();

        info!("Tracking stopped");
        let _ = self.events.send(NavigationEvent::Stopped(StopReason::Requested));
    }

    /// Re-fetch the route from the current origin
    ///
    /// Returns false when idle.
    pub fn refresh_now(&self) -> bool {
        self.inner
            .lock()
            .run
            .as_ref()
            .is_some_and(|run| run.commands.send(TrackerCommand::Refresh).is_ok())
    }

    /// Fit the view around the live origin and the destination
    ///
    /// Returns false when idle.
    pub fn recenter(&self) -> bool {
        let Some((origin, destination)) = self
            .inner
            .lock()
            .session
            .as_ref()
            .map(|s| (s.origin, s.destination))
        else {
            return false;
        };
        self.renderer.recenter(&origin, &destination);
        true
    }
}

impl Drop for LiveTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Task body of one tracking session
///
/// A worker only touches tracker state while its generation is current,
/// so a late worker can never disturb the session that replaced it.
struct TrackingWorker {
    generation: u64,
    refresher: Arc<RouteRefresher>,
    renderer: Arc<RouteRenderer>,
    events: broadcast::Sender<NavigationEvent>,
    inner: Arc<Mutex<TrackerInner>>,
    refreshes: JoinSet<RefreshOutcome>,
}

impl TrackingWorker {
    async fn run(
        mut self,
        mut updates: PositionUpdates,
        mut commands: mpsc::UnboundedReceiver<TrackerCommand>,
    ) {
        self.request_refresh();

        let reason = loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(Ok(fix)) => self.on_fix(fix),
                    Some(Err(error)) => {
                        warn!(%error, "Position error");
                        let _ = self.events.send(NavigationEvent::PositionError(error));
                        if error.is_terminal() {
                            break StopReason::PermissionDenied;
                        }
                    },
                    None => break StopReason::SourceClosed,
                },
                Some(TrackerCommand::Refresh) = commands.recv() => self.request_refresh(),
                Some(done) = self.refreshes.join_next(), if !self.refreshes.is_empty() => {
                    match done {
                        Ok(outcome) => self.on_outcome(outcome),
                        Err(e) => warn!(error = %e, "Route refresh task ended abnormally"),
                    }
                },
            }
        };

        self.end(reason);
    }

    fn on_fix(&mut self, fix: Coordinate) {
        {
            let mut inner = self.inner.lock();
            if inner.generation != self.generation {
                return;
            }
            let Some(session) = inner.session.as_mut() else {
                return;
            };
            session.update_origin(fix);
        }
        debug!(position = %fix, "Position fix");
        self.request_refresh();
    }

    fn request_refresh(&mut self) {
        let endpoints = {
            let inner = self.inner.lock();
            if inner.generation == self.generation {
                inner.session.as_ref().map(|s| (s.origin, s.destination))
            } else {
                None
            }
        };
        let Some((origin, destination)) = endpoints else {
            return;
        };
        self.refreshes
            .spawn(self.refresher.begin(origin, destination));
    }

    fn on_outcome(&self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Applied { ticket, route, .. } => {
                let bounds = {
                    let mut inner = self.inner.lock();
                    if inner.generation != self.generation
                        || inner.last_applied.is_some_and(|last| last > ticket)
                    {
                        return;
                    }
                    inner.last_applied = Some(ticket);
                    let Some(session) = inner.session.as_mut() else {
                        return;
                    };
                    session.replace_route(Arc::clone(&route));
                    (session.origin, session.destination)
                };
                self.renderer.recenter(&bounds.0, &bounds.1);
                let _ = self.events.send(NavigationEvent::RouteUpdated(route));
            },
            RefreshOutcome::Failed { error, .. } => {
                let _ = self.events.send(NavigationEvent::RouteFailed(error));
            },
            RefreshOutcome::Stale { ticket } => debug!(%ticket, "Stale refresh ignored"),
        }
    }

    /// Wind down after the stream ended or a terminal error
    fn end(mut self, reason: StopReason) {
        self.refreshes.abort_all();
        let run = {
            let mut inner = self.inner.lock();
            if inner.generation != self.generation {
                return;
            }
            inner.session = None;
            inner.run.take()
        };
        if let Some(mut run) = run {
            run.watch.cancel();
        }
        self.refresher.invalidate();
        info!(?reason, "Tracking ended");
        let _ = self.events.send(NavigationEvent::Stopped(reason));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::{
        services::{DrivingRouteService, RouteNormalizer},
        testing::{ChannelLocation, RecordingSurface, ScriptedDriving},
    };

    struct Harness {
        tracker: LiveTracker,
        location: ChannelLocation,
        driving: Arc<ScriptedDriving>,
        surface: Arc<RecordingSurface>,
    }

    fn harness() -> Harness {
        let location = ChannelLocation::new();
        let driving = ScriptedDriving::new();
        let surface = RecordingSurface::new();
        let renderer = Arc::new(RouteRenderer::new(surface.clone()));
        let service = Arc::new(DrivingRouteService::new(
            driving.clone(),
            Arc::new(RouteNormalizer::default()),
        ));
        let refresher = Arc::new(RouteRefresher::new(service, Arc::clone(&renderer)));
        let tracker = LiveTracker::new(Arc::new(location.clone()), refresher, renderer);

        Harness {
            tracker,
            location,
            driving,
            surface,
        }
    }

    fn point(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn origin() -> Coordinate {
        point(37.5665, 126.9780)
    }

    fn destination() -> Coordinate {
        point(37.5796, 126.9990)
    }

    async fn next_event(rx: &mut broadcast::Receiver<NavigationEvent>) -> NavigationEvent {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event within timeout")
            .expect("channel open")
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn start_draws_initial_route() {
        let h = harness();
        let mut events = h.tracker.subscribe();

        h.tracker.start(origin(), destination()).unwrap();
        assert_eq!(h.tracker.state(), TrackerState::Tracking);

        let event = next_event(&mut events).await;
        assert!(matches!(event, NavigationEvent::RouteUpdated(_)));
        assert_eq!(h.driving.calls(), 1);
        assert_eq!(h.surface.polylines().len(), 1);
        assert!(h.surface.fit_count() >= 1);
        assert!(h.tracker.session().unwrap().last_route.is_some());
    }

    #[tokio::test]
    async fn fix_updates_origin_and_redraws() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        h.tracker.start(origin(), destination()).unwrap();
        next_event(&mut events).await;

        let moved = point(37.5700, 126.9850);
        assert!(h.location.push(Ok(moved)));

        let event = next_event(&mut events).await;
        let NavigationEvent::RouteUpdated(route) = event else {
            panic!("expected route update, got {event:?}");
        };
        assert_eq!(route.segments()[0].points()[0], moved);
        assert_eq!(h.tracker.session().unwrap().origin, moved);
        assert_eq!(h.surface.polylines().len(), 1);
        assert_eq!(h.driving.calls(), 2);

        let bounds = h.surface.last_bounds().unwrap();
        assert!(bounds.contains(&moved));
        assert!(bounds.contains(&destination()));
    }

    #[tokio::test]
    async fn stop_cancels_subscription_and_recomputation() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        h.tracker.start(origin(), destination()).unwrap();
        next_event(&mut events).await;

        h.tracker.stop();
        assert_eq!(h.tracker.state(), TrackerState::Idle);
        assert!(h.location.is_cancelled());
        assert!(h.tracker.session().is_none());
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::Stopped(StopReason::Requested)
        ));

        let calls = h.driving.calls();
        assert!(!h.location.push(Ok(point(37.5700, 126.9850))));
        settle().await;
        assert_eq!(h.driving.calls(), calls);
    }

    #[tokio::test]
    async fn stop_discards_in_flight_route() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        let release = h.driving.hold_next();
        h.tracker.start(origin(), destination()).unwrap();
        settle().await;

        h.tracker.stop();
        let _ = release.send(Ok(crate::testing::straight_directions(origin(), destination())));
        settle().await;

        assert_eq!(h.surface.live_count(), 0);
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::Stopped(StopReason::Requested)
        ));
    }

    #[tokio::test]
    async fn stop_when_idle_is_noop() {
        let h = harness();
        h.tracker.stop();
        h.tracker.stop();
        assert_eq!(h.tracker.state(), TrackerState::Idle);
        assert!(!h.tracker.refresh_now());
        assert!(!h.tracker.recenter());
    }

    #[tokio::test]
    async fn transient_errors_keep_tracking() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        h.tracker.start(origin(), destination()).unwrap();
        next_event(&mut events).await;

        h.location.push(Err(LocationError::Timeout));
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::PositionError(LocationError::Timeout)
        ));
        h.location.push(Err(LocationError::PositionUnavailable));
        next_event(&mut events).await;

        assert_eq!(h.tracker.state(), TrackerState::Tracking);
        assert!(!h.location.is_cancelled());

        h.location.push(Ok(point(37.5700, 126.9850)));
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::RouteUpdated(_)
        ));
    }

    #[tokio::test]
    async fn permission_denied_ends_session() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        h.tracker.start(origin(), destination()).unwrap();
        next_event(&mut events).await;

        h.location.push(Err(LocationError::PermissionDenied));
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::PositionError(LocationError::PermissionDenied)
        ));
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::Stopped(StopReason::PermissionDenied)
        ));
        assert_eq!(h.tracker.state(), TrackerState::Idle);
        assert!(h.location.is_cancelled());
    }

    #[tokio::test]
    async fn failed_refresh_is_published() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        let release = h.driving.hold_next();
        h.tracker.start(origin(), destination()).unwrap();
        settle().await;

        release
            .send(Err(ApplicationError::ProviderUnavailable("HTTP 500".into())))
            .unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::RouteFailed(ApplicationError::RouteUnavailable(_))
        ));
        assert_eq!(h.tracker.state(), TrackerState::Tracking);
    }

    #[tokio::test]
    async fn refresh_now_refetches() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        h.tracker.start(origin(), destination()).unwrap();
        next_event(&mut events).await;

        assert!(h.tracker.refresh_now());
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::RouteUpdated(_)
        ));
        assert_eq!(h.driving.calls(), 2);
        assert!(h.tracker.recenter());
    }

    #[tokio::test]
    async fn restart_replaces_session() {
        let h = harness();
        let mut events = h.tracker.subscribe();
        h.tracker.start(origin(), destination()).unwrap();
        next_event(&mut events).await;

        let other = point(37.5512, 126.9882);
        h.tracker.start(origin(), other).unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::Stopped(StopReason::Requested)
        ));
        assert!(matches!(
            next_event(&mut events).await,
            NavigationEvent::RouteUpdated(_)
        ));
        assert_eq!(h.tracker.session().unwrap().destination, other);
        assert_eq!(h.location.watch_count(), 2);
    }

    #[test]
    fn invalid_start_is_rejected() {
        let h = harness();
        let result = h
            .tracker
            .start(Coordinate::new_unchecked(100.0, 0.0), destination());
        assert!(matches!(result, Err(ApplicationError::InvalidCoordinate { .. })));
        assert_eq!(h.tracker.state(), TrackerState::Idle);
    }
}
