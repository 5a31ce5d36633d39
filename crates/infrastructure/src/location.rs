//! Channel-fed device location source
//!
//! The host pushes fixes (from a GPS daemon, a browser bridge, a replay file)
//! and every active watcher receives them. One-shot reads return the latest
//! fix if it is fresh enough and otherwise wait for the next one.

use std::{collections::HashMap, sync::Arc};

use application::ports::{LocationError, LocationPort, PositionWatch, WatchHandle, WatchOptions};
use async_trait::async_trait;
use domain::Coordinate;
use parking_lot::Mutex;
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, instrument, trace};

type Fix = Result<Coordinate, LocationError>;

#[derive(Debug, Default)]
struct SourceState {
    latest: Option<(Fix, Instant)>,
    next_watcher: u64,
    watchers: HashMap<u64, mpsc::UnboundedSender<Fix>>,
}

impl SourceState {
    fn register(&mut self) -> (u64, mpsc::UnboundedReceiver<Fix>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.next_watcher += 1;
        self.watchers.insert(self.next_watcher, tx);
        (self.next_watcher, rx)
    }

    fn broadcast(&mut self, fix: Fix) {
        self.latest = Some((fix, Instant::now()));
        // Receivers dropped without cancelling their handle are pruned here
        self.watchers.retain(|_, tx| tx.send(fix).is_ok());
    }
}

/// [`LocationPort`] fed through [`push_fix`](Self::push_fix) and
/// [`push_error`](Self::push_error)
#[derive(Debug, Clone, Default)]
pub struct ChannelLocationSource {
    state: Arc<Mutex<SourceState>>,
}

impl ChannelLocationSource {
    /// Create a source with no known position
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a position to every watcher
    pub fn push_fix(&self, position: Coordinate) {
        trace!(lat = position.lat(), lng = position.lng(), "Position fix");
        self.state.lock().broadcast(Ok(position));
    }

    /// Deliver a position error to every watcher
    pub fn push_error(&self, error: LocationError) {
        debug!(%error, "Position error");
        self.state.lock().broadcast(Err(error));
    }

    /// Set the latest known position without notifying watchers
    pub fn set_current(&self, position: Coordinate) {
        self.state.lock().latest = Some((Ok(position), Instant::now()));
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.state.lock().watchers.len()
    }
}

#[async_trait]
impl LocationPort for ChannelLocationSource {
    #[instrument(skip(self))]
    async fn current_position(&self, options: WatchOptions) -> Result<Coordinate, LocationError> {
        let (id, mut rx) = {
            let mut state = self.state.lock();
            if let Some((fix, _)) = state
                .latest
                .filter(|(_, at)| at.elapsed() <= options.maximum_age)
            {
                return fix;
            }
            state.register()
        };

        let result = tokio::time::timeout(options.timeout, rx.recv()).await;
        self.state.lock().watchers.remove(&id);

        match result {
            Ok(Some(fix)) => fix,
            Ok(None) => Err(LocationError::PositionUnavailable),
            Err(_) => Err(LocationError::Timeout),
        }
    }

    fn watch(&self, options: WatchOptions) -> PositionWatch {
        let (id, updates) = self.state.lock().register();
        debug!(watcher = id, high_accuracy = options.high_accuracy, "Position watch started");

        let state = Arc::downgrade(&self.state);
        let handle = WatchHandle::new(move || {
            if let Some(state) = state.upgrade() {
                state.lock().watchers.remove(&id);
                debug!(watcher = id, "Position watch cancelled");
            }
        });

        PositionWatch { updates, handle }
    }
}
