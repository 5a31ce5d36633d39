//! Hand-written fakes shared by the service tests

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use domain::Coordinate;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::{
    error::ApplicationError,
    ports::{
        Bounds, DrivingDirections, DrivingRoutePort, LocationError, LocationPort, MapSurfacePort,
        MarkerSpec, PolylineSpec, PopupSpec, PositionWatch, PrimitiveId, WatchHandle,
        WatchOptions,
    },
};

/// A primitive living on the recording surface
#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Polyline(PolylineSpec),
    Marker(MarkerSpec),
    Popup(PopupSpec),
}

/// Map surface that records every call
#[derive(Default)]
pub struct RecordingSurface {
    next_id: AtomicU64,
    live: Mutex<BTreeMap<PrimitiveId, (Drawn, bool)>>,
    removed: Mutex<Vec<PrimitiveId>>,
    bounds: Mutex<Vec<Bounds>>,
    remaining_adds: Mutex<Option<usize>>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail every add after `n` more successful ones
    pub fn fail_after(&self, n: usize) {
        *self.remaining_adds.lock() = Some(n);
    }

    fn add(&self, drawn: Drawn) -> Result<PrimitiveId, ApplicationError> {
        {
            let mut remaining = self.remaining_adds.lock();
            if let Some(n) = remaining.as_mut() {
                if *n == 0 {
                    return Err(ApplicationError::MapSurface("surface closed".into()));
                }
                *n -= 1;
            }
        }
        let id = PrimitiveId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.live.lock().insert(id, (drawn, true));
        Ok(id)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn visible_count(&self) -> usize {
        self.live.lock().values().filter(|(_, visible)| *visible).count()
    }

    /// Live polylines in creation order
    pub fn polylines(&self) -> Vec<PolylineSpec> {
        self.live
            .lock()
            .values()
            .filter_map(|(drawn, _)| match drawn {
                Drawn::Polyline(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    /// Live markers in creation order
    pub fn markers(&self) -> Vec<(PrimitiveId, MarkerSpec)> {
        self.live
            .lock()
            .iter()
            .filter_map(|(id, (drawn, _))| match drawn {
                Drawn::Marker(m) => Some((*id, m.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn open_popups(&self) -> Vec<PopupSpec> {
        self.live
            .lock()
            .values()
            .filter_map(|(drawn, _)| match drawn {
                Drawn::Popup(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn removed(&self) -> Vec<PrimitiveId> {
        self.removed.lock().clone()
    }

    pub fn last_bounds(&self) -> Option<Bounds> {
        self.bounds.lock().last().copied()
    }

    pub fn fit_count(&self) -> usize {
        self.bounds.lock().len()
    }
}

impl MapSurfacePort for RecordingSurface {
    fn add_polyline(&self, polyline: PolylineSpec) -> Result<PrimitiveId, ApplicationError> {
        self.add(Drawn::Polyline(polyline))
    }

    fn add_marker(&self, marker: MarkerSpec) -> Result<PrimitiveId, ApplicationError> {
        self.add(Drawn::Marker(marker))
    }

    fn open_popup(&self, popup: PopupSpec) -> Result<PrimitiveId, ApplicationError> {
        self.add(Drawn::Popup(popup))
    }

    fn set_visible(&self, id: PrimitiveId, visible: bool) {
        if let Some(entry) = self.live.lock().get_mut(&id) {
            entry.1 = visible;
        }
    }

    fn remove(&self, id: PrimitiveId) {
        if self.live.lock().remove(&id).is_some() {
            self.removed.lock().push(id);
        }
    }

    fn fit_bounds(&self, bounds: Bounds) {
        self.bounds.lock().push(bounds);
    }
}

type PendingRoute = oneshot::Receiver<Result<DrivingDirections, ApplicationError>>;

/// Driving provider whose answers are released by the test
///
/// Calls take the oldest pending answer; with none queued they answer
/// immediately with a straight two-point route.
#[derive(Default)]
pub struct ScriptedDriving {
    pending: Mutex<VecDeque<PendingRoute>>,
    calls: AtomicUsize,
}

impl ScriptedDriving {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue an answer the test releases through the returned sender
    pub fn hold_next(&self) -> oneshot::Sender<Result<DrivingDirections, ApplicationError>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Straight driving directions between two points
pub fn straight_directions(from: Coordinate, to: Coordinate) -> DrivingDirections {
    DrivingDirections {
        distance_m: from.distance_km(&to) * 1000.0,
        duration_s: 120.0,
        path: vec![from, to],
        road_name: None,
    }
}

#[async_trait]
impl DrivingRoutePort for ScriptedDriving {
    async fn driving_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<DrivingDirections, ApplicationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.pending.lock().pop_front();
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApplicationError::Internal("answer dropped".into()))),
            None => Ok(straight_directions(*origin, *destination)),
        }
    }
}

#[derive(Default)]
struct ChannelLocationInner {
    sender: Mutex<Option<mpsc::UnboundedSender<Result<Coordinate, LocationError>>>>,
    cancelled: AtomicBool,
    watches: AtomicUsize,
}

/// Location provider fed by the test
#[derive(Default, Clone)]
pub struct ChannelLocation {
    inner: Arc<ChannelLocationInner>,
}

impl ChannelLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a fix or error; false once the watch is gone
    pub fn push(&self, update: Result<Coordinate, LocationError>) -> bool {
        self.inner
            .sender
            .lock()
            .as_ref()
            .is_some_and(|tx| tx.send(update).is_ok())
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub fn watch_count(&self) -> usize {
        self.inner.watches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationPort for ChannelLocation {
    async fn current_position(&self, _options: WatchOptions) -> Result<Coordinate, LocationError> {
        Err(LocationError::PositionUnavailable)
    }

    fn watch(&self, _options: WatchOptions) -> PositionWatch {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.sender.lock() = Some(tx);
        self.inner.cancelled.store(false, Ordering::SeqCst);
        self.inner.watches.fetch_add(1, Ordering::SeqCst);

        let inner = Arc::clone(&self.inner);
        PositionWatch {
            updates: rx,
            handle: WatchHandle::new(move || {
                inner.cancelled.store(true, Ordering::SeqCst);
                inner.sender.lock().take();
            }),
        }
    }
}
