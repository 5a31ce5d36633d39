//! Route renderer - Draws routes on the map surface and owns their lifecycle
//!
//! The renderer is the only writer of route overlays. It keeps the surface
//! primitives it created, grouped per [`DrawHandle`], and never holds on to
//! geographic data beyond what it needs to build popups.

use std::{collections::HashMap, fmt, sync::Arc};

use domain::{Coordinate, MARKER_Z_ORDER, Route, StopPoint, TransitLeg};
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{Bounds, MapSurfacePort, MarkerKind, MarkerSpec, PolylineSpec, PopupSpec, PrimitiveId},
};

/// Handle to one drawn route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawHandle(u64);

impl fmt::Display for DrawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct OverlaySet {
    polylines: Vec<PrimitiveId>,
    markers: Vec<PrimitiveId>,
    visible: bool,
}

impl OverlaySet {
    fn primitives(&self) -> impl Iterator<Item = PrimitiveId> + '_ {
        self.polylines.iter().chain(self.markers.iter()).copied()
    }
}

#[derive(Debug, Default)]
struct RendererState {
    next_handle: u64,
    overlays: HashMap<DrawHandle, OverlaySet>,
    active: Option<DrawHandle>,
    popup_content: HashMap<PrimitiveId, (DrawHandle, PopupSpec)>,
    open_popup: Option<(DrawHandle, PrimitiveId)>,
}

/// Turns routes into layered drawables
pub struct RouteRenderer {
    surface: Arc<dyn MapSurfacePort>,
    state: Mutex<RendererState>,
}

impl fmt::Debug for RouteRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RouteRenderer")
            .field("active", &state.active)
            .field("overlays", &state.overlays.len())
            .finish_non_exhaustive()
    }
}

impl RouteRenderer {
    /// Create a renderer drawing on `surface`
    pub fn new(surface: Arc<dyn MapSurfacePort>) -> Self {
        Self {
            surface,
            state: Mutex::new(RendererState::default()),
        }
    }

    /// Draw a route as the new active overlay
    ///
    /// The previous active overlay is disposed first. Vehicle segments are
    /// added before walking segments, and stop markers last, so the surface
    /// sees primitives in ascending draw order.
    ///
    /// # Errors
    ///
    /// Returns `MapSurface` if the surface rejects a primitive; everything
    /// added for this route is removed again in that case.
    #[instrument(skip(self, route), fields(kind = ?route.kind(), segments = route.segments().len()))]
    pub fn draw(&self, route: &Route) -> Result<DrawHandle, ApplicationError> {
        let mut state = self.state.lock();
        if let Some(previous) = state.active.take() {
            self.dispose_locked(&mut state, previous);
        }

        let mut overlay = OverlaySet {
            visible: true,
            ..OverlaySet::default()
        };
        let mut popups = Vec::new();

        if let Err(e) = self.add_primitives(route, &mut overlay, &mut popups) {
            warn!(error = %e, "Map surface rejected route, rolling back");
            for id in overlay.primitives() {
                self.surface.remove(id);
            }
            return Err(e);
        }

        state.next_handle += 1;
        let handle = DrawHandle(state.next_handle);
        for (marker, popup) in popups {
            state.popup_content.insert(marker, (handle, popup));
        }
        debug!(
            %handle,
            polylines = overlay.polylines.len(),
            markers = overlay.markers.len(),
            "Route drawn"
        );
        state.overlays.insert(handle, overlay);
        state.active = Some(handle);

        Ok(handle)
    }

    fn add_primitives(
        &self,
        route: &Route,
        overlay: &mut OverlaySet,
        popups: &mut Vec<(PrimitiveId, PopupSpec)>,
    ) -> Result<(), ApplicationError> {
        let mut segments: Vec<_> = route.segments().iter().collect();
        segments.sort_by_key(|segment| segment.z_order());

        for segment in segments {
            let id = self.surface.add_polyline(PolylineSpec {
                points: segment.points().to_vec(),
                style: segment.style().clone(),
                z_order: segment.z_order(),
            })?;
            overlay.polylines.push(id);
        }

        for leg in route.legs() {
            let stops = [
                (MarkerKind::Departure, &leg.departure_stop, &leg.departure_time_text),
                (MarkerKind::Arrival, &leg.arrival_stop, &leg.arrival_time_text),
            ];
            for (kind, stop, time) in stops {
                let id = self.surface.add_marker(MarkerSpec {
                    position: stop.location,
                    kind,
                    title: stop.name.clone(),
                    z_order: MARKER_Z_ORDER,
                })?;
                overlay.markers.push(id);
                popups.push((id, stop_popup(leg, stop, time.as_deref())));
            }
        }

        Ok(())
    }

    /// Make a drawn route visible; false if the handle is gone
    pub fn show(&self, handle: DrawHandle) -> bool {
        self.set_visible(handle, true)
    }

    /// Hide a drawn route without disposing it; false if the handle is gone
    pub fn hide(&self, handle: DrawHandle) -> bool {
        self.set_visible(handle, false)
    }

    fn set_visible(&self, handle: DrawHandle, visible: bool) -> bool {
        let mut state = self.state.lock();
        let Some(overlay) = state.overlays.get_mut(&handle) else {
            return false;
        };
        overlay.visible = visible;
        for id in overlay.primitives() {
            self.surface.set_visible(id, visible);
        }
        if !visible {
            Self::close_popup_of(&self.surface, &mut state, Some(handle));
        }
        true
    }

    /// Remove every primitive of a drawn route
    ///
    /// Disposing an unknown or already disposed handle is a no-op.
    pub fn dispose(&self, handle: DrawHandle) -> bool {
        let mut state = self.state.lock();
        self.dispose_locked(&mut state, handle)
    }

    fn dispose_locked(&self, state: &mut RendererState, handle: DrawHandle) -> bool {
        let Some(overlay) = state.overlays.remove(&handle) else {
            return false;
        };
        Self::close_popup_of(&self.surface, state, Some(handle));
        for id in overlay.primitives() {
            self.surface.remove(id);
        }
        state.popup_content.retain(|_, (owner, _)| *owner != handle);
        if state.active == Some(handle) {
            state.active = None;
        }
        debug!(%handle, "Route disposed");
        true
    }

    /// Dispose every overlay this renderer created
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let handles: Vec<_> = state.overlays.keys().copied().collect();
        for handle in handles {
            self.dispose_locked(&mut state, handle);
        }
        Self::close_popup_of(&self.surface, &mut state, None);
    }

    /// Open the detail popup of a clicked stop marker
    ///
    /// Any other popup opened by this renderer is closed first. Returns
    /// `None` for markers this renderer did not create.
    ///
    /// # Errors
    ///
    /// Returns `MapSurface` if the surface cannot open the popup.
    pub fn on_marker_click(
        &self,
        marker: PrimitiveId,
    ) -> Result<Option<PrimitiveId>, ApplicationError> {
        let mut state = self.state.lock();
        let Some((owner, popup)) = state.popup_content.get(&marker).cloned() else {
            return Ok(None);
        };

        Self::close_popup_of(&self.surface, &mut state, None);
        let id = self.surface.open_popup(popup)?;
        state.open_popup = Some((owner, id));
        Ok(Some(id))
    }

    /// Close the open popup, if any
    pub fn close_popup(&self) -> bool {
        let mut state = self.state.lock();
        Self::close_popup_of(&self.surface, &mut state, None)
    }

    /// Close the open popup if it belongs to `owner` (or to anyone for `None`)
    fn close_popup_of(
        surface: &Arc<dyn MapSurfacePort>,
        state: &mut RendererState,
        owner: Option<DrawHandle>,
    ) -> bool {
        match state.open_popup {
            Some((popup_owner, id)) if owner.is_none_or(|o| o == popup_owner) => {
                surface.remove(id);
                state.open_popup = None;
                true
            },
            _ => false,
        }
    }

    /// Fit the viewport around the live origin and the destination
    pub fn recenter(&self, origin: &Coordinate, destination: &Coordinate) {
        if let Some(bounds) = Bounds::enclosing([origin, destination]) {
            self.surface.fit_bounds(bounds);
        }
    }

    /// Handle of the active overlay
    #[must_use]
    pub fn active_handle(&self) -> Option<DrawHandle> {
        self.state.lock().active
    }

    /// Whether a handle is drawn and visible
    #[must_use]
    pub fn is_visible(&self, handle: DrawHandle) -> bool {
        self.state
            .lock()
            .overlays
            .get(&handle)
            .is_some_and(|overlay| overlay.visible)
    }

    /// Popup currently open, if any
    #[must_use]
    pub fn open_popup(&self) -> Option<PrimitiveId> {
        self.state.lock().open_popup.map(|(_, id)| id)
    }
}

fn stop_popup(leg: &TransitLeg, stop: &StopPoint, time: Option<&str>) -> PopupSpec {
    let mut lines = vec![format!(
        "{} {}",
        leg.vehicle_kind.emoji(),
        leg.display_line_name()
    )];
    if let Some(time) = time {
        lines.push(time.to_string());
    }
    lines.push(format!("{} stops", leg.stop_count));

    PopupSpec {
        position: stop.location,
        title: stop.name.clone(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use domain::{
        DashStyle, PathSegment, SegmentStyle, TravelMode, VEHICLE_Z_ORDER, VehicleKind,
        WALKING_Z_ORDER,
    };

    use super::*;
    use crate::{
        ports::MockMapSurfacePort,
        testing::RecordingSurface,
    };

    fn point(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn segment(mode: TravelMode, color: &str) -> PathSegment {
        PathSegment::new(
            mode,
            vec![point(37.5665, 126.9780), point(37.5651, 126.9895)],
            SegmentStyle::new(color, 4, DashStyle::Solid),
        )
        .unwrap()
    }

    fn leg(name: &str) -> TransitLeg {
        TransitLeg {
            vehicle_kind: VehicleKind::Bus,
            line_name: name.to_string(),
            line_short_name: String::new(),
            line_color: None,
            departure_stop: StopPoint::new(format!("{name} 승차"), point(37.5660, 126.9800)),
            arrival_stop: StopPoint::new(format!("{name} 하차"), point(37.5655, 126.9880)),
            stop_count: 4,
            departure_time_text: Some("오후 3:12".to_string()),
            arrival_time_text: None,
        }
    }

    /// Walking segment listed first so layering has work to do
    fn transit_route() -> Route {
        Route::transit(
            2.0,
            15,
            vec![
                segment(TravelMode::Walking, "#757575"),
                segment(TravelMode::Transit, "#4CAF50"),
                segment(TravelMode::Walking, "#757575"),
            ],
            vec![leg("472")],
            5,
            "버스 472",
        )
    }

    fn driving_route() -> Route {
        Route::driving(3.0, 9, segment(TravelMode::Driving, "#007bff"), None)
    }

    #[test]
    fn vehicle_segments_are_drawn_below_walking_and_markers() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());

        renderer.draw(&transit_route()).unwrap();

        let z: Vec<_> = surface.polylines().iter().map(|p| p.z_order).collect();
        assert_eq!(z, vec![VEHICLE_Z_ORDER, WALKING_Z_ORDER, WALKING_Z_ORDER]);

        let markers = surface.markers();
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|(_, m)| m.z_order > WALKING_Z_ORDER));
        assert_eq!(markers[0].1.kind, MarkerKind::Departure);
        assert_eq!(markers[1].1.kind, MarkerKind::Arrival);
    }

    #[test]
    fn second_draw_disposes_first() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());

        let first = renderer.draw(&transit_route()).unwrap();
        let first_count = surface.live_count();
        let second = renderer.draw(&driving_route()).unwrap();

        assert_ne!(first, second);
        assert_eq!(surface.removed().len(), first_count);
        assert_eq!(surface.live_count(), 1);
        assert_eq!(surface.visible_count(), 1);
        assert_eq!(renderer.active_handle(), Some(second));
        assert!(!renderer.is_visible(first));
        assert!(renderer.is_visible(second));
    }

    #[test]
    fn double_dispose_is_noop() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());
        let handle = renderer.draw(&driving_route()).unwrap();

        assert!(renderer.dispose(handle));
        assert!(!renderer.dispose(handle));
        assert_eq!(surface.live_count(), 0);
        assert_eq!(surface.removed().len(), 1);
        assert_eq!(renderer.active_handle(), None);
    }

    #[test]
    fn hide_and_show() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());
        let handle = renderer.draw(&transit_route()).unwrap();
        let total = surface.live_count();

        assert!(renderer.hide(handle));
        assert_eq!(surface.visible_count(), 0);
        assert!(!renderer.is_visible(handle));

        assert!(renderer.show(handle));
        assert_eq!(surface.visible_count(), total);

        renderer.dispose(handle);
        assert!(!renderer.show(handle));
    }

    #[test]
    fn only_one_popup_open_at_a_time() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());
        renderer.draw(&transit_route()).unwrap();
        let markers = surface.markers();

        let first = renderer.on_marker_click(markers[0].0).unwrap().unwrap();
        assert_eq!(surface.open_popups().len(), 1);
        assert_eq!(surface.open_popups()[0].title, "472 승차");
        assert!(surface.open_popups()[0].lines.contains(&"오후 3:12".to_string()));

        let second = renderer.on_marker_click(markers[1].0).unwrap().unwrap();
        assert_ne!(first, second);
        assert_eq!(surface.open_popups().len(), 1);
        assert_eq!(surface.open_popups()[0].title, "472 하차");
        assert_eq!(renderer.open_popup(), Some(second));
    }

    #[test]
    fn unknown_marker_click_is_ignored() {
        let renderer = RouteRenderer::new(RecordingSurface::new());
        assert_eq!(renderer.on_marker_click(PrimitiveId(999)).unwrap(), None);
    }

    #[test]
    fn dispose_closes_popup() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());
        let handle = renderer.draw(&transit_route()).unwrap();
        let marker = surface.markers()[0].0;
        renderer.on_marker_click(marker).unwrap();

        renderer.dispose(handle);
        assert!(surface.open_popups().is_empty());
        assert_eq!(renderer.open_popup(), None);
        assert_eq!(surface.live_count(), 0);
        assert_eq!(renderer.on_marker_click(marker).unwrap(), None);
    }

    #[test]
    fn failed_draw_rolls_back() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());
        surface.fail_after(2);

        let result = renderer.draw(&transit_route());
        assert!(matches!(result, Err(ApplicationError::MapSurface(_))));
        assert_eq!(surface.live_count(), 0);
        assert_eq!(renderer.active_handle(), None);
    }

    #[test]
    fn clear_disposes_everything() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());
        renderer.draw(&transit_route()).unwrap();
        renderer.on_marker_click(surface.markers()[0].0).unwrap();

        renderer.clear();
        assert_eq!(surface.live_count(), 0);
        assert_eq!(renderer.active_handle(), None);
    }

    #[test]
    fn recenter_fits_both_points() {
        let surface = RecordingSurface::new();
        let renderer = RouteRenderer::new(surface.clone());
        let origin = point(37.5665, 126.9780);
        let destination = point(37.5796, 126.9990);

        renderer.recenter(&origin, &destination);
        let bounds = surface.last_bounds().unwrap();
        assert!(bounds.contains(&origin));
        assert!(bounds.contains(&destination));
    }

    #[test]
    fn estimated_route_without_segments_draws_nothing() {
        let mut surface = MockMapSurfacePort::new();
        surface.expect_add_polyline().times(0);
        surface.expect_add_marker().times(0);

        let renderer = RouteRenderer::new(Arc::new(surface));
        let route = Route::estimated(1.0, 3, 1, 0, "대중교통", Vec::new());
        assert!(renderer.draw(&route).is_ok());
    }
}
