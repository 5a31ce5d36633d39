//! Headless map surface
//!
//! Keeps the drawn scene in memory. Used by hosts without a map widget and by
//! tests; a UI layer can poll [`HeadlessMapSurface::snapshot`] and render it.

use std::collections::BTreeMap;

use application::error::ApplicationError;
use application::ports::{
    Bounds, MapSurfacePort, MarkerSpec, PolylineSpec, PopupSpec, PrimitiveId,
};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

/// A primitive as stored by the surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Drawable {
    Polyline(PolylineSpec),
    Marker(MarkerSpec),
    Popup(PopupSpec),
}

/// One primitive with its visibility
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePrimitive {
    pub id: PrimitiveId,
    pub visible: bool,
    pub drawable: Drawable,
}

/// Serializable view of the whole scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    /// Primitives in creation order
    pub primitives: Vec<ScenePrimitive>,
    /// Last fitted bounds
    pub viewport: Option<Bounds>,
}

#[derive(Debug, Default)]
struct Scene {
    next_id: u64,
    primitives: BTreeMap<PrimitiveId, ScenePrimitive>,
    fitted: Vec<Bounds>,
}

impl Scene {
    fn insert(&mut self, drawable: Drawable) -> PrimitiveId {
        self.next_id += 1;
        let id = PrimitiveId(self.next_id);
        self.primitives.insert(
            id,
            ScenePrimitive {
                id,
                visible: true,
                drawable,
            },
        );
        id
    }
}

/// In-memory [`MapSurfacePort`]
///
/// Ids are never reused, so a stale id held by a caller cannot address a
/// newer primitive.
#[derive(Debug, Default)]
pub struct HeadlessMapSurface {
    scene: Mutex<Scene>,
    capacity: Option<usize>,
}

impl HeadlessMapSurface {
    /// Create an empty surface
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that rejects primitives beyond `capacity`
    #[must_use]
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            scene: Mutex::default(),
            capacity: Some(capacity),
        }
    }

    fn add(&self, drawable: Drawable) -> Result<PrimitiveId, ApplicationError> {
        let mut scene = self.scene.lock();
        if let Some(capacity) = self.capacity.filter(|c| scene.primitives.len() >= *c) {
            return Err(ApplicationError::MapSurface(format!(
                "surface is full ({capacity} primitives)"
            )));
        }
        let id = scene.insert(drawable);
        trace!(%id, "Primitive added");
        Ok(id)
    }

    /// Copy of the current scene
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        let scene = self.scene.lock();
        SceneSnapshot {
            primitives: scene.primitives.values().cloned().collect(),
            viewport: scene.fitted.last().copied(),
        }
    }

    /// Look up one primitive
    #[must_use]
    pub fn primitive(&self, id: PrimitiveId) -> Option<ScenePrimitive> {
        self.scene.lock().primitives.get(&id).cloned()
    }

    /// Visible polylines in creation order
    #[must_use]
    pub fn visible_polylines(&self) -> Vec<PolylineSpec> {
        self.visible(|d| match d {
            Drawable::Polyline(p) => Some(p.clone()),
            _ => None,
        })
    }

    /// Visible markers in creation order
    #[must_use]
    pub fn visible_markers(&self) -> Vec<MarkerSpec> {
        self.visible(|d| match d {
            Drawable::Marker(m) => Some(m.clone()),
            _ => None,
        })
    }

    /// Open popups in creation order
    #[must_use]
    pub fn open_popups(&self) -> Vec<PopupSpec> {
        self.visible(|d| match d {
            Drawable::Popup(p) => Some(p.clone()),
            _ => None,
        })
    }

    fn visible<T>(&self, select: impl Fn(&Drawable) -> Option<T>) -> Vec<T> {
        self.scene
            .lock()
            .primitives
            .values()
            .filter(|p| p.visible)
            .filter_map(|p| select(&p.drawable))
            .collect()
    }

    /// Number of live primitives, visible or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.scene.lock().primitives.len()
    }

    /// Whether nothing is drawn
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every bounds passed to `fit_bounds`, oldest first
    #[must_use]
    pub fn fit_history(&self) -> Vec<Bounds> {
        self.scene.lock().fitted.clone()
    }
}

impl MapSurfacePort for HeadlessMapSurface {
    fn add_polyline(&self, polyline: PolylineSpec) -> Result<PrimitiveId, ApplicationError> {
        if polyline.points.len() < 2 {
            return Err(ApplicationError::MapSurface(
                "polyline needs at least two points".to_string(),
            ));
        }
        self.add(Drawable::Polyline(polyline))
    }

    fn add_marker(&self, marker: MarkerSpec) -> Result<PrimitiveId, ApplicationError> {
        self.add(Drawable::Marker(marker))
    }

    fn open_popup(&self, popup: PopupSpec) -> Result<PrimitiveId, ApplicationError> {
        self.add(Drawable::Popup(popup))
    }

    fn set_visible(&self, id: PrimitiveId, visible: bool) {
        if let Some(primitive) = self.scene.lock().primitives.get_mut(&id) {
            primitive.visible = visible;
        }
    }

    fn remove(&self, id: PrimitiveId) {
        if self.scene.lock().primitives.remove(&id).is_some() {
            trace!(%id, "Primitive removed");
        }
    }

    fn fit_bounds(&self, bounds: Bounds) {
        debug!(?bounds, "Viewport fitted");
        self.scene.lock().fitted.push(bounds);
    }
}
