//! Layout model: icon entities, scale and coordinate transforms
//!
//! The model owns every icon dot as an arena entry addressed by [`EntityId`],
//! the current uniform scale, and the conversions between virtual space and
//! screen space. Virtual coordinates are translated by the canvas origin
//! before scaling, so a canvas with `min_x = min_y = 0` maps `(x, y)` to
//! `(x * scale, y * scale)`.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::domain::core::{ScreenPoint, VirtualPoint};
use crate::domain::monitors::VirtualCanvas;

/// Default hit radius (and drawn dot radius) in screen pixels
pub const DEFAULT_HIT_RADIUS: u32 = 6;

/// Stable handle to an entity in the model's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(usize);

impl EntityId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A stored icon position, as loaded from the position store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconPosition {
    pub path: PathBuf,
    pub position: VirtualPoint,
}

impl IconPosition {
    pub fn new(path: impl Into<PathBuf>, x: i32, y: i32) -> Self {
        Self {
            path: path.into(),
            position: VirtualPoint::new(x, y),
        }
    }
}

/// An icon dot owned by the layout model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntity {
    /// Desktop file path, unique within the model
    pub path: PathBuf,
    /// Position in virtual space
    pub position: VirtualPoint,
    /// Whether this entity is currently being dragged
    pub dragging: bool,
}

#[derive(Debug, Clone)]
pub struct LayoutModel {
    entities: Vec<IconEntity>,
    canvas: VirtualCanvas,
    scale: f64,
    surface: (u32, u32),
    hit_radius: u32,
}

impl LayoutModel {
    pub fn new(canvas: VirtualCanvas, hit_radius: u32) -> Self {
        Self {
            entities: Vec::new(),
            canvas,
            scale: 1.0,
            surface: (canvas.width as u32, canvas.height as u32),
            hit_radius: hit_radius.max(1),
        }
    }

    /// Replaces the whole entity set
    ///
    /// A reload is authoritative: nothing from the previous set survives. When
    /// the same path appears twice only its first position is kept.
    pub fn rebuild_from(&mut self, positions: impl IntoIterator<Item = IconPosition>) {
        let mut seen = HashSet::new();
        self.entities.clear();

        for IconPosition { path, position } in positions {
            if !seen.insert(path.clone()) {
                debug!(path = %path.display(), "duplicate icon path ignored");
                continue;
            }
            self.entities.push(IconEntity {
                path,
                position,
                dragging: false,
            });
        }

        debug!(icons = self.entities.len(), "layout model rebuilt");
    }

    /// Recomputes the scale for a drawing surface of the given size
    ///
    /// The same factor is used for both axes. A surface with a zero dimension
    /// (a minimized window) is ignored and the previous scale kept.
    pub fn recompute_scale(&mut self, surface_width: u32, surface_height: u32) -> f64 {
        if surface_width == 0 || surface_height == 0 {
            trace!(surface_width, surface_height, "empty surface ignored");
            return self.scale;
        }
        self.surface = (surface_width, surface_height);

        let sx = f64::from(surface_width) / f64::from(self.canvas.width.max(1));
        let sy = f64::from(surface_height) / f64::from(self.canvas.height.max(1));
        self.scale = sx.min(sy);

        trace!(surface_width, surface_height, scale = self.scale, "scale recomputed");
        self.scale
    }

    /// Swaps the canvas (after a display change) and rescales for the last surface size
    pub fn set_canvas(&mut self, canvas: VirtualCanvas) {
        self.canvas = canvas;
        let (width, height) = self.surface;
        self.recompute_scale(width, height);
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    pub fn hit_radius(&self) -> u32 {
        self.hit_radius
    }

    /// Maps a virtual point onto the drawing surface
    ///
    /// The origin translation happens in `f64`: stored positions span the
    /// whole `i32` range and would overflow against a negative canvas origin.
    pub fn to_screen(&self, point: VirtualPoint) -> ScreenPoint {
        ScreenPoint::new(
            (f64::from(point.x) - f64::from(self.canvas.min_x)) * self.scale,
            (f64::from(point.y) - f64::from(self.canvas.min_y)) * self.scale,
        )
    }

    /// Maps a surface point back to virtual space, rounded to the nearest pixel
    pub fn to_virtual(&self, point: ScreenPoint) -> VirtualPoint {
        VirtualPoint::new(
            (point.x / self.scale + f64::from(self.canvas.min_x)).round() as i32,
            (point.y / self.scale + f64::from(self.canvas.min_y)).round() as i32,
        )
    }

    /// Returns the first entity, in load order, within the hit radius of `point`
    pub fn hit_test(&self, point: ScreenPoint) -> Option<EntityId> {
        let radius = f64::from(self.hit_radius);
        let limit = radius * radius;

        self.entities
            .iter()
            .position(|entity| self.to_screen(entity.position).distance_squared(&point) <= limit)
            .map(EntityId)
    }

    pub fn entity(&self, id: EntityId) -> Option<&IconEntity> {
        self.entities.get(id.0)
    }

    pub fn entities(&self) -> &[IconEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Moves an entity; returns false for a stale handle
    pub fn move_entity(&mut self, id: EntityId, position: VirtualPoint) -> bool {
        match self.entities.get_mut(id.0) {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_dragging(&mut self, id: EntityId, dragging: bool) -> bool {
        match self.entities.get_mut(id.0) {
            Some(entity) => {
                entity.dragging = dragging;
                true
            }
            None => false,
        }
    }
}
