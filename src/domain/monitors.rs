//! Monitor registry and virtual canvas
//!
//! Holds the detected monitor rectangles and derives the bounding virtual
//! canvas every other component maps against. Detection itself is delegated to
//! a [`MonitorSource`] so the platform query stays outside the domain layer.

use tracing::{debug, warn};

use crate::domain::core::Rect;

/// A single monitor in absolute desktop pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorRect {
    /// Monitor bounds in virtual space
    pub rect: Rect,
    /// Reported scale factor (1.0 = 96 DPI); informational only
    pub scale_factor: f32,
}

impl MonitorRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            scale_factor: 1.0,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }
}

/// Bounding box of every monitor, always covering the origin
///
/// `min_x`/`min_y` are never positive and `width`/`height` are never below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualCanvas {
    pub min_x: i32,
    pub min_y: i32,
    pub width: i32,
    pub height: i32,
}

impl VirtualCanvas {
    /// The 1×1 canvas used when no monitor could be detected
    pub fn degenerate() -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            width: 1,
            height: 1,
        }
    }

    /// Computes the canvas covering all `monitors` and the origin
    pub fn from_monitors(monitors: &[MonitorRect]) -> Self {
        let bounds = monitors
            .iter()
            .fold(Rect::new(0, 0, 1, 1), |bounds, monitor| bounds.union(&monitor.rect));

        Self {
            min_x: bounds.x,
            min_y: bounds.y,
            width: bounds.w.max(1),
            height: bounds.h.max(1),
        }
    }
}

impl Default for VirtualCanvas {
    fn default() -> Self {
        Self::degenerate()
    }
}

/// External display-configuration query
pub trait MonitorSource {
    type Error: std::error::Error;

    fn query(&self) -> Result<Vec<MonitorRect>, Self::Error>;
}

/// Detected monitors plus the derived canvas
#[derive(Debug, Clone, Default)]
pub struct MonitorRegistry {
    monitors: Vec<MonitorRect>,
    canvas: VirtualCanvas,
}

impl MonitorRegistry {
    pub fn new(monitors: Vec<MonitorRect>) -> Self {
        let canvas = VirtualCanvas::from_monitors(&monitors);
        Self { monitors, canvas }
    }

    /// Queries `source` for monitors
    ///
    /// Never fails: a query error or an empty result leaves the registry with
    /// no monitors and the degenerate 1×1 canvas.
    pub fn detect<S: MonitorSource>(source: &S) -> Self {
        let monitors = match source.query() {
            Ok(monitors) => monitors,
            Err(err) => {
                warn!("monitor detection failed, using a 1x1 canvas: {err}");
                Vec::new()
            }
        };

        if monitors.is_empty() {
            warn!("no monitors detected, using a 1x1 canvas");
        }
        for monitor in &monitors {
            debug!(rect = ?monitor.rect, scale_factor = monitor.scale_factor, "monitor detected");
        }

        let registry = Self::new(monitors);
        debug!(
            monitors = registry.monitors.len(),
            canvas = ?registry.canvas,
            "monitor registry built"
        );
        registry
    }

    /// Replaces the monitor set and recomputes the canvas
    pub fn replace(&mut self, monitors: Vec<MonitorRect>) {
        self.canvas = VirtualCanvas::from_monitors(&monitors);
        self.monitors = monitors;
    }

    pub fn monitors(&self) -> &[MonitorRect] {
        &self.monitors
    }

    pub fn virtual_canvas(&self) -> VirtualCanvas {
        self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Result<Vec<MonitorRect>, std::fmt::Error>);

    impl MonitorSource for FixedSource {
        type Error = std::fmt::Error;

        fn query(&self) -> Result<Vec<MonitorRect>, Self::Error> {
            self.0.clone()
        }
    }

    #[test]
    fn single_monitor_canvas() {
        let registry = MonitorRegistry::new(vec![MonitorRect::new(0, 0, 1920, 1080)]);
        let canvas = registry.virtual_canvas();
        assert_eq!(canvas, VirtualCanvas { min_x: 0, min_y: 0, width: 1920, height: 1080 });
    }

    #[test]
    fn canvas_covers_every_monitor() {
        let monitors = vec![
            MonitorRect::new(0, 0, 1920, 1080),
            MonitorRect::new(1920, -200, 1080, 1920),
            MonitorRect::new(-1280, 100, 1280, 1024),
        ];
        let canvas = VirtualCanvas::from_monitors(&monitors);

        let max_right = monitors.iter().map(|m| m.rect.right()).max().unwrap();
        assert!(canvas.min_x + canvas.width >= max_right);
        assert!(canvas.width >= max_right, "Width must reach the rightmost edge");
        for monitor in &monitors {
            let r = monitor.rect;
            assert!(
                r.x >= canvas.min_x
                    && r.y >= canvas.min_y
                    && r.right() <= canvas.min_x + canvas.width
                    && r.bottom() <= canvas.min_y + canvas.height,
                "Canvas should cover {:?}",
                r
            );
        }
        assert_eq!(canvas.min_x, -1280);
        assert_eq!(canvas.min_y, -200);
    }

    #[test]
    fn canvas_always_includes_origin() {
        let canvas = VirtualCanvas::from_monitors(&[MonitorRect::new(100, 50, 800, 600)]);
        assert_eq!(canvas.min_x, 0);
        assert_eq!(canvas.min_y, 0);
        assert_eq!(canvas.width, 900);
        assert_eq!(canvas.height, 650);
    }

    #[test]
    fn zero_monitors_yield_unit_canvas() {
        let registry = MonitorRegistry::detect(&FixedSource(Ok(Vec::new())));
        assert!(registry.monitors().is_empty());
        assert_eq!(registry.virtual_canvas().width, 1);
        assert_eq!(registry.virtual_canvas().height, 1);
    }

    #[test]
    fn failed_detection_degrades_softly() {
        let registry = MonitorRegistry::detect(&FixedSource(Err(std::fmt::Error)));
        assert_eq!(registry.virtual_canvas(), VirtualCanvas::degenerate());
    }

    #[test]
    fn replace_recomputes_canvas() {
        let mut registry = MonitorRegistry::new(vec![MonitorRect::new(0, 0, 1920, 1080)]);
        registry.replace(vec![
            MonitorRect::new(0, 0, 1920, 1080),
            MonitorRect::new(1920, 0, 2560, 1440).with_scale_factor(1.5),
        ]);
        assert_eq!(registry.monitors().len(), 2);
        assert_eq!(registry.virtual_canvas().width, 4480);
        assert_eq!(registry.virtual_canvas().height, 1440);
    }
}
