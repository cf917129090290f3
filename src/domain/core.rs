//! Core domain types and operations
//!
//! This module defines the pure geometric types shared by the layout engine.
//! Two coordinate spaces exist side by side:
//! - virtual space: absolute desktop pixels, integers, as the icon manager stores them
//! - screen space: pixels inside the application's own drawing surface, floats

/// Rectangle in absolute desktop pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the right edge coordinate
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Returns the bottom edge coordinate
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Returns the bounding box that contains both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Point in virtual (absolute desktop) space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VirtualPoint {
    pub x: i32,
    pub y: i32,
}

impl VirtualPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Point in screen (drawing surface) space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to `other`
    ///
    /// Hit-testing compares squared distances so that integer inputs stay exact
    /// at the radius boundary.
    pub fn distance_squared(&self, other: &ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_basic_properties() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
    }

    #[test]
    fn rect_union_spans_both() {
        let rect1 = Rect::new(-1280, 0, 1280, 1024);
        let rect2 = Rect::new(0, -100, 1920, 1080);
        assert_eq!(rect1.union(&rect2), Rect::new(-1280, -100, 3200, 1124));
        assert_eq!(rect2.union(&rect1), rect1.union(&rect2));
    }

    #[test]
    fn squared_distance_is_exact_for_integers() {
        let a = ScreenPoint::new(50.0, 100.0);
        assert_eq!(a.distance_squared(&ScreenPoint::new(56.0, 100.0)), 36.0);
        assert_eq!(a.distance_squared(&ScreenPoint::new(56.0, 101.0)), 37.0);
    }
}
