//! Geometric primitives for recovering structure from diagram coordinates.
//!
//! This module provides the small set of geometric types the extractors
//! need to reason about where diagram elements sit relative to each other.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Diagram documents use a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner at `(0, 0)`
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward, so a larger `y` means "later" on a
//!   sequence diagram timeline.

/// A 2D point representing a position in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use seqmodel_core::geometry::Point;
/// let origin = Point::new(10.0, 20.0);
/// let offset = Point::new(5.0, 5.0);
///
/// let moved = origin.add_point(offset);
/// assert_eq!(moved.x(), 15.0);
/// assert_eq!(moved.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned rectangle in diagram space.
///
/// Stored as minimum and maximum corners. Diagram documents describe boxes
/// by their top-left corner and size, so [`Bounds::new_from_top_left`] is
/// the usual constructor.
///
/// # Examples
///
/// ```
/// # use seqmodel_core::geometry::{Bounds, Point, Size};
/// let frame = Bounds::new_from_top_left(Point::new(20.0, 60.0), Size::new(300.0, 60.0));
///
/// assert_eq!(frame.height(), 60.0);
/// assert!(frame.contains_y(80.0));
/// assert!(!frame.contains_y(121.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and a size.
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x(),
            min_y: top_left.y(),
            max_x: top_left.x() + size.width(),
            max_y: top_left.y() + size.height(),
        }
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Returns the center point
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True when `x` lies within the horizontal span, edges inclusive.
    pub fn contains_x(self, x: f32) -> bool {
        self.min_x <= x && x <= self.max_x
    }

    /// True when `y` lies within the vertical span, edges inclusive.
    pub fn contains_y(self, y: f32) -> bool {
        self.min_y <= y && y <= self.max_y
    }

    /// Containment test that lets a point float up to `tolerance` above the top edge.
    ///
    /// Frame captions are frequently drawn slightly above the frame they
    /// belong to; this is the test used to attach such captions.
    pub fn contains_with_top_tolerance(self, point: Point, tolerance: f32) -> bool {
        self.contains_x(point.x())
            && self.min_y - tolerance <= point.y()
            && point.y() <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_add() {
        let p1 = Point::new(1.0, 2.0);
        let p2 = Point::new(3.0, 4.0);
        let result = p1.add_point(p2);
        assert_eq!(result.x(), 4.0);
        assert_eq!(result.y(), 6.0);
    }

    #[test]
    fn test_bounds_from_top_left() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(30.0, 40.0));
        assert_eq!(bounds.min_point(), Point::new(10.0, 20.0));
        assert_eq!(bounds.width(), 30.0);
        assert_eq!(bounds.height(), 40.0);
        assert_eq!(bounds.center(), Point::new(25.0, 40.0));
        assert!(bounds.contains_y(60.0));
        assert!(!bounds.contains_y(60.1));
    }

    #[test]
    fn test_contains_edges_inclusive() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 60.0), Size::new(100.0, 60.0));
        assert!(bounds.contains_y(60.0));
        assert!(bounds.contains_y(120.0));
        assert!(!bounds.contains_y(59.9));
        assert!(bounds.contains_x(0.0));
        assert!(bounds.contains_x(100.0));
        assert!(!bounds.contains_x(100.1));
    }

    #[test]
    fn test_top_tolerance() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 100.0), Size::new(200.0, 50.0));
        assert!(bounds.contains_with_top_tolerance(Point::new(10.0, 70.0), 40.0));
        assert!(!bounds.contains_with_top_tolerance(Point::new(10.0, 50.0), 40.0));
        // Tolerance only extends upwards.
        assert!(!bounds.contains_with_top_tolerance(Point::new(10.0, 160.0), 40.0));
        assert!(!bounds.contains_with_top_tolerance(Point::new(-1.0, 120.0), 40.0));
    }
}
