//! Integer pixel geometry
//!
//! Everything here lives in canvas orientation: x grows right, y grows down.

use std::ops::{Add, AddAssign, Sub};

/// A point or displacement in whole pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

/// Tight pixel rectangle around the ink of a run, pen at the origin.
///
/// `min <= max` on both axes. A run without ink is the degenerate
/// `(0,0)-(0,0)` rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundingRect {
    pub min: Point,
    pub max: Point,
}

impl BoundingRect {
    pub const EMPTY: BoundingRect = BoundingRect {
        min: Point::ORIGIN,
        max: Point::ORIGIN,
    };

    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// True for the degenerate rectangle of an ink-less run
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x)
    }

    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y)
    }

    pub fn translate(&self, by: Point) -> BoundingRect {
        BoundingRect::new(self.min + by, self.max + by)
    }

    /// Smallest rectangle holding both `self` and `other`
    pub fn union(&self, other: &BoundingRect) -> BoundingRect {
        BoundingRect::new(
            Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }
}

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
