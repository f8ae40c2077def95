//! Screen-space geometry

use std::ops::{Add, Sub};

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move this point in place
    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// A copy of this point moved by `(dx, dy)`
    pub fn shifted(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Component-wise scale, used for parallax
    pub fn scaled(self, scale: MotionScale) -> Self {
        Self::new(self.x * scale.x, self.y * scale.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size of an image in pixels
    pub fn of_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// Axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn bottom_right(&self) -> Point {
        self.origin.shifted(self.size.width, self.size.height)
    }

    /// Closed-interval containment: points on every edge are inside
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.size.width
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.size.height
    }
}

/// Per-axis factor applied to camera motion for a layer.
///
/// `(1, 1)` follows the camera, `(0, 0)` is fixed to the screen, values in
/// between (or above) produce parallax.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionScale {
    pub x: f32,
    pub y: f32,
}

impl MotionScale {
    pub const IDENTITY: MotionScale = MotionScale { x: 1.0, y: 1.0 };
    pub const FIXED: MotionScale = MotionScale { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn uniform(scale: f32) -> Self {
        Self::new(scale, scale)
    }
}

impl Default for MotionScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<(f32, f32)> for MotionScale {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}
