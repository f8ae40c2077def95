//! Anchors
//!
//! An anchor names the point of a renderable's bounding box that sits on its
//! logical position. A `Center`-anchored 10x10 sprite at (50, 50) covers
//! (45, 45) to (55, 55).

use crate::geometry::{Point, Size};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Distance from the box's top-left corner to the anchor point
    pub fn offset(self, size: Size) -> (f32, f32) {
        let Size { width, height } = size;
        let (half_width, half_height) = (width / 2.0, height / 2.0);

        match self {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopCenter => (half_width, 0.0),
            Anchor::TopRight => (width, 0.0),
            Anchor::CenterLeft => (0.0, half_height),
            Anchor::Center => (half_width, half_height),
            Anchor::CenterRight => (width, half_height),
            Anchor::BottomLeft => (0.0, height),
            Anchor::BottomCenter => (half_width, height),
            Anchor::BottomRight => (width, height),
        }
    }

    /// Top-left corner of a box of `size` anchored at `position`
    pub fn top_left(self, position: Point, size: Size) -> Point {
        let (dx, dy) = self.offset(size);
        position.shifted(-dx, -dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_top_left_of_10x10_box() {
        let size = Size::new(10.0, 10.0);
        let at = Point::ZERO;
        let expected = [
            (Anchor::TopLeft, Point::new(0.0, 0.0)),
            (Anchor::TopCenter, Point::new(-5.0, 0.0)),
            (Anchor::TopRight, Point::new(-10.0, 0.0)),
            (Anchor::CenterLeft, Point::new(0.0, -5.0)),
            (Anchor::Center, Point::new(-5.0, -5.0)),
            (Anchor::CenterRight, Point::new(-10.0, -5.0)),
            (Anchor::BottomLeft, Point::new(0.0, -10.0)),
            (Anchor::BottomCenter, Point::new(-5.0, -10.0)),
            (Anchor::BottomRight, Point::new(-10.0, -10.0)),
        ];

        for (anchor, top_left) in expected {
            assert_eq!(anchor.top_left(at, size), top_left, "{anchor:?}");
        }
    }

    #[test]
    fn test_default_is_top_left() {
        assert_eq!(Anchor::default(), Anchor::TopLeft);
        assert_eq!(Anchor::ALL.len(), 9);
    }
}
