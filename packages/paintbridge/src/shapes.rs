//! Integer geometry used by the integer overloads of the draw calls.

use kurbo::{Line, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

impl IntPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<IntPoint> for Point {
    fn from(p: IntPoint) -> Self {
        Point::new(p.x as f64, p.y as f64)
    }
}

/// Rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// One past the last row.
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl From<IntRect> for Rect {
    fn from(r: IntRect) -> Self {
        Rect::new(r.x as f64, r.y as f64, r.right() as f64, r.bottom() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntLine {
    pub p0: IntPoint,
    pub p1: IntPoint,
}

impl IntLine {
    pub const fn new(p0: IntPoint, p1: IntPoint) -> Self {
        Self { p0, p1 }
    }
}

impl From<IntLine> for Line {
    fn from(l: IntLine) -> Self {
        Line::new(l.p0, l.p1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_edges_saturate() {
        let r = IntRect::new(i32::MAX - 1, i32::MIN, 10, -10);
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.bottom(), i32::MIN);
        assert_eq!(IntRect::new(2, 3, 4, 5).right(), 6);
    }
}
