// Copyright (c) 2026 rezky_nightky

/// Axis-aligned rectangle in viewport units. `top < bottom` grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Edges are inclusive; a zero-area rectangle contains nothing.
    pub fn contains(&self, p: Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    pub fn translated(&self, offset: Offset) -> Self {
        Self {
            left: self.left + offset.dx,
            top: self.top + offset.dy,
            right: self.right + offset.dx,
            bottom: self.bottom + offset.dy,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(30.1, 15.0)));
    }

    #[test]
    fn zero_area_rect_never_contains() {
        let flat = Rect::new(0.0, 50.0, 100.0, 0.0);
        assert!(flat.is_degenerate());
        assert!(!flat.contains(Point::new(10.0, 50.0)));

        let thin = Rect::new(40.0, 0.0, 0.0, 100.0);
        assert!(!thin.contains(Point::new(40.0, 10.0)));
    }

    #[test]
    fn translated_moves_all_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).translated(Offset { dx: 2.0, dy: -1.0 });
        assert_eq!(r, Rect::new(2.0, -1.0, 10.0, 10.0));
    }
}
