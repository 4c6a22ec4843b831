//! FILENAME: core/engine/src/geometry.rs
//! PURPOSE: Axis-aligned rectangles for laid-out nodes, cells and shapes.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking containment of summed float bounds.
const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Bounds { x, y, width, height }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.max_x() && py >= self.y && py < self.max_y()
    }

    /// True when `other` lies fully inside `self`.
    pub fn contains(&self, other: &Bounds) -> bool {
        other.x + EPSILON >= self.x
            && other.y + EPSILON >= self.y
            && other.max_x() <= self.max_x() + EPSILON
            && other.max_y() <= self.max_y() + EPSILON
    }

    /// True when the two rectangles share any area.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.max_x().max(other.max_x()) - x,
            height: self.max_y().max(other.max_y()) - y,
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Bounds {
        Bounds {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Shrinks the rectangle by `padding` on every side (never below zero size).
    pub fn inset(&self, padding: f64) -> Bounds {
        Bounds {
            x: self.x + padding,
            y: self.y + padding,
            width: (self.width - padding * 2.0).max(0.0),
            height: (self.height - padding * 2.0).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_contains() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 5.0, 5.0, 20.0);
        let u = a.union(&b);
        assert_eq!(u, Bounds::new(0.0, 0.0, 15.0, 25.0));
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert!(!a.contains(&b));
        assert!(u.intersects(&b));
        // Touching edges do not overlap
        assert!(!a.intersects(&Bounds::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_point_hit_and_inset() {
        let a = Bounds::new(10.0, 10.0, 20.0, 10.0);
        assert!(a.contains_point(10.0, 10.0));
        assert!(!a.contains_point(30.0, 10.0));
        assert_eq!(a.inset(3.0), Bounds::new(13.0, 13.0, 14.0, 4.0));
        assert_eq!(a.inset(50.0).width, 0.0);
    }
}
