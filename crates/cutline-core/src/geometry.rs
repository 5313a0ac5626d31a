//! Geometric primitives for element placement on the canvas.

use serde::{Deserialize, Serialize};

/// Point in scene-graph units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise offset.
    #[inline]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow the rectangle by `dx` horizontally and `dy` vertically on every side.
    pub fn inflate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x - dx,
            y: self.y - dy,
            width: self.width + dx * 2.0,
            height: self.height + dy * 2.0,
        }
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Position and transform of an element on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Placement {
    /// Unrotated, unscaled placement.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Top-left corner.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bounding rectangle before rotation and scale.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Same placement moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Clip rectangle around the placement, padded by `margin` scene units.
    /// The padding is expressed in the element's own (scaled) space.
    pub fn clip_mask(&self, margin: f64) -> Rect {
        let dx = margin / non_zero(self.scale_x);
        let dy = margin / non_zero(self.scale_y);
        self.bounds().inflate(dx, dy)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}

fn non_zero(scale: f64) -> f64 {
    if scale.abs() < f64::EPSILON {
        1.0
    } else {
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translated_keeps_size() {
        let p = Placement::new(10.0, 20.0, 160.0, 90.0);
        let moved = p.translated(50.0, 20.0);
        assert_eq!(moved.origin(), Point::new(60.0, 40.0));
        assert_eq!(moved.width, 160.0);
        assert_eq!(moved.scale_x, 1.0);
    }

    #[test]
    fn test_clip_mask_respects_scale() {
        let mut p = Placement::new(100.0, 100.0, 200.0, 50.0);
        p.scale_x = 2.0;
        let clip = p.clip_mask(50.0);
        assert_eq!(clip, Rect::new(75.0, 50.0, 250.0, 150.0));
        assert!(clip.contains(Point::new(100.0, 100.0)));
    }
}
