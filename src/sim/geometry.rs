//! Axis-aligned collision geometry
//!
//! Every hit test in the game reduces to rectangle/rectangle or
//! circle/rectangle overlap. Entities are anchored at their feet: `pos.x` is
//! the horizontal centre and `pos.y` the bottom edge of the body.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Body rectangle of an entity standing at `feet` with the given size
    pub fn from_feet(feet: Vec2, size: Vec2) -> Self {
        Self {
            x: feet.x - size.x * 0.5,
            y: feet.y - size.y,
            w: size.x,
            h: size.y,
        }
    }

    /// Rectangle centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x * 0.5,
            y: center.y - size.y * 0.5,
            w: size.x,
            h: size.y,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap: rectangles that only share an edge do not collide
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Circle overlap, inclusive at the boundary
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min(), self.max());
        center.distance_squared(closest) <= radius * radius
    }
}
