//! Items carried by a belt

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Item identity, unique within its lane
pub type ItemId = u32;

/// A package riding a belt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    /// Top-left corner
    origin: Vec2,
    /// Horizontal speed (units/s)
    speed: f32,
    size: f32,
}

impl Item {
    pub fn new(id: ItemId, origin: Vec2, speed: f32, size: f32) -> Self {
        Self {
            id,
            origin,
            speed,
            size,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Horizontal position (left edge)
    #[inline]
    pub fn position(&self) -> f32 {
        self.origin.x
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Move right by `speed * dt`. Bounds are the belt's business.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.origin.x += self.speed * dt;
    }

    /// Takes effect on the next advance
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Horizontal span `(left, right)`
    pub fn extent(&self) -> (f32, f32) {
        (self.origin.x, self.origin.x + self.size)
    }

    pub fn center_x(&self) -> f32 {
        self.origin.x + self.size / 2.0
    }

    /// Axis-aligned bounding box `(min, max)`
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.origin, self.origin + Vec2::splat(self.size))
    }
}
