//! Motion state and per-session geometry
//!
//! Everything the integrator reads or mutates lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};


/// A single accelerometer reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    /// Horizontal acceleration (device units, before orientation correction)
    pub ax: f32,
    /// Vertical acceleration (device units)
    pub ay: f32,
    /// Monotonic timestamp in nanoseconds
    pub timestamp: i64,
}

impl AccelerationSample {
    pub fn new(ax: f32, ay: f32, timestamp: i64) -> Self {
        Self { ax, ay, timestamp }
    }
}

/// Surface extent and ball radius for one viewing session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
    pub radius: f32,
}

impl Bounds {
    pub fn new(width: u32, height: u32, radius: f32) -> Self {
        Self {
            width,
            height,
            radius,
        }
    }

    /// Surface extent as a vector
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Lowest allowed ball center on each axis
    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::splat(self.radius)
    }

    /// Highest allowed ball center on each axis
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.size() - Vec2::splat(self.radius)
    }

    /// Center of the surface
    ///
    /// Not rounded: an odd extent puts the center on a half pixel.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    /// True when the ball fits on both axes
    pub fn fits_ball(&self) -> bool {
        let diameter = self.radius * 2.0;
        self.width as f32 >= diameter && self.height as f32 >= diameter
    }

    /// True when `pos` keeps the whole ball on the surface
    pub fn contains(&self, pos: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
    }
}

/// Mutable motion record owned by the active session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Ball center in screen pixels
    pub pos: Vec2,
    /// Velocity in raw device units per second (unscaled)
    pub vel: Vec2,
    /// Timestamp of the previous sample; `None` until a baseline is set
    pub last_timestamp: Option<i64>,
}

impl MotionState {
    /// Ball at rest in the middle of `bounds`, no time baseline
    pub fn centered(bounds: &Bounds) -> Self {
        Self {
            pos: bounds.center(),
            vel: Vec2::ZERO,
            last_timestamp: None,
        }
    }

    /// Recenter, stop, and forget the time baseline
    pub fn reset(&mut self, bounds: &Bounds) {
        *self = Self::centered(bounds);
    }

    /// Whether the next sample will only establish a baseline
    pub fn awaiting_baseline(&self) -> bool {
        self.last_timestamp.is_none()
    }
}
