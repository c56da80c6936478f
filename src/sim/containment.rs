//! Wall containment and bounce response
//!
//! The surface is an axis-aligned box, so each axis is handled on its own:
//! a ball past the low or high limit is clamped back onto it, and if it was
//! still heading outward its velocity on that axis is reflected and damped.

use glam::Vec2;

use super::state::{Bounds, MotionState};

/// Screen axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Which wall was touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    /// Left (x) or top (y)
    Low,
    /// Right (x) or bottom (y)
    High,
}

/// Result of containing one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub axis: Axis,
    pub wall: Wall,
    /// Whether the velocity was reflected (false = position clamp only)
    pub bounced: bool,
    /// Velocity on this axis before the response
    pub speed_before: f32,
}

/// Clamp a single coordinate into `[min, max]`
///
/// Returns the new coordinate, the new velocity, and the wall touched.
/// Velocity is only reflected when it points out of bounds; a ball that is
/// already heading back inside is clamped without changing its velocity.
/// When `min > max` (ball larger than surface) the low wall wins.
#[inline]
fn contain_axis(
    pos: f32,
    vel: f32,
    min: f32,
    max: f32,
    restitution_divisor: f32,
) -> (f32, f32, Option<(Wall, bool)>) {
    if pos < min {
        if vel < 0.0 {
            (min, -vel / restitution_divisor, Some((Wall::Low, true)))
        } else {
            (min, vel, Some((Wall::Low, false)))
        }
    } else if pos > max {
        if vel > 0.0 {
            (max, -vel / restitution_divisor, Some((Wall::High, true)))
        } else {
            (max, vel, Some((Wall::High, false)))
        }
    } else {
        (pos, vel, None)
    }
}

/// Walls touched during one containment pass (at most one per axis)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Containment {
    pub x: Option<WallHit>,
    pub y: Option<WallHit>,
}

impl Containment {
    pub fn iter(&self) -> impl Iterator<Item = &WallHit> {
        self.x.iter().chain(self.y.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }

    /// Number of axes whose velocity was reflected
    pub fn bounces(&self) -> u32 {
        self.iter().filter(|hit| hit.bounced).count() as u32
    }
}

/// Keep the ball inside `bounds`, bouncing off walls it is moving into
///
/// Both axes are checked independently, so a corner hit reports both.
pub fn contain(state: &mut MotionState, bounds: &Bounds, restitution_divisor: f32) -> Containment {
    let (min, max) = (bounds.min(), bounds.max());

    let (x, vx, hit_x) = contain_axis(state.pos.x, state.vel.x, min.x, max.x, restitution_divisor);
    let (y, vy, hit_y) = contain_axis(state.pos.y, state.vel.y, min.y, max.y, restitution_divisor);

    let result = Containment {
        x: hit_x.map(|(wall, bounced)| WallHit {
            axis: Axis::X,
            wall,
            bounced,
            speed_before: state.vel.x,
        }),
        y: hit_y.map(|(wall, bounced)| WallHit {
            axis: Axis::Y,
            wall,
            bounced,
            speed_before: state.vel.y,
        }),
    };

    state.pos = Vec2::new(x, y);
    state.vel = Vec2::new(vx, vy);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::RESTITUTION_DIVISOR;

    fn state(pos: Vec2, vel: Vec2) -> MotionState {
        MotionState {
            pos,
            vel,
            last_timestamp: Some(0),
        }
    }

    #[test]
    fn test_inside_is_untouched() {
        let bounds = Bounds::new(1000, 2000, 150.0);
        let mut s = state(Vec2::new(500.0, 1000.0), Vec2::new(3.0, -2.0));
        let hits = contain(&mut s, &bounds, RESTITUTION_DIVISOR);
        assert!(hits.is_empty());
        assert_eq!(s.pos, Vec2::new(500.0, 1000.0));
        assert_eq!(s.vel, Vec2::new(3.0, -2.0));
    }

    #[test]
    fn test_left_wall_bounce() {
        let bounds = Bounds::new(1000, 2000, 150.0);
        let mut s = state(Vec2::new(60.0, 1000.0), Vec2::new(-3.0, 0.0));
        let hits = contain(&mut s, &bounds, RESTITUTION_DIVISOR);

        let hit = hits.x.expect("left wall hit");
        assert!(hits.y.is_none());
        assert_eq!(hit.axis, Axis::X);
        assert_eq!(hit.wall, Wall::Low);
        assert!(hit.bounced);
        assert_eq!(hit.speed_before, -3.0);
        assert_eq!(s.pos.x, 150.0);
        assert!((s.vel.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bottom_wall_bounce() {
        let bounds = Bounds::new(1000, 2000, 150.0);
        let mut s = state(Vec2::new(500.0, 1900.0), Vec2::new(0.0, 4.5));
        let hits = contain(&mut s, &bounds, RESTITUTION_DIVISOR);

        assert!(hits.x.is_none());
        assert_eq!(hits.y.map(|h| h.wall), Some(Wall::High));
        assert_eq!(s.pos.y, 1850.0);
        assert!((s.vel.y - (-3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_corner_applies_both_axes() {
        let bounds = Bounds::new(1000, 2000, 150.0);
        let mut s = state(Vec2::new(990.0, 10.0), Vec2::new(1.5, -1.5));
        let hits = contain(&mut s, &bounds, RESTITUTION_DIVISOR);

        assert_eq!(hits.bounces(), 2);
        assert_eq!(s.pos, Vec2::new(850.0, 150.0));
        assert!((s.vel.x + 1.0).abs() < 1e-6);
        assert!((s.vel.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_outside_but_returning_is_clamped_only() {
        let bounds = Bounds::new(1000, 2000, 150.0);
        let mut s = state(Vec2::new(100.0, 1000.0), Vec2::new(0.5, 0.0));
        let hits = contain(&mut s, &bounds, RESTITUTION_DIVISOR);

        assert_eq!(hits.iter().count(), 1);
        assert_eq!(hits.bounces(), 0);
        assert_eq!(s.pos.x, 150.0);
        assert_eq!(s.vel.x, 0.5);
    }

    #[test]
    fn test_exactly_on_limit_is_inside() {
        let bounds = Bounds::new(1000, 2000, 150.0);
        let mut s = state(Vec2::new(150.0, 1850.0), Vec2::new(-1.0, 1.0));
        assert!(contain(&mut s, &bounds, RESTITUTION_DIVISOR).is_empty());
        assert_eq!(s.vel, Vec2::new(-1.0, 1.0));
    }
}
