//! Sample-driven motion step
//!
//! There is no fixed timestep: every accelerometer sample advances the ball
//! by the time elapsed since the previous one.

use glam::Vec2;

use super::containment::{Containment, contain};
use super::state::{AccelerationSample, Bounds, MotionState};
use crate::consts::{RESTITUTION_DIVISOR, SCALE_COEFFICIENT};
use crate::nanos_to_secs;
use crate::settings::Settings;

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepReport {
    /// First sample since reset: timestamp recorded, nothing moved
    Baseline,
    /// Sample was not newer than the baseline and was dropped
    Stale { elapsed_nanos: i64 },
    /// Motion integrated over `dt` seconds
    Moved { dt: f32, walls: Containment },
}

impl StepReport {
    /// Number of wall bounces in this step
    pub fn bounces(&self) -> u32 {
        match self {
            StepReport::Moved { walls, .. } => walls.bounces(),
            _ => 0,
        }
    }
}

/// Turns acceleration samples into ball motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionIntegrator {
    /// Displacement (device units) to screen pixels
    pub scale_coefficient: f32,
    /// Velocity divisor applied on each bounce
    pub restitution_divisor: f32,
    /// Negate the horizontal axis (device orientation correction)
    pub invert_x: bool,
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self {
            scale_coefficient: SCALE_COEFFICIENT,
            restitution_divisor: RESTITUTION_DIVISOR,
            invert_x: true,
        }
    }
}

impl MotionIntegrator {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            scale_coefficient: settings.scale_coefficient,
            restitution_divisor: settings.restitution_divisor,
            invert_x: settings.invert_x,
        }
    }

    /// Acceleration in screen orientation
    #[inline]
    pub fn oriented(&self, sample: &AccelerationSample) -> Vec2 {
        let ax = if self.invert_x { -sample.ax } else { sample.ax };
        Vec2::new(ax, sample.ay)
    }

    /// Advance `state` by one sample and return the new ball position
    pub fn step(
        &self,
        sample: &AccelerationSample,
        bounds: &Bounds,
        state: &mut MotionState,
    ) -> Vec2 {
        self.integrate(sample, bounds, state);
        state.pos
    }

    /// Advance `state` by one sample, reporting what happened
    pub fn integrate(
        &self,
        sample: &AccelerationSample,
        bounds: &Bounds,
        state: &mut MotionState,
    ) -> StepReport {
        let Some(last) = state.last_timestamp else {
            state.last_timestamp = Some(sample.timestamp);
            return StepReport::Baseline;
        };

        let elapsed_nanos = sample.timestamp - last;
        if elapsed_nanos <= 0 {
            return StepReport::Stale { elapsed_nanos };
        }
        state.last_timestamp = Some(sample.timestamp);

        let dt = nanos_to_secs(elapsed_nanos);
        let accel = self.oriented(sample);

        // d = v0*t + a*t^2/2
        let displacement = state.vel * dt + accel * (dt * dt / 2.0);
        state.pos += displacement * self.scale_coefficient;
        state.vel += accel * dt;

        let walls = contain(state, bounds, self.restitution_divisor);
        StepReport::Moved { dt, walls }
    }
}
