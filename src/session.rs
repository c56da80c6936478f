//! Viewing session lifecycle
//!
//! Surface notifications drive an explicit state machine:
//!
//! ```text
//! Uninitialized --created/resized--> Active --destroyed--> Destroyed
//!                                    ^    |                     |
//!                                    +----+ resized             |
//!                                    +-------- created ---------+
//! ```
//!
//! While active, every accelerometer reading runs one integration step and
//! one frame draw, in delivery order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::renderer::{FrameRenderer, FrameSurface, Rgba, Sprite};
use crate::sensor::{SensorAccuracy, SensorReading, SensorSource};
use crate::settings::Settings;
use crate::sim::{Bounds, MotionIntegrator, MotionState, StepReport};

/// Lifecycle phase, without the per-phase data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No surface yet
    Uninitialized,
    /// Surface present, sensor delivering
    Active,
    /// Surface gone, sensor stopped
    Destroyed,
}

/// Lifecycle state with the data each phase owns
#[derive(Debug, Clone, Copy, PartialEq)]
enum SessionState {
    Uninitialized,
    Active { bounds: Bounds, motion: MotionState },
    Destroyed,
}

/// Counters over the lifetime of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Accelerometer readings received while active
    pub samples: u64,
    /// Samples that moved the ball
    pub steps: u64,
    /// Frames drawn and presented
    pub frames_presented: u64,
    /// Frames skipped because no frame buffer was available
    pub frames_skipped: u64,
    /// Wall bounces
    pub bounces: u64,
    /// Times the session (re)entered `Active`
    pub activations: u64,
}

/// One ball, one surface, one sensor
pub struct Session<S: SensorSource, F: FrameSurface> {
    state: SessionState,
    sensor: S,
    sensor_available: bool,
    surface: F,
    sprite: Sprite,
    integrator: MotionIntegrator,
    renderer: FrameRenderer,
    radius: f32,
    stats: SessionStats,
}

impl<S: SensorSource, F: FrameSurface> Session<S, F> {
    /// Create a session with a generated ball sprite
    pub fn new(settings: &Settings, sensor: S, surface: F) -> Self {
        let sprite = Sprite::ball(settings.diameter(), Rgba::from_array(settings.ball_color));
        Self::with_sprite(settings, sensor, surface, sprite)
    }

    /// Create a session drawing a caller-supplied sprite
    pub fn with_sprite(settings: &Settings, sensor: S, surface: F, sprite: Sprite) -> Self {
        let sensor_available = sensor.is_available();
        if !sensor_available {
            log::warn!("No accelerometer available; the ball will stay still");
        }
        if sprite.size() != (settings.diameter(), settings.diameter()) {
            log::warn!(
                "Sprite is {}x{}, expected {}px square",
                sprite.width(),
                sprite.height(),
                settings.diameter()
            );
        }

        Self {
            state: SessionState::Uninitialized,
            sensor,
            sensor_available,
            surface,
            sprite,
            integrator: MotionIntegrator::from_settings(settings),
            renderer: FrameRenderer::new(settings.radius),
            radius: settings.radius,
            stats: SessionStats::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Uninitialized => SessionPhase::Uninitialized,
            SessionState::Active { .. } => SessionPhase::Active,
            SessionState::Destroyed => SessionPhase::Destroyed,
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn sensor_available(&self) -> bool {
        self.sensor_available
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn surface(&self) -> &F {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut F {
        &mut self.surface
    }

    /// Current bounds, while active
    pub fn bounds(&self) -> Option<Bounds> {
        match self.state {
            SessionState::Active { bounds, .. } => Some(bounds),
            _ => None,
        }
    }

    /// Current motion state, while active
    pub fn motion(&self) -> Option<&MotionState> {
        match &self.state {
            SessionState::Active { motion, .. } => Some(motion),
            _ => None,
        }
    }

    /// Ball position, while active
    pub fn position(&self) -> Option<Vec2> {
        self.motion().map(|m| m.pos)
    }

    /// Surface came into existence with the given size
    pub fn surface_created(&mut self, width: u32, height: u32) {
        log::info!("Surface created ({}x{})", width, height);
        self.activate(width, height);
    }

    /// Surface changed size (also sent once right after creation)
    pub fn surface_resized(&mut self, width: u32, height: u32) {
        if self.phase() == SessionPhase::Destroyed {
            log::debug!("Ignoring resize to {}x{} after destroy", width, height);
            return;
        }
        log::info!("Surface resized to {}x{}", width, height);
        self.activate(width, height);
    }

    /// Surface is going away: stop the sensor and drop motion state
    pub fn surface_destroyed(&mut self) {
        if self.sensor.is_subscribed() {
            self.sensor.unsubscribe();
            log::info!("Sensor delivery stopped");
        }
        if self.phase() != SessionPhase::Destroyed {
            log::info!("Session destroyed");
        }
        self.state = SessionState::Destroyed;
    }

    /// Recompute bounds, recenter the ball, and make sure readings flow
    fn activate(&mut self, width: u32, height: u32) {
        let bounds = Bounds::new(width, height, self.radius);
        if !bounds.fits_ball() {
            log::warn!(
                "Surface {}x{} is smaller than the {}px ball",
                width,
                height,
                self.radius * 2.0
            );
        }

        self.surface.resize(width, height);
        self.state = SessionState::Active {
            bounds,
            motion: MotionState::centered(&bounds),
        };
        self.stats.activations += 1;

        if self.sensor_available && !self.sensor.is_subscribed() {
            self.sensor.subscribe();
            log::info!("Sensor delivery started");
        }
    }

    /// Handle one reading from the sensor
    ///
    /// Returns the ball position after the step, or `None` if the reading
    /// was ignored (not active, or not from the accelerometer).
    pub fn on_reading(&mut self, reading: &SensorReading) -> Option<Vec2> {
        let Some(sample) = reading.acceleration() else {
            log::debug!("Ignoring {:?} reading", reading.kind);
            return None;
        };

        let SessionState::Active { bounds, motion } = &mut self.state else {
            log::debug!("Ignoring sample while {:?}", self.phase());
            return None;
        };
        self.stats.samples += 1;

        let report = self.integrator.integrate(&sample, bounds, motion);
        let position = motion.pos;
        match report {
            StepReport::Baseline => {
                log::debug!("Time baseline set at {}ns", sample.timestamp);
            }
            StepReport::Stale { elapsed_nanos } => {
                log::debug!("Dropping out-of-order sample ({}ns)", elapsed_nanos);
            }
            StepReport::Moved { walls, .. } => {
                self.stats.steps += 1;
                for hit in walls.iter().filter(|hit| hit.bounced) {
                    log::trace!(
                        "Bounce off {:?} {:?} wall at speed {}",
                        hit.axis,
                        hit.wall,
                        hit.speed_before
                    );
                }
                self.stats.bounces += walls.bounces() as u64;
            }
        }

        match self.renderer.draw(&mut self.surface, position, &self.sprite) {
            Ok(()) => self.stats.frames_presented += 1,
            Err(e) => {
                self.stats.frames_skipped += 1;
                log::warn!("Skipping frame: {}", e);
            }
        }

        Some(position)
    }

    /// Sensor accuracy changed; motion is unaffected
    pub fn on_accuracy_changed(&mut self, accuracy: SensorAccuracy) {
        log::debug!("Sensor accuracy now {:?}", accuracy);
    }
}

impl<S: SensorSource, F: FrameSurface> Drop for Session<S, F> {
    fn drop(&mut self) {
        if self.sensor.is_subscribed() {
            self.sensor.unsubscribe();
        }
    }
}
