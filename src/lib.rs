//! AccBall - a ball that rolls around the screen as the device tilts
//!
//! Core modules:
//! - `sim`: Motion integration (kinematics, wall containment, bounce)
//! - `renderer`: Frame acquisition and sprite drawing (software + WebGPU)
//! - `session`: Surface lifecycle state machine driving sim + renderer
//! - `sensor`: Accelerometer source abstraction
//! - `settings`: Tunable constants

pub mod renderer;
pub mod sensor;
pub mod session;
pub mod settings;
pub mod sim;

pub use renderer::{FrameRenderer, RenderError, Sprite};
pub use sensor::{SensorReading, SensorSource};
pub use session::{Session, SessionPhase, SessionStats};
pub use settings::{Settings, SettingsError};

/// Motion configuration constants
pub mod consts {
    /// Ball radius in pixels
    pub const RADIUS: f32 = 150.0;
    /// Largest accepted radius; the sprite must fit a 2048px texture
    pub const MAX_RADIUS: f32 = 1024.0;
    /// Amplifies raw displacement into screen pixels (visual feel, not physics)
    pub const SCALE_COEFFICIENT: f32 = 1000.0;
    /// Velocity is divided by this on each bounce (~67% retained)
    pub const RESTITUTION_DIVISOR: f32 = 1.5;
    /// Sensor timestamps are in nanoseconds
    pub const NANOS_PER_SECOND: f32 = 1_000_000_000.0;
}

/// Convert a nanosecond interval to seconds
#[inline]
pub fn nanos_to_secs(nanos: i64) -> f32 {
    nanos as f32 / consts::NANOS_PER_SECOND
}

/// Convert seconds to a nanosecond interval
#[inline]
pub fn secs_to_nanos(secs: f64) -> i64 {
    (secs * consts::NANOS_PER_SECOND as f64).round() as i64
}
