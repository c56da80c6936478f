//! Motion simulation module
//!
//! Pure and platform-free:
//! - Elapsed time comes from sample timestamps, never a wall clock
//! - One point mass, one restitution coefficient
//! - No rendering or platform dependencies

pub mod containment;
pub mod state;
pub mod step;

pub use containment::{Axis, Containment, Wall, WallHit, contain};
pub use state::{AccelerationSample, Bounds, MotionState};
pub use step::{MotionIntegrator, StepReport};
