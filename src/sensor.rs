//! Accelerometer sources
//!
//! The host platform owns the actual hardware; the session only needs to
//! switch delivery on and off and to receive readings.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::AccelerationSample;

/// Nominal interval between readings at "game" delivery priority (50 Hz)
pub const GAME_RATE_INTERVAL_NANOS: i64 = 20_000_000;

/// Standard gravity, m/s²
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Kind of sensor a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Other,
}

/// Reported sensor accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorAccuracy {
    Unreliable,
    Low,
    Medium,
    High,
}

/// One raw reading as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub kind: SensorKind,
    /// Axis values (x, y, z) in device units
    pub values: [f32; 3],
    /// Monotonic timestamp in nanoseconds
    pub timestamp: i64,
}

impl SensorReading {
    pub fn accelerometer(x: f32, y: f32, z: f32, timestamp: i64) -> Self {
        Self {
            kind: SensorKind::Accelerometer,
            values: [x, y, z],
            timestamp,
        }
    }

    /// Planar acceleration sample, if this reading is from an accelerometer
    pub fn acceleration(&self) -> Option<AccelerationSample> {
        match self.kind {
            SensorKind::Accelerometer => Some(AccelerationSample::new(
                self.values[0],
                self.values[1],
                self.timestamp,
            )),
            _ => None,
        }
    }
}

/// Platform accelerometer subscription
pub trait SensorSource {
    /// Whether the device has the hardware at all
    fn is_available(&self) -> bool;
    /// Start delivering readings
    fn subscribe(&mut self);
    /// Stop delivering readings
    fn unsubscribe(&mut self);
    fn is_subscribed(&self) -> bool;
}

/// Stand-in accelerometer for headless runs
///
/// Produces a slowly wandering tilt with irregular delivery intervals, fully
/// determined by its seed.
#[derive(Debug, Clone)]
pub struct SimulatedTilt {
    rng: Pcg32,
    available: bool,
    subscribed: bool,
    clock: i64,
    interval_nanos: i64,
    jitter_nanos: i64,
    /// Current gravity component in the screen plane (m/s²)
    tilt: Vec2,
}

impl SimulatedTilt {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            available: true,
            subscribed: false,
            clock: 0,
            interval_nanos: GAME_RATE_INTERVAL_NANOS,
            jitter_nanos: GAME_RATE_INTERVAL_NANOS / 4,
            tilt: Vec2::ZERO,
        }
    }

    /// A device without an accelerometer
    pub fn missing() -> Self {
        Self {
            available: false,
            ..Self::new(0)
        }
    }

    /// Next reading, or `None` while not subscribed
    pub fn poll(&mut self) -> Option<SensorReading> {
        if !self.subscribed {
            return None;
        }

        let jitter = if self.jitter_nanos > 0 {
            self.rng.random_range(-self.jitter_nanos..=self.jitter_nanos)
        } else {
            0
        };
        self.clock += self.interval_nanos + jitter;

        // Random walk, kept to a plausible tilt
        let nudge = Vec2::new(
            self.rng.random_range(-0.4..0.4),
            self.rng.random_range(-0.4..0.4),
        );
        self.tilt = (self.tilt + nudge).clamp_length_max(STANDARD_GRAVITY);
        let z = (STANDARD_GRAVITY * STANDARD_GRAVITY - self.tilt.length_squared())
            .max(0.0)
            .sqrt();

        Some(SensorReading::accelerometer(
            self.tilt.x,
            self.tilt.y,
            z,
            self.clock,
        ))
    }
}

impl SensorSource for SimulatedTilt {
    fn is_available(&self) -> bool {
        self.available
    }

    fn subscribe(&mut self) {
        if self.available {
            self.subscribed = true;
        }
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_until_subscribed() {
        let mut sensor = SimulatedTilt::new(7);
        assert!(sensor.poll().is_none());

        sensor.subscribe();
        assert!(sensor.poll().is_some());

        sensor.unsubscribe();
        assert!(sensor.poll().is_none());
    }

    #[test]
    fn test_missing_sensor_never_delivers() {
        let mut sensor = SimulatedTilt::missing();
        assert!(!sensor.is_available());
        sensor.subscribe();
        assert!(!sensor.is_subscribed());
        assert!(sensor.poll().is_none());
    }

    #[test]
    fn test_timestamps_increase_irregularly() {
        let mut sensor = SimulatedTilt::new(42);
        sensor.subscribe();

        let stamps: Vec<i64> = (0..50).filter_map(|_| sensor.poll()).map(|r| r.timestamp).collect();
        let gaps: Vec<i64> = stamps.windows(2).map(|w| w[1] - w[0]).collect();

        assert!(gaps.iter().all(|&g| g > 0));
        assert!(gaps.iter().any(|&g| g != gaps[0]));
    }

    #[test]
    fn test_same_seed_same_readings() {
        let mut a = SimulatedTilt::new(99);
        let mut b = SimulatedTilt::new(99);
        a.subscribe();
        b.subscribe();
        for _ in 0..20 {
            assert_eq!(a.poll(), b.poll());
        }
    }

    #[test]
    fn test_tilt_stays_physical() {
        let mut sensor = SimulatedTilt::new(3);
        sensor.subscribe();
        for _ in 0..500 {
            let r = sensor.poll().unwrap();
            let planar = Vec2::new(r.values[0], r.values[1]).length();
            assert!(planar <= STANDARD_GRAVITY + 1e-3);
        }
    }

    #[test]
    fn test_only_accelerometer_yields_samples() {
        let accel = SensorReading::accelerometer(1.0, 2.0, 9.0, 10);
        assert_eq!(accel.acceleration(), Some(AccelerationSample::new(1.0, 2.0, 10)));

        let gyro = SensorReading {
            kind: SensorKind::Gyroscope,
            ..accel
        };
        assert_eq!(gyro.acceleration(), None);
    }
}
