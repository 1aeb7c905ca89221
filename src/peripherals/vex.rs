//! V5 hardware backend.
//!
//! Implements the collaborator traits over [vexide](https://vexide.dev)
//! devices. Device errors never stop a maneuver: they are logged with
//! `warn!` and the last known reading is used instead.
//!
//! # Example
//!
//! ```ignore
//! use helmsman::{
//!     motion::{config::MotionConfig, sequencer::MotionSequencer},
//!     peripherals::vex::{VexDrivetrain, VexGyro, VexHost},
//! };
//! use vexide::prelude::*;
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     let drivetrain = VexDrivetrain::new(
//!         Motor::new(peripherals.port_1, Gearset::Green, Direction::Forward),
//!         Motor::new(peripherals.port_2, Gearset::Green, Direction::Reverse),
//!         Motor::new(peripherals.port_3, Gearset::Green, Direction::Forward),
//!         Motor::new(peripherals.port_4, Gearset::Green, Direction::Reverse),
//!         28.0,
//!     );
//!     let gyro = VexGyro::new(InertialSensor::new(peripherals.port_10));
//!     let host = VexHost::new(|| true);
//!
//!     let mut seq = MotionSequencer::new(MotionConfig::default(), drivetrain, gyro, host).unwrap();
//!     seq.drive_by_distance(24.0, 0.3).await;
//!     seq.rotate(90.0).await;
//! }
//! ```

use std::{future::Future, time::Duration};

use log::{debug, warn};
use vexide::{
    math::Angle,
    smart::{imu::InertialSensor, motor::Motor},
    time::{sleep, user_uptime},
};

use super::{Drivetrain, EncoderMode, Host, Orientation, Wheel};

/// Voltage of a full-power command.
const MAX_VOLTAGE: f64 = 12.0;

/// Four V5 motors. The left rear motor's integrated encoder is the primary
/// position counter.
pub struct VexDrivetrain {
    left_rear:      Motor,
    right_rear:     Motor,
    left_front:     Motor,
    right_front:    Motor,
    counts_per_rev: f64,
    last_position:  i32,
    target:         i32,
    mode:           EncoderMode,
}

impl VexDrivetrain {
    /// `counts_per_rev` converts the primary motor's angle into counts; use
    /// the same value as the sequencer's wheel geometry.
    pub fn new(
        left_rear: Motor,
        right_rear: Motor,
        left_front: Motor,
        right_front: Motor,
        counts_per_rev: f64,
    ) -> Self {
        Self {
            left_rear,
            right_rear,
            left_front,
            right_front,
            counts_per_rev,
            last_position: 0,
            target: 0,
            mode: EncoderMode::RawPower,
        }
    }

    /// Target register as last written.
    pub fn target(&self) -> i32 { self.target }

    pub fn mode(&self) -> EncoderMode { self.mode }

    fn motor(&mut self, wheel: Wheel) -> &mut Motor {
        match wheel {
            Wheel::LeftRear => &mut self.left_rear,
            Wheel::RightRear => &mut self.right_rear,
            Wheel::LeftFront => &mut self.left_front,
            Wheel::RightFront => &mut self.right_front,
        }
    }
}

impl Drivetrain for VexDrivetrain {
    fn set_power(&mut self, wheel: Wheel, power: f64) {
        let voltage = power.clamp(-1.0, 1.0) * MAX_VOLTAGE;
        if let Err(e) = self.motor(wheel).set_voltage(voltage) {
            warn!("Motor Voltage Error ({:?}): {}", wheel, e);
        }
    }

    fn reset_position(&mut self) {
        match self.left_rear.reset_position() {
            Ok(()) => self.last_position = 0,
            Err(e) => warn!("Motor Position Reset Error: {}", e),
        }
    }

    fn position(&mut self) -> i32 {
        match self.left_rear.position() {
            Ok(angle) => self.last_position = degrees_to_counts(angle, self.counts_per_rev),
            Err(e) => warn!("Motor Position Error: {}", e),
        }
        self.last_position
    }

    // V5 motors always count; the register and mode are bookkeeping so the
    // motor keeps running on raw voltage.
    fn set_target_position(&mut self, counts: i32) { self.target = counts; }

    fn set_mode(&mut self, mode: EncoderMode) {
        debug!("Primary motor mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }
}

/// A V5 inertial sensor read as a continuous rotation in degrees.
pub struct VexGyro {
    imu:          InertialSensor,
    last_heading: f64,
}

impl VexGyro {
    /// The sensor should already be calibrated. Readings taken while it is
    /// calibrating return the last known heading.
    pub fn new(imu: InertialSensor) -> Self {
        Self {
            imu,
            last_heading: 0.0,
        }
    }
}

impl Orientation for VexGyro {
    fn heading(&mut self) -> f64 {
        let is_calibrating = self.imu.is_calibrating().unwrap_or_else(|e| {
            warn!("IMU Calibration State Error: {}", e);
            true
        });
        if !is_calibrating {
            match self.imu.rotation() {
                Ok(rotation) => self.last_heading = rotation.as_degrees(),
                Err(e) => warn!("IMU Rotation Error: {}", e),
            }
        }
        self.last_heading
    }

    fn reset_reference(&mut self) {
        match self.imu.reset_rotation() {
            Ok(()) => self.last_heading = 0.0,
            Err(e) => warn!("IMU Rotation Reset Error: {}", e),
        }
    }
}

/// Host backed by vexide's user-program uptime and async sleep.
///
/// `active` decides whether maneuvers may keep running, e.g. a check of the
/// competition mode or a driver's abort button.
pub struct VexHost<F> {
    active: F,
}

impl<F: Fn() -> bool> VexHost<F> {
    pub fn new(active: F) -> Self { Self { active } }
}

impl<F: Fn() -> bool> Host for VexHost<F> {
    fn is_active(&self) -> bool { (self.active)() }

    fn uptime(&self) -> Duration { user_uptime() }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> { sleep(duration) }
}

/// Primary motor angle to encoder counts, truncated toward zero.
fn degrees_to_counts(angle: Angle, counts_per_rev: f64) -> i32 {
    (angle.as_degrees() / 360.0 * counts_per_rev) as i32
}
