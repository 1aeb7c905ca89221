//! PID controller for the motion maneuvers.
//!
//! This module provides the feedback primitive every maneuver is built on:
//! a [`PidController`](controller::PidController) that turns a sensor
//! reading into a bounded correction once per control cycle.
//!
//! # How PID Works
//!
//! PID control calculates an output from three terms:
//!
//! - **P (Proportional)**: Output proportional to the error (distance from target).
//! - **I (Integral)**: Output proportional to accumulated error over time.
//! - **D (Derivative)**: Output proportional to the rate of error change.
//!
//! The formula is: `output = Kp*error + Ki*integral + Kd*derivative`
//!
//! Here the error is divided by the width of the configured input range
//! before any gain sees it, so one set of gains behaves the same whether the
//! input is degrees, inches or encoder counts. Integral and derivative use the
//! real time between updates, not the number of updates.
//!
//! # Tuning
//!
//! Start with Kp and increase until the robot reaches the target.
//! Add Kd to reduce overshoot. Only add Ki if the robot consistently
//! undershoots.

/// The time-aware PID controller.
pub mod controller;

pub use controller::PidController;

/// A closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Builds a range from two bounds given in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn width(&self) -> f64 { self.max - self.min }

    /// Clamps `value` into the range.
    pub fn clamp(&self, value: f64) -> f64 { value.max(self.min).min(self.max) }

    /// Clamps the magnitude of `value` into the range, keeping its sign.
    /// Zero stays zero.
    pub fn clamp_magnitude(&self, value: f64) -> f64 {
        if value == 0.0 {
            return 0.0;
        }
        self.clamp(value.abs()).copysign(value)
    }
}
