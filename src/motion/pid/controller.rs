//! A reusable, time-aware PID controller.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use helmsman::motion::{config::PidGains, pid::PidController};
//!
//! let mut pid = PidController::new(PidGains::new(1.0, 0.0, 0.0), Duration::from_millis(5));
//! pid.configure(90.0, (0.0, 90.1), (0.0, 0.25), 0.1);
//! pid.reset();
//! pid.enable();
//!
//! let correction = pid.perform_pid(0.0, Duration::ZERO);
//! assert_eq!(correction, 0.25); // saturated at the output bound
//! assert!(!pid.on_target());
//! ```

use std::time::Duration;

use super::Range;
use crate::motion::config::PidGains;

/// Feedback-loop state for one controlled axis.
///
/// Gains are fixed at construction. Setpoint, ranges and tolerance are
/// (re)configured at the start of every maneuver, together with
/// [`reset`](Self::reset) to clear integral and derivative history.
///
/// The controller has no side effects outside itself.
#[derive(Debug, Clone)]
pub struct PidController {
    gains:          PidGains,
    nominal_period: Duration,
    setpoint:       f64,
    input_range:    Range,
    output_range:   Range,
    tolerance:      f64,
    error_sum:      f64,
    last_error:     Option<f64>,
    last_time:      Option<Duration>,
    error:          Option<f64>,
    enabled:        bool,
}

impl PidController {
    /// Creates a disabled controller.
    ///
    /// `nominal_period` stands in for the elapsed time on the first update
    /// after a reset, when there is no previous timestamp to measure from.
    pub fn new(gains: PidGains, nominal_period: Duration) -> Self {
        Self {
            gains,
            nominal_period,
            setpoint: 0.0,
            input_range: Range::new(0.0, 0.0),
            output_range: Range::new(0.0, 1.0),
            tolerance: 0.0,
            error_sum: 0.0,
            last_error: None,
            last_time: None,
            error: None,
            enabled: false,
        }
    }

    /// Establishes a fresh control objective.
    ///
    /// `input_range` bounds may come in either order. `output_range` bounds
    /// the *magnitude* of the correction; its sign is kept. The most recent
    /// error is forgotten, so [`on_target`](Self::on_target) is `false` until
    /// the next update.
    pub fn configure(
        &mut self,
        setpoint: f64,
        input_range: (f64, f64),
        output_range: (f64, f64),
        tolerance: f64,
    ) {
        self.set_setpoint(setpoint);
        self.set_input_range(input_range.0, input_range.1);
        self.set_output_range(output_range.0, output_range.1);
        self.set_tolerance(tolerance);
        self.error = None;
    }

    /// Out-of-range setpoints are kept as given.
    pub fn set_setpoint(&mut self, setpoint: f64) { self.setpoint = setpoint; }

    pub fn set_input_range(&mut self, a: f64, b: f64) { self.input_range = Range::new(a, b); }

    pub fn set_output_range(&mut self, a: f64, b: f64) {
        self.output_range = Range::new(a.abs(), b.abs());
    }

    pub fn set_tolerance(&mut self, tolerance: f64) { self.tolerance = tolerance.abs(); }

    /// Clears integral, derivative and timing history. Configuration is kept.
    pub fn reset(&mut self) {
        self.error_sum = 0.0;
        self.last_error = None;
        self.last_time = None;
        self.error = None;
    }

    pub fn enable(&mut self) { self.enabled = true; }

    pub fn disable(&mut self) { self.enabled = false; }

    pub fn is_enabled(&self) -> bool { self.enabled }

    pub fn gains(&self) -> PidGains { self.gains }

    pub fn setpoint(&self) -> f64 { self.setpoint }

    pub fn input_range(&self) -> Range { self.input_range }

    pub fn output_range(&self) -> Range { self.output_range }

    pub fn tolerance(&self) -> f64 { self.tolerance }

    /// Error (setpoint minus input, in input units) of the most recent
    /// update. `None` before the first update after a reset or reconfigure.
    pub fn error(&self) -> Option<f64> { self.error }

    /// Computes the correction for `input` observed at time `now`.
    ///
    /// Returns 0.0 without touching any state while disabled. The result's
    /// magnitude always lies inside the output range.
    pub fn perform_pid(&mut self, input: f64, now: Duration) -> f64 {
        if !self.enabled {
            return 0.0;
        }

        // the input range only sets the scale; readings outside it still count in full
        let width = self.input_range.width();
        let scale = if width > 0.0 { width } else { 1.0 };

        let error = self.setpoint - input;
        let scaled = error / scale;

        let dt = match self.last_time {
            Some(prev) if now > prev => (now - prev).as_secs_f64(),
            _ => self.nominal_period.as_secs_f64(),
        };

        let PidGains { kp, ki, kd } = self.gains;

        self.error_sum += scaled * dt;
        if ki != 0.0 {
            let i_max = self.output_range.max / ki.abs();
            self.error_sum = self.error_sum.max(-i_max).min(i_max);
        }

        let derivative = match self.last_error {
            Some(prev) => (scaled - prev) / dt,
            None => 0.0,
        };

        let u = kp * scaled + ki * self.error_sum + kd * derivative;

        self.last_error = Some(scaled);
        self.last_time = Some(now);
        self.error = Some(error);

        self.output_range.clamp_magnitude(u)
    }

    /// `true` iff the most recent update's `|setpoint - input|` is within
    /// tolerance.
    pub fn on_target(&self) -> bool { self.error.is_some_and(|e| e.abs() <= self.tolerance) }
}
