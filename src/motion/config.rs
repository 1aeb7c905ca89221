//! Tuning and geometry for a [`MotionSequencer`](super::sequencer::MotionSequencer).
//!
//! Everything a sequencer needs to know about its robot lives in one
//! immutable [`MotionConfig`]. Two sequencers with different configs can run
//! side by side (or in separate tests) without sharing any state.
//!
//! # Example
//!
//! ```
//! use helmsman::motion::config::{MotionConfig, WheelGeometry};
//!
//! let config = MotionConfig {
//!     base_power: 0.5,
//!     wheel: WheelGeometry::new(3.25, 300.0),
//!     ..MotionConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::{f64::consts::PI, time::Duration};

use thiserror::Error;

/// Sensor-polarity calibration for rotation commands.
///
/// Commanded degrees are multiplied by this before they become the rotation
/// controller's setpoint. The orientation sensor on the reference robot counts
/// the opposite way to the command convention, so a command of `+90.0` is a
/// sensor setpoint of `-90.0`. Headings reported back to the caller are
/// multiplied by the same constant.
pub const ROTATION_SIGN: f64 = -1.0;

/// Proportional / integral / derivative gains.
///
/// Gains act on error normalised to the controller's input-range width and on
/// time in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self { Self { kp, ki, kd } }

    /// Rotation gains derived from the top rotate speed.
    ///
    /// `kp = max_speed`, `ki = kp / 125` per cycle and `kd = 20 * kp` per
    /// cycle, with the cycle terms rescaled to seconds by `cycle_period`.
    ///
    /// The controller divides the error by its input-range width, which for a
    /// turn is `|setpoint| + input_epsilon`. The gains therefore act on the
    /// fraction of the current turn still remaining: a full-width error gives
    /// `max_speed` of proportional output whatever the size of the turn.
    pub fn rotation(max_speed: f64, cycle_period: Duration) -> Self {
        let period = cycle_period.as_secs_f64();
        Self {
            kp: max_speed,
            ki: max_speed / 125.0 / period,
            kd: max_speed * 20.0 * period,
        }
    }

    /// Heading-hold gains: `kp_per_degree` across the full `[-span, span]`
    /// input range, no integral or derivative.
    pub fn heading_hold(kp_per_degree: f64, span: f64) -> Self {
        Self {
            kp: kp_per_degree * 2.0 * span,
            ki: 0.0,
            kd: 0.0,
        }
    }

    fn is_finite(&self) -> bool { self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite() }
}

/// Wheel size and encoder resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    /// Wheel diameter, in the same unit as commanded distances.
    pub diameter:       f64,
    /// Encoder counts per wheel revolution.
    pub counts_per_rev: f64,
}

impl WheelGeometry {
    pub const fn new(diameter: f64, counts_per_rev: f64) -> Self {
        Self {
            diameter,
            counts_per_rev,
        }
    }

    /// Converts a linear distance into primary encoder counts.
    ///
    /// `counts = distance / (diameter * PI) * counts_per_rev`. The sign of the
    /// distance is preserved.
    pub fn counts_for(&self, distance: f64) -> f64 {
        let revs = distance / (self.diameter * PI);
        revs * self.counts_per_rev
    }
}

impl Default for WheelGeometry {
    fn default() -> Self { Self::new(4.0, 28.0) }
}

/// Configuration of a motion sequencer.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Nominal drive power and bound of the heading-hold correction.
    pub base_power:       f64,
    pub wheel:            WheelGeometry,
    /// Top rotate speed. The rotation output is capped at a quarter of it.
    pub max_rotate_speed: f64,
    pub rotation_gains:   PidGains,
    pub heading_gains:    PidGains,
    /// Rotation on-target band, degrees.
    pub turn_tolerance:   f64,
    /// Added to the rotation setpoint to form the input range `[0, target + epsilon]`.
    pub input_epsilon:    f64,
    /// Largest single-command turn, degrees. Larger requests saturate.
    pub max_turn:         f64,
    /// Heading-hold input range is `[-heading_span, heading_span]`.
    pub heading_span:     f64,
    /// Open-loop pivot power used before the sensor registers movement.
    pub pre_roll_power:   f64,
    /// See [`ROTATION_SIGN`].
    pub rotation_sign:    f64,
    /// Nominal control period. The loops sleep this long every cycle.
    pub cycle_period:     Duration,
    /// Pause after a rotation before the heading is trusted again.
    pub settle_delay:     Duration,
    /// Per-maneuver deadline. `None` waits for as long as the host stays
    /// active, even if the target can never be reached.
    pub timeout:          Option<Duration>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        let cycle_period = Duration::from_millis(5);
        let max_rotate_speed = 1.0;
        let heading_span = 90.0;
        Self {
            base_power: 0.3,
            wheel: WheelGeometry::default(),
            max_rotate_speed,
            rotation_gains: PidGains::rotation(max_rotate_speed, cycle_period),
            heading_gains: PidGains::heading_hold(0.05, heading_span),
            turn_tolerance: 0.1,
            input_epsilon: 0.1,
            max_turn: 359.0,
            heading_span,
            pre_roll_power: 0.3,
            rotation_sign: ROTATION_SIGN,
            cycle_period,
            settle_delay: Duration::from_millis(500),
            timeout: None,
        }
    }
}

/// Reasons a [`MotionConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("wheel diameter must be positive and finite, got {0}")]
    WheelDiameter(f64),
    #[error("counts per revolution must be positive and finite, got {0}")]
    CountsPerRev(f64),
    #[error("{name} must be in (0, 1], got {value}")]
    Power { name: &'static str, value: f64 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{0} gains must be finite")]
    Gains(&'static str),
    #[error("rotation sign must be 1.0 or -1.0, got {0}")]
    RotationSign(f64),
    #[error("cycle period must be non-zero")]
    CyclePeriod,
}

impl MotionConfig {
    /// Checks the config for values the maneuvers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let wheel = &self.wheel;
        if !(wheel.diameter.is_finite() && wheel.diameter > 0.0) {
            return Err(ConfigError::WheelDiameter(wheel.diameter));
        }
        if !(wheel.counts_per_rev.is_finite() && wheel.counts_per_rev > 0.0) {
            return Err(ConfigError::CountsPerRev(wheel.counts_per_rev));
        }

        for (name, value) in [
            ("base power", self.base_power),
            ("max rotate speed", self.max_rotate_speed),
            ("pre-roll power", self.pre_roll_power),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Power { name, value });
            }
        }

        for (name, value) in [
            ("turn tolerance", self.turn_tolerance),
            ("input epsilon", self.input_epsilon),
            ("max turn", self.max_turn),
            ("heading span", self.heading_span),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        if !self.rotation_gains.is_finite() {
            return Err(ConfigError::Gains("rotation"));
        }
        if !self.heading_gains.is_finite() {
            return Err(ConfigError::Gains("heading"));
        }
        if self.rotation_sign.abs() != 1.0 {
            return Err(ConfigError::RotationSign(self.rotation_sign));
        }
        if self.cycle_period.is_zero() {
            return Err(ConfigError::CyclePeriod);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() { assert_eq!(MotionConfig::default().validate(), Ok(())); }

    #[test]
    fn default_gains() {
        let gains = MotionConfig::default().rotation_gains;
        assert!((gains.kp - 1.0).abs() < 1e-12);
        assert!((gains.ki - 1.6).abs() < 1e-9);
        assert!((gains.kd - 0.1).abs() < 1e-12);

        let heading = MotionConfig::default().heading_gains;
        assert!((heading.kp - 9.0).abs() < 1e-12);
        assert_eq!(heading.ki, 0.0);
    }

    #[test]
    fn rejects_bad_geometry() {
        let config = MotionConfig {
            wheel: WheelGeometry::new(0.0, 28.0),
            ..MotionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::WheelDiameter(0.0)));

        let config = MotionConfig {
            wheel: WheelGeometry::new(4.0, f64::NAN),
            ..MotionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::CountsPerRev(_))));
    }

    #[test]
    fn rejects_power_out_of_range() {
        let config = MotionConfig {
            base_power: 1.5,
            ..MotionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Power {
                name:  "base power",
                value: 1.5,
            })
        );
    }

    #[test]
    fn rejects_other_fields() {
        let config = MotionConfig {
            turn_tolerance: -0.1,
            ..MotionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Negative { .. })));

        let config = MotionConfig {
            rotation_sign: 0.5,
            ..MotionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::RotationSign(0.5)));

        let config = MotionConfig {
            cycle_period: Duration::ZERO,
            ..MotionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::CyclePeriod));

        let config = MotionConfig {
            heading_gains: PidGains::new(f64::INFINITY, 0.0, 0.0),
            ..MotionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Gains("heading")));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::WheelDiameter(-1.0).to_string(),
            "wheel diameter must be positive and finite, got -1"
        );
        assert_eq!(ConfigError::CyclePeriod.to_string(), "cycle period must be non-zero");
    }

    #[test]
    fn counts_for_reference_wheel() {
        let wheel = WheelGeometry::default();
        let counts = wheel.counts_for(4.0 * PI);
        assert!((counts - 28.0).abs() < 1e-9);
        assert_eq!(wheel.counts_for(-10.0), -wheel.counts_for(10.0));
    }
}
