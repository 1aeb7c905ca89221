//! The rotate-to-heading state machine.
//!
//! ```text
//! ZEROING -> (PRE-ROLL) -> FEEDBACK -> SETTLING
//! ```
//!
//! A sequencer with no live [`Turn`] is idle. A cancelled or timed-out turn is
//! dropped from whatever phase it was in.
//!
//! [`Turn`] holds no hardware. The sequencer feeds it one heading reading per
//! cycle and writes whatever [`WheelPowers`] it returns, which keeps every
//! transition testable with plain numbers.

use std::time::Duration;

use log::debug;

use crate::{
    motion::{config::MotionConfig, pid::PidController},
    peripherals::WheelPowers,
};

/// Where a rotation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Outputs stopped and the heading reference being re-zeroed.
    Zeroing,
    /// Open-loop pivot until the sensor registers any movement.
    PreRoll,
    /// Closed-loop pivot on the rotation controller.
    Feedback,
    /// On target. The sequencer stops the outputs and waits out the settle
    /// delay.
    Settling,
}

/// One rotate-to-heading maneuver.
#[derive(Debug, Clone)]
pub struct Turn {
    phase:          TurnPhase,
    commanded:      f64,
    setpoint:       f64,
    pre_roll_power: f64,
}

impl Turn {
    /// Prepares a turn of `degrees` (command convention).
    ///
    /// Requests beyond `config.max_turn` saturate at the limit with their sign
    /// kept. The sensor setpoint is the saturated request times
    /// `config.rotation_sign`.
    pub fn new(degrees: f64, config: &MotionConfig) -> Self {
        let commanded = if degrees.abs() > config.max_turn {
            config.max_turn.copysign(degrees)
        } else {
            degrees
        };
        Self {
            phase: TurnPhase::Zeroing,
            commanded,
            setpoint: config.rotation_sign * commanded,
            pre_roll_power: config.pre_roll_power,
        }
    }

    pub fn phase(&self) -> TurnPhase { self.phase }

    /// Saturated request, command convention.
    pub fn commanded(&self) -> f64 { self.commanded }

    /// Rotation controller setpoint, sensor convention.
    pub fn setpoint(&self) -> f64 { self.setpoint }

    /// Turns commanded in the negative direction start with a pre-roll.
    pub fn needs_pre_roll(&self) -> bool { self.commanded < 0.0 }

    /// Resets and configures the rotation controller for this turn, then
    /// leaves `Zeroing` for `PreRoll` or `Feedback`.
    ///
    /// The input range is `[0, setpoint + epsilon]` and the output is capped at
    /// a quarter of the top rotate speed.
    pub fn engage(&mut self, controller: &mut PidController, config: &MotionConfig) {
        controller.reset();
        controller.configure(
            self.setpoint,
            (0.0, self.setpoint + config.input_epsilon),
            (0.0, config.max_rotate_speed / 4.0),
            config.turn_tolerance,
        );
        controller.enable();

        self.phase = if self.needs_pre_roll() {
            TurnPhase::PreRoll
        } else {
            TurnPhase::Feedback
        };
        debug!("Turn engaged in {:?}", self.phase);
    }

    /// Advances one control cycle with the latest `heading` reading.
    ///
    /// During pre-roll a reading of exactly zero keeps the fixed pivot power
    /// going. The first nonzero reading ends pre-roll and is also the first
    /// input of the feedback loop. When the controller reports on-target the
    /// turn moves to `Settling` and the returned powers are zero.
    pub fn step(&mut self, heading: f64, controller: &mut PidController, now: Duration) -> WheelPowers {
        if self.phase == TurnPhase::PreRoll {
            if heading == 0.0 {
                return WheelPowers::pivot(self.pre_roll_power.copysign(self.setpoint));
            }
            debug!("Pre-roll ended at {heading:.2} deg");
            self.phase = TurnPhase::Feedback;
        }

        if self.phase != TurnPhase::Feedback {
            return WheelPowers::ZERO;
        }

        let c = controller.perform_pid(heading, now);
        if controller.on_target() {
            debug!("On target at {heading:.2} deg");
            self.phase = TurnPhase::Settling;
            return WheelPowers::ZERO;
        }
        WheelPowers::pivot(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::config::PidGains;

    fn rotation_controller(config: &MotionConfig) -> PidController {
        PidController::new(config.rotation_gains, config.cycle_period)
    }

    #[test]
    fn saturates_large_requests() {
        let config = MotionConfig::default();
        assert_eq!(Turn::new(720.0, &config).commanded(), 359.0);
        assert_eq!(Turn::new(-400.0, &config).commanded(), -359.0);
        assert_eq!(Turn::new(-45.0, &config).commanded(), -45.0);
    }

    #[test]
    fn setpoint_follows_rotation_sign() {
        let config = MotionConfig::default();
        assert_eq!(Turn::new(90.0, &config).setpoint(), -90.0);

        let config = MotionConfig {
            rotation_sign: 1.0,
            ..MotionConfig::default()
        };
        assert_eq!(Turn::new(90.0, &config).setpoint(), 90.0);
    }

    #[test]
    fn engage_configures_controller() {
        let config = MotionConfig::default();
        let mut pid = rotation_controller(&config);
        let mut turn = Turn::new(90.0, &config);
        assert_eq!(turn.phase(), TurnPhase::Zeroing);

        turn.engage(&mut pid, &config);
        assert_eq!(turn.phase(), TurnPhase::Feedback);
        assert!(pid.is_enabled());
        assert_eq!(pid.setpoint(), -90.0);
        assert_eq!(pid.input_range().max, 0.0);
        assert!((pid.input_range().min + 89.9).abs() < 1e-12);
        assert_eq!(pid.output_range().max, 0.25);
        assert_eq!(pid.tolerance(), 0.1);
    }

    #[test]
    fn pre_roll_holds_until_sensor_moves() {
        let config = MotionConfig::default();
        let mut pid = rotation_controller(&config);
        let mut turn = Turn::new(-45.0, &config);
        turn.engage(&mut pid, &config);
        assert_eq!(turn.phase(), TurnPhase::PreRoll);

        for i in 0..50 {
            let powers = turn.step(0.0, &mut pid, Duration::from_millis(i * 5));
            assert_eq!(powers, WheelPowers::pivot(0.3));
            assert_eq!(turn.phase(), TurnPhase::PreRoll);
        }
        assert_eq!(pid.error(), None);

        let powers = turn.step(0.4, &mut pid, Duration::from_millis(250));
        assert_eq!(turn.phase(), TurnPhase::Feedback);
        assert_eq!(pid.error().map(|e| (e - 44.6).abs() < 1e-9), Some(true));
        assert_eq!(powers, WheelPowers::pivot(0.25));
    }

    #[test]
    fn feedback_ends_on_target() {
        let config = MotionConfig {
            rotation_gains: PidGains::new(1.0, 0.0, 0.0),
            ..MotionConfig::default()
        };
        let mut pid = rotation_controller(&config);
        let mut turn = Turn::new(30.0, &config);
        turn.engage(&mut pid, &config);

        let powers = turn.step(-10.0, &mut pid, Duration::ZERO);
        assert!(powers.left_rear > 0.0, "pivot should drive the heading down");
        assert_eq!(turn.phase(), TurnPhase::Feedback);

        let powers = turn.step(-29.95, &mut pid, Duration::from_millis(5));
        assert_eq!(powers, WheelPowers::ZERO);
        assert_eq!(turn.phase(), TurnPhase::Settling);

        // further readings keep the outputs stopped
        assert_eq!(turn.step(-40.0, &mut pid, Duration::from_millis(10)), WheelPowers::ZERO);
        assert_eq!(turn.phase(), TurnPhase::Settling);
    }

    #[test]
    fn zero_turn_is_immediately_on_target() {
        let config = MotionConfig::default();
        let mut pid = rotation_controller(&config);
        let mut turn = Turn::new(0.0, &config);
        turn.engage(&mut pid, &config);
        assert_eq!(turn.phase(), TurnPhase::Feedback);
        assert_eq!(turn.step(0.0, &mut pid, Duration::ZERO), WheelPowers::ZERO);
        assert_eq!(turn.phase(), TurnPhase::Settling);
    }
}
