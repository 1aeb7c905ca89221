//! Hardware collaborators driven by the motion core.
//!
//! The maneuvers in [`motion`](crate::motion) never talk to devices directly.
//! They go through three small traits:
//!
//! - [`Drivetrain`]: four independently powered wheels, one of which (the left
//!   rear) carries the primary encoder.
//! - [`Orientation`]: a zeroable heading sensor (gyro / IMU).
//! - [`Host`]: the program hosting the maneuver. It answers "are we still
//!   allowed to move?", tells the time, and provides the cooperative sleep.
//!
//! Two backends ship with the crate:
//!
//! - [`sim`]: a deterministic simulated robot, used by the tests.
//! - `vex` (feature `vexide`): V5 motors and inertial sensor through
//!   [vexide](https://vexide.dev).
//!
//! # Example
//!
//! ```
//! use helmsman::peripherals::{Drivetrain, WheelPowers, sim::SimRobot};
//!
//! let robot = SimRobot::new();
//! let mut drivetrain = robot.drivetrain();
//! drivetrain.apply(WheelPowers::uniform(0.5));
//! drivetrain.stop();
//! assert_eq!(robot.powers(), WheelPowers::ZERO);
//! ```

use std::{cell::RefCell, future::Future, rc::Rc, time::Duration};

/// Simulated robot backend.
pub mod sim;

/// V5 hardware backend built on vexide.
#[cfg(feature = "vexide")]
pub mod vex;

/// One of the four drive outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wheel {
    /// Left rear motor. Carries the primary encoder.
    LeftRear,
    /// Right rear motor.
    RightRear,
    /// Left front motor.
    LeftFront,
    /// Right front motor.
    RightFront,
}

impl Wheel {
    /// All four wheels, in write order.
    pub const ALL: [Wheel; 4] = [
        Wheel::LeftRear,
        Wheel::RightRear,
        Wheel::LeftFront,
        Wheel::RightFront,
    ];
}

/// Counting mode of the primary encoder-bearing motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderMode {
    /// Plain power output, position is not tracked against a target.
    RawPower,
    /// Position is tracked against the target register.
    PositionTracked,
}

/// Power levels for all four wheels during one control cycle.
///
/// Powers are fractions of full output, nominally in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelPowers {
    pub left_rear:   f64,
    pub right_rear:  f64,
    pub left_front:  f64,
    pub right_front: f64,
}

impl WheelPowers {
    /// Every output at zero power.
    pub const ZERO: WheelPowers = WheelPowers {
        left_rear:   0.0,
        right_rear:  0.0,
        left_front:  0.0,
        right_front: 0.0,
    };

    /// The same power on every wheel (straight-line, open loop).
    pub fn uniform(power: f64) -> Self {
        Self {
            left_rear:   power,
            right_rear:  power,
            left_front:  power,
            right_front: power,
        }
    }

    /// Differential-turn mapping: the robot pivots in place.
    ///
    /// The left pair gets `-c` (rear) / `+c` (front) and the right pair the
    /// complement. A positive `c` turns the robot in the direction that makes
    /// the orientation sensor count up.
    pub fn pivot(c: f64) -> Self {
        Self {
            left_rear:   -c,
            right_rear:  c,
            left_front:  c,
            right_front: -c,
        }
    }

    /// Straight drive at `power` with heading correction `c`.
    ///
    /// The correction is split across the rear pair (`power - c` left,
    /// `power + c` right), which carries the primary encoder. The front pair
    /// holds the baseline.
    pub fn heading_hold(power: f64, c: f64) -> Self {
        Self {
            left_rear:   power - c,
            right_rear:  power + c,
            left_front:  power,
            right_front: power,
        }
    }

    /// Power assigned to `wheel`.
    pub fn get(&self, wheel: Wheel) -> f64 {
        match wheel {
            Wheel::LeftRear => self.left_rear,
            Wheel::RightRear => self.right_rear,
            Wheel::LeftFront => self.left_front,
            Wheel::RightFront => self.right_front,
        }
    }

    /// `true` when every output is exactly zero.
    pub fn is_stopped(&self) -> bool { Wheel::ALL.iter().all(|w| self.get(*w) == 0.0) }
}

/// A four-output drive train with a primary encoder on the left rear motor.
pub trait Drivetrain {
    /// Sets the power of a single output.
    fn set_power(&mut self, wheel: Wheel, power: f64);

    /// Zeroes the primary position counter.
    fn reset_position(&mut self);

    /// Current primary position count. Backends return the last known value
    /// if the device cannot be read.
    fn position(&mut self) -> i32;

    /// Writes the primary motor's target-position register.
    fn set_target_position(&mut self, counts: i32);

    /// Switches the primary motor's counting mode.
    fn set_mode(&mut self, mode: EncoderMode);

    /// Writes all four outputs.
    fn apply(&mut self, powers: WheelPowers) {
        for wheel in Wheel::ALL {
            self.set_power(wheel, powers.get(wheel));
        }
    }

    /// Writes zero power to all four outputs.
    fn stop(&mut self) { self.apply(WheelPowers::ZERO) }
}

/// A heading sensor with a resettable zero.
pub trait Orientation {
    /// Heading in degrees relative to the last reference reset. The sign
    /// convention is the sensor's own.
    fn heading(&mut self) -> f64;

    /// Re-zeroes the heading baseline at the current orientation.
    fn reset_reference(&mut self);
}

/// The program a maneuver runs inside.
pub trait Host {
    /// Whether the maneuver may keep running. Checked before every cycle.
    fn is_active(&self) -> bool;

    /// Monotonic time since the program started.
    fn uptime(&self) -> Duration;

    /// Cooperative sleep.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Makes an object clonable by wrapping it in `Rc` and `RefCell`
pub fn make_cloneable<T>(t: T) -> Rc<RefCell<T>> { Rc::new(RefCell::new(t)) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_is_antisymmetric_per_side() {
        let p = WheelPowers::pivot(0.25);
        assert_eq!(p.left_rear, -0.25);
        assert_eq!(p.left_front, 0.25);
        assert_eq!(p.right_rear, 0.25);
        assert_eq!(p.right_front, -0.25);
        assert_eq!(WheelPowers::pivot(-0.25), WheelPowers::pivot(0.25).negated());
    }

    #[test]
    fn heading_hold_splits_rear_pair() {
        let p = WheelPowers::heading_hold(0.3, 0.1);
        assert!((p.left_rear - 0.2).abs() < 1e-12);
        assert!((p.right_rear - 0.4).abs() < 1e-12);
        assert_eq!(p.left_front, 0.3);
        assert_eq!(p.right_front, 0.3);
    }

    #[test]
    fn zero_is_stopped() {
        assert!(WheelPowers::ZERO.is_stopped());
        assert!(!WheelPowers::uniform(0.1).is_stopped());
    }

    impl WheelPowers {
        fn negated(&self) -> Self {
            Self {
                left_rear:   -self.left_rear,
                right_rear:  -self.right_rear,
                left_front:  -self.left_front,
                right_front: -self.right_front,
            }
        }
    }
}
