//! Rotate and drive maneuvers on top of two PID controllers.
//!
//! A [`MotionSequencer`] owns a drivetrain, an orientation sensor, the host
//! handle and two independently tuned [`PidController`]s:
//!
//! - the **rotation** controller, reset and reconfigured for every turn;
//! - the **heading-hold** controller, configured once and used to keep
//!   straight drives straight.
//!
//! # Architecture
//!
//! Each maneuver is a cooperative loop that, every cycle, checks whether the
//! host still allows motion, reads the sensors, updates a controller and
//! writes all four wheel powers, in that order. The per-cycle logic lives in
//! the pure [`Turn`] and [`Drive`] types; this module only moves values
//! between them and the hardware.
//!
//! Every exit path (target reached, host cancelled, optional timeout) writes
//! zero power to all four wheels before anything else.
//!
//! Without a configured [`timeout`](MotionConfig::timeout) an unreachable
//! target keeps the loop running for as long as the host stays active.
//!
//! # Example
//!
//! ```
//! use helmsman::{
//!     motion::{config::MotionConfig, sequencer::{MotionSequencer, Outcome}},
//!     peripherals::sim::{HeadingModel, SimRobot},
//! };
//!
//! let robot = SimRobot::new()
//!     .with_heading_model(HeadingModel::Physics { degrees_per_second: 360.0 })
//!     .with_counts_per_second(200.0);
//! let mut sequencer = MotionSequencer::new(
//!     MotionConfig::default(),
//!     robot.drivetrain(),
//!     robot.gyro(),
//!     robot.host(),
//! )?;
//!
//! futures::executor::block_on(async {
//!     assert_eq!(sequencer.drive_by_distance(12.0, 0.3).await, Outcome::Reached);
//!     assert_eq!(sequencer.rotate(90.0).await, Outcome::Reached);
//! });
//! assert!(robot.powers().is_stopped());
//! # Ok::<(), helmsman::motion::config::ConfigError>(())
//! ```

use std::time::Duration;

use log::{info, trace};

use crate::{
    motion::{
        config::{ConfigError, MotionConfig},
        pid::PidController,
    },
    peripherals::{Drivetrain, EncoderMode, Host, Orientation},
};

mod drive;
mod turn;

pub use drive::Drive;
pub use turn::{Turn, TurnPhase};

/// How a maneuver ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The rotation came on target, or the drive covered its distance.
    Reached,
    /// The host stopped reporting active.
    Cancelled,
    /// The configured timeout expired first.
    TimedOut,
}

/// Runs rotate-to-heading and drive-by-distance maneuvers.
///
/// Only one maneuver runs at a time: both take `&mut self`, and each keeps
/// exclusive use of the outputs and controllers until it resolves.
pub struct MotionSequencer<D, G, H> {
    config:       MotionConfig,
    drivetrain:   D,
    gyro:         G,
    host:         H,
    rotation:     PidController,
    heading_hold: PidController,
    last_heading: f64,
}

impl<D: Drivetrain, G: Orientation, H: Host> MotionSequencer<D, G, H> {
    /// Validates `config` and sets up both controllers.
    ///
    /// The heading-hold controller is configured here, once: setpoint 0,
    /// input range `[-heading_span, heading_span]`, output bounded by
    /// `base_power`, enabled for good.
    pub fn new(config: MotionConfig, drivetrain: D, gyro: G, host: H) -> Result<Self, ConfigError> {
        config.validate()?;

        let rotation = PidController::new(config.rotation_gains, config.cycle_period);
        let mut heading_hold = PidController::new(config.heading_gains, config.cycle_period);
        heading_hold.configure(
            0.0,
            (-config.heading_span, config.heading_span),
            (0.0, config.base_power),
            0.0,
        );
        heading_hold.enable();

        Ok(Self {
            config,
            drivetrain,
            gyro,
            host,
            rotation,
            heading_hold,
            last_heading: 0.0,
        })
    }

    pub fn config(&self) -> &MotionConfig { &self.config }

    /// Heading at the end of the last rotation, command convention.
    pub fn last_heading(&self) -> f64 { self.last_heading }

    pub fn rotation_controller(&self) -> &PidController { &self.rotation }

    pub fn heading_controller(&self) -> &PidController { &self.heading_hold }

    /// Converts a linear distance into primary encoder counts. Pure.
    pub fn convert_distance_to_counts(&self, distance: f64) -> f64 { self.config.wheel.counts_for(distance) }

    /// Rotates in place by `degrees` (positive and negative per the command
    /// convention, see [`ROTATION_SIGN`](crate::motion::config::ROTATION_SIGN)).
    ///
    /// Requests larger than `max_turn` saturate. The heading reference is
    /// zeroed before the turn and again after the settle delay, so the next
    /// maneuver measures from the new heading.
    pub async fn rotate(&mut self, degrees: f64) -> Outcome {
        let mut turn = Turn::new(degrees, &self.config);
        info!(
            "Rotate {:.1} deg (sensor setpoint {:.1})",
            turn.commanded(),
            turn.setpoint()
        );

        self.drivetrain.stop();
        self.gyro.reset_reference();
        turn.engage(&mut self.rotation, &self.config);

        let started = self.host.uptime();
        let outcome = loop {
            if let Some(exit) = self.interrupted(started) {
                break exit;
            }

            let heading = self.gyro.heading();
            let powers = turn.step(heading, &mut self.rotation, self.host.uptime());
            if turn.phase() == TurnPhase::Settling {
                break Outcome::Reached;
            }
            trace!("{:?} heading {:.2} -> {:?}", turn.phase(), heading, powers);
            self.drivetrain.apply(powers);

            self.host.sleep(self.config.cycle_period).await;
        };

        self.drivetrain.stop();
        self.last_heading = self.config.rotation_sign * self.gyro.heading();

        self.host.sleep(self.config.settle_delay).await;
        self.gyro.reset_reference();

        info!("Rotate finished: {:?} at {:.2} deg", outcome, self.last_heading);
        outcome
    }

    /// Drives `distance` (signed) at `power`, holding the current heading.
    ///
    /// The maneuver ends when the primary encoder count reaches the converted
    /// target. There is no on-target check on the heading.
    pub async fn drive_by_distance(&mut self, distance: f64, power: f64) -> Outcome {
        let drive = Drive::new(self.convert_distance_to_counts(distance), power);
        info!(
            "Drive {:.2} ({:.1} counts) at {:.2}, last turn ended at {:.2} deg",
            distance,
            drive.target_counts(),
            drive.power(),
            self.last_heading
        );

        self.heading_hold.reset();
        self.drivetrain.reset_position();
        self.drivetrain.set_mode(EncoderMode::PositionTracked);
        self.drivetrain.set_target_position(drive.target_register());
        self.drivetrain.apply(drive.baseline());

        let started = self.host.uptime();
        let outcome = loop {
            if let Some(exit) = self.interrupted(started) {
                break exit;
            }

            let position = self.drivetrain.position();
            let heading = self.gyro.heading();
            match drive.step(heading, position, &mut self.heading_hold, self.host.uptime()) {
                Some(powers) => {
                    trace!("count {position} heading {heading:.2} -> {powers:?}");
                    self.drivetrain.apply(powers);
                }
                None => break Outcome::Reached,
            }

            self.host.sleep(self.config.cycle_period).await;
        };

        self.drivetrain.stop();
        self.drivetrain.set_mode(EncoderMode::RawPower);

        info!("Drive finished: {:?}", outcome);
        outcome
    }

    fn interrupted(&self, started: Duration) -> Option<Outcome> {
        if !self.host.is_active() {
            return Some(Outcome::Cancelled);
        }
        match self.config.timeout {
            Some(timeout) if self.host.uptime().saturating_sub(started) >= timeout => {
                Some(Outcome::TimedOut)
            }
            _ => None,
        }
    }
}
