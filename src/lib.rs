//! # Helmsman
//!
//! Helmsman is the closed-loop motion core of an autonomous ground robot. It
//! turns commands like "rotate to heading X" and "drive N inches" into
//! continuously corrected motor power, using a generic PID controller fed by a
//! gyro and a drive encoder.
//!
//! - **PID Control**: A reusable, time-aware controller with input
//!   normalisation, output clamping, tolerance and anti-windup.
//! - **Motion Sequencing**: Rotate-to-heading (with an open-loop pre-roll) and
//!   drive-by-distance with heading hold.
//! - **Peripherals**: Small traits for the drivetrain, orientation sensor and
//!   host program, a simulated robot, and a [vexide](https://vexide.dev)
//!   backend behind the `vexide` feature.
//! - **Logging**: A file-based logger for debugging and telemetry.
//!
//! ## Quick Start
//!
//! ```
//! use helmsman::{
//!     motion::{config::MotionConfig, sequencer::{MotionSequencer, Outcome}},
//!     peripherals::sim::{HeadingModel, SimRobot},
//! };
//!
//! let robot = SimRobot::new().with_heading_model(HeadingModel::Physics {
//!     degrees_per_second: 180.0,
//! });
//! let mut sequencer = MotionSequencer::new(
//!     MotionConfig::default(),
//!     robot.drivetrain(),
//!     robot.gyro(),
//!     robot.host(),
//! )?;
//!
//! let outcome = futures::executor::block_on(sequencer.rotate(45.0));
//! assert_eq!(outcome, Outcome::Reached);
//! assert!((sequencer.last_heading() - 45.0).abs() < 0.5);
//! # Ok::<(), helmsman::motion::config::ConfigError>(())
//! ```
//!
//! ## Modules
//!
//! - [`motion`]: Configuration, PID controller and maneuvers.
//! - [`peripherals`]: Hardware collaborator traits and backends.
//! - [`fs`]: Filesystem utilities including logging.

/// Filesystem utilities module.
///
/// Contains logging functionality for recording maneuver telemetry and debug
/// information to a file.
pub mod fs;

/// Closed-loop motion control module.
///
/// Provides the PID controller and the maneuvers built on it:
///
/// - **Rotate**: Pivot in place to a relative heading.
/// - **Drive**: Travel a distance while holding the current heading.
pub mod motion;

/// Hardware collaborators module.
///
/// Defines the [`Drivetrain`](peripherals::Drivetrain),
/// [`Orientation`](peripherals::Orientation) and [`Host`](peripherals::Host)
/// traits the maneuvers are written against.
pub mod peripherals;
