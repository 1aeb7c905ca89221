//! Closed-loop motion control.
//!
//! This module turns high-level motion commands into corrected motor power,
//! cycle by cycle. It includes:
//!
//! - **Config**: The immutable tuning and geometry of one robot.
//! - **PID Control**: A generic, time-aware Proportional-Integral-Derivative
//!   controller.
//! - **Sequencer**: Rotate-to-heading and drive-by-distance maneuvers built on
//!   two PID controllers.
//!
//! # Architecture
//!
//! Maneuvers are `async` and cooperative. They run inside the caller's task,
//! sleep once per control cycle, and resolve when the maneuver exits. Nothing
//! is spawned in the background.
//!
//! # Example
//!
//! ```ignore
//! use helmsman::motion::{config::MotionConfig, sequencer::MotionSequencer};
//!
//! let mut seq = MotionSequencer::new(MotionConfig::default(), drivetrain, gyro, host)?;
//!
//! seq.drive_by_distance(24.0, 0.3).await; // 24 inches forward
//! seq.rotate(90.0).await;                 // quarter turn
//! ```

/// Robot tuning and geometry.
///
/// Provides [`MotionConfig`](config::MotionConfig), the wheel geometry used
/// for distance conversion, and the named rotation calibration constant.
pub mod config;

/// PID control algorithm.
///
/// Contains the [`PidController`](pid::PidController) shared by every
/// maneuver.
pub mod pid;

/// Rotate and drive maneuvers.
///
/// Provides the [`MotionSequencer`](sequencer::MotionSequencer) and the pure
/// per-cycle state machines it drives.
pub mod sequencer;
