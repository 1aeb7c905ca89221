//! The drive-by-distance loop.

use std::time::Duration;

use crate::{motion::pid::PidController, peripherals::WheelPowers};

/// One drive-by-distance maneuver: open-loop power along the direction of
/// travel, trimmed every cycle by the heading-hold controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drive {
    target_counts: f64,
    power:         f64,
}

impl Drive {
    /// `power` is a magnitude; the direction comes from the sign of
    /// `target_counts`.
    pub fn new(target_counts: f64, power: f64) -> Self {
        let power = if target_counts > 0.0 { power.abs() } else { -power.abs() };
        Self {
            target_counts,
            power,
        }
    }

    pub fn target_counts(&self) -> f64 { self.target_counts }

    /// Signed drive power.
    pub fn power(&self) -> f64 { self.power }

    /// Value for the primary motor's target-position register.
    pub fn target_register(&self) -> i32 { self.target_counts.round() as i32 }

    /// Open-loop power written before the first cycle.
    pub fn baseline(&self) -> WheelPowers { WheelPowers::uniform(self.power) }

    /// `true` once the primary count has covered the target, in either direction.
    pub fn reached(&self, position: i32) -> bool { f64::from(position).abs() >= self.target_counts.abs() }

    /// Advances one control cycle. Returns `None` once the target count is
    /// reached, otherwise the baseline with the heading correction applied.
    pub fn step(
        &self,
        heading: f64,
        position: i32,
        controller: &mut PidController,
        now: Duration,
    ) -> Option<WheelPowers> {
        if self.reached(position) {
            return None;
        }
        let correction = controller.perform_pid(heading, now);
        Some(WheelPowers::heading_hold(self.power, correction))
    }
}
