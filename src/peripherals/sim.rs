//! A deterministic simulated robot.
//!
//! [`SimRobot`] owns one shared [`SimState`] and hands out the three
//! collaborator handles ([`SimDrivetrain`], [`SimGyro`], [`SimHost`]) that a
//! [`MotionSequencer`](crate::motion::sequencer::MotionSequencer) needs.
//!
//! Simulated time only moves inside [`Host::sleep`]. Each sleep also advances
//! the heading and encoder models using the powers written before it, so the
//! writes of one control cycle are what the next cycle's reads observe.
//!
//! Every collaborator call is appended to an event log ([`SimEvent`]) that
//! tests can inspect afterwards.
//!
//! ```
//! use helmsman::peripherals::{Drivetrain, Host, Orientation, WheelPowers, sim::*};
//! use std::time::Duration;
//!
//! let robot = SimRobot::new().with_heading_model(HeadingModel::Physics {
//!     degrees_per_second: 100.0,
//! });
//! let mut drivetrain = robot.drivetrain();
//! let mut gyro = robot.gyro();
//! let host = robot.host();
//!
//! drivetrain.apply(WheelPowers::pivot(1.0));
//! futures::executor::block_on(host.sleep(Duration::from_millis(100)));
//! assert!((gyro.heading() - 10.0).abs() < 1e-9);
//! ```

use std::{cell::RefCell, future::Future, rc::Rc, time::Duration};

use super::{Drivetrain, EncoderMode, Host, Orientation, Wheel, WheelPowers, make_cloneable};

/// How the simulated heading responds over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingModel {
    /// The heading never changes from the given value.
    Frozen(f64),
    /// Each sleep moves the heading a fixed `step` toward `toward`,
    /// regardless of wheel power.
    Stepping { step: f64, toward: f64 },
    /// Yaw rate proportional to the pivot component of the wheel powers.
    /// A full `pivot(1.0)` turns at `degrees_per_second`.
    Physics { degrees_per_second: f64 },
}

/// One recorded collaborator call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Power(Wheel, f64),
    ResetPosition,
    TargetPosition(i32),
    Mode(EncoderMode),
    HeadingRead(f64),
    ResetReference,
    ActiveQuery(bool),
    Sleep(Duration),
}

/// State shared by all handles of one [`SimRobot`].
#[derive(Debug)]
pub struct SimState {
    pub powers:            WheelPowers,
    pub heading:           f64,
    pub heading_model:     HeadingModel,
    pub position:          f64,
    pub counts_per_second: f64,
    pub target_position:   i32,
    pub mode:              EncoderMode,
    pub clock:             Duration,
    /// Remaining `is_active` queries that answer `true`. `None` never cancels.
    pub active_budget:     Option<u32>,
    pub events:            Vec<SimEvent>,
}

impl SimState {
    fn advance(&mut self, duration: Duration) {
        let secs = duration.as_secs_f64();
        let p = self.powers;

        match self.heading_model {
            HeadingModel::Frozen(value) => self.heading = value,
            HeadingModel::Stepping { step, toward } => {
                let remaining = toward - self.heading;
                if remaining.abs() <= step {
                    self.heading = toward;
                } else {
                    self.heading += step.copysign(remaining);
                }
            }
            HeadingModel::Physics { degrees_per_second } => {
                let yaw = (p.right_rear - p.left_rear + p.left_front - p.right_front) / 4.0;
                self.heading += degrees_per_second * yaw * secs;
            }
        }

        self.position += self.counts_per_second * p.left_rear * secs;
        self.clock += duration;
    }
}

/// A simulated four-wheel robot with a gyro and a primary encoder.
#[derive(Clone)]
pub struct SimRobot {
    state: Rc<RefCell<SimState>>,
}

impl Default for SimRobot {
    fn default() -> Self { Self::new() }
}

impl SimRobot {
    /// A robot at rest: heading frozen at zero, encoder idle, never cancelled.
    pub fn new() -> Self {
        Self {
            state: make_cloneable(SimState {
                powers:            WheelPowers::ZERO,
                heading:           0.0,
                heading_model:     HeadingModel::Frozen(0.0),
                position:          0.0,
                counts_per_second: 0.0,
                target_position:   0,
                mode:              EncoderMode::RawPower,
                clock:             Duration::ZERO,
                active_budget:     None,
                events:            Vec::new(),
            }),
        }
    }

    /// Replaces the heading model. A `Frozen` model also sets the heading.
    pub fn with_heading_model(self, model: HeadingModel) -> Self {
        {
            let mut s = self.state.borrow_mut();
            s.heading_model = model;
            if let HeadingModel::Frozen(value) = model {
                s.heading = value;
            }
        }
        self
    }

    /// Encoder counts per second at full power on the left rear wheel.
    pub fn with_counts_per_second(self, counts_per_second: f64) -> Self {
        self.state.borrow_mut().counts_per_second = counts_per_second;
        self
    }

    /// The host reports inactive after `queries` calls to `is_active`.
    pub fn cancel_after(self, queries: u32) -> Self {
        self.state.borrow_mut().active_budget = Some(queries);
        self
    }

    pub fn drivetrain(&self) -> SimDrivetrain {
        SimDrivetrain {
            state: self.state.clone(),
        }
    }

    pub fn gyro(&self) -> SimGyro {
        SimGyro {
            state: self.state.clone(),
        }
    }

    pub fn host(&self) -> SimHost {
        SimHost {
            state: self.state.clone(),
        }
    }

    pub fn powers(&self) -> WheelPowers { self.state.borrow().powers }

    pub fn heading(&self) -> f64 { self.state.borrow().heading }

    pub fn position(&self) -> f64 { self.state.borrow().position }

    pub fn mode(&self) -> EncoderMode { self.state.borrow().mode }

    pub fn target_position(&self) -> i32 { self.state.borrow().target_position }

    pub fn uptime(&self) -> Duration { self.state.borrow().clock }

    /// A copy of the event log.
    pub fn events(&self) -> Vec<SimEvent> { self.state.borrow().events.clone() }
}

/// Drivetrain handle of a [`SimRobot`].
pub struct SimDrivetrain {
    state: Rc<RefCell<SimState>>,
}

impl Drivetrain for SimDrivetrain {
    fn set_power(&mut self, wheel: Wheel, power: f64) {
        let mut s = self.state.borrow_mut();
        match wheel {
            Wheel::LeftRear => s.powers.left_rear = power,
            Wheel::RightRear => s.powers.right_rear = power,
            Wheel::LeftFront => s.powers.left_front = power,
            Wheel::RightFront => s.powers.right_front = power,
        }
        s.events.push(SimEvent::Power(wheel, power));
    }

    fn reset_position(&mut self) {
        let mut s = self.state.borrow_mut();
        s.position = 0.0;
        s.events.push(SimEvent::ResetPosition);
    }

    fn position(&mut self) -> i32 { self.state.borrow().position as i32 }

    fn set_target_position(&mut self, counts: i32) {
        let mut s = self.state.borrow_mut();
        s.target_position = counts;
        s.events.push(SimEvent::TargetPosition(counts));
    }

    fn set_mode(&mut self, mode: EncoderMode) {
        let mut s = self.state.borrow_mut();
        s.mode = mode;
        s.events.push(SimEvent::Mode(mode));
    }
}

/// Orientation handle of a [`SimRobot`].
pub struct SimGyro {
    state: Rc<RefCell<SimState>>,
}

impl Orientation for SimGyro {
    fn heading(&mut self) -> f64 {
        let mut s = self.state.borrow_mut();
        let heading = s.heading;
        s.events.push(SimEvent::HeadingRead(heading));
        heading
    }

    fn reset_reference(&mut self) {
        let mut s = self.state.borrow_mut();
        s.heading = 0.0;
        s.events.push(SimEvent::ResetReference);
    }
}

/// Host handle of a [`SimRobot`].
pub struct SimHost {
    state: Rc<RefCell<SimState>>,
}

impl Host for SimHost {
    fn is_active(&self) -> bool {
        let mut s = self.state.borrow_mut();
        let active = match s.active_budget {
            None => true,
            Some(0) => false,
            Some(n) => {
                s.active_budget = Some(n - 1);
                true
            }
        };
        s.events.push(SimEvent::ActiveQuery(active));
        active
    }

    fn uptime(&self) -> Duration { self.state.borrow().clock }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        {
            let mut s = self.state.borrow_mut();
            s.advance(duration);
            s.events.push(SimEvent::Sleep(duration));
        }
        std::future::ready(())
    }
}
