//! Driving the base joint (J1) with its motor and encoder.

use tracing::{debug, warn};
use crate::arm_error::{ArmError, HardwareError, MotionPhase};
use crate::control_loop::{PollingLoop, Step};
use crate::hardware::{ActuatorInterface, ArmHardware, Delay};
use crate::kinematic_traits::JointId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseDrive {
    full_rotation_ticks: i64,
}

impl BaseDrive {
    pub fn new(full_rotation_ticks: i64) -> Self {
        BaseDrive { full_rotation_ticks }
    }

    pub fn full_rotation_ticks(&self) -> i64 {
        self.full_rotation_ticks
    }

    /// Starts the motor. Clockwise rotation is positive power and counts the encoder up.
    /// Only the magnitude of `power` is used, the direction comes from `clockwise`.
    pub fn rotate<A: ActuatorInterface + ?Sized>(&self, actuators: &mut A, clockwise: bool, power: i8)
                                                 -> Result<(), HardwareError> {
        let power = power.saturating_abs();
        let power = if clockwise { power } else { -power };
        actuators.set_motor_power(JointId::Base, power)
    }

    pub fn stop<A: ActuatorInterface + ?Sized>(&self, actuators: &mut A) -> Result<(), HardwareError> {
        actuators.set_motor_power(JointId::Base, 0)
    }

    /// Encoder position, in ticks from the reference, for the base angle in degrees.
    pub fn ticks_for_angle(&self, theta: f64) -> i64 {
        (theta / 360.0 * self.full_rotation_ticks as f64).round() as i64
    }

    /// Signed ticks still to go from the current encoder value to the base angle.
    pub fn ticks_to_go(&self, theta: f64, current: i64) -> i64 {
        self.ticks_for_angle(theta) - current
    }

    /// Direction (clockwise if true) and distance in ticks of the shorter way from
    /// the zero of the encoder to the target.
    pub fn route(&self, target: i64) -> (bool, i64) {
        if self.full_rotation_ticks <= 0 {
            return (target >= 0, target.abs());
        }
        let target = target.rem_euclid(self.full_rotation_ticks);
        if 2 * target > self.full_rotation_ticks {
            (false, self.full_rotation_ticks - target)
        } else {
            (true, target)
        }
    }

    /// Rotates to the target given relative to a freshly zeroed encoder. The motion is
    /// over once the encoder, counted in the direction of travel, is within `tolerance` of
    /// the distance to travel.
    /// Returns the encoder value at the stop.
    pub fn move_to_target<H, D>(&self, hardware: &mut H, polling: &mut PollingLoop<D>,
                                target: i64, power: i8, tolerance: i64) -> Result<i64, ArmError>
    where
        H: ArmHardware + ?Sized,
        D: Delay + ?Sized,
    {
        let (clockwise, distance) = self.route(target);
        let goal = (distance - tolerance).max(0);
        debug!("Moving base to {} ticks: {} ticks {}", target, distance,
               if clockwise { "clockwise" } else { "counter-clockwise" });
        if goal == 0 {
            return Ok(hardware.read_encoder(JointId::Base)?);
        }

        self.rotate(hardware, clockwise, power)?;
        let result = polling.run(MotionPhase::Returning, |_| {
            let encoder = hardware.read_encoder(JointId::Base)?;
            let travelled = if clockwise { encoder } else { -encoder };
            Ok(if travelled >= goal { Step::Done(encoder) } else { Step::Pending { encoder } })
        });
        self.finish(hardware, result)
    }

    /// Rotates until the encoder, counted from the current reference, reaches `target`
    /// within `tolerance`. Returns the encoder value at the stop.
    pub fn move_to_ticks<H, D>(&self, hardware: &mut H, polling: &mut PollingLoop<D>,
                               target: i64, power: i8, tolerance: i64) -> Result<i64, ArmError>
    where
        H: ArmHardware + ?Sized,
        D: Delay + ?Sized,
    {
        let current = hardware.read_encoder(JointId::Base)?;
        let delta = target - current;
        if delta.abs() <= tolerance {
            return Ok(current);
        }
        let clockwise = delta > 0;
        debug!("Positioning base from {} to {} ticks", current, target);

        self.rotate(hardware, clockwise, power)?;
        let result = polling.run(MotionPhase::Positioning, |_| {
            let encoder = hardware.read_encoder(JointId::Base)?;
            let arrived = if clockwise {
                encoder >= target - tolerance
            } else {
                encoder <= target + tolerance
            };
            Ok(if arrived { Step::Done(encoder) } else { Step::Pending { encoder } })
        });
        self.finish(hardware, result)
    }

    /// Stops the motor whatever the outcome of the motion was.
    pub(crate) fn finish<A, T>(&self, actuators: &mut A, result: Result<T, ArmError>) -> Result<T, ArmError>
    where
        A: ActuatorInterface + ?Sized,
    {
        let stopped = self.stop(actuators);
        match result {
            Ok(value) => {
                stopped?;
                Ok(value)
            }
            Err(err) => {
                warn!("Base motion failed: {}", err);
                if let Err(stop_error) = stopped {
                    warn!("Failed to stop the base motor: {}", stop_error);
                }
                Err(err)
            }
        }
    }
}
