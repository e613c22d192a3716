//! In-memory arm for tests and demonstrations.
//!
//! Time is counted in encoder reads: every read of the base encoder advances the base by
//! `ticks_per_power` times the current motor power. The ranging sensor returns a
//! distance that depends on the base angle only.

use std::collections::HashMap;
use crate::arm_error::HardwareError;
use crate::hardware::{ActuatorInterface, SensorInterface};
use crate::kinematic_traits::JointId;

/// Closest distance reported by [`SimulatedArm::with_reference_at`].
pub const REFERENCE_DISTANCE: f64 = 20.0;

pub struct SimulatedArm {
    full_rotation_ticks: i64,
    ticks_per_power: f64,
    /// Base position in ticks since creation, not wrapped.
    absolute: f64,
    /// Value of `absolute` at the last encoder reset.
    zero: f64,
    power: i8,
    stalled: bool,
    /// Encoder reads left before the base jams, if set.
    jam_after: Option<u64>,
    sensor_failure: bool,
    distance_profile: Box<dyn Fn(f64) -> f64 + Send>,
    servo_commands: HashMap<(JointId, u8), f64>,
}

impl SimulatedArm {
    /// Base at angle 0 with the encoder zeroed, nothing in sensor range.
    pub fn new(full_rotation_ticks: i64) -> Self {
        SimulatedArm {
            full_rotation_ticks,
            ticks_per_power: 0.05,
            absolute: 0.0,
            zero: 0.0,
            power: 0,
            stalled: false,
            jam_after: None,
            sensor_failure: false,
            distance_profile: Box::new(|_: f64| 255.0),
            servo_commands: HashMap::new(),
        }
    }

    /// Places a wall so that the distance is smallest at the given base angle (degrees) and
    /// grows by one unit per degree away from it.
    pub fn with_reference_at(self, angle: f64) -> Self {
        self.with_distance_profile(move |at| {
            let off = (at - angle).rem_euclid(360.0);
            REFERENCE_DISTANCE + off.min(360.0 - off)
        })
    }

    /// Distance as a function of the base angle in degrees, [0, 360).
    pub fn with_distance_profile<F: Fn(f64) -> f64 + Send + 'static>(mut self, profile: F) -> Self {
        self.distance_profile = Box::new(profile);
        self
    }

    /// Encoder ticks the base advances per poll for each unit of motor power.
    pub fn with_speed(mut self, ticks_per_power: f64) -> Self {
        self.ticks_per_power = ticks_per_power;
        self
    }

    /// A stalled base does not move whatever the power.
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// The base jams for good after the given number of encoder reads.
    pub fn jam_after_reads(&mut self, reads: u64) {
        self.jam_after = Some(reads);
    }

    pub fn set_sensor_failure(&mut self, failure: bool) {
        self.sensor_failure = failure;
    }

    /// Physical base angle in degrees, [0, 360).
    pub fn base_angle(&self) -> f64 {
        let full = self.full_rotation_ticks as f64;
        self.absolute.rem_euclid(full) / full * 360.0
    }

    pub fn motor_power(&self) -> i8 {
        self.power
    }

    /// Last command sent to the servo, if any.
    pub fn servo_command(&self, joint: JointId, channel: u8) -> Option<f64> {
        self.servo_commands.get(&(joint, channel)).copied()
    }
}

impl SensorInterface for SimulatedArm {
    fn read_distance(&mut self) -> Result<f64, HardwareError> {
        if self.sensor_failure {
            return Err(HardwareError::new("ranging sensor does not respond"));
        }
        Ok((self.distance_profile)(self.base_angle()))
    }

    fn read_encoder(&mut self, joint: JointId) -> Result<i64, HardwareError> {
        if joint != JointId::Base {
            return Err(HardwareError::new(format!("no encoder on {:?}", joint)));
        }
        match self.jam_after {
            Some(0) => self.stalled = true,
            Some(left) => self.jam_after = Some(left - 1),
            None => {}
        }
        if !self.stalled {
            self.absolute += self.power as f64 * self.ticks_per_power;
        }
        Ok((self.absolute - self.zero).round() as i64)
    }

    fn reset_encoder(&mut self, joint: JointId) -> Result<(), HardwareError> {
        if joint != JointId::Base {
            return Err(HardwareError::new(format!("no encoder on {:?}", joint)));
        }
        self.zero = self.absolute;
        Ok(())
    }
}

impl ActuatorInterface for SimulatedArm {
    fn set_joint_command(&mut self, joint: JointId, channel: u8, value: f64) -> Result<(), HardwareError> {
        if !value.is_finite() {
            return Err(HardwareError::new(format!("servo command {} for {:?}", value, joint)));
        }
        self.servo_commands.insert((joint, channel), value);
        Ok(())
    }

    fn set_motor_power(&mut self, joint: JointId, power: i8) -> Result<(), HardwareError> {
        if joint != JointId::Base {
            return Err(HardwareError::new(format!("no motor on {:?}", joint)));
        }
        if !(-100..=100).contains(&power) {
            return Err(HardwareError::new(format!("motor power {} out of range", power)));
        }
        self.power = power;
        Ok(())
    }
}
