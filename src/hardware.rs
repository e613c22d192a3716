//! Contracts of the hardware the arm is built from. The controller board, the sensor
//! multiplexer and the servo controller are implemented outside this crate; see
//! [`crate::simulation::SimulatedArm`] for an in-memory implementation.

use std::time::Duration;
use crate::arm_error::HardwareError;
use crate::kinematic_traits::JointId;

pub trait SensorInterface {
    /// Reading of the ranging sensor, in the same units as the link lengths.
    fn read_distance(&mut self) -> Result<f64, HardwareError>;

    /// Encoder ticks of the motor driving the joint.
    fn read_encoder(&mut self, joint: JointId) -> Result<i64, HardwareError>;

    /// Sets the current encoder position of the joint as zero.
    fn reset_encoder(&mut self, joint: JointId) -> Result<(), HardwareError>;
}

pub trait ActuatorInterface {
    /// Sends the servo position command on the given channel of the servo controller.
    fn set_joint_command(&mut self, joint: JointId, channel: u8, value: f64) -> Result<(), HardwareError>;

    /// Signed motor power in [-100, 100]. Positive power rotates clockwise.
    fn set_motor_power(&mut self, joint: JointId, power: i8) -> Result<(), HardwareError>;
}

/// Blocking pause between polls.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Delay that sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Delay that returns immediately, for simulated hardware where time is counted in polls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&mut self, _duration: Duration) {}
}

/// Sensors and actuators of the arm together, as needed by the motion routines.
pub trait ArmHardware: SensorInterface + ActuatorInterface {}

impl<T: SensorInterface + ActuatorInterface + ?Sized> ArmHardware for T {}
