//! Errors reported by the solver, the validators and the motion routines

use std::fmt;
use crate::kinematic_traits::{AngleSet, Point};

/// Failure reported by the hardware collaborators (sensors, motors, servos).
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareError {
    pub message: String,
}

impl HardwareError {
    pub fn new(message: impl Into<String>) -> Self {
        HardwareError { message: message.into() }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HardwareError {}

/// Motion phase that was active when a polling loop gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    /// Homing, full revolution while sampling the distance sensor.
    Scanning,
    /// Homing, rotating back to the recorded reference.
    Returning,
    /// Rotating the base to the requested theta.
    Positioning,
}

impl fmt::Display for MotionPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MotionPhase::Scanning => "scanning",
            MotionPhase::Returning => "returning",
            MotionPhase::Positioning => "positioning",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallCause {
    /// Encoder did not change over the configured number of polls while powered.
    NoProgress,
    /// Poll budget of the phase exhausted.
    PollLimit,
    /// Deadline passed.
    Deadline,
}

impl fmt::Display for StallCause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            StallCause::NoProgress => "encoder does not move",
            StallCause::PollLimit => "poll limit reached",
            StallCause::Deadline => "deadline exceeded",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArmError {
    /// Argument of arccos outside [-1, 1] (or not finite): the links cannot form
    /// the triangle with the target.
    GeometricallyUnreachable { argument: f64, point: Point },
    /// Angles were computed but some joint cannot physically take them.
    PhysicallyInvalidAngle { angles: AngleSet },
    /// The point is outside the reachable workspace.
    OutOfWorkspace { point: Point },
    /// Encoder or sensor did not reach the expected state in time.
    HomingStall { phase: MotionPhase, cause: StallCause, encoder: i64 },
    /// Motion cancelled by the caller.
    Cancelled { phase: MotionPhase },
    Hardware(HardwareError),
}

impl fmt::Display for ArmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ArmError::GeometricallyUnreachable { argument, ref point } =>
                write!(f, "Point ({}, {}, {}) is geometrically unreachable (arccos argument {})",
                       point.x, point.y, point.z, argument),
            ArmError::PhysicallyInvalidAngle { ref angles } =>
                write!(f, "Angles {} are outside the joint range of motion", angles),
            ArmError::OutOfWorkspace { ref point } =>
                write!(f, "Point ({}, {}, {}) is outside the workspace", point.x, point.y, point.z),
            ArmError::HomingStall { phase, cause, encoder } =>
                write!(f, "Stall while {}: {} (encoder {})", phase, cause, encoder),
            ArmError::Cancelled { phase } =>
                write!(f, "Cancelled while {}", phase),
            ArmError::Hardware(ref err) =>
                write!(f, "Hardware Error: {}", err),
        }
    }
}

impl std::error::Error for ArmError {}

impl From<HardwareError> for ArmError {
    fn from(err: HardwareError) -> Self {
        ArmError::Hardware(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_error_converts() {
        fn failing() -> Result<(), ArmError> {
            Err(HardwareError::new("encoder cable"))?;
            Ok(())
        }
        assert_eq!(failing(), Err(ArmError::Hardware(HardwareError::new("encoder cable"))));
    }

    #[test]
    fn test_display_mentions_phase_and_cause() {
        let err = ArmError::HomingStall {
            phase: MotionPhase::Returning,
            cause: StallCause::NoProgress,
            encoder: 42,
        };
        let text = err.to_string();
        assert!(text.contains("returning"), "{}", text);
        assert!(text.contains("encoder does not move"), "{}", text);
        assert!(text.contains("42"), "{}", text);
    }
}
