extern crate nalgebra as na;

use std::fmt;
use na::Point3;
use crate::arm_error::ArmError;

/// Target of the end effector, Cartesian coordinates in the same units as the link lengths
/// (millimeters for the presets).
/// ```
/// use rs_servo_arm_kinematics::kinematic_traits::Point;
/// let target = Point::new(200.0, 100.0, 100.0);
/// assert_eq!(target.y, 100.0);
/// ```
pub type Point = Point3<f64>;

/// Identifies a joint of the arm. The base (J1) rotates around the vertical axis and is
/// driven by a motor with the encoder, J2 and J3 are servos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointId {
    Base,
    Shoulder,
    Elbow,
}

/// Joint angles of the arm pose, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleSet {
    /// Shoulder joint (J2), angle of the shoulder segment above the base plane.
    pub alpha: f64,
    /// Elbow joint (J3), angle between the shoulder segment and the forearm.
    pub beta: f64,
    /// Base rotation (J1).
    pub theta: f64,
}

impl AngleSet {
    pub fn new(alpha: f64, beta: f64, theta: f64) -> Self {
        AngleSet { alpha, beta, theta }
    }

    pub fn is_finite(&self) -> bool {
        self.alpha.is_finite() && self.beta.is_finite() && self.theta.is_finite()
    }
}

impl fmt::Display for AngleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[alpha {:.2}°, beta {:.2}°, theta {:.2}°]", self.alpha, self.beta, self.theta)
    }
}

/// Outcome of the inverse kinematics. The angles are always the geometric solution,
/// even if some joint cannot physically reach them. Check `valid` (or call
/// [`Solution::validated`]) before sending them to the actuators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub angles: AngleSet,
    pub valid: bool,
}

pub trait Kinematics {
    /// Computes the joint angles for the given target point. Returns
    /// `ArmError::GeometricallyUnreachable` if the triangle formed by the links and
    /// the target cannot be closed.
    fn inverse(&self, point: &Point) -> Result<Solution, ArmError>;

    /// Checks if the point lies in the workspace of the arm, without solving for angles.
    fn reachable(&self, point: &Point) -> bool;
}
