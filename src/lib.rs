//! Inverse kinematics and base homing for a small three joint arm, built from a motor driven
//! rotating base (J1) and two servo joints, the shoulder (J2) and the elbow (J3).
//!
//! # Features
//!
//! - Inverse kinematics by cosine law decomposition of the triangle formed by the shoulder
//!   segment, the forearm and the line to the target. Angles are always returned,
//!   together with the flag telling whether the joints can physically take them.
//! - Points where the triangle cannot be closed are reported as errors, never as NaN.
//! - Workspace check that does not need the solver: spherical shell with two cut off cones.
//! - Servo commands from calibration polynomials, applied only to validated angles.
//! - Homing of the base joint: a full revolution while sampling a ranging sensor, then
//!   return to the closest reading. Polling loops are bounded by stall detection,
//!   poll budget, deadline and a cancellation token.
//! - Arm configuration from YAML files (feature `allow_filesystem`).
//!
//! # Parameters
//!
//! The shoulder and forearm lengths define the triangle, `l1` and `l2` the workspace shell.
//! The arm is at zero with the shoulder segment horizontal. Joint limits are in degrees and
//! exclusive. See [`parameters::arm_kinematics::ArmConfig`].
//!
//! ```
//! use rs_servo_arm_kinematics::kinematic_traits::{Kinematics, Point};
//! use rs_servo_arm_kinematics::kinematics_impl::ArmKinematics;
//! use rs_servo_arm_kinematics::parameters::arm_kinematics::ArmGeometry;
//!
//! let robot = ArmKinematics::new(ArmGeometry::nxt_arm());
//! let target = Point::new(200.0, 100.0, 100.0);
//! assert!(robot.reachable(&target));
//! let solution = robot.inverse(&target).unwrap();
//! assert!(solution.valid);
//! println!("{}", solution.angles);
//! ```

pub mod parameters;
pub mod parameters_robots;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;

pub mod parameter_error;
pub mod arm_error;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod constraints;

pub mod workspace;

pub mod calibration;

pub mod hardware;

pub mod control_loop;

pub mod base_drive;

pub mod homing;

pub mod controller;

pub mod simulation;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
