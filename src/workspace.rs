//! Reachable workspace of the arm, checked without solving for the angles.
//!
//! The workspace is a spherical shell between `l1` and `l1 + l2` around J2, with the
//! range limited by two cones of the configured half angle. Above and below the
//! cones, the point must be within `l2` from an offset pivot. The three regions are
//! split by height:
//!
//! - central: `-(l1 + l2)·sin(a) < z < (l1 + l2)·cos(a)`,
//! - lower cone: `z <= -(l1 + l2)·sin(a)`, pivot at `(l1·cos(a), sin(a))`,
//! - upper cone: `z >= (l1 + l2)·cos(a)`, pivot at `(l1·sin(a), cos(a))`,
//!
//! where the first pivot coordinate is the horizontal distance from the base axis. The
//! pivot height is the bare sine or cosine, not scaled by `l1`. With the usual link
//! lengths this leaves only a thin band below the lower boundary reachable, and nothing
//! above the upper one.

use crate::kinematic_traits::Point;
use crate::parameters::arm_kinematics::ArmGeometry;
use crate::utils::{distance_from_origin, horizontal_reach};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Central,
    LowerCone,
    UpperCone,
}

pub fn region(geometry: &ArmGeometry, point: &Point) -> Region {
    let reach = geometry.l1 + geometry.l2;
    let (sin_a, cos_a) = geometry.cone_half_angle.sin_cos();
    if point.z <= -reach * sin_a {
        Region::LowerCone
    } else if point.z >= reach * cos_a {
        Region::UpperCone
    } else {
        Region::Central
    }
}

/// Checks if the point lies in the reachable workspace. Points for which this returns
/// false must not be passed to the solver and the actuators.
pub fn is_point_valid(geometry: &ArmGeometry, point: &Point) -> bool {
    let (l1, l2) = (geometry.l1, geometry.l2);
    let (sin_a, cos_a) = geometry.cone_half_angle.sin_cos();

    match region(geometry, point) {
        Region::Central => {
            let distance = distance_from_origin(point);
            distance > l1 && distance < l1 + l2
        }
        Region::LowerCone => {
            within_forearm(point, l1 * cos_a, sin_a, l2)
        }
        Region::UpperCone => {
            within_forearm(point, l1 * sin_a, cos_a, l2)
        }
    }
}

/// The point must be on the same side of the base axis as the pivot offset, and closer
/// than `l2` to the pivot.
fn within_forearm(point: &Point, pivot_reach: f64, pivot_z: f64, l2: f64) -> bool {
    let same_side = (point.x >= 0.0 && point.x - pivot_reach >= 0.0)
        || (point.x < 0.0 && point.x - pivot_reach < 0.0);
    if !same_side {
        return false;
    }
    let distance = (horizontal_reach(point) - pivot_reach).hypot(point.z - pivot_z);
    distance < l2
}
