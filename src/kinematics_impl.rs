//! Inverse kinematics of the three joint arm by cosine law decomposition.
//!
//! The shoulder segment, the forearm and the line from J2 to the target (of length
//! `L = sqrt(x² + z²)`) form a triangle. The cosine law gives the interior angles:
//! alpha is the elevation of the target (`atan2(z, x)`) plus the angle between `L` and the
//! shoulder segment, beta is the angle between the shoulder segment and the forearm.
//! Theta, the base rotation, is `atan2(y, z)`.

use crate::arm_error::ArmError;
use crate::constraints::JointLimits;
use crate::kinematic_traits::{AngleSet, Kinematics, Point, Solution};
use crate::parameters::arm_kinematics::ArmGeometry;
use crate::utils::{planar_reach, rad_to_deg};
use crate::workspace;

/// Rounding noise allowed in the arccos argument when the target is exactly at the end of
/// the reach. Larger excess is reported as unreachable.
const ACOS_SLACK: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct ArmKinematics {
    geometry: ArmGeometry,
    limits: JointLimits,
}

impl ArmKinematics {
    /// Creates a new `ArmKinematics` instance with the given geometry and the
    /// default joint limits.
    pub fn new(geometry: ArmGeometry) -> Self {
        ArmKinematics { geometry, limits: JointLimits::default() }
    }

    pub fn new_with_limits(geometry: ArmGeometry, limits: JointLimits) -> Self {
        ArmKinematics { geometry, limits }
    }

    pub fn geometry(&self) -> &ArmGeometry {
        &self.geometry
    }

    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    /// Base rotation, radians. Pairs y with z, not x with z as the other angles do.
    pub fn theta(&self, point: &Point) -> f64 {
        point.y.atan2(point.z)
    }

    /// Elevation of the target over the base plane, radians.
    pub fn alpha1(&self, point: &Point) -> f64 {
        point.z.atan2(point.x)
    }

    /// Angle between the shoulder segment and the line to the target, radians.
    pub fn alpha2(&self, point: &Point, l: f64) -> Result<f64, ArmError> {
        let (s, f) = (self.geometry.shoulder, self.geometry.forearm);
        let numerator = f * f - s * s - l * l;
        let denominator = -2.0 * s * l;
        acos_checked(numerator / denominator, point)
    }

    /// Angle between the shoulder segment and the forearm, radians.
    pub fn beta(&self, point: &Point, l: f64) -> Result<f64, ArmError> {
        let (s, f) = (self.geometry.shoulder, self.geometry.forearm);
        let numerator = l * l - s * s - f * f;
        let denominator = -2.0 * s * f;
        acos_checked(numerator / denominator, point)
    }

    /// Solves and converts to degrees, without checking the joint limits.
    pub fn angles(&self, point: &Point) -> Result<AngleSet, ArmError> {
        let l = planar_reach(point);
        let alpha = self.alpha1(point) + self.alpha2(point, l)?;
        let beta = self.beta(point, l)?;
        let theta = self.theta(point);
        Ok(AngleSet {
            alpha: rad_to_deg(alpha),
            beta: rad_to_deg(beta),
            theta: rad_to_deg(theta),
        })
    }
}

fn acos_checked(argument: f64, point: &Point) -> Result<f64, ArmError> {
    if !argument.is_finite() || argument.abs() > 1.0 + ACOS_SLACK {
        return Err(ArmError::GeometricallyUnreachable { argument, point: *point });
    }
    Ok(argument.clamp(-1.0, 1.0).acos())
}

impl Kinematics for ArmKinematics {
    fn inverse(&self, point: &Point) -> Result<Solution, ArmError> {
        let angles = self.angles(point)?;
        Ok(Solution {
            angles,
            valid: self.limits.compliant(&angles),
        })
    }

    fn reachable(&self, point: &Point) -> bool {
        workspace::is_point_valid(&self.geometry, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn robot() -> ArmKinematics {
        ArmKinematics::new(ArmGeometry::nxt_arm())
    }

    #[test]
    fn test_reference_point() {
        let robot = robot();
        let point = Point::new(200.0, 100.0, 100.0);
        let solution = robot.inverse(&point).expect("point must be solvable");

        assert!((planar_reach(&point) - 223.607).abs() < 1e-3);
        assert!((solution.angles.alpha - 75.823174).abs() < 1e-3, "{}", solution.angles);
        assert!((solution.angles.beta - 85.255037).abs() < 1e-3, "{}", solution.angles);
        assert!((solution.angles.theta - 45.0).abs() < 1e-3, "{}", solution.angles);
        assert_eq!(solution.valid,
                   robot.limits().are_angles_valid(solution.angles.alpha, solution.angles.beta));
        assert!(solution.valid);
    }

    #[test]
    fn test_intermediate_angles() {
        let robot = robot();
        let point = Point::new(200.0, 100.0, 100.0);
        let l = planar_reach(&point);
        assert!((rad_to_deg(robot.alpha1(&point)) - 26.565051).abs() < 1e-3);
        assert!((rad_to_deg(robot.alpha2(&point, l).unwrap()) - 49.258123).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_angles_still_returned() {
        // Equal links, beta opens beyond 90 degrees for this target
        let geometry = ArmGeometry { shoulder: 150.0, forearm: 150.0, ..ArmGeometry::nxt_arm() };
        let robot = ArmKinematics::new(geometry);
        let solution = robot.inverse(&Point::new(200.0, 100.0, 100.0)).unwrap();
        assert!(!solution.valid);
        assert!(solution.angles.beta > 90.0);
        assert!(solution.angles.is_finite());
    }

    #[test]
    fn test_too_far_is_unreachable() {
        let robot = robot();
        match robot.inverse(&Point::new(400.0, 0.0, 0.0)) {
            Err(ArmError::GeometricallyUnreachable { argument, .. }) => assert!(argument.abs() > 1.0),
            other => panic!("Expected unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_origin_is_unreachable() {
        // L = 0 divides by zero in alpha2
        let result = robot().inverse(&Point::new(0.0, 10.0, 0.0));
        assert!(matches!(result, Err(ArmError::GeometricallyUnreachable { .. })), "{:?}", result);
    }

    #[test]
    fn test_too_close_is_unreachable() {
        // |forearm - shoulder| = 10
        let result = robot().inverse(&Point::new(5.0, 0.0, 0.0));
        assert!(matches!(result, Err(ArmError::GeometricallyUnreachable { .. })), "{:?}", result);
    }

    #[test]
    fn test_full_stretch_is_solvable() {
        let robot = robot();
        let solution = robot.inverse(&Point::new(330.0, 0.0, 0.0)).unwrap();
        assert!(solution.angles.beta.abs() > 179.9, "{}", solution.angles);
        assert!(solution.angles.alpha.abs() < 1e-3, "{}", solution.angles);
    }

    #[test]
    fn test_no_domain_error_inside_annulus() {
        let robot = robot();
        let g = robot.geometry();
        let inner = (g.forearm - g.shoulder).abs();
        let outer = g.forearm + g.shoulder;
        let mut rng = StdRng::seed_from_u64(2016);
        for _ in 0..2000 {
            let l: f64 = rng.random_range(inner + 1e-6..outer - 1e-6);
            let phi: f64 = rng.random_range(-std::f64::consts::PI..std::f64::consts::PI);
            let y: f64 = rng.random_range(-300.0..300.0);
            let point = Point::new(l * phi.cos(), y, l * phi.sin());
            let solution = robot.inverse(&point);
            assert!(solution.is_ok(), "{:?} for L = {}", solution, l);
            assert!(solution.unwrap().angles.is_finite());
        }
    }
}
