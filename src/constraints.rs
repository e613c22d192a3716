//! Range of motion of the shoulder and elbow joints. The base joint rotates freely and
//! has no constraints.

use crate::kinematic_traits::AngleSet;
use crate::parameter_error::ParameterError;

/// Exclusive joint limits, in degrees. An angle exactly on the limit is not reachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    /// (lower, upper) for the shoulder angle alpha.
    pub alpha: (f64, f64),

    /// (lower, upper) for the elbow angle beta.
    pub beta: (f64, f64),
}

impl JointLimits {
    pub fn new(alpha: (f64, f64), beta: (f64, f64)) -> Self {
        JointLimits { alpha, beta }
    }

    /// Range of motion of the arm as built. The shoulder servo has 90 degrees of travel,
    /// with 30 degrees cut at the top and 60 at the bottom; the elbow stays within
    /// +/- 90 degrees from the shoulder segment.
    pub fn nxt_arm() -> Self {
        JointLimits {
            alpha: (60.0, 150.0),
            beta: (-90.0, 90.0),
        }
    }

    pub fn is_alpha_valid(&self, alpha: f64) -> bool {
        alpha > self.alpha.0 && alpha < self.alpha.1
    }

    pub fn is_beta_valid(&self, beta: f64) -> bool {
        beta > self.beta.0 && beta < self.beta.1
    }

    /// Theta is not checked, the base can rotate to any angle.
    pub fn are_angles_valid(&self, alpha: f64, beta: f64) -> bool {
        self.is_alpha_valid(alpha) && self.is_beta_valid(beta)
    }

    pub fn compliant(&self, angles: &AngleSet) -> bool {
        self.are_angles_valid(angles.alpha, angles.beta)
    }

    pub fn check(&self) -> Result<(), ParameterError> {
        for (name, (from, to)) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !from.is_finite() || !to.is_finite() || from >= to {
                return Err(ParameterError::InvalidValue {
                    field: format!("joint_limits.{}", name),
                    reason: format!("lower limit must be below upper limit (got [{}, {}])", from, to),
                });
            }
        }
        Ok(())
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        Self::nxt_arm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_bounds_are_exclusive() {
        let limits = JointLimits::nxt_arm();
        assert!(!limits.is_alpha_valid(60.0));
        assert!(limits.is_alpha_valid(60.001));
        assert!(!limits.is_alpha_valid(150.0));
        assert!(limits.is_alpha_valid(149.999));
        assert!(!limits.is_alpha_valid(0.0));
        assert!(!limits.is_alpha_valid(f64::NAN));
    }

    #[test]
    fn test_beta_bounds_are_exclusive() {
        let limits = JointLimits::nxt_arm();
        assert!(!limits.is_beta_valid(-90.0));
        assert!(!limits.is_beta_valid(90.0));
        assert!(limits.is_beta_valid(0.0));
        assert!(limits.is_beta_valid(-89.999));
        assert!(limits.is_beta_valid(89.999));
    }

    #[test]
    fn test_theta_is_ignored() {
        let limits = JointLimits::nxt_arm();
        assert!(limits.compliant(&AngleSet::new(90.0, 10.0, 720.0)));
        assert!(limits.compliant(&AngleSet::new(90.0, 10.0, -179.0)));
        assert!(!limits.compliant(&AngleSet::new(90.0, 95.0, 0.0)));
        assert!(!limits.compliant(&AngleSet::new(30.0, 10.0, 0.0)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let limits = JointLimits::new((150.0, 60.0), (-90.0, 90.0));
        assert!(limits.check().is_err());
        assert!(JointLimits::nxt_arm().check().is_ok());
    }
}
