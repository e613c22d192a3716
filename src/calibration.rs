//! Servo command mapping of the shoulder (J2) and elbow (J3) joints.
//!
//! The servo positions are not linear in the joint angle. Each joint has a polynomial,
//! fitted from measurements, that gives the servo command for the angle in degrees.

use crate::arm_error::{ArmError, HardwareError};
use crate::constraints::JointLimits;
use crate::hardware::ActuatorInterface;
use crate::kinematic_traits::{AngleSet, JointId, Solution};
use crate::parameter_error::ParameterError;

/// Polynomial with coefficients stored lowest order first: `c0 + c1·x + c2·x² + ...`
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationPolynomial {
    coefficients: Vec<f64>,
}

impl CalibrationPolynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        CalibrationPolynomial { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }
}

/// Servo attached to a joint: sensor port channel and calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServoChannel {
    pub channel: u8,
    pub polynomial: CalibrationPolynomial,
}

impl ServoChannel {
    pub fn command(&self, angle: f64) -> f64 {
        self.polynomial.evaluate(angle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServoCalibration {
    /// Shoulder servo, driven by alpha.
    pub joint2: ServoChannel,
    /// Elbow servo, driven by beta.
    pub joint3: ServoChannel,
}

impl ServoCalibration {
    /// Calibration of the arm as built: quadratic fit for the shoulder, cubic for the elbow.
    pub fn nxt_arm() -> Self {
        ServoCalibration {
            joint2: ServoChannel {
                channel: 1,
                polynomial: CalibrationPolynomial::new(vec![-30.0, -3.0, 0.0333]),
            },
            joint3: ServoChannel {
                channel: 2,
                polynomial: CalibrationPolynomial::new(vec![25.0, 0.9472, -0.0015, -0.00001]),
            },
        }
    }

    pub fn joint2_command(&self, angles: &ValidAngleSet) -> f64 {
        self.joint2.command(angles.alpha())
    }

    pub fn joint3_command(&self, angles: &ValidAngleSet) -> f64 {
        self.joint3.command(angles.beta())
    }

    /// Sends the servo commands for both joints. Only angles that passed the joint limits
    /// are accepted.
    pub fn apply<A: ActuatorInterface + ?Sized>(&self, actuators: &mut A, angles: &ValidAngleSet)
                                                -> Result<(), HardwareError> {
        actuators.set_joint_command(JointId::Shoulder, self.joint2.channel, self.joint2_command(angles))?;
        actuators.set_joint_command(JointId::Elbow, self.joint3.channel, self.joint3_command(angles))?;
        Ok(())
    }

    pub fn check(&self) -> Result<(), ParameterError> {
        for (name, servo) in [("joint2", &self.joint2), ("joint3", &self.joint3)] {
            if servo.polynomial.coefficients.is_empty() {
                return Err(ParameterError::InvalidLength {
                    field: format!("servo_calibration.{}.coefficients", name),
                    expected: 1,
                    found: 0,
                });
            }
            if servo.polynomial.coefficients.iter().any(|c| !c.is_finite()) {
                return Err(ParameterError::InvalidValue {
                    field: format!("servo_calibration.{}.coefficients", name),
                    reason: "all coefficients must be finite".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self::nxt_arm()
    }
}

/// Angle set that is known to be within the joint limits. Can only be obtained
/// through the validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidAngleSet(AngleSet);

impl ValidAngleSet {
    pub fn new(angles: AngleSet, limits: &JointLimits) -> Result<Self, ArmError> {
        if limits.compliant(&angles) {
            Ok(ValidAngleSet(angles))
        } else {
            Err(ArmError::PhysicallyInvalidAngle { angles })
        }
    }

    pub fn alpha(&self) -> f64 {
        self.0.alpha
    }

    pub fn beta(&self) -> f64 {
        self.0.beta
    }

    pub fn theta(&self) -> f64 {
        self.0.theta
    }

    pub fn angles(&self) -> &AngleSet {
        &self.0
    }
}

impl Solution {
    /// Converts the solution into angles usable by the actuators, or
    /// `PhysicallyInvalidAngle` if the solver flagged it invalid.
    pub fn validated(&self) -> Result<ValidAngleSet, ArmError> {
        if self.valid {
            Ok(ValidAngleSet(self.angles))
        } else {
            Err(ArmError::PhysicallyInvalidAngle { angles: self.angles })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulatedArm;

    #[test]
    fn test_joint2_polynomial() {
        let servos = ServoCalibration::nxt_arm();
        assert_eq!(servos.joint2.command(0.0), -30.0);
        for alpha in [68.0, 90.0, 120.0, 149.0] {
            let expected = 0.0333 * alpha * alpha - 3.0 * alpha - 30.0;
            assert!((servos.joint2.command(alpha) - expected).abs() < 1e-9, "alpha {}", alpha);
        }
    }

    #[test]
    fn test_joint2_turning_point() {
        // Vertex at 3 / (2 * 0.0333) = 45.045 degrees: decreasing below, increasing above.
        let servos = ServoCalibration::nxt_arm();
        assert!(servos.joint2.command(30.0) > servos.joint2.command(40.0));
        assert!(servos.joint2.command(50.0) > servos.joint2.command(46.0));
        assert!(servos.joint2.command(90.0) < servos.joint2.command(120.0));
    }

    #[test]
    fn test_joint3_polynomial() {
        let servos = ServoCalibration::nxt_arm();
        assert_eq!(servos.joint3.command(0.0), 25.0);
        for beta in [-85.0, -45.0, 10.0, 45.0, 85.0] {
            let expected: f64 = -0.00001 * f64::powi(beta, 3) - 0.0015 * beta * beta + 0.9472 * beta + 25.0;
            assert!((servos.joint3.command(beta) - expected).abs() < 1e-9, "beta {}", beta);
        }
        assert!((servos.joint3.command(45.0) - 63.67525).abs() < 1e-9);
        assert_eq!(servos.joint3.polynomial.degree(), 3);
    }

    #[test]
    fn test_invalid_solution_cannot_be_applied() {
        let solution = Solution { angles: AngleSet::new(40.0, 0.0, 0.0), valid: false };
        assert!(matches!(solution.validated(), Err(ArmError::PhysicallyInvalidAngle { .. })));
        let limits = JointLimits::nxt_arm();
        assert!(ValidAngleSet::new(AngleSet::new(150.0, 0.0, 0.0), &limits).is_err());
        assert!(ValidAngleSet::new(AngleSet::new(149.0, 0.0, 0.0), &limits).is_ok());
    }

    #[test]
    fn test_apply_sends_both_channels() {
        let servos = ServoCalibration::nxt_arm();
        let mut arm = SimulatedArm::new(360);
        let solution = Solution { angles: AngleSet::new(90.0, 45.0, 10.0), valid: true };
        servos.apply(&mut arm, &solution.validated().unwrap()).unwrap();

        let j2 = arm.servo_command(JointId::Shoulder, 1).expect("joint 2 commanded");
        let j3 = arm.servo_command(JointId::Elbow, 2).expect("joint 3 commanded");
        assert!((j2 - (0.0333 * 8100.0 - 270.0 - 30.0)).abs() < 1e-9);
        assert!((j3 - 63.67525).abs() < 1e-9);
    }

    #[test]
    fn test_empty_polynomial_rejected() {
        let mut servos = ServoCalibration::nxt_arm();
        servos.joint3.polynomial = CalibrationPolynomial::new(vec![]);
        assert!(matches!(servos.check(), Err(ParameterError::InvalidLength { .. })));
        assert_eq!(servos.joint3.command(12.0), 0.0);
    }
}
