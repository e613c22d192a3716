//! Defines the arm parameter data structures

pub mod arm_kinematics {
    use std::time::Duration;
    use crate::calibration::{CalibrationPolynomial, ServoCalibration};
    use crate::constraints::JointLimits;
    use crate::parameter_error::ParameterError;
    use crate::utils::deg;

    /// Link lengths of the arm. See [parameters_robots.rs](parameters_robots.rs) for the preset.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ArmGeometry {
        /// Length of the shoulder segment (between J2 and J3).
        pub shoulder: f64,

        /// Length of the forearm segment (between J3 and the end effector).
        pub forearm: f64,

        /// Inner radius of the workspace used by the reachability check. This is
        /// the shoulder segment for the arm as built.
        pub l1: f64,

        /// Outer extent beyond `l1`, so the workspace shell reaches `l1 + l2`.
        pub l2: f64,

        /// Half angle of the cones cut off from the workspace, in radians.
        pub cone_half_angle: f64,
    }

    /// Parameters of the base homing routine and base positioning.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct HomingParameters {
        /// Encoder ticks of one full revolution of the base.
        pub full_rotation_ticks: i64,

        /// Motor power while scanning the surroundings.
        pub scan_power: i8,

        /// Motor power while moving to the target.
        pub return_power: i8,

        /// Allowed difference, in ticks, between the encoder and the target.
        pub tolerance: i64,

        /// Distance assumed before the first sample. Readings at or above it are never
        /// taken as the reference.
        pub initial_min_distance: f64,

        /// Pause between two polls of the hardware.
        pub poll_interval: Duration,

        /// Polls without any encoder change, while the motor is powered, before the
        /// motion is declared stalled.
        pub stall_polls: u32,

        /// Upper bound of polls for a single motion phase.
        pub max_polls: u64,

        /// Time allowed for the whole routine. None means only the poll bounds apply.
        pub timeout: Option<Duration>,
    }

    /// Complete configuration of the arm, read only after startup.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ArmConfig {
        pub geometry: ArmGeometry,
        pub limits: JointLimits,
        pub servos: ServoCalibration,
        pub homing: HomingParameters,
    }

    impl ArmGeometry {
        pub fn check(&self) -> Result<(), ParameterError> {
            for (name, value) in [
                ("shoulder", self.shoulder), ("forearm", self.forearm),
                ("l1", self.l1), ("l2", self.l2),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ParameterError::InvalidValue {
                        field: format!("arm_geometry.{}", name),
                        reason: format!("must be finite and positive (got {})", value),
                    });
                }
            }
            if !self.cone_half_angle.is_finite()
                || self.cone_half_angle <= 0.0
                || self.cone_half_angle >= std::f64::consts::FRAC_PI_2 {
                return Err(ParameterError::InvalidValue {
                    field: "arm_geometry.cone_half_angle".to_string(),
                    reason: format!("must be between 0 and 90 degrees (got {})",
                                    deg(&self.cone_half_angle)),
                });
            }
            Ok(())
        }
    }

    impl HomingParameters {
        pub fn check(&self) -> Result<(), ParameterError> {
            if self.full_rotation_ticks <= 0 {
                return Err(ParameterError::InvalidValue {
                    field: "homing.full_rotation_ticks".to_string(),
                    reason: format!("must be positive (got {})", self.full_rotation_ticks),
                });
            }
            for (name, power) in [("scan_power", self.scan_power), ("return_power", self.return_power)] {
                if !(1..=100).contains(&power) {
                    return Err(ParameterError::InvalidValue {
                        field: format!("homing.{}", name),
                        reason: format!("must be within [1, 100], the direction is chosen by the motion (got {})", power),
                    });
                }
            }
            if self.tolerance < 0 {
                return Err(ParameterError::InvalidValue {
                    field: "homing.tolerance".to_string(),
                    reason: format!("must not be negative (got {})", self.tolerance),
                });
            }
            if self.stall_polls == 0 || self.max_polls == 0 {
                return Err(ParameterError::InvalidValue {
                    field: "homing.stall_polls, homing.max_polls".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            Ok(())
        }
    }

    impl ArmConfig {
        /// Checks all sections, reporting the first problem found.
        pub fn check(&self) -> Result<(), ParameterError> {
            self.geometry.check()?;
            self.limits.check()?;
            self.servos.check()?;
            self.homing.check()
        }

        /// Convert to string yaml representation (quick viewing, saving the configuration).
        /// The output can be read back with `from_yaml`.
        pub fn to_yaml(&self) -> String {
            let g = &self.geometry;
            let h = &self.homing;
            format!(
                "arm_geometry:\n  \
                  shoulder: {:?}\n  \
                  forearm: {:?}\n  \
                  l1: {:?}\n  \
                  l2: {:?}\n  \
                  cone_half_angle: {}\n\
                joint_limits:\n  \
                  alpha: [{:?}, {:?}]\n  \
                  beta: [{:?}, {:?}]\n\
                servo_calibration:\n  \
                  joint2:\n    \
                    channel: {}\n    \
                    coefficients: [{}]\n  \
                  joint3:\n    \
                    channel: {}\n    \
                    coefficients: [{}]\n\
                homing:\n  \
                  full_rotation_ticks: {}\n  \
                  scan_power: {}\n  \
                  return_power: {}\n  \
                  tolerance: {}\n  \
                  initial_min_distance: {:?}\n  \
                  poll_interval_ms: {}\n  \
                  stall_polls: {}\n  \
                  max_polls: {}\n  \
                  timeout_ms: {}\n",
                g.shoulder, g.forearm, g.l1, g.l2, deg(&g.cone_half_angle),
                self.limits.alpha.0, self.limits.alpha.1,
                self.limits.beta.0, self.limits.beta.1,
                self.servos.joint2.channel, coefficients(&self.servos.joint2.polynomial),
                self.servos.joint3.channel, coefficients(&self.servos.joint3.polynomial),
                h.full_rotation_ticks, h.scan_power, h.return_power, h.tolerance,
                h.initial_min_distance, h.poll_interval.as_millis(),
                h.stall_polls, h.max_polls,
                h.timeout.map_or("~".to_string(), |t| t.as_millis().to_string()),
            )
        }
    }

    fn coefficients(polynomial: &CalibrationPolynomial) -> String {
        polynomial.coefficients().iter()
            .map(|c| format!("{:?}", c))
            .collect::<Vec<_>>().join(", ")
    }
}
