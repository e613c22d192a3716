//! Hardcoded parameters of the arm as built

pub mod arm_kinematics {
    use std::time::Duration;
    use crate::calibration::ServoCalibration;
    use crate::constraints::JointLimits;
    use crate::parameters::arm_kinematics::{ArmConfig, ArmGeometry, HomingParameters};

    #[allow(dead_code)]
    impl ArmGeometry {
        /// Both links of the given length, workspace taken from the links.
        pub fn equal_links(length: f64) -> Self {
            ArmGeometry {
                shoulder: length,
                forearm: length,
                l1: length,
                l2: length,
                ..Self::nxt_arm()
            }
        }

        /// Links of the arm (millimeters). The workspace bounds are the link lengths.
        pub fn nxt_arm() -> Self {
            ArmGeometry {
                shoulder: 160.0,
                forearm: 170.0,
                l1: 160.0,
                l2: 170.0,
                cone_half_angle: 30.0_f64.to_radians(),
            }
        }
    }

    impl HomingParameters {
        /// NXT motor: 360 encoder ticks per revolution of the base, ultrasonic sensor
        /// that reports 255 when nothing is in range.
        pub fn nxt_arm() -> Self {
            HomingParameters {
                full_rotation_ticks: 360,
                scan_power: 40,
                return_power: 75,
                tolerance: 0,
                initial_min_distance: 255.0,
                poll_interval: Duration::from_millis(1),
                stall_polls: 250,
                max_polls: 100_000,
                timeout: Some(Duration::from_secs(60)),
            }
        }
    }

    impl ArmConfig {
        pub fn nxt_arm() -> Self {
            ArmConfig {
                geometry: ArmGeometry::nxt_arm(),
                limits: JointLimits::nxt_arm(),
                servos: ServoCalibration::nxt_arm(),
                homing: HomingParameters::nxt_arm(),
            }
        }
    }

    impl Default for ArmGeometry {
        fn default() -> Self {
            Self::nxt_arm()
        }
    }

    impl Default for HomingParameters {
        fn default() -> Self {
            Self::nxt_arm()
        }
    }

    impl Default for ArmConfig {
        fn default() -> Self {
            Self::nxt_arm()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_presets_pass_checks() {
            assert!(ArmConfig::nxt_arm().check().is_ok());
            let config = ArmConfig { geometry: ArmGeometry::equal_links(150.0), ..ArmConfig::nxt_arm() };
            assert!(config.check().is_ok());
        }

        #[test]
        fn test_bad_values_rejected() {
            let mut config = ArmConfig::nxt_arm();
            config.geometry.forearm = -1.0;
            assert!(config.check().is_err());

            let mut config = ArmConfig::nxt_arm();
            config.homing.full_rotation_ticks = 0;
            assert!(config.check().is_err());

            let mut config = ArmConfig::nxt_arm();
            config.homing.scan_power = 0;
            assert!(config.check().is_err());

            let mut config = ArmConfig::nxt_arm();
            config.homing.scan_power = -40;
            assert!(config.check().is_err());

            let mut config = ArmConfig::nxt_arm();
            config.geometry.cone_half_angle = 90.0_f64.to_radians();
            assert!(config.check().is_err());
        }
    }
}
