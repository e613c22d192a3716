#[cfg(test)]
mod tests {
    use crate::arm_error::{ArmError, MotionPhase, StallCause};
    use crate::controller::ArmController;
    use crate::hardware::NoDelay;
    use crate::kinematic_traits::{JointId, Point};
    use crate::parameters::arm_kinematics::ArmConfig;
    use crate::simulation::SimulatedArm;

    fn geared_config() -> ArmConfig {
        ArmConfig::from_yaml_file("src/tests/data/geared_base.yaml")
            .expect("Failed to load configuration from file")
    }

    #[test]
    fn test_homing_all_around() {
        let config = ArmConfig::nxt_arm();
        for reference in [10.0, 45.0, 135.0, 179.0, 181.0, 225.0, 300.0, 355.0] {
            let arm = SimulatedArm::new(config.homing.full_rotation_ticks).with_reference_at(reference);
            let mut controller = ArmController::new_with_delay(config.clone(), arm, NoDelay).unwrap();
            let report = controller.home_base().expect("homing must succeed");
            assert!(report.reference_found);

            let angle = controller.hardware().base_angle();
            let off = (angle - reference).rem_euclid(360.0);
            assert!(off.min(360.0 - off) < 4.0, "reference {}: base at {}", reference, angle);
        }
    }

    #[test]
    fn test_homing_geared_base_with_tolerance() {
        let config = geared_config();
        let arm = SimulatedArm::new(config.homing.full_rotation_ticks)
            .with_reference_at(200.0)
            .with_speed(0.2);
        let mut controller = ArmController::new_with_delay(config, arm, NoDelay).unwrap();
        let report = controller.home_base().unwrap();
        // 200 degrees is 800 of 1440 ticks: returning counter-clockwise
        assert_eq!(report.target_ticks, 800);
        assert!(report.stopped_at < 0);
        assert!((controller.hardware().base_angle() - 200.0).abs() < 4.0,
                "base at {}", controller.hardware().base_angle());
    }

    #[test]
    fn test_slow_motor_is_not_a_stall() {
        // A fraction of a tick per poll repeats encoder values, but well below the stall limit.
        let config = ArmConfig::nxt_arm();
        let arm = SimulatedArm::new(config.homing.full_rotation_ticks)
            .with_reference_at(60.0)
            .with_speed(0.005);
        let mut controller = ArmController::new_with_delay(config, arm, NoDelay).unwrap();
        controller.home_base().expect("slow homing must succeed");
        assert!((controller.hardware().base_angle() - 60.0).abs() < 4.0);
    }

    #[test]
    fn test_stall_while_positioning() {
        // Base homed, then the motor jams before moving to theta.
        let mut config = ArmConfig::nxt_arm();
        config.homing.stall_polls = 5;
        let arm = SimulatedArm::new(config.homing.full_rotation_ticks).with_reference_at(90.0);
        let mut controller = ArmController::new_with_delay(config, arm, NoDelay).unwrap();
        controller.home_base().unwrap();

        controller.hardware_mut().set_stalled(true);
        let result = controller.move_to_point(&Point::new(200.0, 100.0, 100.0));
        assert!(matches!(result, Err(ArmError::HomingStall {
            phase: MotionPhase::Positioning, cause: StallCause::NoProgress, ..
        })), "{:?}", result);
        assert_eq!(controller.hardware().motor_power(), 0);
        assert!(controller.hardware().servo_command(JointId::Shoulder, 1).is_none());
    }
}
