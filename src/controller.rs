//! Moving the arm to a point: workspace check, inverse kinematics, joint limits,
//! then the base motor and the servos.

use std::time::Instant;
use tracing::{debug, info, warn};
use crate::arm_error::ArmError;
use crate::base_drive::BaseDrive;
use crate::calibration::ValidAngleSet;
use crate::control_loop::{CancellationToken, PollingLoop};
use crate::hardware::{ArmHardware, Delay, ThreadDelay};
use crate::homing::{BaseHoming, HomingReport};
use crate::kinematic_traits::{Kinematics, Point};
use crate::kinematics_impl::ArmKinematics;
use crate::parameter_error::ParameterError;
use crate::parameters::arm_kinematics::ArmConfig;

pub struct ArmController<H: ArmHardware, D: Delay = ThreadDelay> {
    config: ArmConfig,
    kinematics: ArmKinematics,
    drive: BaseDrive,
    hardware: H,
    delay: D,
    cancel: Option<CancellationToken>,
}

impl<H: ArmHardware> ArmController<H, ThreadDelay> {
    pub fn new(config: ArmConfig, hardware: H) -> Result<Self, ParameterError> {
        Self::new_with_delay(config, hardware, ThreadDelay)
    }
}

impl<H: ArmHardware, D: Delay> ArmController<H, D> {
    /// Fails if the configuration does not pass [`ArmConfig::check`].
    pub fn new_with_delay(config: ArmConfig, hardware: H, delay: D) -> Result<Self, ParameterError> {
        config.check()?;
        Ok(ArmController {
            kinematics: ArmKinematics::new_with_limits(config.geometry, config.limits),
            drive: BaseDrive::new(config.homing.full_rotation_ticks),
            config,
            hardware,
            delay,
            cancel: None,
        })
    }

    /// Motions started after this call stop with `ArmError::Cancelled` once the token
    /// is cancelled.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    pub fn kinematics(&self) -> &ArmKinematics {
        &self.kinematics
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn into_hardware(self) -> H {
        self.hardware
    }

    /// Joint angles for the point, only if the point is in the workspace, the solver
    /// succeeds and the joints can take the angles.
    pub fn plan(&self, point: &Point) -> Result<ValidAngleSet, ArmError> {
        if !self.kinematics.reachable(point) {
            warn!("({}, {}, {}) is outside the workspace", point.x, point.y, point.z);
            return Err(ArmError::OutOfWorkspace { point: *point });
        }
        let solution = self.kinematics.inverse(point)?;
        debug!("Solution {} valid: {}", solution.angles, solution.valid);
        solution.validated()
    }

    /// Rotates the base to theta and sets the shoulder and elbow servos. The base encoder
    /// must be referenced (see [`ArmController::home_base`]).
    pub fn move_to_point(&mut self, point: &Point) -> Result<ValidAngleSet, ArmError> {
        let angles = self.plan(point)?;
        let h = &self.config.homing;
        let deadline = h.timeout.map(|timeout| Instant::now() + timeout);
        let mut polling = PollingLoop::new(&mut self.delay, h.poll_interval, h.max_polls, h.stall_polls)
            .with_deadline(deadline)
            .with_cancellation(self.cancel.clone());

        let target = self.drive.ticks_for_angle(angles.theta());
        self.drive.move_to_ticks(&mut self.hardware, &mut polling, target, h.return_power, h.tolerance)?;
        self.config.servos.apply(&mut self.hardware, &angles)?;
        info!("Moved to ({}, {}, {}): {}", point.x, point.y, point.z, angles.angles());
        Ok(angles)
    }

    /// Finds the base reference with the ranging sensor and zeroes the encoder there.
    pub fn home_base(&mut self) -> Result<HomingReport, ArmError> {
        let mut homing = BaseHoming::new(&self.config.homing);
        if let Some(cancel) = &self.cancel {
            homing = homing.with_cancellation(cancel.clone());
        }
        homing.run(&mut self.hardware, &mut self.delay)
    }
}
