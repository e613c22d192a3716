//! Homing of the base joint.
//!
//! The base has no index mark. To find a repeatable zero, the base makes a full revolution
//! while the ranging sensor is sampled, and the encoder position of the closest reading
//! (the nearest wall or marker) is recorded. The base then returns there by the shorter way
//! and the encoder is zeroed at that position.
//!
//! ```
//! use rs_servo_arm_kinematics::hardware::NoDelay;
//! use rs_servo_arm_kinematics::homing::BaseHoming;
//! use rs_servo_arm_kinematics::parameters::arm_kinematics::HomingParameters;
//! use rs_servo_arm_kinematics::simulation::SimulatedArm;
//!
//! let parameters = HomingParameters::nxt_arm();
//! let mut arm = SimulatedArm::new(parameters.full_rotation_ticks).with_reference_at(120.0);
//! let report = BaseHoming::new(&parameters).run(&mut arm, &mut NoDelay).unwrap();
//! assert!(report.reference_found);
//! assert!((arm.base_angle() - 120.0).abs() < 5.0);
//! ```

use std::time::Instant;
use tracing::{debug, info, warn};
use crate::arm_error::{ArmError, MotionPhase};
use crate::base_drive::BaseDrive;
use crate::control_loop::{CancellationToken, PollingLoop, Step};
use crate::hardware::{ArmHardware, Delay};
use crate::kinematic_traits::JointId;
use crate::parameters::arm_kinematics::HomingParameters;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HomingState {
    /// Rotating at the scan power, sampling the distance each poll.
    Scanning,
    /// Rotating back to the encoder value where the closest distance was seen.
    Returning { target: i64 },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingReport {
    /// Closest distance seen during the scan.
    pub min_distance: f64,
    /// Encoder value, counted from the start of the scan, of the closest distance.
    pub target_ticks: i64,
    /// False if no reading was closer than the initial minimum. The base then
    /// stays where the scan started.
    pub reference_found: bool,
    /// Encoder value when the base stopped at the reference, before zeroing.
    pub stopped_at: i64,
}

pub struct BaseHoming<'a> {
    parameters: &'a HomingParameters,
    drive: BaseDrive,
    cancel: Option<CancellationToken>,
}

impl<'a> BaseHoming<'a> {
    pub fn new(parameters: &'a HomingParameters) -> Self {
        BaseHoming {
            parameters,
            drive: BaseDrive::new(parameters.full_rotation_ticks),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Runs the homing. Blocks until the base is at the reference with the encoder zeroed,
    /// or until the motion stalls, times out or is cancelled. The motor is stopped in all
    /// cases.
    pub fn run<H, D>(&self, hardware: &mut H, delay: &mut D) -> Result<HomingReport, ArmError>
    where
        H: ArmHardware + ?Sized,
        D: Delay + ?Sized,
    {
        let p = self.parameters;
        let deadline = p.timeout.map(|timeout| Instant::now() + timeout);
        let mut polling = PollingLoop::new(delay, p.poll_interval, p.max_polls, p.stall_polls)
            .with_deadline(deadline)
            .with_cancellation(self.cancel.clone());

        let mut report = HomingReport {
            min_distance: p.initial_min_distance,
            target_ticks: 0,
            reference_found: false,
            stopped_at: 0,
        };
        let mut state = HomingState::Scanning;
        loop {
            debug!("Homing state {:?}", state);
            state = match state {
                HomingState::Scanning => {
                    let (min_distance, target) = self.scan(hardware, &mut polling)?;
                    report.min_distance = min_distance;
                    report.target_ticks = target;
                    report.reference_found = min_distance < p.initial_min_distance;
                    if report.reference_found {
                        info!("Closest distance {} at {} ticks", min_distance, target);
                    } else {
                        warn!("No distance below {} seen, keeping the start position as reference",
                              p.initial_min_distance);
                    }
                    HomingState::Returning { target }
                }
                HomingState::Returning { target } => {
                    hardware.reset_encoder(JointId::Base)?;
                    report.stopped_at = self.drive.move_to_target(
                        hardware, &mut polling, target, p.return_power, p.tolerance)?;
                    HomingState::Done
                }
                HomingState::Done => {
                    self.drive.stop(hardware)?;
                    hardware.reset_encoder(JointId::Base)?;
                    info!("Base homed, stopped at {} ticks from the scan start", report.stopped_at);
                    return Ok(report);
                }
            };
        }
    }

    /// Makes a full revolution, returning the closest distance and its encoder value.
    fn scan<H, D>(&self, hardware: &mut H, polling: &mut PollingLoop<D>) -> Result<(f64, i64), ArmError>
    where
        H: ArmHardware + ?Sized,
        D: Delay + ?Sized,
    {
        let p = self.parameters;
        let mut min_distance = p.initial_min_distance;
        let mut target = 0;

        hardware.reset_encoder(JointId::Base)?;
        self.drive.rotate(hardware, true, p.scan_power)?;
        let result = polling.run(MotionPhase::Scanning, |_| {
            let encoder = hardware.read_encoder(JointId::Base)?;
            if encoder >= p.full_rotation_ticks {
                return Ok(Step::Done(()));
            }
            let distance = hardware.read_distance()?;
            if distance < min_distance {
                min_distance = distance;
                target = encoder;
            }
            Ok(Step::Pending { encoder })
        });
        self.drive.finish(hardware, result)?;
        Ok((min_distance, target))
    }
}
