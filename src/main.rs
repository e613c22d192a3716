use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rs_servo_arm_kinematics::controller::ArmController;
use rs_servo_arm_kinematics::hardware::NoDelay;
use rs_servo_arm_kinematics::kinematic_traits::{Kinematics, Point};
use rs_servo_arm_kinematics::kinematics_impl::ArmKinematics;
use rs_servo_arm_kinematics::parameters::arm_kinematics::ArmConfig;
use rs_servo_arm_kinematics::simulation::SimulatedArm;
use rs_servo_arm_kinematics::utils::dump_solution;
use rs_servo_arm_kinematics::workspace;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ArmConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => ArmConfig::nxt_arm(),
    };

    match cli.command {
        Command::Solve(target) => solve(&config, &target.point()),
        Command::Check(target) => check(&config, &target.point()),
        Command::Home(args) => home(config, &args),
        Command::Config => {
            print!("{}", config.to_yaml());
            Ok(())
        }
    }
}

#[derive(Parser)]
#[command(name = "rs-servo-arm-kinematics", about = "Inverse kinematics and homing of the servo arm")]
struct Cli {
    /// YAML configuration of the arm. The built-in preset is used if not given.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute joint angles and servo commands for the target point.
    Solve(Target),
    /// Check if the target point is in the workspace.
    Check(Target),
    /// Home the base joint of a simulated arm.
    Home(HomeArgs),
    /// Print the configuration in use as YAML.
    Config,
}

#[derive(Args)]
struct Target {
    #[arg(allow_hyphen_values = true)]
    x: f64,
    #[arg(allow_hyphen_values = true)]
    y: f64,
    #[arg(allow_hyphen_values = true)]
    z: f64,
}

impl Target {
    fn point(&self) -> Point {
        Point::new(self.x, self.y, self.z)
    }
}

#[derive(Args)]
struct HomeArgs {
    /// Base angle, in degrees, where the simulated wall is closest.
    #[arg(long, default_value_t = 90.0)]
    reference: f64,
}

fn solve(config: &ArmConfig, point: &Point) -> Result<()> {
    let kinematics = ArmKinematics::new_with_limits(config.geometry, config.limits);
    if !kinematics.reachable(point) {
        println!("Point is outside the workspace, solving anyway");
    }
    let solution = kinematics.inverse(point)?;
    dump_solution(&solution);
    match solution.validated() {
        Ok(angles) => {
            println!("J2 channel {}: {:.3}", config.servos.joint2.channel,
                     config.servos.joint2_command(&angles));
            println!("J3 channel {}: {:.3}", config.servos.joint3.channel,
                     config.servos.joint3_command(&angles));
        }
        Err(err) => println!("{}", err),
    }
    Ok(())
}

fn check(config: &ArmConfig, point: &Point) -> Result<()> {
    let region = workspace::region(&config.geometry, point);
    let valid = workspace::is_point_valid(&config.geometry, point);
    println!("{:?} region, {}", region, if valid { "reachable" } else { "NOT reachable" });
    Ok(())
}

fn home(config: ArmConfig, args: &HomeArgs) -> Result<()> {
    let arm = SimulatedArm::new(config.homing.full_rotation_ticks).with_reference_at(args.reference);
    let mut controller = ArmController::new_with_delay(config, arm, NoDelay)
        .context("invalid configuration")?;
    let report = controller.home_base().context("homing failed")?;
    println!("Closest distance {:.1} at {} ticks, base now at {:.1} degrees",
             report.min_distance, report.target_ticks, controller.hardware().base_angle());
    Ok(())
}
