//! Supports reading the arm configuration from YAML file (optional)

use std::path::Path;
use std::time::Duration;
use regex::Regex;
use yaml_rust2::{Yaml, YamlLoader};

use crate::calibration::{CalibrationPolynomial, ServoChannel};
use crate::constraints::JointLimits;
use crate::parameter_error::ParameterError;
use crate::parameters::arm_kinematics::{ArmConfig, ArmGeometry, HomingParameters};

impl ArmConfig {
    /// Read the arm configuration from YAML file. YAML file like this is supported:
    /// ```yaml
    /// arm_geometry:
    ///   shoulder: 160.0
    ///   forearm: 170.0
    ///   l1: 160.0
    ///   l2: 170.0
    ///   cone_half_angle: deg(30)
    /// joint_limits:
    ///   alpha: [60.0, 150.0]
    ///   beta: [-90.0, 90.0]
    /// servo_calibration:
    ///   joint2:
    ///     channel: 1
    ///     coefficients: [-30.0, -3.0, 0.0333]
    ///   joint3:
    ///     channel: 2
    ///     coefficients: [25.0, 0.9472, -0.0015, -0.00001]
    /// homing:
    ///   full_rotation_ticks: 360
    ///   scan_power: 40
    ///   return_power: 75
    ///   tolerance: 0
    ///   initial_min_distance: 255
    ///   poll_interval_ms: 1
    ///   stall_polls: 250
    ///   max_polls: 100000
    ///   timeout_ms: 60000
    /// ```
    /// All sections and keys are optional, missing values are taken from
    /// [`ArmConfig::nxt_arm`]. `timeout_ms: ~` disables the timeout.
    ///
    /// Angles stored in radians can be written as deg(angle). Joint limits are in degrees
    /// and are written as plain numbers. Coefficients of the servo polynomials are lowest
    /// order first.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ParameterError> {
        let contents = expand_degrees(contents)?;
        let docs = YamlLoader::load_from_str(&contents)
            .map_err(|e| ParameterError::ParseError(format!("{}", e)))?;
        let defaults = ArmConfig::nxt_arm();
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(defaults),
        };
        if doc.as_hash().is_none() {
            return Err(ParameterError::ParseError("top level must be a mapping".to_string()));
        }

        let g = &doc["arm_geometry"];
        let dg = defaults.geometry;
        let geometry = ArmGeometry {
            shoulder: number(&g["shoulder"], "arm_geometry.shoulder")?.unwrap_or(dg.shoulder),
            forearm: number(&g["forearm"], "arm_geometry.forearm")?.unwrap_or(dg.forearm),
            l1: number(&g["l1"], "arm_geometry.l1")?.unwrap_or(dg.l1),
            l2: number(&g["l2"], "arm_geometry.l2")?.unwrap_or(dg.l2),
            cone_half_angle: number(&g["cone_half_angle"], "arm_geometry.cone_half_angle")?
                .unwrap_or(dg.cone_half_angle),
        };

        let l = &doc["joint_limits"];
        let limits = JointLimits {
            alpha: range(&l["alpha"], "joint_limits.alpha")?.unwrap_or(defaults.limits.alpha),
            beta: range(&l["beta"], "joint_limits.beta")?.unwrap_or(defaults.limits.beta),
        };

        let s = &doc["servo_calibration"];
        let mut servos = defaults.servos.clone();
        servos.joint2 = servo(&s["joint2"], "servo_calibration.joint2", servos.joint2)?;
        servos.joint3 = servo(&s["joint3"], "servo_calibration.joint3", servos.joint3)?;

        let h = &doc["homing"];
        let dh = defaults.homing;
        let homing = HomingParameters {
            full_rotation_ticks: integer(&h["full_rotation_ticks"], "homing.full_rotation_ticks")?
                .unwrap_or(dh.full_rotation_ticks),
            scan_power: power(&h["scan_power"], "homing.scan_power")?.unwrap_or(dh.scan_power),
            return_power: power(&h["return_power"], "homing.return_power")?.unwrap_or(dh.return_power),
            tolerance: integer(&h["tolerance"], "homing.tolerance")?.unwrap_or(dh.tolerance),
            initial_min_distance: number(&h["initial_min_distance"], "homing.initial_min_distance")?
                .unwrap_or(dh.initial_min_distance),
            poll_interval: millis(&h["poll_interval_ms"], "homing.poll_interval_ms")?
                .unwrap_or(dh.poll_interval),
            stall_polls: match integer(&h["stall_polls"], "homing.stall_polls")? {
                Some(v) => u32::try_from(v).map_err(|_| out_of_range("homing.stall_polls", v))?,
                None => dh.stall_polls,
            },
            max_polls: match integer(&h["max_polls"], "homing.max_polls")? {
                Some(v) => u64::try_from(v).map_err(|_| out_of_range("homing.max_polls", v))?,
                None => dh.max_polls,
            },
            timeout: match &h["timeout_ms"] {
                Yaml::Null => None,
                node => millis(node, "homing.timeout_ms")?.or(dh.timeout),
            },
        };

        let config = ArmConfig { geometry, limits, servos, homing };
        config.check()?;
        Ok(config)
    }
}

/// Replaces deg(angle) with the angle in radians.
fn expand_degrees(contents: &str) -> Result<String, ParameterError> {
    let re = Regex::new(r"deg\(\s*(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)\s*\)")
        .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?;
    Ok(re.replace_all(contents, |caps: &regex::Captures| {
        caps[1].parse::<f64>()
            .map(|degrees| format!("{:?}", degrees.to_radians()))
            .unwrap_or_else(|_| caps[0].to_string())
    }).into_owned())
}

fn number(node: &Yaml, field: &str) -> Result<Option<f64>, ParameterError> {
    match node {
        Yaml::BadValue => Ok(None),
        Yaml::Integer(value) => Ok(Some(*value as f64)),
        Yaml::Real(_) => node.as_f64().map(Some)
            .ok_or_else(|| ParameterError::ParseError(format!("{} is not a valid number", field))),
        _ => Err(ParameterError::ParseError(format!("{} must be a number", field))),
    }
}

fn integer(node: &Yaml, field: &str) -> Result<Option<i64>, ParameterError> {
    match node {
        Yaml::BadValue => Ok(None),
        Yaml::Integer(value) => Ok(Some(*value)),
        _ => Err(ParameterError::ParseError(format!("{} must be an integer", field))),
    }
}

fn millis(node: &Yaml, field: &str) -> Result<Option<Duration>, ParameterError> {
    match integer(node, field)? {
        Some(ms) => u64::try_from(ms)
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| out_of_range(field, ms)),
        None => Ok(None),
    }
}

fn power(node: &Yaml, field: &str) -> Result<Option<i8>, ParameterError> {
    match integer(node, field)? {
        Some(value) => i8::try_from(value).map(Some).map_err(|_| out_of_range(field, value)),
        None => Ok(None),
    }
}

fn numbers(node: &Yaml, field: &str) -> Result<Option<Vec<f64>>, ParameterError> {
    if node.is_badvalue() {
        return Ok(None);
    }
    let items = node.as_vec()
        .ok_or_else(|| ParameterError::ParseError(format!("{} must be a list", field)))?;
    let mut values = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let value = number(item, &format!("{}[{}]", field, i))?
            .ok_or_else(|| ParameterError::MissingField(format!("{}[{}]", field, i)))?;
        values.push(value);
    }
    Ok(Some(values))
}

fn range(node: &Yaml, field: &str) -> Result<Option<(f64, f64)>, ParameterError> {
    match numbers(node, field)? {
        Some(values) if values.len() == 2 => Ok(Some((values[0], values[1]))),
        Some(values) => Err(ParameterError::InvalidLength {
            field: field.to_string(),
            expected: 2,
            found: values.len(),
        }),
        None => Ok(None),
    }
}

fn servo(node: &Yaml, field: &str, default: ServoChannel) -> Result<ServoChannel, ParameterError> {
    let channel = match integer(&node["channel"], &format!("{}.channel", field))? {
        Some(value) => u8::try_from(value).map_err(|_| out_of_range(&format!("{}.channel", field), value))?,
        None => default.channel,
    };
    let polynomial = match numbers(&node["coefficients"], &format!("{}.coefficients", field))? {
        Some(coefficients) => CalibrationPolynomial::new(coefficients),
        None => default.polynomial,
    };
    Ok(ServoChannel { channel, polynomial })
}

fn out_of_range(field: &str, value: i64) -> ParameterError {
    ParameterError::InvalidValue {
        field: field.to_string(),
        reason: format!("{} is out of range", value),
    }
}
