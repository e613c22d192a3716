//! Helper functions

use crate::kinematic_traits::{Point, Solution};

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Distance from the base axis to the point, projected on the x/z plane
/// (the plane in which the shoulder and the forearm move).
pub fn planar_reach(point: &Point) -> f64 {
    point.x.hypot(point.z)
}

/// Distance from the base axis to the point, projected on the x/y plane.
pub fn horizontal_reach(point: &Point) -> f64 {
    point.x.hypot(point.y)
}

/// Euclidean distance from the origin (J2) to the point.
pub fn distance_from_origin(point: &Point) -> f64 {
    point.coords.norm()
}

/// Print the solution angles and the validity flag.
#[allow(dead_code)]
pub fn dump_solution(solution: &Solution) {
    println!("{} {}", solution.angles, if solution.valid { "valid" } else { "INVALID" });
}

/// formatting for YAML output
pub(crate) fn deg(x: &f64) -> String {
    if *x == 0.0 {
        return "0".to_string();
    }
    format!("deg({:?})", x.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_conversion_round_trip() {
        for x in [-360.0, -270.0, -90.0, -45.5, 0.0, 1e-6, 30.0, 60.001, 149.999, 180.0, 360.0] {
            let back = rad_to_deg(deg_to_rad(x));
            assert!((back - x).abs() < 1e-9, "{} came back as {}", x, back);
        }
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..1000 {
            let x: f64 = rng.random_range(-360.0..360.0);
            assert!((rad_to_deg(deg_to_rad(x)) - x).abs() < 1e-9);
        }
    }

    #[test]
    fn test_known_angles() {
        assert!((deg_to_rad(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((rad_to_deg(std::f64::consts::FRAC_PI_6) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_lengths() {
        let p = Point::new(200.0, 100.0, 100.0);
        assert!((planar_reach(&p) - 223.60679774997897).abs() < 1e-9);
        assert!((horizontal_reach(&p) - 223.60679774997897).abs() < 1e-9);
        assert!((distance_from_origin(&p) - 60000.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_deg_formatting() {
        assert_eq!(deg(&0.0), "0");
        assert_eq!(deg(&25.5_f64.to_radians()), "deg(25.5)");
    }

    #[test]
    fn test_deg_keeps_full_precision() {
        for radians in [0.1234567_f64, std::f64::consts::FRAC_PI_6, 1.2345678901234567] {
            let text = deg(&radians);
            let degrees: f64 = text["deg(".len()..text.len() - 1].parse().unwrap();
            assert!((degrees.to_radians() - radians).abs() < 1e-15, "{} from {}", text, radians);
        }
    }
}
