//! Pure numeric and angle helpers.
//!
//! Angles come in three flavours: radians (0 = +x, counter-clockwise),
//! degrees (same orientation) and headings (0 = +y, clockwise degrees).
//! The `*_toward_xy` functions return a direction in the named flavour.

use std::f64::consts::PI;

use crate::error::MathError;

const TO_DEGREES: f64 = 180.0 / PI;
const TO_RADIANS: f64 = PI / 180.0;

// ── Scalars ─────────────────────────────────────────────────────

/// Floored modulus: the result has the sign of `n`.
///
/// `modulo(-1.0, 5.0) == 4.0`, unlike the `%` remainder operator.
pub fn modulo(v: f64, n: f64) -> f64 {
    ((v % n) + n) % n
}

/// Wrap `v` into `[min, max)`.
pub fn wrap(v: f64, min: f64, max: f64) -> f64 {
    min + modulo(v - min, max - min)
}

/// Clamp `v` into `[min, max]`.
pub fn clamp(v: f64, min: f64, max: f64) -> f64 {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

/// Whether `v` lies in `[min, max]` (inclusive).
pub fn is_between(v: f64, min: f64, max: f64) -> bool {
    min <= v && v <= max
}

/// Linear interpolation between `lo` and `hi`, `scale` in `[0, 1]`.
///
/// When `lo > hi` the scale runs from the `hi` end.
pub fn lerp(lo: f64, hi: f64, scale: f64) -> f64 {
    if lo <= hi {
        lo + (hi - lo) * scale
    } else {
        lo - (lo - hi) * scale
    }
}

/// Inverse of [`lerp`]: where `number` sits within `[lo, hi]`.
///
/// `number` is clamped into the range first.
pub fn lerp_scale(number: f64, lo: f64, hi: f64) -> Result<f64, MathError> {
    if lo == hi {
        return Err(MathError::DegenerateRange { bound: lo });
    }
    let number = clamp(number, lo, hi);
    Ok((number - lo) / (hi - lo))
}

/// Round to `digits` decimal places. Negative zero becomes zero.
pub fn precision(num: f64, digits: i32) -> f64 {
    let mult = 10f64.powi(digits);
    let rounded = (num * mult).round() / mult;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// ── Angles ──────────────────────────────────────────────────────

/// Degrees to radians, normalized to `[0, 2π)`.
pub fn deg_to_rad(degrees: f64) -> f64 {
    mod2pi(degrees * TO_RADIANS)
}

/// Radians to degrees, normalized to `[0, 360)`.
pub fn rad_to_deg(radians: f64) -> f64 {
    mod360(radians * TO_DEGREES)
}

/// Euclidean radians to a heading in `[0, 360)`.
pub fn rad_to_heading(radians: f64) -> f64 {
    mod360(90.0 - radians * TO_DEGREES)
}

/// A heading to euclidean radians.
pub fn heading_to_rad(heading: f64) -> f64 {
    mod360(90.0 - heading) * TO_RADIANS
}

/// Normalize degrees into `[0, 360)`.
pub fn mod360(degrees: f64) -> f64 {
    modulo(degrees, 360.0)
}

/// Normalize radians into `[0, 2π)`.
pub fn mod2pi(radians: f64) -> f64 {
    modulo(radians, 2.0 * PI)
}

/// Normalize radians into `[-π, π)`.
pub fn modpipi(radians: f64) -> f64 {
    mod2pi(radians) - PI
}

/// The angle in `(-π, π]` that, added to `rad0`, gives `rad1`.
pub fn subtract_radians(rad1: f64, rad0: f64) -> f64 {
    let dr = mod2pi(rad1 - rad0);
    if dr > PI {
        dr - 2.0 * PI
    } else {
        dr
    }
}

/// The angle in `(-180, 180]` that, added to `deg0`, gives `deg1`.
pub fn subtract_degrees(deg1: f64, deg0: f64) -> f64 {
    let d = mod360(deg1 - deg0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Smallest clockwise turn from heading `head0` to heading `head1`.
pub fn subtract_headings(head1: f64, head0: f64) -> f64 {
    -subtract_degrees(head1, head0)
}

/// Direction in radians, `[-π, π]`, from `(x, y)` to `(x1, y1)`.
pub fn radians_toward_xy(x: f64, y: f64, x1: f64, y1: f64) -> f64 {
    (y1 - y).atan2(x1 - x)
}

/// Heading from `(x, y)` to `(x1, y1)`.
pub fn heading_toward_xy(x: f64, y: f64, x1: f64, y1: f64) -> f64 {
    rad_to_heading(radians_toward_xy(x, y, x1, y1))
}

/// Direction in degrees from `(x, y)` to `(x1, y1)`.
pub fn degrees_toward_xy(x: f64, y: f64, x1: f64, y1: f64) -> f64 {
    rad_to_deg(radians_toward_xy(x, y, x1, y1))
}

// ── Distances ───────────────────────────────────────────────────

/// Squared euclidean distance in the plane.
pub fn sq_distance(x: f64, y: f64, x1: f64, y1: f64) -> f64 {
    (x - x1).powi(2) + (y - y1).powi(2)
}

/// Euclidean distance in the plane.
pub fn distance(x: f64, y: f64, x1: f64, y1: f64) -> f64 {
    sq_distance(x, y, x1, y1).sqrt()
}

/// Squared euclidean distance in 3D.
pub fn sq_distance3(x: f64, y: f64, z: f64, x1: f64, y1: f64, z1: f64) -> f64 {
    (x - x1).powi(2) + (y - y1).powi(2) + (z - z1).powi(2)
}

/// Euclidean distance in 3D.
pub fn distance3(x: f64, y: f64, z: f64, x1: f64, y1: f64, z1: f64) -> f64 {
    sq_distance3(x, y, z, x1, y1, z1).sqrt()
}

/// Whether `(x, y)` lies in the cone rooted at `(x0, y0)`.
///
/// The cone points along `direction` (radians), is `cone_angle` radians
/// wide and `radius` long.
pub fn in_cone(
    x: f64,
    y: f64,
    radius: f64,
    cone_angle: f64,
    direction: f64,
    x0: f64,
    y0: f64,
) -> bool {
    if sq_distance(x0, y0, x, y) > radius * radius {
        return false;
    }
    let angle = radians_toward_xy(x0, y0, x, y);
    cone_angle / 2.0 >= subtract_radians(direction, angle).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn modulo_is_floored() {
        assert_eq!(modulo(-1.0, 5.0), 4.0);
        assert_eq!(modulo(7.0, 5.0), 2.0);
        assert_eq!(modulo(0.0, 5.0), 0.0);
    }

    #[test]
    fn wrap_into_half_open_range() {
        assert_eq!(wrap(2.75, -2.5, 2.5), -2.25);
        assert_eq!(wrap(-2.75, -2.5, 2.5), 2.25);
        assert_eq!(wrap(1.0, -2.5, 2.5), 1.0);
    }

    #[test]
    fn clamp_and_between() {
        assert_eq!(clamp(3.0, 0.0, 2.0), 2.0);
        assert_eq!(clamp(-3.0, 0.0, 2.0), 0.0);
        assert!(is_between(2.0, 0.0, 2.0));
        assert!(!is_between(2.1, 0.0, 2.0));
    }

    #[test]
    fn lerp_runs_from_hi_when_inverted() {
        assert_eq!(lerp(0.0, 10.0, 0.25), 2.5);
        assert_eq!(lerp(10.0, 0.0, 0.25), 7.5);
    }

    #[test]
    fn lerp_scale_rejects_empty_range() {
        assert_eq!(lerp_scale(3.0, 0.0, 10.0), Ok(0.3));
        assert_eq!(lerp_scale(30.0, 0.0, 10.0), Ok(1.0));
        assert!(matches!(
            lerp_scale(1.0, 2.0, 2.0),
            Err(MathError::DegenerateRange { .. })
        ));
    }

    #[test]
    fn precision_rounds_and_drops_negative_zero() {
        assert_eq!(precision(1.234_56, 2), 1.23);
        assert_eq!(precision(-0.000_01, 2), 0.0);
        assert!(precision(-0.000_01, 2).is_sign_positive());
    }

    #[test]
    fn headings_and_radians() {
        assert!(close(rad_to_heading(0.0), 90.0));
        assert!(close(rad_to_heading(PI), 270.0));
        assert!(close(heading_to_rad(0.0), PI / 2.0));
        assert!(close(heading_to_rad(90.0), 0.0));
        assert!(close(heading_to_rad(180.0), 3.0 * PI / 2.0));
    }

    #[test]
    fn subtract_angles_pick_shortest_turn() {
        assert!(close(subtract_radians(0.1, 2.0 * PI - 0.1), 0.2));
        assert!(close(subtract_degrees(10.0, 350.0), 20.0));
        assert!(close(subtract_degrees(350.0, 10.0), -20.0));
        assert!(close(subtract_headings(10.0, 350.0), -20.0));
    }

    #[test]
    fn toward_xy_directions() {
        assert!(close(radians_toward_xy(0.0, 0.0, 0.0, 1.0), PI / 2.0));
        assert!(close(heading_toward_xy(0.0, 0.0, 0.0, -1.0), 180.0));
        assert!(close(heading_toward_xy(0.0, 0.0, 1.0, 0.0), 90.0));
        assert!(close(degrees_toward_xy(0.0, 0.0, -1.0, 0.0), 180.0));
    }

    #[test]
    fn distances() {
        assert_eq!(sq_distance(0.0, 0.0, 3.0, 4.0), 25.0);
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance3(0.0, 0.0, 0.0, 2.0, 3.0, 6.0), 7.0);
    }

    #[test]
    fn cone_membership() {
        // Cone pointing along +x, 90 degrees wide, radius 2.
        let cone = PI / 2.0;
        assert!(in_cone(1.0, 0.0, 2.0, cone, 0.0, 0.0, 0.0));
        assert!(in_cone(1.0, 0.9, 2.0, cone, 0.0, 0.0, 0.0));
        assert!(!in_cone(0.0, 1.0, 2.0, cone, 0.0, 0.0, 0.0));
        assert!(!in_cone(-1.0, 0.0, 2.0, cone, 0.0, 0.0, 0.0));
        assert!(!in_cone(3.0, 0.0, 2.0, cone, 0.0, 0.0, 0.0));
    }

    proptest! {
        #[test]
        fn wrap_stays_in_range(v in -1e6f64..1e6, min in -100.0f64..0.0, width in 0.5f64..100.0) {
            let max = min + width;
            let w = wrap(v, min, max);
            prop_assert!(w >= min - 1e-9 && w <= max + 1e-9);
        }

        #[test]
        fn subtract_radians_in_half_open_range(a in -20.0f64..20.0, b in -20.0f64..20.0) {
            let d = subtract_radians(a, b);
            prop_assert!(d > -PI - 1e-12 && d <= PI + 1e-12);
        }
    }
}
