//! Angle conventions a model can present to its scripts.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

const TO_DEG: f64 = 180.0 / PI;
const TO_RAD: f64 = PI / 180.0;

/// How a model reads and writes directions and turn angles.
///
/// Turtles always store their direction internally as euclidean radians
/// (`theta`). A `Geometry` converts between that and the user-facing
/// representation:
///
/// | Variant | Direction | Turn angle | Positive turn |
/// |---|---|---|---|
/// | `Radians` | radians, 0 = +x | radians | counter-clockwise |
/// | `Degrees` | degrees, 0 = +x | degrees | counter-clockwise |
/// | `Heading` | degrees, 0 = +y | degrees | clockwise |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    /// Native euclidean radians.
    Radians,
    /// Euclidean degrees.
    Degrees,
    /// Compass headings: 0 is up, angles grow clockwise.
    #[default]
    Heading,
}

impl Geometry {
    /// Convert a direction in this geometry to euclidean radians.
    pub fn to_rads(self, direction: f64) -> f64 {
        match self {
            Self::Radians => direction,
            Self::Degrees => direction * TO_RAD,
            Self::Heading => (90.0 - direction) * TO_RAD,
        }
    }

    /// Convert euclidean radians to a direction in this geometry.
    pub fn from_rads(self, rads: f64) -> f64 {
        match self {
            Self::Radians => rads,
            Self::Degrees => rads * TO_DEG,
            Self::Heading => 90.0 - rads * TO_DEG,
        }
    }

    /// Convert a relative angle (cone width, turn size) to radians.
    pub fn to_angle_rads(self, angle: f64) -> f64 {
        match self {
            Self::Radians => angle,
            Self::Degrees | Self::Heading => angle * TO_RAD,
        }
    }

    /// Convert a relative angle in radians back to this geometry.
    pub fn from_angle_rads(self, rads: f64) -> f64 {
        match self {
            Self::Radians => rads,
            Self::Degrees | Self::Heading => rads * TO_DEG,
        }
    }

    /// Flip a turn angle so that positive means counter-clockwise.
    pub fn to_ccw(self, angle: f64) -> f64 {
        match self {
            Self::Heading => -angle,
            Self::Radians | Self::Degrees => angle,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radians => write!(f, "radians"),
            Self::Degrees => write!(f, "degrees"),
            Self::Heading => write!(f, "heading"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn heading_zero_points_up() {
        let g = Geometry::Heading;
        assert!(close(g.to_rads(0.0), PI / 2.0));
        assert!(close(g.to_rads(90.0), 0.0));
        assert!(close(g.from_rads(0.0), 90.0));
    }

    #[test]
    fn round_trips() {
        for g in [Geometry::Radians, Geometry::Degrees, Geometry::Heading] {
            for v in [-30.0, 0.0, 45.0, 270.0] {
                assert!(close(g.from_rads(g.to_rads(v)), v), "{g} {v}");
                assert!(close(g.from_angle_rads(g.to_angle_rads(v)), v));
            }
        }
    }

    #[test]
    fn only_heading_flips_turns() {
        assert_eq!(Geometry::Heading.to_ccw(10.0), -10.0);
        assert_eq!(Geometry::Degrees.to_ccw(10.0), 10.0);
        assert_eq!(Geometry::Radians.to_ccw(-1.0), -1.0);
    }

    #[test]
    fn default_is_heading() {
        assert_eq!(Geometry::default(), Geometry::Heading);
    }
}
