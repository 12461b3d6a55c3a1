//! Error types for world construction and numeric helpers.

use std::error::Error;
use std::fmt;

/// Errors from building a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq)]
pub enum WorldError {
    /// A bound supplied as a float was not an integer.
    NonIntegerBound {
        /// Name of the offending bound (e.g. `"max_x"`).
        name: &'static str,
        /// The value supplied.
        value: f64,
    },
    /// An axis has `min > max`, leaving no patches along it.
    InvertedBounds {
        /// Axis name: `'x'`, `'y'` or `'z'`.
        axis: char,
        /// Lower bound.
        min: i32,
        /// Upper bound.
        max: i32,
    },
    /// The grid has more patches than a `u32` id can number.
    TooManyPatches {
        /// Patches the bounds describe, saturated at `u64::MAX`.
        count: u64,
    },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonIntegerBound { name, value } => {
                write!(f, "world bound {name} must be an integer, got {value}")
            }
            Self::InvertedBounds { axis, min, max } => {
                write!(f, "world {axis} bounds inverted: min {min} > max {max}")
            }
            Self::TooManyPatches { count } => {
                write!(f, "world has {count} patches, more than u32::MAX")
            }
        }
    }
}

impl Error for WorldError {}

/// Errors from the numeric helpers in [`math`](crate::math).
#[derive(Clone, Debug, PartialEq)]
pub enum MathError {
    /// `lerp_scale` was asked to scale within an empty range.
    DegenerateRange {
        /// The shared value of `lo` and `hi`.
        bound: f64,
    },
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateRange { bound } => {
                write!(f, "cannot scale within degenerate range [{bound}, {bound}]")
            }
        }
    }
}

impl Error for MathError {}
