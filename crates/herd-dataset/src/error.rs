//! Errors from data set construction and strict lattice access.

use std::error::Error;
use std::fmt;

/// Errors from [`DataSet`](crate::DataSet) operations.
#[derive(Clone, Debug, PartialEq)]
pub enum DataSetError {
    /// The data buffer length is not `width * height`.
    LengthMismatch {
        /// Buffer length supplied.
        len: usize,
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// A coordinate lies outside `[0, width-1] x [0, height-1]`.
    OutOfBounds {
        /// Requested x.
        x: f64,
        /// Requested y.
        y: f64,
        /// Lattice width.
        width: usize,
        /// Lattice height.
        height: usize,
    },
    /// Two data sets cannot be combined along the requested edge.
    DimensionMismatch {
        /// The operation attempted.
        op: &'static str,
        /// Extent of this data set along the shared edge.
        expected: usize,
        /// Extent of the other data set.
        actual: usize,
    },
}

impl fmt::Display for DataSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { len, width, height } => {
                write!(f, "data length {len} != {width} * {height}")
            }
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => {
                write!(f, "({x}, {y}) outside {width}x{height} data set")
            }
            Self::DimensionMismatch {
                op,
                expected,
                actual,
            } => {
                write!(f, "{op}: edge lengths differ ({expected} vs {actual})")
            }
        }
    }
}

impl Error for DataSetError {}
