//! Rectangular numeric lattices for raster and field data.
//!
//! A [`DataSet`] is a `width x height` grid of `f64` values stored row
//! by row, with `(0, 0)` at the top-left. It is independent of the agent
//! model: patches import and export their numeric variables through it,
//! and terrain-style computations (gradients, slope, blur) run on it
//! directly.
//!
//! Transforms return new data sets. Only [`DataSet::set_xy`] and
//! [`DataSet::convert_type`] modify one in place.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod kernel;

pub use dataset::{DataSet, DataType};
pub use error::DataSetError;
pub use kernel::{Kernel, SlopeAspect};
