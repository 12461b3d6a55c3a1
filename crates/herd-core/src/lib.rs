//! Core types and helpers for the herd agent simulation kernel.
//!
//! This is the leaf crate with no internal dependencies. It defines
//! the identifiers shared by every agent set, the [`World`] coordinate
//! system, angle [`Geometry`] conventions, and the pure numeric helpers
//! used by the grid and agent layers above it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;
pub mod math;
pub mod random;
pub mod world;

pub use error::{MathError, WorldError};
pub use geometry::Geometry;
pub use id::{AgentId, BreedId};
pub use world::{BBox, BBoxTransform, World, WorldOptions};
