//! Model container and tick loop for the herd agent simulation kernel.
//!
//! A [`Model`] owns one [`World`](herd_core::World) and the three agent
//! sets living in it: patches, turtles and links. Operations that touch
//! more than one set (creating turtles on patches, killing a turtle and
//! its links, asking with the whole model as context) live here.
//!
//! [`Simulation`] drives a [`Behavior`] over a model, one step per tick.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod model;
pub mod sample;
pub mod simulation;

pub use config::{ConfigError, ModelConfig};
pub use error::ModelError;
pub use model::Model;
pub use sample::sample_model;
pub use simulation::{Behavior, Simulation};
