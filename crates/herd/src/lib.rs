//! Herd: an agent-based simulation kernel with patches, turtles and links.
//!
//! This facade re-exports the public API of the herd sub-crates, so a
//! single `herd` dependency is enough for most models.
//!
//! # Quick start
//!
//! ```rust
//! use herd::prelude::*;
//!
//! struct Walkers;
//!
//! impl Behavior for Walkers {
//!     fn setup(&mut self, model: &mut Model) -> Result<(), ModelError> {
//!         model.create_turtles(Scope::Base, 20, |_, _| Ok(()))?;
//!         Ok(())
//!     }
//!
//!     fn step(&mut self, model: &mut Model) -> Result<(), ModelError> {
//!         model.ask_turtles(Scope::Base, |m, id| {
//!             m.forward(id, 0.5)?;
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let config = ModelConfig::with_world(WorldOptions::centered(8, 8, 0));
//! let mut sim = Simulation::new(config, Walkers).unwrap();
//! sim.setup().unwrap();
//! sim.run(10).unwrap();
//! assert_eq!(sim.model().ticks(), 10);
//! assert_eq!(sim.model().turtles.set().len(Scope::Base), 20);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `herd-core` | World bounds, geometry, ids, math and seeded randomness |
//! | [`dataset`] | `herd-dataset` | 2D rasters, sampling, convolution and slope/aspect |
//! | [`agents`] | `herd-agents` | Agent arrays and sets, patches, turtles and links |
//! | [`engine`] | `herd-engine` | Model container, config, ask loop and simulation stepping |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// World bounds, geometry, ids and randomness (`herd-core`).
pub use herd_core as core;

/// Rasters and raster math (`herd-dataset`).
///
/// [`dataset::DataSet`] backs patch import and export and the
/// slope/aspect computation in [`dataset::SlopeAspect`].
pub use herd_dataset as dataset;

/// Agent collections (`herd-agents`).
///
/// [`agents::Patches`], [`agents::Turtles`] and [`agents::Links`] wrap an
/// [`agents::AgentSet`] each; [`agents::AgentArray`] holds query results.
pub use herd_agents as agents;

/// The model and its stepping loop (`herd-engine`).
pub use herd_engine as engine;

/// Common imports for writing a model.
///
/// ```rust
/// use herd::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use herd_core::{AgentId, BreedId, Geometry, World, WorldOptions};

    // Rasters
    pub use herd_dataset::DataSet;

    // Agents
    pub use herd_agents::{
        AgentArray, AgentError, AgentSet, EdgeOutcome, EdgePolicy, Scope, TurtleState, Value,
    };

    // Engine
    pub use herd_engine::{sample_model, Behavior, Model, ModelConfig, ModelError, Simulation};
}
