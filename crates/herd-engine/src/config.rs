//! Model configuration and its validation errors.
//!
//! [`ModelConfig`] is the input for building a [`Model`](crate::Model).
//! [`validate()`](ModelConfig::validate) checks it before any agent set
//! is allocated; [`Model::new`](crate::Model::new) calls it first.

use std::error::Error;
use std::fmt;

use herd_core::{Geometry, WorldError, WorldOptions};
use serde::{Deserialize, Serialize};

// ── ConfigError ─────────────────────────────────────────────────

/// Errors detected during [`ModelConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The world bounds are unusable, including grids with more patches
    /// than agent ids can address.
    World(WorldError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World(e) => write!(f, "world: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::World(e) => Some(e),
        }
    }
}

impl From<WorldError> for ConfigError {
    fn from(e: WorldError) -> Self {
        Self::World(e)
    }
}

// ── ModelConfig ─────────────────────────────────────────────────

/// Everything needed to build a [`Model`](crate::Model).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Patch bounds of the world. Default: `centered(16, 16, 16)`.
    pub world: WorldOptions,
    /// Angle convention for headings and turns. Default: compass headings.
    pub geometry: Geometry,
    /// Seed of the model-owned generator. Default: 0.
    pub seed: u64,
    /// Whether [`Simulation::step`](crate::Simulation::step) advances the
    /// tick counter after each step. Default: true.
    pub auto_tick: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            world: WorldOptions::default(),
            geometry: Geometry::default(),
            seed: 0,
            auto_tick: true,
        }
    }
}

impl ModelConfig {
    /// Config with the given world bounds and defaults elsewhere.
    pub fn with_world(world: WorldOptions) -> Self {
        Self {
            world,
            ..Self::default()
        }
    }

    /// Validate the world bounds and the size of the patch grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        Ok(())
    }
}
