//! Stepping a user behaviour over a model.
//!
//! [`Simulation`] pairs a [`Model`] with a [`Behavior`]. Each
//! [`step()`](Simulation::step) runs the behaviour once and, when the
//! config asks for it, advances the tick counter.

use tracing::trace;

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::model::Model;

/// The user part of a model: how it is set up and how it steps.
pub trait Behavior {
    /// Populate the model. Called once before stepping, and again after
    /// every reset the caller wants to replay.
    fn setup(&mut self, model: &mut Model) -> Result<(), ModelError>;

    /// Advance the model by one step.
    fn step(&mut self, model: &mut Model) -> Result<(), ModelError>;
}

/// A model driven by a [`Behavior`].
#[derive(Debug)]
pub struct Simulation<B> {
    model: Model,
    behavior: B,
}

impl<B: Behavior> Simulation<B> {
    /// Build the model from `config`. [`setup`](Simulation::setup) is not
    /// called.
    pub fn new(config: ModelConfig, behavior: B) -> Result<Self, ModelError> {
        Ok(Self {
            model: Model::new(config)?,
            behavior,
        })
    }

    /// Wrap an existing model.
    pub fn from_model(model: Model, behavior: B) -> Self {
        Self { model, behavior }
    }

    /// Run the behaviour's setup.
    pub fn setup(&mut self) -> Result<(), ModelError> {
        self.behavior.setup(&mut self.model)
    }

    /// Run one step, then tick if `auto_tick` is set.
    ///
    /// A failed step leaves the tick counter unchanged.
    pub fn step(&mut self) -> Result<(), ModelError> {
        self.behavior.step(&mut self.model)?;
        if self.model.config().auto_tick {
            self.model.tick();
        }
        trace!(ticks = self.model.ticks(), "step");
        Ok(())
    }

    /// Run `n` steps, stopping at the first error.
    pub fn run(&mut self, n: u64) -> Result<(), ModelError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// The model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Mutable access to the model.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// The behaviour.
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Mutable access to the behaviour, for changing its parameters.
    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    /// Split into the model and the behaviour.
    pub fn into_parts(self) -> (Model, B) {
        (self.model, self.behavior)
    }
}
