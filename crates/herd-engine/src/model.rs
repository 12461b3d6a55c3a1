//! The model: a world, its three agent sets, a tick counter and a
//! seeded generator.
//!
//! The agent sets are public fields so callers can borrow them
//! disjointly (for example, moving a turtle while updating patch
//! occupancy). Operations spanning several sets, where forgetting one of
//! them would break an invariant, are methods on [`Model`].

use std::f64::consts::{FRAC_PI_2, TAU};

use herd_agents::{
    ask, AgentArray, AgentError, AgentSet, EdgeOutcome, Links, Patches, Scope, TurtleState,
    Turtles,
};
use herd_core::random::seeded_rng;
use herd_core::{AgentId, BreedId, World, WorldOptions};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::ModelError;

/// A running simulation model.
#[derive(Clone, Debug)]
pub struct Model {
    /// Coordinate system shared by every set.
    pub world: World,
    /// The patch grid.
    pub patches: Patches,
    /// Mobile agents.
    pub turtles: Turtles,
    /// Edges between turtles.
    pub links: Links,
    config: ModelConfig,
    ticks: u64,
    rng: ChaCha8Rng,
}

impl Model {
    /// Build a model from a validated config.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let world = World::new(config.world)?;
        let g = config.geometry;
        Ok(Self {
            world,
            patches: Patches::new(world, g)?,
            turtles: Turtles::new(world, g),
            links: Links::new(g),
            config,
            ticks: 0,
            rng: seeded_rng(config.seed),
        })
    }

    /// The config the model was built (or last reset) with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    // ── lifecycle ───────────────────────────────────────────────

    /// Rebuild the world and all three sets, optionally with new bounds,
    /// and zero the tick counter.
    ///
    /// Breeds, fields and defaults are discarded with the old sets. The
    /// generator keeps its state; call [`Model::reseed`] to restart it.
    pub fn reset(&mut self, world: Option<WorldOptions>) -> Result<(), ModelError> {
        let mut config = self.config;
        if let Some(w) = world {
            config.world = w;
        }
        config.validate()?;
        let world = World::new(config.world)?;
        let g = config.geometry;
        let patches = Patches::new(world, g)?;
        self.world = world;
        self.patches = patches;
        self.turtles = Turtles::new(world, g);
        self.links = Links::new(g);
        self.config = config;
        self.ticks = 0;
        debug!(patches = world.num_patches(), "model reset");
        Ok(())
    }

    /// Advance the tick counter.
    pub fn tick(&mut self) {
        self.ticks += 1;
    }

    /// Ticks since construction or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Restart the generator from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = seeded_rng(seed);
    }

    /// The model-owned generator.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // ── breeds ──────────────────────────────────────────────────

    /// Declare patch breeds from a whitespace-separated list of names.
    pub fn patch_breeds(&mut self, names: &str) -> Vec<BreedId> {
        declare(self.patches.set_mut(), names)
    }

    /// Declare turtle breeds from a whitespace-separated list of names.
    pub fn turtle_breeds(&mut self, names: &str) -> Vec<BreedId> {
        declare(self.turtles.set_mut(), names)
    }

    /// Declare link breeds from a whitespace-separated list of names.
    pub fn link_breeds(&mut self, names: &str) -> Vec<BreedId> {
        declare(self.links.set_mut(), names)
    }

    // ── random picks ────────────────────────────────────────────

    /// A random patch of `scope`.
    pub fn one_of_patches(&mut self, scope: Scope) -> Option<AgentId> {
        self.patches.set().members(scope).one_of(&mut self.rng).copied()
    }

    /// A random turtle of `scope`.
    pub fn one_of_turtles(&mut self, scope: Scope) -> Option<AgentId> {
        self.turtles.set().members(scope).one_of(&mut self.rng).copied()
    }

    /// A random turtle of `scope` other than `id`.
    pub fn other_one_of_turtles(&mut self, scope: Scope, id: AgentId) -> Option<AgentId> {
        self.turtles
            .set()
            .members(scope)
            .other_one_of(&id, &mut self.rng)
            .copied()
    }

    /// A random link of `scope`.
    pub fn one_of_links(&mut self, scope: Scope) -> Option<AgentId> {
        self.links.set().members(scope).one_of(&mut self.rng).copied()
    }

    // ── creation ────────────────────────────────────────────────

    /// Create `n` turtles at the origin with random headings, running
    /// `init` on each right after it is created.
    pub fn create_turtles(
        &mut self,
        scope: Scope,
        n: usize,
        mut init: impl FnMut(&mut Self, AgentId) -> Result<(), ModelError>,
    ) -> Result<AgentArray<AgentId>, ModelError> {
        let mut made = AgentArray::with_capacity(n);
        for _ in 0..n {
            let id = self
                .turtles
                .create_one(scope, &mut self.patches, &mut self.rng)?;
            made.push(id);
            init(self, id)?;
        }
        Ok(made)
    }

    /// Create `n` turtles on the centre of `patch`.
    pub fn sprout(
        &mut self,
        patch: AgentId,
        n: usize,
        scope: Scope,
        mut init: impl FnMut(&mut Self, AgentId) -> Result<(), ModelError>,
    ) -> Result<AgentArray<AgentId>, ModelError> {
        let (px, py) = self
            .patches
            .xy_of(patch)
            .ok_or_else(|| AgentError::UnknownAgent {
                set: self.patches.set().name().to_owned(),
                id: patch,
            })?;
        let mut made = AgentArray::with_capacity(n);
        for _ in 0..n {
            let theta = self.rng.random::<f64>() * TAU;
            let state = TurtleState::at(f64::from(px), f64::from(py), theta);
            let id = self.turtles.create_with(scope, state, &mut self.patches)?;
            made.push(id);
            init(self, id)?;
        }
        Ok(made)
    }

    /// Create `n` copies of `parent` in `scope`.
    ///
    /// Each child starts at the parent's position and direction, and
    /// takes the parent's value of every field `scope` declares.
    pub fn hatch(
        &mut self,
        parent: AgentId,
        n: usize,
        scope: Scope,
        mut init: impl FnMut(&mut Self, AgentId) -> Result<(), ModelError>,
    ) -> Result<AgentArray<AgentId>, ModelError> {
        let record = self.turtles.set().require(parent)?;
        let (x, y, z, theta) = (
            record.state.x,
            record.state.y,
            record.state.z,
            record.state.theta,
        );
        let inherited: Vec<_> = self
            .turtles
            .set()
            .own_variables(scope)
            .into_iter()
            .filter_map(|name| record.vars().get(&name).cloned().map(|v| (name, v)))
            .collect();
        let mut made = AgentArray::with_capacity(n);
        for _ in 0..n {
            let mut state = TurtleState::at(x, y, theta);
            state.z = z;
            let id = self.turtles.create_with(scope, state, &mut self.patches)?;
            for (name, value) in &inherited {
                self.turtles.set_mut().set_var(id, name, value.clone())?;
            }
            made.push(id);
            init(self, id)?;
        }
        Ok(made)
    }

    /// Link `from` to each of `tos`.
    pub fn create_links(
        &mut self,
        scope: Scope,
        from: AgentId,
        tos: &[AgentId],
    ) -> Result<AgentArray<AgentId>, ModelError> {
        Ok(self.links.create(scope, from, tos, &mut self.turtles)?)
    }

    // ── movement ────────────────────────────────────────────────

    /// Place a turtle, killing it if its edge handler asks for that.
    pub fn setxy(
        &mut self,
        id: AgentId,
        x: f64,
        y: f64,
        z: Option<f64>,
    ) -> Result<EdgeOutcome, ModelError> {
        let outcome = self.turtles.setxy(id, x, y, z, &mut self.patches)?;
        Ok(self.settle(id, outcome))
    }

    /// Move a turtle along its heading; see [`Model::setxy`].
    pub fn forward(&mut self, id: AgentId, distance: f64) -> Result<EdgeOutcome, ModelError> {
        let outcome = self.turtles.forward(id, distance, &mut self.patches)?;
        Ok(self.settle(id, outcome))
    }

    /// Move a turtle to `(x, y, z)`; see [`Model::setxy`].
    pub fn move_to(
        &mut self,
        id: AgentId,
        x: f64,
        y: f64,
        z: Option<f64>,
    ) -> Result<EdgeOutcome, ModelError> {
        let outcome = self.turtles.move_to(id, x, y, z, &mut self.patches)?;
        Ok(self.settle(id, outcome))
    }

    fn settle(&mut self, id: AgentId, outcome: EdgeOutcome) -> EdgeOutcome {
        if outcome == EdgeOutcome::Die {
            self.kill_turtle(id);
        }
        outcome
    }

    /// Spread the turtles of `scope` evenly on a circle, clockwise from
    /// the top, each facing outwards.
    pub fn layout_circle(
        &mut self,
        scope: Scope,
        radius: f64,
        center: (f64, f64),
    ) -> Result<(), ModelError> {
        let ids = self.turtles.set().members(scope).to_vec();
        if ids.is_empty() {
            return Ok(());
        }
        let d_theta = TAU / ids.len() as f64;
        for (i, id) in ids.into_iter().enumerate() {
            if self.setxy(id, center.0, center.1, None)? == EdgeOutcome::Die {
                continue;
            }
            if let Some(s) = self.turtles.set_mut().state_mut(id) {
                s.theta = FRAC_PI_2 - d_theta * i as f64;
            }
            self.forward(id, radius)?;
        }
        Ok(())
    }

    // ── removal ─────────────────────────────────────────────────

    /// Remove a turtle and every link attached to it.
    pub fn kill_turtle(&mut self, id: AgentId) -> bool {
        self.turtles
            .die(id, &mut self.links, &mut self.patches)
            .is_some()
    }

    /// Remove a link.
    pub fn kill_link(&mut self, id: AgentId) -> bool {
        self.links.die(id, &mut self.turtles).is_some()
    }

    /// Kill every turtle of `scope`. Returns how many died.
    pub fn clear_turtles(&mut self, scope: Scope) -> usize {
        let ids = self.turtles.set().members(scope).to_vec();
        ids.into_iter().filter(|&id| self.kill_turtle(id)).count()
    }

    /// Kill every link of `scope`. Returns how many died.
    pub fn clear_links(&mut self, scope: Scope) -> usize {
        let ids = self.links.set().members(scope).to_vec();
        ids.into_iter().filter(|&id| self.kill_link(id)).count()
    }

    // ── occupancy ───────────────────────────────────────────────

    /// Turtles standing on `patch`.
    pub fn turtles_here(&mut self, patch: AgentId) -> AgentArray<AgentId> {
        self.patches.turtles_here(patch, &self.turtles)
    }

    /// Turtles of `scope` standing on `patch`.
    pub fn breeds_here(&mut self, patch: AgentId, scope: Scope) -> AgentArray<AgentId> {
        self.patches.breeds_here(patch, scope, &self.turtles)
    }

    /// The patch under turtle `id`.
    pub fn patch_of(&self, id: AgentId) -> Option<AgentId> {
        self.turtles.patch_of(id)
    }

    // ── ask ─────────────────────────────────────────────────────

    /// Run `f` on every patch of `scope` with the model as context.
    ///
    /// The first error stops the ask and is returned.
    pub fn ask_patches(
        &mut self,
        scope: Scope,
        f: impl FnMut(&mut Self, AgentId) -> Result<(), ModelError>,
    ) -> Result<(), ModelError> {
        self.ask_in(|m| m.patches.set(), scope, f)
    }

    /// Run `f` on every turtle of `scope`; see [`Model::ask_patches`].
    pub fn ask_turtles(
        &mut self,
        scope: Scope,
        f: impl FnMut(&mut Self, AgentId) -> Result<(), ModelError>,
    ) -> Result<(), ModelError> {
        self.ask_in(|m| m.turtles.set(), scope, f)
    }

    /// Run `f` on every link of `scope`; see [`Model::ask_patches`].
    pub fn ask_links(
        &mut self,
        scope: Scope,
        f: impl FnMut(&mut Self, AgentId) -> Result<(), ModelError>,
    ) -> Result<(), ModelError> {
        self.ask_in(|m| m.links.set(), scope, f)
    }

    fn ask_in<S>(
        &mut self,
        view: impl Fn(&Self) -> &AgentSet<S>,
        scope: Scope,
        mut f: impl FnMut(&mut Self, AgentId) -> Result<(), ModelError>,
    ) -> Result<(), ModelError> {
        view(self).check_scope(scope)?;
        let mut failed = None;
        ask::ask_set(self, view, scope, |m, id| {
            if failed.is_none() {
                failed = f(m, id).err();
            }
        });
        failed.map_or(Ok(()), Err)
    }
}

fn declare<S>(set: &mut AgentSet<S>, names: &str) -> Vec<BreedId> {
    names
        .split_whitespace()
        .map(|name| set.new_breed(name))
        .collect()
}
