//! Benchmark profiles and reference models for the herd simulation kernel.
//!
//! Provides pre-built [`ModelConfig`] profiles and three complete
//! [`Behavior`]s used by the benchmarks, the examples and the engine's
//! end-to-end tests:
//!
//! - [`reference_config`]: 101x101 patches (~10K)
//! - [`stress_config`]: 317x317 patches (~100K)
//! - [`Hello`]: wandering turtles joined by random links
//! - [`HelloPlus`]: `Hello` with turtles born and dying as the target
//!   population drifts
//! - [`Droplets`]: one droplet per patch running downhill over a terrain
//! - [`terrain`]: deterministic synthetic elevation raster

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use herd_agents::{AgentError, EdgeOutcome, EdgePolicy, Scope, TurtleState};
use herd_core::random::{random_centered, random_float, random_int2, seeded_rng};
use herd_core::{AgentId, World, WorldOptions};
use herd_dataset::DataSet;
use herd_engine::{Behavior, Model, ModelConfig, ModelError};
use tracing::info;

/// 101x101 patches, compass headings.
pub fn reference_config(seed: u64) -> ModelConfig {
    ModelConfig {
        seed,
        ..ModelConfig::with_world(WorldOptions::centered(50, 50, 0))
    }
}

/// 317x317 patches; same settings as [`reference_config`].
pub fn stress_config(seed: u64) -> ModelConfig {
    ModelConfig {
        seed,
        ..ModelConfig::with_world(WorldOptions::centered(158, 158, 0))
    }
}

/// A `width` x `height` elevation raster made of a few smooth hills.
///
/// Hill positions and heights come from `seed`, so the same arguments
/// always produce the same raster.
pub fn terrain(width: usize, height: usize, seed: u64) -> DataSet {
    let mut rng = seeded_rng(seed);
    let (w, h) = (width as f64, height as f64);
    let hills: Vec<(f64, f64, f64, f64)> = (0..6)
        .map(|_| {
            (
                random_float(&mut rng, w),
                random_float(&mut rng, h),
                50.0 + random_float(&mut rng, 100.0),
                (w.min(h) / 8.0).max(1.0) + random_float(&mut rng, w.min(h) / 4.0),
            )
        })
        .collect();
    DataSet::from_fn(width, height, |x, y| {
        hills
            .iter()
            .map(|&(hx, hy, peak, spread)| {
                let d2 = (x as f64 - hx).powi(2) + (y as f64 - hy).powi(2);
                peak * (-d2 / (2.0 * spread * spread)).exp()
            })
            .sum()
    })
}

// ── Hello ───────────────────────────────────────────────────────

/// Turtles on random patches, each linked to another turtle, wiggling
/// forward every step.
#[derive(Clone, Debug)]
pub struct Hello {
    /// Number of turtles.
    pub population: usize,
    /// Step length in patch units.
    pub speed: f64,
    /// Largest random turn per step, in degrees.
    pub wiggle_angle: f64,
}

impl Default for Hello {
    fn default() -> Self {
        Self {
            population: 10,
            speed: 0.1,
            wiggle_angle: 10.0,
        }
    }
}

fn place_on_random_patch(m: &mut Model, id: AgentId) -> Result<(), ModelError> {
    let Some((x, y)) = m.one_of_patches(Scope::Base).and_then(|p| m.patches.xy_of(p)) else {
        return Ok(());
    };
    m.setxy(id, f64::from(x), f64::from(y), None)?;
    Ok(())
}

impl Behavior for Hello {
    fn setup(&mut self, model: &mut Model) -> Result<(), ModelError> {
        model.create_turtles(Scope::Base, self.population, place_on_random_patch)?;
        model.ask_turtles(Scope::Base, |m, id| {
            if let Some(other) = m.other_one_of_turtles(Scope::Base, id) {
                m.create_links(Scope::Base, id, &[other])?;
            }
            Ok(())
        })
    }

    fn step(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let (wiggle, speed) = (self.wiggle_angle, self.speed);
        model.ask_turtles(Scope::Base, |m, id| {
            let turn = random_centered(m.rng(), wiggle);
            let heading = m.turtles.heading(id)?;
            m.turtles.set_heading(id, heading + turn)?;
            m.forward(id, speed)?;
            Ok(())
        })
    }
}

// ── HelloPlus ───────────────────────────────────────────────────

/// [`Hello`] with a moving population target.
///
/// Every `change_tick` ticks (tick 0 included) a new target is drawn from
/// `min_population..max_population`. Each step then kills random turtles
/// or creates new ones on random patches until the count matches, links
/// every turtle left without a link to a random other, and runs the
/// `Hello` step.
#[derive(Clone, Debug)]
pub struct HelloPlus {
    /// The wandering model; its `population` is the current target.
    pub hello: Hello,
    /// Smallest target drawn.
    pub min_population: usize,
    /// Exclusive upper bound of the targets drawn.
    pub max_population: usize,
    /// Ticks between new targets. `None` or `Some(0)` keeps the target.
    pub change_tick: Option<u64>,
}

impl Default for HelloPlus {
    fn default() -> Self {
        Self {
            hello: Hello {
                population: 15,
                ..Hello::default()
            },
            min_population: 5,
            max_population: 25,
            change_tick: Some(25),
        }
    }
}

impl HelloPlus {
    /// Kill or create turtles to reach the target, then relink loners.
    pub fn check_population(&self, model: &mut Model) -> Result<(), ModelError> {
        let target = self.hello.population;
        let have = model.turtles.set().len(Scope::Base);
        if have == target {
            return Ok(());
        }
        if have > target {
            for _ in target..have {
                if let Some(t) = model.one_of_turtles(Scope::Base) {
                    model.kill_turtle(t);
                }
            }
        } else {
            model.create_turtles(Scope::Base, target - have, place_on_random_patch)?;
        }
        model.ask_turtles(Scope::Base, |m, id| {
            if m.turtles.links_of(id).is_empty() {
                if let Some(other) = m.other_one_of_turtles(Scope::Base, id) {
                    m.create_links(Scope::Base, id, &[other])?;
                }
            }
            Ok(())
        })
    }
}

impl Behavior for HelloPlus {
    fn setup(&mut self, model: &mut Model) -> Result<(), ModelError> {
        self.hello.setup(model)
    }

    fn step(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let every = self.change_tick.filter(|&n| n > 0);
        if every.is_some_and(|n| model.ticks() % n == 0) {
            let (lo, hi) = (self.min_population as i64, self.max_population as i64);
            let population = random_int2(model.rng(), lo, hi) as usize;
            info!(population, tick = model.ticks(), "new population target");
            self.hello.population = population;
        }
        self.check_population(model)?;
        self.hello.step(model)
    }
}

// ── Droplets ────────────────────────────────────────────────────

/// How a droplet picks its direction each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepType {
    /// Face the lowest neighbouring patch.
    #[default]
    MinNeighbor,
    /// Follow the aspect stored on the patch.
    PatchAspect,
    /// Sample the aspect raster at the droplet's exact position.
    DataSetAspect {
        /// Nearest-neighbour rather than bilinear sampling.
        nearest: bool,
    },
}

/// Droplets sprouted on every patch flow downhill and pool in local
/// minima.
#[derive(Clone, Debug)]
pub struct Droplets {
    /// Remove droplets leaving the world instead of clamping them.
    pub kill_offworld: bool,
    /// Step length in patch units.
    pub speed: f64,
    /// A droplet does not enter a patch already holding this many.
    pub puddle_depth: usize,
    /// Direction rule.
    pub step_type: StepType,
    elevation: DataSet,
    aspect: DataSet,
    local_mins: Vec<AgentId>,
}

impl Droplets {
    /// Droplets over `elevation`, with default parameters.
    pub fn new(elevation: DataSet) -> Self {
        let aspect = elevation.slope_and_aspect(1.0, true).aspect;
        Self {
            kill_offworld: false,
            speed: 0.2,
            puddle_depth: 5,
            step_type: StepType::default(),
            elevation,
            aspect,
            local_mins: Vec::new(),
        }
    }

    /// Patches lower than all of their neighbours, found during setup,
    /// in id order.
    pub fn local_mins(&self) -> &[AgentId] {
        &self.local_mins
    }

    /// Number of droplets currently standing on a local minimum.
    pub fn turtles_on_local_mins(&self, model: &Model) -> usize {
        model
            .turtles
            .set()
            .members(Scope::Base)
            .iter()
            .filter(|&&t| {
                model
                    .patch_of(t)
                    .is_some_and(|p| self.local_mins.binary_search(&p).is_ok())
            })
            .count()
    }

    fn direction(&self, model: &Model, id: AgentId) -> Result<Option<f64>, ModelError> {
        let Some(patch) = model.patch_of(id) else {
            return Ok(None);
        };
        let theta = match self.step_type {
            StepType::MinNeighbor => {
                let patches = &model.patches;
                let elevation =
                    |p: &AgentId| patches.set().num(*p, "elevation").unwrap_or(f64::MAX);
                let best = *patches.neighbors(patch).min_one_of(elevation)?;
                let Some((bx, by)) = patches.xy_of(best) else {
                    return Ok(None);
                };
                let (x, y) = model.turtles.xy(id)?;
                if (f64::from(bx), f64::from(by)) == (x, y) {
                    return Ok(None);
                }
                herd_core::math::radians_toward_xy(x, y, f64::from(bx), f64::from(by))
            }
            StepType::PatchAspect => model.patches.set().num(patch, "aspect").unwrap_or(0.0),
            StepType::DataSetAspect { nearest } => {
                let w: &World = &model.world;
                let (x, y) = model.turtles.xy(id)?;
                self.aspect
                    .coord_sample(
                        x,
                        y,
                        w.min_xcor(),
                        w.max_ycor(),
                        w.num_x() as f64,
                        w.num_y() as f64,
                        nearest,
                    )
                    .map_err(AgentError::from)?
            }
        };
        Ok(Some(theta))
    }
}

impl Behavior for Droplets {
    fn setup(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let edge = if self.kill_offworld {
            EdgePolicy::Custom(Arc::new(|_: &mut TurtleState, _: &World| EdgeOutcome::Die))
        } else {
            EdgePolicy::Clamp
        };
        model.turtles.set_default_edge(edge);
        model
            .patches
            .import_data_set(Scope::Base, &self.elevation, "elevation", true)?;
        model
            .patches
            .import_data_set(Scope::Base, &self.aspect, "aspect", true)?;

        let mut mins = Vec::new();
        model.ask_patches(Scope::Base, |m, p| {
            let patches = &m.patches;
            let here = patches.set().num(p, "elevation").unwrap_or(0.0);
            let lowest = patches
                .neighbors(p)
                .min_val_of(|n| patches.set().num(*n, "elevation").unwrap_or(f64::MAX))?;
            if lowest > here {
                mins.push(p);
            }
            m.sprout(p, 1, Scope::Base, |_, _| Ok(()))?;
            Ok(())
        })?;
        self.local_mins = mins;
        Ok(())
    }

    fn step(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let (speed, depth) = (self.speed, self.puddle_depth);
        model.ask_turtles(Scope::Base, |m, id| {
            if let Some(theta) = self.direction(m, id)? {
                if let Some(s) = m.turtles.set_mut().state_mut(id) {
                    s.theta = theta;
                }
            }
            let heading = m.turtles.heading(id)?;
            let ahead = m
                .turtles
                .patch_at_heading_and_distance(id, heading, speed, &m.patches)?;
            let crowded = ahead.is_some_and(|p| m.turtles_here(p).len() >= depth);
            if !crowded {
                m.forward(id, speed)?;
            }
            Ok(())
        })
    }
}
