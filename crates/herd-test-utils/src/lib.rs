//! Test fixtures and mock types for herd development.
//!
//! Provides a [`TestGridBuilder`] that assembles a world with its
//! patches, turtles and links outside of a full model, and a
//! [`MockLocator`] implementing [`Locate`] over fixed points for the
//! spatial filters.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;

use herd_agents::{AgentError, Links, Locate, Patches, Scope, TurtleState, Turtles};
use herd_core::random::seeded_rng;
use herd_core::{AgentId, Geometry, World, WorldOptions};
use rand_chacha::ChaCha8Rng;

/// A world and its three agent sets, without a model around them.
pub struct TestGrid {
    pub world: World,
    pub patches: Patches,
    pub turtles: Turtles,
    pub links: Links,
    pub rng: ChaCha8Rng,
}

impl TestGrid {
    /// Place a new base turtle at `(x, y)` facing `theta` radians.
    pub fn turtle_at(&mut self, x: f64, y: f64, theta: f64) -> Result<AgentId, AgentError> {
        self.turtles
            .create_with(Scope::Base, TurtleState::at(x, y, theta), &mut self.patches)
    }
}

/// Builder for [`TestGrid`].
///
/// Defaults to a 5x5 world (`-2..=2` on x and y, flat z), compass
/// headings, seed 0 and no turtles.
pub struct TestGridBuilder {
    options: WorldOptions,
    geometry: Geometry,
    seed: u64,
    turtles: usize,
    occupancy: bool,
}

impl TestGridBuilder {
    pub fn new() -> Self {
        Self {
            options: WorldOptions::centered(2, 2, 0),
            geometry: Geometry::Heading,
            seed: 0,
            turtles: 0,
            occupancy: false,
        }
    }

    pub fn world(mut self, options: WorldOptions) -> Self {
        self.options = options;
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Create `n` turtles scattered over random points of the world.
    pub fn turtles(mut self, n: usize) -> Self {
        self.turtles = n;
        self
    }

    /// Build the per-patch occupancy lists up front.
    pub fn with_occupancy(mut self) -> Self {
        self.occupancy = true;
        self
    }

    /// # Panics
    ///
    /// Panics on invalid world options; fixtures are expected to be valid.
    pub fn build(self) -> TestGrid {
        let world = World::new(self.options).expect("fixture world options are valid");
        let mut grid = TestGrid {
            world,
            patches: Patches::new(world, self.geometry).expect("fixture grid fits in u32 ids"),
            turtles: Turtles::new(world, self.geometry),
            links: Links::new(self.geometry),
            rng: seeded_rng(self.seed),
        };
        if self.occupancy {
            grid.patches.ensure_occupancy(&grid.turtles);
        }
        for _ in 0..self.turtles {
            let (x, y) = world.random_point(&mut grid.rng);
            let theta = fixtures::random_theta(&mut grid.rng);
            grid.turtles
                .create_with(Scope::Base, TurtleState::at(x, y, theta), &mut grid.patches)
                .expect("base scope always exists");
        }
        grid
    }
}

impl Default for TestGridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Locate`] over a fixed table of points.
pub struct MockLocator {
    points: HashMap<AgentId, (f64, f64)>,
}

impl MockLocator {
    pub fn new() -> Self {
        Self {
            points: HashMap::new(),
        }
    }

    /// Build from a list; the `i`th point gets id `i`.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let mut locator = Self::new();
        for (i, &p) in points.iter().enumerate() {
            locator.insert(AgentId(i as u32), p);
        }
        locator
    }

    pub fn insert(&mut self, id: AgentId, point: (f64, f64)) {
        self.points.insert(id, point);
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<_> = self.points.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for MockLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Locate for MockLocator {
    fn locate(&self, id: AgentId) -> Option<(f64, f64)> {
        self.points.get(&id).copied()
    }
}
