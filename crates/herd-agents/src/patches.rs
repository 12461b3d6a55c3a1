//! The patch grid.
//!
//! Patches are the fixed cells of the world, one per integer coordinate.
//! Patch ids equal grid indices: index 0 is the top-left patch and rows
//! run left to right, top to bottom. Positions are therefore derived from
//! the id and never stored.
//!
//! Neighbour lists are built on first use and kept per patch. The
//! per-patch turtle occupancy lists are only built when first queried and
//! from then on are kept current by turtle moves and deaths.

use std::cell::OnceCell;
use std::collections::HashMap;

use herd_core::math::{distance, radians_toward_xy};
use herd_core::{AgentId, Geometry, World};
use herd_dataset::{DataSet, DataType};
use smallvec::SmallVec;
use tracing::warn;

use crate::agent_array::AgentArray;
use crate::agent_list::{self, Locate, Origin};
use crate::agent_set::{AgentSet, Scope};
use crate::error::AgentError;
use crate::turtles::Turtles;

static EMPTY: AgentArray<AgentId> = AgentArray::new();

/// `(dx, dy)` neighbour steps in clockwise order from the upper left.
const NEIGHBOR_STEPS: [(i32, i32); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
];

/// Key of a cached patch rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RectKey {
    /// Horizontal half-width.
    pub dx: i32,
    /// Vertical half-height.
    pub dy: i32,
    /// Whether the centre patch is included.
    pub me_too: bool,
}

/// Per-patch state.
#[derive(Clone, Debug, Default)]
pub struct PatchState {
    /// Elevation; 0 unless set.
    pub z: f64,
    neighbors: OnceCell<AgentArray<AgentId>>,
    neighbors4: OnceCell<AgentArray<AgentId>>,
    rect_cache: HashMap<RectKey, AgentArray<AgentId>>,
}

// ── Patches ─────────────────────────────────────────────────────

/// All patches of a world.
#[derive(Clone, Debug)]
pub struct Patches {
    set: AgentSet<PatchState>,
    world: World,
    geometry: Geometry,
    occupancy: Option<Vec<AgentArray<AgentId>>>,
}

impl Patches {
    /// One patch per grid cell of `world`.
    pub fn new(world: World, geometry: Geometry) -> Result<Self, AgentError> {
        let mut patches = Self {
            set: AgentSet::new_fixed("patches"),
            world,
            geometry,
            occupancy: None,
        };
        patches.populate()?;
        Ok(patches)
    }

    fn populate(&mut self) -> Result<(), AgentError> {
        for _ in 0..self.world.num_patches() {
            self.set.add_agent(Scope::Base, PatchState::default())?;
        }
        Ok(())
    }

    /// The underlying agent set.
    pub fn set(&self) -> &AgentSet<PatchState> {
        &self.set
    }

    /// Mutable access to the underlying agent set, for fields and breeds.
    pub fn set_mut(&mut self) -> &mut AgentSet<PatchState> {
        &mut self.set
    }

    /// The world the grid covers.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.set.len(Scope::Base)
    }

    /// Whether the grid is empty. Never true for a valid world.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── coordinates ─────────────────────────────────────────────

    /// Integer coordinates of patch `id`.
    pub fn xy_of(&self, id: AgentId) -> Option<(i32, i32)> {
        let i = id.index();
        if i >= self.world.num_patches() {
            return None;
        }
        let num_x = self.world.num_x();
        Some((
            (i % num_x) as i32 + self.world.min_x(),
            self.world.max_y() - (i / num_x) as i32,
        ))
    }

    /// Elevation of patch `id`.
    pub fn z_of(&self, id: AgentId) -> Option<f64> {
        self.set.state(id).map(|s| s.z)
    }

    /// Grid index of integer coordinate `(x, y)`.
    pub fn patch_index(&self, x: i32, y: i32) -> Option<usize> {
        let w = &self.world;
        if x < w.min_x() || x > w.max_x() || y < w.min_y() || y > w.max_y() {
            return None;
        }
        let col = (i64::from(x) - i64::from(w.min_x())) as usize;
        let row = (i64::from(w.max_y()) - i64::from(y)) as usize;
        Some(col + w.num_x() * row)
    }

    /// Patch at integer coordinate `(x, y)`.
    pub fn patch_xy(&self, x: i32, y: i32) -> Option<AgentId> {
        self.patch_index(x, y).map(|i| AgentId(i as u32))
    }

    /// Patch containing the point `(x, y)`, or `None` off-world.
    pub fn patch(&self, x: f64, y: f64) -> Option<AgentId> {
        self.world
            .xy_to_patch_index(x, y)
            .map(|i| AgentId(i as u32))
    }

    /// Patch offset `(dx, dy)` from `id`.
    pub fn patch_at(&self, id: AgentId, dx: i32, dy: i32) -> Option<AgentId> {
        let (x, y) = self.xy_of(id)?;
        self.patch_xy(x.saturating_add(dx), y.saturating_add(dy))
    }

    /// Patch `distance` away from `id` along `heading`.
    pub fn patch_at_heading_and_distance(
        &self,
        id: AgentId,
        heading: f64,
        distance: f64,
    ) -> Option<AgentId> {
        let (x, y) = self.xy_of(id)?;
        let rads = self.geometry.to_rads(heading);
        self.patch(
            x as f64 + distance * rads.cos(),
            y as f64 + distance * rads.sin(),
        )
    }

    /// Distance from the centre of `id` to `(x, y)`.
    pub fn distance_xy(&self, id: AgentId, x: f64, y: f64) -> Option<f64> {
        let (px, py) = self.xy_of(id)?;
        Some(distance(px as f64, py as f64, x, y))
    }

    /// Direction from the centre of `id` toward `(x, y)`.
    pub fn towards_xy(&self, id: AgentId, x: f64, y: f64) -> Option<f64> {
        let (px, py) = self.xy_of(id)?;
        Some(
            self.geometry
                .from_rads(radians_toward_xy(px as f64, py as f64, x, y)),
        )
    }

    /// Whether `id` lies on the border of the grid.
    pub fn is_on_edge(&self, id: AgentId) -> bool {
        let w = &self.world;
        self.xy_of(id).is_some_and(|(x, y)| {
            x == w.min_x() || x == w.max_x() || y == w.min_y() || y == w.max_y()
        })
    }

    /// Border patches in `scope`.
    pub fn edge_patches(&self, scope: Scope) -> AgentArray<AgentId> {
        self.set.members(scope).with(|&id| self.is_on_edge(id))
    }

    // ── neighbourhoods ──────────────────────────────────────────

    fn offsets(&self, x: i32, y: i32, four: bool) -> SmallVec<[isize; 8]> {
        let w = &self.world;
        let num_x = w.num_x() as isize;
        NEIGHBOR_STEPS
            .iter()
            .filter(|&&(dx, dy)| !four || dx == 0 || dy == 0)
            .filter(|&&(dx, dy)| {
                !(x == w.min_x() && dx < 0
                    || x == w.max_x() && dx > 0
                    || y == w.max_y() && dy > 0
                    || y == w.min_y() && dy < 0)
            })
            .map(|&(dx, dy)| -(dy as isize) * num_x + dx as isize)
            .collect()
    }

    /// Index offsets of the up-to-8 neighbours of patch `(x, y)`, in
    /// clockwise order from the upper left. The grid does not wrap.
    pub fn neighbors_offsets(&self, x: i32, y: i32) -> SmallVec<[isize; 8]> {
        self.offsets(x, y, false)
    }

    /// Index offsets of the up-to-4 orthogonal neighbours of `(x, y)`.
    pub fn neighbors4_offsets(&self, x: i32, y: i32) -> SmallVec<[isize; 8]> {
        self.offsets(x, y, true)
    }

    fn neighbor_list(&self, id: AgentId, four: bool) -> AgentArray<AgentId> {
        let Some((x, y)) = self.xy_of(id) else {
            return AgentArray::new();
        };
        let offsets = if four {
            self.neighbors4_offsets(x, y)
        } else {
            self.neighbors_offsets(x, y)
        };
        offsets
            .iter()
            .map(|&o| AgentId((id.index() as isize + o) as u32))
            .collect()
    }

    /// The up-to-8 neighbours of `id`, built on first use.
    pub fn neighbors(&self, id: AgentId) -> &AgentArray<AgentId> {
        match self.set.state(id) {
            Some(s) => s.neighbors.get_or_init(|| self.neighbor_list(id, false)),
            None => &EMPTY,
        }
    }

    /// The up-to-4 orthogonal neighbours of `id`, built on first use.
    pub fn neighbors4(&self, id: AgentId) -> &AgentArray<AgentId> {
        match self.set.state(id) {
            Some(s) => s.neighbors4.get_or_init(|| self.neighbor_list(id, true)),
            None => &EMPTY,
        }
    }

    // ── rectangles ──────────────────────────────────────────────

    fn compute_rect(&self, id: AgentId, dx: i32, dy: i32, me_too: bool) -> AgentArray<AgentId> {
        let Some((x, y)) = self.xy_of(id) else {
            return AgentArray::new();
        };
        let w = &self.world;
        let x0 = x.saturating_sub(dx).max(w.min_x());
        let x1 = x.saturating_add(dx).min(w.max_x());
        let y0 = y.saturating_sub(dy).max(w.min_y());
        let y1 = y.saturating_add(dy).min(w.max_y());
        let mut rect = AgentArray::new();
        for py in y0..=y1 {
            for px in x0..=x1 {
                if let Some(p) = self.patch_xy(px, py) {
                    if p != id || me_too {
                        rect.push(p);
                    }
                }
            }
        }
        rect
    }

    /// Half-width in patches of the square covering `radius`, capped at
    /// the longer side of the grid.
    pub(crate) fn radius_span(&self, radius: f64) -> i32 {
        let side = self.world.num_x().max(self.world.num_y());
        radius.ceil().clamp(0.0, side as f64) as i32
    }

    /// Patches within `dx` columns and `dy` rows of `id`, clipped to the
    /// grid, bottom row first.
    pub fn patch_rect(&self, id: AgentId, dx: i32, dy: i32, me_too: bool) -> AgentArray<AgentId> {
        let key = RectKey { dx, dy, me_too };
        if let Some(rect) = self.set.state(id).and_then(|s| s.rect_cache.get(&key)) {
            return rect.clone();
        }
        self.compute_rect(id, dx, dy, me_too)
    }

    /// [`Patches::patch_rect`] around the patch containing `(x, y)`;
    /// empty off-world.
    pub fn patch_rect_xy(
        &self,
        x: f64,
        y: f64,
        dx: i32,
        dy: i32,
        me_too: bool,
    ) -> AgentArray<AgentId> {
        match self.patch(x, y) {
            Some(p) => self.patch_rect(p, dx, dy, me_too),
            None => AgentArray::new(),
        }
    }

    /// Precompute the `(dx, dy, me_too)` rectangle for every patch. With
    /// `clear`, other cached rectangles are discarded first.
    pub fn cache_rect(&mut self, dx: i32, dy: i32, me_too: bool, clear: bool) {
        let key = RectKey { dx, dy, me_too };
        let ids = self.set.members(Scope::Base).to_vec();
        let rects: Vec<_> = ids
            .iter()
            .map(|&id| self.compute_rect(id, dx, dy, me_too))
            .collect();
        for (id, rect) in ids.into_iter().zip(rects) {
            if let Some(state) = self.set.state_mut(id) {
                if clear {
                    state.rect_cache.clear();
                }
                state.rect_cache.insert(key, rect);
            }
        }
    }

    /// Members of `scope` within the `dx` by `dy` rectangle around `id`.
    pub fn in_rect(
        &self,
        scope: Scope,
        id: AgentId,
        dx: i32,
        dy: i32,
        me_too: bool,
    ) -> AgentArray<AgentId> {
        let rect = self.patch_rect(id, dx, dy, me_too);
        self.set.filter_scope(rect, scope)
    }

    /// Members of `scope` whose centres lie within `radius` of `id`.
    pub fn in_radius(
        &self,
        scope: Scope,
        id: AgentId,
        radius: f64,
        me_too: bool,
    ) -> AgentArray<AgentId> {
        let Some((x, y)) = self.xy_of(id) else {
            return AgentArray::new();
        };
        let r = self.radius_span(radius);
        let rect = self.in_rect(scope, id, r, r, true);
        agent_list::in_radius(self, &rect, Origin::agent(id, x as f64, y as f64), radius, me_too)
    }

    /// Members of `scope` within the cone at `id` pointing along
    /// `heading`, `cone_angle` wide.
    pub fn in_cone(
        &self,
        scope: Scope,
        id: AgentId,
        radius: f64,
        cone_angle: f64,
        heading: f64,
        me_too: bool,
    ) -> AgentArray<AgentId> {
        let Some((x, y)) = self.xy_of(id) else {
            return AgentArray::new();
        };
        let r = self.radius_span(radius);
        let rect = self.in_rect(scope, id, r, r, true);
        agent_list::in_cone(
            self,
            &rect,
            Origin::agent(id, x as f64, y as f64),
            radius,
            self.geometry.to_angle_rads(cone_angle),
            self.geometry.to_rads(heading),
            me_too,
        )
    }

    // ── rasters ─────────────────────────────────────────────────

    fn base_scope(scope: Scope, op: &str) -> Scope {
        if scope != Scope::Base {
            warn!(op, "breed scope ignored; using all patches");
        }
        Scope::Base
    }

    /// Set field `property` on every patch from `ds`, resampled to the
    /// grid size.
    pub fn import_data_set(
        &mut self,
        scope: Scope,
        ds: &DataSet,
        property: &str,
        use_nearest: bool,
    ) -> Result<(), AgentError> {
        let scope = Self::base_scope(scope, "import_data_set");
        let resampled = ds.resample(self.world.num_x(), self.world.num_y(), use_nearest);
        let ids = self.set.members(scope).to_vec();
        for id in ids {
            let v = resampled.data().get(id.index()).copied().unwrap_or(0.0);
            self.set.set_var(id, property, v)?;
        }
        Ok(())
    }

    /// Field `property` of every patch as a grid-sized data set. Unset
    /// values read as NaN before the type conversion.
    pub fn export_data_set(
        &self,
        scope: Scope,
        property: &str,
        data_type: DataType,
    ) -> Result<DataSet, AgentError> {
        let scope = Self::base_scope(scope, "export_data_set");
        let data = self.set.nums(scope, property).into_vec();
        let mut ds = DataSet::new(self.world.num_x(), self.world.num_y(), data)?;
        ds.convert_type(data_type);
        Ok(ds)
    }

    // ── diffusion ───────────────────────────────────────────────

    /// Diffuse field `v` to the 8 neighbours. See [`Patches::diffuse_n`].
    pub fn diffuse(&mut self, v: &str, rate: f64) -> Result<(), AgentError> {
        self.diffuse_n(8, v, rate)
    }

    /// Diffuse field `v` to the 4 orthogonal neighbours.
    pub fn diffuse4(&mut self, v: &str, rate: f64) -> Result<(), AgentError> {
        self.diffuse_n(4, v, rate)
    }

    /// Share `rate` of each patch's `v` equally among `n` neighbours.
    ///
    /// Shares for neighbours missing at the border stay with the patch,
    /// so the total is conserved. Unset values count as 0.
    pub fn diffuse_n(&mut self, n: usize, v: &str, rate: f64) -> Result<(), AgentError> {
        if n != 4 && n != 8 {
            return Err(AgentError::UnsupportedNeighborhood { n });
        }
        if !(0.0..=1.0).contains(&rate) {
            warn!(rate, "diffusion rate outside [0, 1]");
        }
        let len = self.world.num_patches();
        let mut next = vec![0.0; len];
        for i in 0..len {
            let id = AgentId(i as u32);
            let value = self.set.num(id, v).unwrap_or(0.0);
            let dv = value * rate;
            let dvn = dv / n as f64;
            let neighbors = if n == 8 {
                self.neighbors(id)
            } else {
                self.neighbors4(id)
            };
            next[i] += value - dv + (n - neighbors.len()) as f64 * dvn;
            for nb in neighbors.iter() {
                next[nb.index()] += dvn;
            }
        }
        for (i, value) in next.into_iter().enumerate() {
            self.set.set_var(AgentId(i as u32), v, value)?;
        }
        Ok(())
    }

    // ── occupancy ───────────────────────────────────────────────

    /// Whether per-patch turtle lists have been built.
    pub fn has_occupancy(&self) -> bool {
        self.occupancy.is_some()
    }

    /// Build the per-patch turtle lists if they do not exist yet.
    pub fn ensure_occupancy(&mut self, turtles: &Turtles) {
        if self.occupancy.is_some() {
            return;
        }
        let mut lists = vec![AgentArray::new(); self.world.num_patches()];
        for &t in turtles.set().members(Scope::Base).iter() {
            if let Some(p) = turtles.patch_of(t) {
                lists[p.index()].push(t);
            }
        }
        self.occupancy = Some(lists);
    }

    /// Turtles on patch `id`, building the occupancy lists on first use.
    pub fn turtles_here(&mut self, id: AgentId, turtles: &Turtles) -> AgentArray<AgentId> {
        self.ensure_occupancy(turtles);
        self.turtles_on(id).clone()
    }

    /// Turtles of `breed` scope on patch `id`.
    pub fn breeds_here(
        &mut self,
        id: AgentId,
        scope: Scope,
        turtles: &Turtles,
    ) -> AgentArray<AgentId> {
        let here = self.turtles_here(id, turtles);
        turtles.set().filter_scope(here, scope)
    }

    /// Turtles on patch `id` per the occupancy lists; empty if the lists
    /// have not been built.
    pub fn turtles_on(&self, id: AgentId) -> &AgentArray<AgentId> {
        self.occupancy
            .as_ref()
            .and_then(|lists| lists.get(id.index()))
            .unwrap_or(&EMPTY)
    }

    /// Move `turtle` between occupancy lists; a no-op until they exist.
    pub fn occupancy_move(&mut self, turtle: AgentId, from: Option<AgentId>, to: Option<AgentId>) {
        if from == to {
            return;
        }
        let Some(lists) = self.occupancy.as_mut() else {
            return;
        };
        if let Some(list) = from.and_then(|p| lists.get_mut(p.index())) {
            list.remove_item_linear(&turtle);
        }
        if let Some(list) = to.and_then(|p| lists.get_mut(p.index())) {
            list.push(turtle);
        }
    }
}

impl Locate for Patches {
    fn locate(&self, id: AgentId) -> Option<(f64, f64)> {
        self.xy_of(id).map(|(x, y)| (x as f64, y as f64))
    }
}
