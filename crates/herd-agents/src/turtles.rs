//! Mobile agents.
//!
//! A turtle stores its position and its direction as euclidean radians
//! (`theta`). The model's [`Geometry`] converts directions and turn
//! angles to and from the user-facing representation.
//!
//! Moving a turtle off the world triggers its edge policy. Operations that
//! move turtles take the [`Patches`] so occupancy lists stay current, and
//! removal takes the [`Links`] so attached links die with the turtle.

use std::fmt;
use std::sync::Arc;

use herd_core::math::{clamp, distance, distance3, mod2pi, radians_toward_xy, wrap};
use herd_core::{AgentId, Geometry, World};
use rand::Rng;

use crate::agent_array::AgentArray;
use crate::agent_list::{self, Locate, Origin};
use crate::agent_set::{AgentRecord, AgentSet, Scope};
use crate::error::AgentError;
use crate::links::Links;
use crate::patches::Patches;

static EMPTY: AgentArray<AgentId> = AgentArray::new();

// ── Edge handling ───────────────────────────────────────────────

/// What should happen to a turtle after its edge handler runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// The turtle stays alive.
    #[default]
    Keep,
    /// The turtle should be removed.
    Die,
}

/// A user edge handler. It may reposition the turtle.
pub type EdgeHandler = Arc<dyn Fn(&mut TurtleState, &World) -> EdgeOutcome + Send + Sync>;

/// How a turtle is treated when a move leaves it off the world.
#[derive(Clone, Default)]
pub enum EdgePolicy {
    /// Reappear at the opposite edge.
    #[default]
    Wrap,
    /// Stop at the edge.
    Clamp,
    /// Stop at the edge and reflect the heading.
    Bounce,
    /// Leave the turtle where it is, off the world.
    Ignore,
    /// Run a handler.
    Custom(EdgeHandler),
}

impl fmt::Debug for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrap => write!(f, "Wrap"),
            Self::Clamp => write!(f, "Clamp"),
            Self::Bounce => write!(f, "Bounce"),
            Self::Ignore => write!(f, "Ignore"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl EdgePolicy {
    fn apply(&self, state: &mut TurtleState, world: &World) -> EdgeOutcome {
        let (x0, x1) = (world.min_xcor(), world.max_xcor());
        let (y0, y1) = (world.min_ycor(), world.max_ycor());
        let (z0, z1) = (world.min_zcor(), world.max_zcor());
        match self {
            Self::Wrap => {
                state.x = wrap(state.x, x0, x1);
                state.y = wrap(state.y, y0, y1);
                state.z = state.z.map(|z| wrap(z, z0, z1));
            }
            Self::Clamp => {
                state.x = clamp(state.x, x0, x1);
                state.y = clamp(state.y, y0, y1);
                state.z = state.z.map(|z| clamp(z, z0, z1));
            }
            Self::Bounce => {
                let z = state.z;
                state.x = clamp(state.x, x0, x1);
                state.y = clamp(state.y, y0, y1);
                state.z = z.map(|z| clamp(z, z0, z1));
                if state.x == x0 || state.x == x1 {
                    state.theta = std::f64::consts::PI - state.theta;
                } else if state.y == y0 || state.y == y1 {
                    state.theta = -state.theta;
                } else if let (Some(orig), Some(zc)) = (z, state.z) {
                    if zc == z0 || zc == z1 {
                        state.z = Some(wrap(orig, z0, z1));
                    }
                }
            }
            Self::Ignore => {}
            Self::Custom(handler) => return handler(state, world),
        }
        EdgeOutcome::Keep
    }
}

// ── TurtleState ─────────────────────────────────────────────────

/// Per-turtle state.
#[derive(Clone, Debug, Default)]
pub struct TurtleState {
    /// x coordinate.
    pub x: f64,
    /// y coordinate.
    pub y: f64,
    /// z coordinate, if the turtle has one.
    pub z: Option<f64>,
    /// Direction in euclidean radians.
    pub theta: f64,
    /// Edge policy overriding the set default.
    pub at_edge: Option<EdgePolicy>,
    links: Option<AgentArray<AgentId>>,
}

impl TurtleState {
    /// Turtle at `(x, y)` facing `theta`.
    pub fn at(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta,
            ..Self::default()
        }
    }

    /// Ids of links attached to this turtle.
    pub fn links(&self) -> &AgentArray<AgentId> {
        self.links.as_ref().unwrap_or(&EMPTY)
    }
}

// ── Turtles ─────────────────────────────────────────────────────

/// All turtles of a model.
#[derive(Clone, Debug)]
pub struct Turtles {
    set: AgentSet<TurtleState>,
    world: World,
    geometry: Geometry,
    default_edge: EdgePolicy,
}

impl Turtles {
    /// An empty population moving in `world`.
    pub fn new(world: World, geometry: Geometry) -> Self {
        Self {
            set: AgentSet::new("turtles"),
            world,
            geometry,
            default_edge: EdgePolicy::default(),
        }
    }

    /// The underlying agent set.
    pub fn set(&self) -> &AgentSet<TurtleState> {
        &self.set
    }

    /// Mutable access to the underlying agent set, for fields and breeds.
    ///
    /// Do not kill turtles through this handle: `remove_agent` and `clear`
    /// leave their links and patch occupancy behind. Use [`Turtles::die`]
    /// or `Model::kill_turtle` instead.
    pub fn set_mut(&mut self) -> &mut AgentSet<TurtleState> {
        &mut self.set
    }

    /// The world turtles move in.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Angle convention for headings and turns.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Edge policy for turtles without their own.
    pub fn set_default_edge(&mut self, policy: EdgePolicy) {
        self.default_edge = policy;
    }

    fn state(&self, id: AgentId) -> Result<&TurtleState, AgentError> {
        self.set.require(id).map(|r| &r.state)
    }

    fn state_mut(&mut self, id: AgentId) -> Result<&mut TurtleState, AgentError> {
        self.set.require_mut(id).map(|r| &mut r.state)
    }

    /// `(x, y)` of `id`.
    pub fn xy(&self, id: AgentId) -> Result<(f64, f64), AgentError> {
        self.state(id).map(|s| (s.x, s.y))
    }

    // ── creation and removal ────────────────────────────────────

    /// Create a turtle at the origin with a random heading.
    pub fn create_one<R: Rng + ?Sized>(
        &mut self,
        scope: Scope,
        patches: &mut Patches,
        rng: &mut R,
    ) -> Result<AgentId, AgentError> {
        let theta = rng.random::<f64>() * std::f64::consts::TAU;
        self.create_with(scope, TurtleState::at(0.0, 0.0, theta), patches)
    }

    /// Create `n` turtles; see [`Turtles::create_one`].
    pub fn create<R: Rng + ?Sized>(
        &mut self,
        scope: Scope,
        n: usize,
        patches: &mut Patches,
        rng: &mut R,
    ) -> Result<AgentArray<AgentId>, AgentError> {
        (0..n).map(|_| self.create_one(scope, patches, rng)).collect()
    }

    /// Create a turtle with explicit state.
    pub fn create_with(
        &mut self,
        scope: Scope,
        state: TurtleState,
        patches: &mut Patches,
    ) -> Result<AgentId, AgentError> {
        let id = self.set.add_agent(scope, state)?;
        patches.occupancy_move(id, None, self.patch_of(id));
        Ok(id)
    }

    /// Remove `id`, killing its links and leaving its patch.
    pub fn die(
        &mut self,
        id: AgentId,
        links: &mut Links,
        patches: &mut Patches,
    ) -> Option<AgentRecord<TurtleState>> {
        let attached = self.set.state(id).map(|s| s.links().to_vec())?;
        for link in attached {
            links.die(link, self);
        }
        patches.occupancy_move(id, self.patch_of(id), None);
        self.set.remove_agent(id)
    }

    pub(crate) fn attach_link(&mut self, turtle: AgentId, link: AgentId) {
        if let Some(s) = self.set.state_mut(turtle) {
            s.links.get_or_insert_with(AgentArray::new).push(link);
        }
    }

    pub(crate) fn detach_link(&mut self, turtle: AgentId, link: AgentId) {
        if let Some(list) = self.set.state_mut(turtle).and_then(|s| s.links.as_mut()) {
            list.remove_item_linear(&link);
        }
    }

    // ── movement ────────────────────────────────────────────────

    /// Place `id` at `(x, y)` (and `z` if given), then apply its edge
    /// policy if it is off the world.
    ///
    /// An [`EdgeOutcome::Die`] from a custom handler is returned for the
    /// caller to act on; the turtle is not removed here.
    pub fn setxy(
        &mut self,
        id: AgentId,
        x: f64,
        y: f64,
        z: Option<f64>,
        patches: &mut Patches,
    ) -> Result<EdgeOutcome, AgentError> {
        let p0 = self.patch_of(id);
        let world = self.world;
        let Self {
            set, default_edge, ..
        } = self;
        let state = set.require_mut(id).map(|r| &mut r.state)?;
        state.x = x;
        state.y = y;
        if z.is_some() {
            state.z = z;
        }
        let mut outcome = EdgeOutcome::Keep;
        if !world.is_on_world(state.x, state.y, state.z) {
            let own = state.at_edge.take();
            outcome = own.as_ref().unwrap_or(&*default_edge).apply(state, &world);
            state.at_edge = own;
        }
        patches.occupancy_move(id, p0, self.patch_of(id));
        Ok(outcome)
    }

    /// Move `distance` along the current heading.
    pub fn forward(
        &mut self,
        id: AgentId,
        distance: f64,
        patches: &mut Patches,
    ) -> Result<EdgeOutcome, AgentError> {
        let s = self.state(id)?;
        let (x, y) = (s.x + distance * s.theta.cos(), s.y + distance * s.theta.sin());
        self.setxy(id, x, y, None, patches)
    }

    /// Move to `(x, y, z)`.
    pub fn move_to(
        &mut self,
        id: AgentId,
        x: f64,
        y: f64,
        z: Option<f64>,
        patches: &mut Patches,
    ) -> Result<EdgeOutcome, AgentError> {
        self.setxy(id, x, y, z, patches)
    }

    /// Heading of `id` in the model geometry.
    pub fn heading(&self, id: AgentId) -> Result<f64, AgentError> {
        self.state(id).map(|s| self.geometry.from_rads(s.theta))
    }

    /// Point `id` along `heading`.
    pub fn set_heading(&mut self, id: AgentId, heading: f64) -> Result<(), AgentError> {
        let theta = mod2pi(self.geometry.to_rads(heading));
        self.state_mut(id)?.theta = theta;
        Ok(())
    }

    /// Turn `id` by `angle`; positive turns counter-clockwise.
    pub fn rotate(&mut self, id: AgentId, angle: f64) -> Result<(), AgentError> {
        let heading = self.heading(id)? + self.geometry.to_ccw(angle);
        self.set_heading(id, heading)
    }

    /// Turn clockwise by `angle`.
    pub fn right(&mut self, id: AgentId, angle: f64) -> Result<(), AgentError> {
        self.rotate(id, -angle)
    }

    /// Turn counter-clockwise by `angle`.
    pub fn left(&mut self, id: AgentId, angle: f64) -> Result<(), AgentError> {
        self.rotate(id, angle)
    }

    /// Smallest turn that would bring `id` to `heading`, signed in the
    /// geometry's own turn direction.
    pub fn subtract_heading(&self, id: AgentId, heading: f64) -> Result<f64, AgentError> {
        let theta = self.state(id)?.theta;
        let d = herd_core::math::subtract_radians(self.geometry.to_rads(heading), theta);
        Ok(self.geometry.to_ccw(self.geometry.from_angle_rads(d)))
    }

    /// Turn `id` to face `(x, y)`.
    pub fn face_xy(&mut self, id: AgentId, x: f64, y: f64) -> Result<(), AgentError> {
        let heading = self.towards_xy(id, x, y)?;
        self.set_heading(id, heading)
    }

    /// Heading from `id` toward `(x, y)`.
    pub fn towards_xy(&self, id: AgentId, x: f64, y: f64) -> Result<f64, AgentError> {
        let s = self.state(id)?;
        Ok(self.geometry.from_rads(radians_toward_xy(s.x, s.y, x, y)))
    }

    /// Distance from `id` to `(x, y)`, in 3D when both sides have a z.
    pub fn distance_xy(
        &self,
        id: AgentId,
        x: f64,
        y: f64,
        z: Option<f64>,
    ) -> Result<f64, AgentError> {
        let s = self.state(id)?;
        Ok(match (s.z, z) {
            (Some(z0), Some(z1)) => distance3(s.x, s.y, z0, x, y, z1),
            _ => distance(s.x, s.y, x, y),
        })
    }

    /// Distance between two turtles.
    pub fn distance(&self, a: AgentId, b: AgentId) -> Result<f64, AgentError> {
        let s = self.state(b)?;
        self.distance_xy(a, s.x, s.y, s.z)
    }

    /// x step of a unit move forward.
    pub fn dx(&self, id: AgentId) -> Result<f64, AgentError> {
        self.state(id).map(|s| s.theta.cos())
    }

    /// y step of a unit move forward.
    pub fn dy(&self, id: AgentId) -> Result<f64, AgentError> {
        self.state(id).map(|s| s.theta.sin())
    }

    // ── patches ─────────────────────────────────────────────────

    /// Patch under `id`; `None` if off the world or unknown.
    pub fn patch_of(&self, id: AgentId) -> Option<AgentId> {
        let s = self.set.state(id)?;
        self.world
            .xy_to_patch_index(s.x, s.y)
            .map(|i| AgentId(i as u32))
    }

    /// Patch `distance` from `id` along `heading`.
    pub fn patch_at_heading_and_distance(
        &self,
        id: AgentId,
        heading: f64,
        distance: f64,
        patches: &Patches,
    ) -> Result<Option<AgentId>, AgentError> {
        let s = self.state(id)?;
        let rads = self.geometry.to_rads(heading);
        Ok(patches.patch(s.x + distance * rads.cos(), s.y + distance * rads.sin()))
    }

    /// Patch `distance` straight ahead.
    pub fn patch_ahead(
        &self,
        id: AgentId,
        distance: f64,
        patches: &Patches,
    ) -> Result<Option<AgentId>, AgentError> {
        let heading = self.heading(id)?;
        self.patch_at_heading_and_distance(id, heading, distance, patches)
    }

    /// Patch `distance` away, `angle` to the right of the heading.
    pub fn patch_right_and_ahead(
        &self,
        id: AgentId,
        angle: f64,
        distance: f64,
        patches: &Patches,
    ) -> Result<Option<AgentId>, AgentError> {
        let heading = self.heading(id)? - self.geometry.to_ccw(angle);
        self.patch_at_heading_and_distance(id, heading, distance, patches)
    }

    /// Patch `distance` away, `angle` to the left of the heading.
    pub fn patch_left_and_ahead(
        &self,
        id: AgentId,
        angle: f64,
        distance: f64,
        patches: &Patches,
    ) -> Result<Option<AgentId>, AgentError> {
        self.patch_right_and_ahead(id, -angle, distance, patches)
    }

    /// Whether moving `distance` forward stays on the world.
    pub fn can_move(
        &self,
        id: AgentId,
        distance: f64,
        patches: &Patches,
    ) -> Result<bool, AgentError> {
        Ok(self.patch_ahead(id, distance, patches)?.is_some())
    }

    /// Patch offset `(dx, dy)` from the turtle's position.
    pub fn patch_at(
        &self,
        id: AgentId,
        dx: f64,
        dy: f64,
        patches: &Patches,
    ) -> Result<Option<AgentId>, AgentError> {
        let s = self.state(id)?;
        Ok(patches.patch(s.x + dx, s.y + dy))
    }

    // ── links ───────────────────────────────────────────────────

    /// Links attached to `id`; empty for unknown turtles.
    pub fn links_of(&self, id: AgentId) -> &AgentArray<AgentId> {
        self.set.state(id).map(TurtleState::links).unwrap_or(&EMPTY)
    }

    /// Turtles at the other end of each link of `id`.
    pub fn link_neighbors(&self, id: AgentId, links: &Links) -> AgentArray<AgentId> {
        self.links_of(id)
            .iter()
            .filter_map(|&l| links.other_end(l, id).ok())
            .collect()
    }

    /// Whether `a` and `b` share a link.
    pub fn is_link_neighbor(&self, a: AgentId, b: AgentId, links: &Links) -> bool {
        self.link_neighbors(a, links).contains(&b)
    }

    // ── spatial queries ─────────────────────────────────────────

    /// Members of `scope` standing on any of `patch_ids`.
    pub fn in_patches(
        &self,
        scope: Scope,
        patch_ids: &[AgentId],
        patches: &mut Patches,
    ) -> AgentArray<AgentId> {
        patches.ensure_occupancy(self);
        let mut found = AgentArray::new();
        for &p in patch_ids {
            for &t in patches.turtles_on(p).iter() {
                found.push(t);
            }
        }
        self.set.filter_scope(found, scope)
    }

    /// Members of `scope` on the patches within `dx` by `dy` of the patch
    /// under `id`. `id` itself is included only with `me_too`.
    pub fn in_patch_rect(
        &self,
        scope: Scope,
        id: AgentId,
        dx: i32,
        dy: i32,
        me_too: bool,
        patches: &mut Patches,
    ) -> AgentArray<AgentId> {
        let Some(p) = self.patch_of(id) else {
            return AgentArray::new();
        };
        let rect = patches.patch_rect(p, dx, dy, true);
        let mut found = self.in_patches(scope, &rect, patches);
        if !me_too {
            found.retain(|&t| t != id);
        }
        found
    }

    /// Members of `scope` on the patches within `dx` by `dy` of the patch
    /// containing `(x, y)`.
    pub fn in_patch_rect_xy(
        &self,
        scope: Scope,
        x: f64,
        y: f64,
        dx: i32,
        dy: i32,
        patches: &mut Patches,
    ) -> AgentArray<AgentId> {
        let rect = patches.patch_rect_xy(x, y, dx, dy, true);
        self.in_patches(scope, &rect, patches)
    }

    /// Members of `scope` within `radius` of `id`.
    pub fn in_radius(
        &self,
        scope: Scope,
        id: AgentId,
        radius: f64,
        me_too: bool,
        patches: &mut Patches,
    ) -> Result<AgentArray<AgentId>, AgentError> {
        let (x, y) = self.xy(id)?;
        let r = patches.radius_span(radius);
        let near = self.in_patch_rect(scope, id, r, r, true, patches);
        Ok(agent_list::in_radius(self, &near, Origin::agent(id, x, y), radius, me_too))
    }

    /// Members of `scope` in the cone `cone_angle` wide and `radius` long
    /// along the heading of `id`.
    pub fn in_cone(
        &self,
        scope: Scope,
        id: AgentId,
        radius: f64,
        cone_angle: f64,
        me_too: bool,
        patches: &mut Patches,
    ) -> Result<AgentArray<AgentId>, AgentError> {
        let s = self.state(id)?;
        let (x, y, theta) = (s.x, s.y, s.theta);
        let r = patches.radius_span(radius);
        let near = self.in_patch_rect(scope, id, r, r, true, patches);
        Ok(agent_list::in_cone(
            self,
            &near,
            Origin::agent(id, x, y),
            radius,
            self.geometry.to_angle_rads(cone_angle),
            theta,
            me_too,
        ))
    }

    /// The member of `scope` nearest `(x, y)` among those on patches
    /// within `radius` (rounded up) of it.
    pub fn closest_turtle(
        &self,
        scope: Scope,
        x: f64,
        y: f64,
        radius: f64,
        patches: &mut Patches,
    ) -> Option<AgentId> {
        let r = patches.radius_span(radius);
        let near = self.in_patch_rect_xy(scope, x, y, r, r, patches);
        near.iter().copied().min_by(|&a, &b| {
            let da = self.distance_xy(a, x, y, None).unwrap_or(f64::INFINITY);
            let db = self.distance_xy(b, x, y, None).unwrap_or(f64::INFINITY);
            da.total_cmp(&db)
        })
    }
}

impl Locate for Turtles {
    fn locate(&self, id: AgentId) -> Option<(f64, f64)> {
        self.set.state(id).map(|s| (s.x, s.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herd_core::math::subtract_degrees;
    use herd_core::random::seeded_rng;
    use herd_core::WorldOptions;

    fn world() -> World {
        World::new(WorldOptions::centered(5, 5, 0)).unwrap()
    }

    fn setup() -> (Turtles, Patches, Links) {
        let w = world();
        (
            Turtles::new(w, Geometry::Heading),
            Patches::new(w, Geometry::Heading).unwrap(),
            Links::new(Geometry::Heading),
        )
    }

    fn spawn(t: &mut Turtles, p: &mut Patches, x: f64, y: f64) -> AgentId {
        t.create_with(Scope::Base, TurtleState::at(x, y, 0.0), p).unwrap()
    }

    #[test]
    fn create_gives_headings_in_range() {
        let (mut t, mut p, _) = setup();
        let mut rng = seeded_rng(11);
        let ids = t.create(Scope::Base, 20, &mut p, &mut rng).unwrap();
        assert_eq!(ids.len(), 20);
        for &id in ids.iter() {
            let theta = t.set().state(id).unwrap().theta;
            assert!((0.0..std::f64::consts::TAU).contains(&theta));
        }
    }

    #[test]
    fn wrap_at_edge() {
        let (mut t, mut p, _) = setup();
        let id = spawn(&mut t, &mut p, 0.0, 0.0);
        let out = t.setxy(id, 6.0, 0.0, None, &mut p).unwrap();
        assert_eq!(out, EdgeOutcome::Keep);
        let (x, _) = t.xy(id).unwrap();
        assert!((x - -5.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_and_bounce() {
        let (mut t, mut p, _) = setup();
        let id = spawn(&mut t, &mut p, 0.0, 0.0);
        t.set_mut().state_mut(id).unwrap().at_edge = Some(EdgePolicy::Clamp);
        t.setxy(id, 9.0, -9.0, None, &mut p).unwrap();
        assert_eq!(t.xy(id).unwrap(), (5.5, -5.5));

        let b = spawn(&mut t, &mut p, 0.0, 0.0);
        t.set_mut().state_mut(b).unwrap().at_edge = Some(EdgePolicy::Bounce);
        t.set_mut().state_mut(b).unwrap().theta = 0.25;
        t.setxy(b, 0.0, 7.0, None, &mut p).unwrap();
        assert_eq!(t.xy(b).unwrap(), (0.0, 5.5));
        assert_eq!(t.set().state(b).unwrap().theta, -0.25);
    }

    #[test]
    fn ignore_leaves_turtle_off_world() {
        let (mut t, mut p, _) = setup();
        t.set_default_edge(EdgePolicy::Ignore);
        let id = spawn(&mut t, &mut p, 0.0, 0.0);
        t.setxy(id, 50.0, 0.0, None, &mut p).unwrap();
        assert_eq!(t.patch_of(id), None);
    }

    #[test]
    fn custom_handler_can_request_death() {
        let (mut t, mut p, _) = setup();
        t.set_default_edge(EdgePolicy::Custom(Arc::new(
            |_: &mut TurtleState, _: &World| EdgeOutcome::Die,
        )));
        let id = spawn(&mut t, &mut p, 0.0, 0.0);
        assert_eq!(t.setxy(id, 1.0, 1.0, None, &mut p), Ok(EdgeOutcome::Keep));
        assert_eq!(t.setxy(id, 10.0, 1.0, None, &mut p), Ok(EdgeOutcome::Die));
    }

    #[test]
    fn heading_and_turns() {
        let (mut t, mut p, _) = setup();
        let id = spawn(&mut t, &mut p, 0.0, 0.0);
        t.set_heading(id, 0.0).unwrap();
        t.right(id, 90.0).unwrap();
        assert!((t.heading(id).unwrap() - 90.0).abs() < 1e-9);
        assert!((t.dx(id).unwrap() - 1.0).abs() < 1e-12);
        t.left(id, 180.0).unwrap();
        let h = t.heading(id).unwrap();
        assert!((h - -90.0).abs() < 1e-9 || (h - 270.0).abs() < 1e-9, "heading {h}");
        let turn = t.subtract_heading(id, 0.0).unwrap();
        assert!((turn - 90.0).abs() < 1e-9, "turn {turn}");
        t.face_xy(id, 0.0, -3.0).unwrap();
        let towards = t.towards_xy(id, 0.0, -3.0).unwrap();
        let facing = t.heading(id).unwrap();
        assert!(subtract_degrees(towards, facing).abs() < 1e-9, "{towards} vs {facing}");
    }

    #[test]
    fn forward_and_patch_ahead() {
        let (mut t, mut p, _) = setup();
        let id = spawn(&mut t, &mut p, 0.0, 0.0);
        t.set_heading(id, 90.0).unwrap();
        t.forward(id, 2.0, &mut p).unwrap();
        let (x, y) = t.xy(id).unwrap();
        assert!((x - 2.0).abs() < 1e-12 && y.abs() < 1e-12);
        assert_eq!(t.patch_of(id), p.patch_xy(2, 0));
        assert_eq!(t.patch_ahead(id, 1.0, &p).unwrap(), p.patch_xy(3, 0));
        assert_eq!(t.patch_right_and_ahead(id, 90.0, 2.0, &p).unwrap(), p.patch_xy(2, -2));
        assert_eq!(t.patch_left_and_ahead(id, 90.0, 2.0, &p).unwrap(), p.patch_xy(2, 2));
        assert!(t.can_move(id, 3.0, &p).unwrap());
        assert!(!t.can_move(id, 4.0, &p).unwrap());
        assert_eq!(t.patch_at(id, -1.0, 1.0, &p).unwrap(), p.patch_xy(1, 1));
    }

    #[test]
    fn occupancy_tracks_moves() {
        let (mut t, mut p, _) = setup();
        let a = spawn(&mut t, &mut p, 0.0, 0.0);
        let origin = p.patch_xy(0, 0).unwrap();
        assert_eq!(p.turtles_here(origin, &t).as_slice(), &[a]);
        t.setxy(a, 1.0, 0.0, None, &mut p).unwrap();
        assert!(p.turtles_on(origin).is_empty());
        let b = spawn(&mut t, &mut p, 1.2, 0.1);
        assert_eq!(p.turtles_on(p.patch_xy(1, 0).unwrap()).as_slice(), &[a, b]);
    }

    #[test]
    fn radius_queries_use_true_distance() {
        let (mut t, mut p, _) = setup();
        let me = spawn(&mut t, &mut p, 0.0, 0.0);
        let near = spawn(&mut t, &mut p, 0.9, 0.9);
        let far = spawn(&mut t, &mut p, 1.4, 1.4);
        let found = t.in_radius(Scope::Base, me, 1.5, false, &mut p).unwrap();
        assert_eq!(found.as_slice(), &[near]);
        let all = t.in_patch_rect(Scope::Base, me, 1, 1, true, &mut p);
        assert_eq!(all.len(), 3);
        assert!(all.contains(&far));
        assert_eq!(t.closest_turtle(Scope::Base, 1.5, 1.5, 1.0, &mut p), Some(far));
    }

    #[test]
    fn huge_radius_finds_every_turtle() {
        let (mut t, mut p, _) = setup();
        let me = spawn(&mut t, &mut p, 4.0, 4.0);
        let other = spawn(&mut t, &mut p, -5.0, -5.0);
        let found = t.in_radius(Scope::Base, me, 1e12, false, &mut p).unwrap();
        assert_eq!(found.as_slice(), &[other]);
        let wide = t.in_cone(Scope::Base, me, 1e12, 90.0, true, &mut p).unwrap();
        assert_eq!(wide, t.in_cone(Scope::Base, me, 20.0, 90.0, true, &mut p).unwrap());
        assert_eq!(t.closest_turtle(Scope::Base, -4.0, -4.0, 1e12, &mut p), Some(other));
    }

    #[test]
    fn cone_follows_heading() {
        let (mut t, mut p, _) = setup();
        let me = spawn(&mut t, &mut p, 0.0, 0.0);
        let ahead = spawn(&mut t, &mut p, 0.0, 2.0);
        spawn(&mut t, &mut p, 0.0, -2.0);
        t.set_heading(me, 0.0).unwrap();
        let seen = t.in_cone(Scope::Base, me, 3.0, 60.0, false, &mut p).unwrap();
        assert_eq!(seen.as_slice(), &[ahead]);
    }

    #[test]
    fn breed_filter_in_patches() {
        let (mut t, mut p, _) = setup();
        let cats = t.set_mut().new_breed("cats");
        let plain = spawn(&mut t, &mut p, 0.0, 0.0);
        let cat = t
            .create_with(Scope::Breed(cats), TurtleState::at(0.0, 0.0, 0.0), &mut p)
            .unwrap();
        let here = p.patch_xy(0, 0).unwrap();
        let all = t.in_patches(Scope::Base, &[here], &mut p);
        assert_eq!(all.as_slice(), &[plain, cat]);
        assert_eq!(p.breeds_here(here, Scope::Breed(cats), &t).as_slice(), &[cat]);
    }

    #[test]
    fn die_removes_links_and_occupancy() {
        let (mut t, mut p, mut l) = setup();
        let a = spawn(&mut t, &mut p, 0.0, 0.0);
        let b = spawn(&mut t, &mut p, 1.0, 0.0);
        let c = spawn(&mut t, &mut p, 2.0, 0.0);
        l.create_one(Scope::Base, a, b, &mut t).unwrap();
        l.create_one(Scope::Base, b, c, &mut t).unwrap();
        assert!(t.is_link_neighbor(b, a, &l));
        assert_eq!(t.link_neighbors(b, &l).as_slice(), &[a, c]);
        let here = p.patch_xy(1, 0).unwrap();
        assert_eq!(p.turtles_here(here, &t).len(), 1);

        assert!(t.die(b, &mut l, &mut p).is_some());
        assert!(l.set().is_empty(Scope::Base));
        assert!(t.links_of(a).is_empty());
        assert!(t.links_of(c).is_empty());
        assert!(p.turtles_on(here).is_empty());
        assert!(t.die(b, &mut l, &mut p).is_none());
    }
}
