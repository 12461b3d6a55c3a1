//! Edges between turtles.

use herd_core::math::{distance, radians_toward_xy};
use herd_core::{AgentId, Geometry};

use crate::agent_array::AgentArray;
use crate::agent_set::{AgentRecord, AgentSet, Scope};
use crate::error::AgentError;
use crate::turtles::Turtles;

/// Per-link state.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkState {
    /// First end.
    pub end0: AgentId,
    /// Second end.
    pub end1: AgentId,
    /// Drawing width.
    pub width: f64,
}

impl LinkState {
    /// A link from `end0` to `end1` of width 1.
    pub fn new(end0: AgentId, end1: AgentId) -> Self {
        Self {
            end0,
            end1,
            width: 1.0,
        }
    }
}

/// All links of a model.
#[derive(Clone, Debug)]
pub struct Links {
    set: AgentSet<LinkState>,
    geometry: Geometry,
}

impl Links {
    /// No links.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            set: AgentSet::new("links"),
            geometry,
        }
    }

    /// The underlying agent set.
    pub fn set(&self) -> &AgentSet<LinkState> {
        &self.set
    }

    /// Mutable access to the underlying agent set, for fields and breeds.
    pub fn set_mut(&mut self) -> &mut AgentSet<LinkState> {
        &mut self.set
    }

    fn state(&self, id: AgentId) -> Result<&LinkState, AgentError> {
        self.set.require(id).map(|r| &r.state)
    }

    /// Link `from` to `to`, registering the link with both turtles.
    pub fn create_one(
        &mut self,
        scope: Scope,
        from: AgentId,
        to: AgentId,
        turtles: &mut Turtles,
    ) -> Result<AgentId, AgentError> {
        turtles.set().require(from)?;
        turtles.set().require(to)?;
        let id = self.set.add_agent(scope, LinkState::new(from, to))?;
        turtles.attach_link(from, id);
        turtles.attach_link(to, id);
        Ok(id)
    }

    /// Link `from` to each of `tos`.
    pub fn create(
        &mut self,
        scope: Scope,
        from: AgentId,
        tos: &[AgentId],
        turtles: &mut Turtles,
    ) -> Result<AgentArray<AgentId>, AgentError> {
        tos.iter()
            .map(|&to| self.create_one(scope, from, to, turtles))
            .collect()
    }

    /// Remove link `id`, detaching it from both ends.
    pub fn die(&mut self, id: AgentId, turtles: &mut Turtles) -> Option<AgentRecord<LinkState>> {
        let record = self.set.remove_agent(id)?;
        turtles.detach_link(record.state.end0, id);
        turtles.detach_link(record.state.end1, id);
        Some(record)
    }

    /// `(end0, end1)`.
    pub fn both_ends(&self, id: AgentId) -> Result<(AgentId, AgentId), AgentError> {
        self.state(id).map(|s| (s.end0, s.end1))
    }

    /// The end of `link` that is not `turtle`.
    pub fn other_end(&self, link: AgentId, turtle: AgentId) -> Result<AgentId, AgentError> {
        let s = self.state(link)?;
        if turtle == s.end0 {
            Ok(s.end1)
        } else if turtle == s.end1 {
            Ok(s.end0)
        } else {
            Err(AgentError::NotALinkEnd { link, turtle })
        }
    }

    /// Distance between the ends.
    pub fn length(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        let (a, b) = self.both_ends(id)?;
        turtles.distance(a, b)
    }

    /// Direction from `end0` to `end1`.
    pub fn heading(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        let (x0, y0) = self.xy0(id, turtles)?;
        let (x1, y1) = self.xy1(id, turtles)?;
        Ok(self.geometry.from_rads(radians_toward_xy(x0, y0, x1, y1)))
    }

    /// How far `(x, y)` is off the link: the sum of its distances to the
    /// ends minus the link length. Zero on the segment.
    pub fn distance_xy(
        &self,
        id: AgentId,
        x: f64,
        y: f64,
        turtles: &Turtles,
    ) -> Result<f64, AgentError> {
        let (x0, y0) = self.xy0(id, turtles)?;
        let (x1, y1) = self.xy1(id, turtles)?;
        Ok(distance(x0, y0, x, y) + distance(x1, y1, x, y) - distance(x0, y0, x1, y1))
    }

    fn xy0(&self, id: AgentId, turtles: &Turtles) -> Result<(f64, f64), AgentError> {
        turtles.xy(self.state(id)?.end0)
    }

    fn xy1(&self, id: AgentId, turtles: &Turtles) -> Result<(f64, f64), AgentError> {
        turtles.xy(self.state(id)?.end1)
    }

    /// x of `end0`.
    pub fn x0(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        self.xy0(id, turtles).map(|p| p.0)
    }

    /// y of `end0`.
    pub fn y0(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        self.xy0(id, turtles).map(|p| p.1)
    }

    /// z of `end0`, 0 when it has none.
    pub fn z0(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        let end = self.state(id)?.end0;
        Ok(turtles.set().require(end)?.state.z.unwrap_or(0.0))
    }

    /// x of `end1`.
    pub fn x1(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        self.xy1(id, turtles).map(|p| p.0)
    }

    /// y of `end1`.
    pub fn y1(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        self.xy1(id, turtles).map(|p| p.1)
    }

    /// z of `end1`, 0 when it has none.
    pub fn z1(&self, id: AgentId, turtles: &Turtles) -> Result<f64, AgentError> {
        let end = self.state(id)?.end1;
        Ok(turtles.set().require(end)?.state.z.unwrap_or(0.0))
    }
}
