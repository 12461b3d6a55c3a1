//! Spatial filters over lists of positioned agents.

use herd_core::math::{in_cone as point_in_cone, sq_distance};
use herd_core::AgentId;

use crate::agent_array::AgentArray;

/// Anything that can report the position of an agent by id.
pub trait Locate {
    /// Position of `id`, or `None` if it does not exist.
    fn locate(&self, id: AgentId) -> Option<(f64, f64)>;
}

/// The centre of a spatial query.
///
/// `id` is the agent at the centre, if any; it is excluded from results
/// unless `me_too` is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Origin {
    /// Centre x.
    pub x: f64,
    /// Centre y.
    pub y: f64,
    /// Agent at the centre.
    pub id: Option<AgentId>,
}

impl Origin {
    /// A query centred on the agent `id` at `(x, y)`.
    pub fn agent(id: AgentId, x: f64, y: f64) -> Self {
        Self { x, y, id: Some(id) }
    }

    /// A query centred on a bare point.
    pub fn point(x: f64, y: f64) -> Self {
        Self { x, y, id: None }
    }
}

fn filter(
    layer: &impl Locate,
    ids: &[AgentId],
    origin: Origin,
    me_too: bool,
    keep: impl Fn(f64, f64) -> bool,
) -> AgentArray<AgentId> {
    ids.iter()
        .copied()
        .filter(|&id| {
            if origin.id == Some(id) {
                return me_too;
            }
            layer.locate(id).is_some_and(|(x, y)| keep(x, y))
        })
        .collect()
}

/// Agents within `dx` horizontally and `dy` vertically of the origin.
pub fn in_rect(
    layer: &impl Locate,
    ids: &[AgentId],
    origin: Origin,
    dx: f64,
    dy: f64,
    me_too: bool,
) -> AgentArray<AgentId> {
    filter(layer, ids, origin, me_too, |x, y| {
        (x - origin.x).abs() <= dx && (y - origin.y).abs() <= dy
    })
}

/// Agents within `radius` of the origin.
pub fn in_radius(
    layer: &impl Locate,
    ids: &[AgentId],
    origin: Origin,
    radius: f64,
    me_too: bool,
) -> AgentArray<AgentId> {
    let r2 = radius * radius;
    filter(layer, ids, origin, me_too, |x, y| {
        sq_distance(origin.x, origin.y, x, y) <= r2
    })
}

/// Agents inside the cone at the origin pointing along `direction`
/// (radians), `cone_angle` radians wide and `radius` long.
pub fn in_cone(
    layer: &impl Locate,
    ids: &[AgentId],
    origin: Origin,
    radius: f64,
    cone_angle: f64,
    direction: f64,
    me_too: bool,
) -> AgentArray<AgentId> {
    filter(layer, ids, origin, me_too, |x, y| {
        point_in_cone(x, y, radius, cone_angle, direction, origin.x, origin.y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::f64::consts::PI;

    struct Points(HashMap<AgentId, (f64, f64)>);

    impl Locate for Points {
        fn locate(&self, id: AgentId) -> Option<(f64, f64)> {
            self.0.get(&id).copied()
        }
    }

    fn layer() -> (Points, Vec<AgentId>) {
        let pts = [(0.0, 0.0), (1.0, 0.0), (0.0, 2.0), (-3.0, 0.0), (1.0, 0.5)];
        let map = pts
            .iter()
            .enumerate()
            .map(|(i, &p)| (AgentId(i as u32), p))
            .collect();
        (Points(map), (0..5).map(AgentId).collect())
    }

    #[test]
    fn radius_excludes_self_unless_asked() {
        let (l, ids) = layer();
        let o = Origin::agent(AgentId(0), 0.0, 0.0);
        let near = in_radius(&l, &ids, o, 1.5, false);
        assert_eq!(near.as_slice(), &[AgentId(1), AgentId(4)]);
        let with_me = in_radius(&l, &ids, o, 1.5, true);
        assert_eq!(with_me.len(), 3);
    }

    #[test]
    fn rect_is_axis_aligned() {
        let (l, ids) = layer();
        let r = in_rect(&l, &ids, Origin::point(0.0, 0.0), 1.0, 2.0, false);
        assert_eq!(r.as_slice(), &[AgentId(0), AgentId(1), AgentId(2), AgentId(4)]);
    }

    #[test]
    fn cone_points_along_direction() {
        let (l, ids) = layer();
        let o = Origin::agent(AgentId(0), 0.0, 0.0);
        let east = in_cone(&l, &ids, o, 5.0, PI / 2.0, 0.0, false);
        assert_eq!(east.as_slice(), &[AgentId(1), AgentId(4)]);
        let west = in_cone(&l, &ids, o, 5.0, PI / 2.0, PI, true);
        assert_eq!(west.as_slice(), &[AgentId(0), AgentId(3)]);
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let (l, _) = layer();
        let r = in_radius(&l, &[AgentId(42)], Origin::point(0.0, 0.0), 100.0, true);
        assert!(r.is_empty());
    }
}
