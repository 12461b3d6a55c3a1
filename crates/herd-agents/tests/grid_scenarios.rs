//! Cross-set scenarios on small grids: patches, turtles and links used
//! together the way a model uses them.

use herd_agents::agent_list::{self, Origin};
use herd_agents::{AgentArray, EdgePolicy, Scope};
use herd_core::AgentId;
use herd_dataset::DataType;
use herd_test_utils::fixtures::{bowl, ramp};
use herd_test_utils::{MockLocator, TestGridBuilder};

#[test]
fn point_lookup_at_world_edge() {
    let grid = TestGridBuilder::new().build();
    let p = grid.patches.patch(2.5, 0.0).unwrap();
    assert_eq!(grid.patches.xy_of(p), Some((2, 0)));
    assert_eq!(grid.patches.patch(2.6, 0.0), None);
    assert_eq!(grid.patches.patch(-2.5, -2.5).and_then(|p| grid.patches.xy_of(p)), Some((-2, -2)));
}

#[test]
fn turtle_death_removes_links_everywhere() {
    let mut grid = TestGridBuilder::new().with_occupancy().build();
    let a = grid.turtle_at(0.0, 0.0, 0.0).unwrap();
    let b = grid.turtle_at(1.0, 1.0, 0.0).unwrap();
    let c = grid.turtle_at(-1.0, 1.0, 0.0).unwrap();
    let ab = grid.links.create_one(Scope::Base, a, b, &mut grid.turtles).unwrap();
    let bc = grid.links.create_one(Scope::Base, b, c, &mut grid.turtles).unwrap();

    grid.turtles.die(b, &mut grid.links, &mut grid.patches).unwrap();

    assert!(!grid.links.set().is_live(ab));
    assert!(!grid.links.set().is_live(bc));
    assert!(grid.turtles.links_of(a).is_empty());
    assert!(grid.turtles.links_of(c).is_empty());
    let pb = grid.patches.patch(1.0, 1.0).unwrap();
    assert!(grid.patches.turtles_on(pb).is_empty());
}

#[test]
fn raster_round_trip_through_patches() {
    let mut grid = TestGridBuilder::new().build();
    let ds = ramp(5, 5);
    grid.patches.import_data_set(Scope::Base, &ds, "height", true).unwrap();
    let back = grid.patches.export_data_set(Scope::Base, "height", DataType::F64).unwrap();
    assert_eq!(back.data(), ds.data());

    let west = grid.patches.patch_xy(-2, 0).unwrap();
    let east = grid.patches.patch_xy(2, 0).unwrap();
    assert_eq!(grid.patches.set().num(west, "height"), Some(0.0));
    assert_eq!(grid.patches.set().num(east, "height"), Some(4.0));
}

#[test]
fn diffusion_keeps_bowl_mass() {
    let mut grid = TestGridBuilder::new().build();
    let ds = bowl(5, 5);
    grid.patches.import_data_set(Scope::Base, &ds, "heat", true).unwrap();
    let before: f64 = grid.patches.set().nums(Scope::Base, "heat").sum();
    for _ in 0..5 {
        grid.patches.diffuse("heat", 0.3).unwrap();
        grid.patches.diffuse4("heat", 0.2).unwrap();
    }
    let after = grid.patches.set().nums(Scope::Base, "heat");
    assert!((after.sum() - before).abs() < 1e-9);
    let centre = grid.patches.patch_xy(0, 0).unwrap();
    assert!(grid.patches.set().num(centre, "heat").unwrap() > 0.0);
}

#[test]
fn occupancy_matches_positions_after_random_walk() {
    let mut grid = TestGridBuilder::new()
        .world(herd_core::WorldOptions::centered(4, 4, 0))
        .turtles(30)
        .seed(9)
        .with_occupancy()
        .build();
    grid.turtles.set_default_edge(EdgePolicy::Bounce);
    let ids = grid.turtles.set().members(Scope::Base).to_vec();
    for step in 0..20 {
        for &id in &ids {
            grid.turtles.right(id, (step * 37 % 90) as f64).unwrap();
            grid.turtles.forward(id, 0.7, &mut grid.patches).unwrap();
        }
    }
    for &id in &ids {
        let p = grid.turtles.patch_of(id).unwrap();
        assert!(grid.patches.turtles_on(p).contains(&id));
    }
    let total: usize = (0..grid.patches.len())
        .map(|i| grid.patches.turtles_on(AgentId(i as u32)).len())
        .sum();
    assert_eq!(total, ids.len());
}

#[test]
fn radius_query_agrees_with_brute_force() {
    let mut grid = TestGridBuilder::new()
        .world(herd_core::WorldOptions::centered(6, 6, 0))
        .turtles(60)
        .seed(4)
        .build();
    let ids = grid.turtles.set().members(Scope::Base).to_vec();
    let me = ids[0];
    let (x, y) = grid.turtles.xy(me).unwrap();
    let mut fast = grid
        .turtles
        .in_radius(Scope::Base, me, 2.5, false, &mut grid.patches)
        .unwrap()
        .into_vec();
    fast.sort();
    let slow: Vec<AgentId> =
        agent_list::in_radius(&grid.turtles, &ids, Origin::agent(me, x, y), 2.5, false).into_vec();
    assert_eq!(fast, slow);
}

#[test]
fn spatial_filters_over_mock_points() {
    let locator = MockLocator::from_points(&[(0.0, 0.0), (3.0, 4.0), (1.0, 1.0), (-0.5, 0.2)]);
    let ids = locator.ids();
    let near = agent_list::in_radius(&locator, &ids, Origin::point(0.0, 0.0), 5.0, true);
    assert_eq!(near.len(), 4);
    let origin = Origin::agent(AgentId(0), 0.0, 0.0);
    let rect = agent_list::in_rect(&locator, &ids, origin, 1.0, 1.0, false);
    assert_eq!(rect, AgentArray::from_vec(vec![AgentId(2), AgentId(3)]));
}
