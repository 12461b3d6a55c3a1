//! End-to-end runs of the reference models through `Simulation`.

use herd_agents::{EdgeOutcome, EdgePolicy, Scope, TurtleState};
use herd_bench::{reference_config, terrain, Droplets, Hello, HelloPlus, StepType};
use herd_core::{World, WorldOptions};
use herd_engine::{sample_model, Model, ModelConfig, Simulation};
use herd_test_utils::fixtures::bowl;
use std::sync::Arc;

fn small(seed: u64) -> ModelConfig {
    ModelConfig {
        seed,
        ..ModelConfig::with_world(WorldOptions::centered(10, 10, 0))
    }
}

#[test]
fn hello_runs_and_keeps_every_turtle_on_world() {
    let mut sim = Simulation::new(small(3), Hello::default()).unwrap();
    sim.setup().unwrap();
    assert_eq!(sim.model().links.set().len(Scope::Base), 10);
    sim.run(200).unwrap();

    let m = sim.model();
    assert_eq!(m.ticks(), 200);
    assert_eq!(m.turtles.set().len(Scope::Base), 10);
    for &t in m.turtles.set().members(Scope::Base).iter() {
        let (x, y) = m.turtles.xy(t).unwrap();
        assert!(m.world.is_on_world(x, y, None));
        for &l in m.turtles.links_of(t).iter() {
            assert!(m.links.other_end(l, t).is_ok());
        }
    }
}

#[test]
fn hello_is_reproducible_per_seed() {
    let sample = |seed| {
        let mut sim = Simulation::new(small(seed), Hello::default()).unwrap();
        sim.setup().unwrap();
        sim.run(50).unwrap();
        sample_model(sim.model_mut())
    };
    assert_eq!(sample(5), sample(5));
    assert_ne!(sample(5)["turtle"], sample(6)["turtle"]);
}

#[test]
fn hello_plus_population_follows_target() {
    let behavior = HelloPlus {
        change_tick: Some(10),
        ..HelloPlus::default()
    };
    let mut sim = Simulation::new(small(4), behavior).unwrap();
    sim.setup().unwrap();
    assert_eq!(sim.model().turtles.set().len(Scope::Base), 15);

    let mut targets = Vec::new();
    let mut last_id = 0;
    for _ in 0..120 {
        sim.step().unwrap();
        let target = sim.behavior().hello.population;
        targets.push(target);
        assert!((5..25).contains(&target));

        let m = sim.model();
        let turtles = m.turtles.set().members(Scope::Base);
        assert_eq!(turtles.len(), target);
        let mut ends = 0;
        for &t in turtles.iter() {
            let (x, y) = m.turtles.xy(t).unwrap();
            assert!(m.world.is_on_world(x, y, None));
            assert!(!m.turtles.links_of(t).is_empty());
            for &l in m.turtles.links_of(t).iter() {
                let other = m.links.other_end(l, t).unwrap();
                assert!(m.turtles.set().is_live(other));
            }
            ends += m.turtles.links_of(t).len();
        }
        assert_eq!(ends, 2 * m.links.set().len(Scope::Base));
        last_id = last_id.max(turtles.last().map_or(0, |t| t.0));
    }
    targets.dedup();
    assert!(targets.len() > 1, "target never changed");
    assert!(last_id >= 15, "no turtle was ever born");
}

#[test]
fn hello_plus_without_change_tick_keeps_population() {
    let behavior = HelloPlus {
        change_tick: None,
        ..HelloPlus::default()
    };
    let mut sim = Simulation::new(small(6), behavior).unwrap();
    sim.setup().unwrap();
    let before = sim.model().turtles.set().members(Scope::Base).to_vec();
    sim.run(30).unwrap();
    assert_eq!(sim.model().turtles.set().members(Scope::Base).to_vec(), before);
}

fn mean_distance_from_origin(m: &Model) -> f64 {
    let ids = m.turtles.set().members(Scope::Base);
    let total: f64 = ids
        .iter()
        .map(|&t| {
            let (x, y) = m.turtles.xy(t).unwrap();
            x.hypot(y)
        })
        .sum();
    total / ids.len() as f64
}

#[test]
fn droplets_run_downhill_into_bowl() {
    let mut sim = Simulation::new(small(1), Droplets::new(bowl(21, 21))).unwrap();
    sim.setup().unwrap();
    let centre = sim.model().patches.patch_xy(0, 0).unwrap();
    assert_eq!(sim.behavior().local_mins(), &[centre]);
    assert_eq!(sim.model().turtles.set().len(Scope::Base), 21 * 21);
    assert_eq!(sim.behavior().turtles_on_local_mins(sim.model()), 1);

    let before = mean_distance_from_origin(sim.model());
    sim.run(150).unwrap();
    let after = mean_distance_from_origin(sim.model());
    assert!(after < 0.8 * before, "{before} -> {after}");
    assert_eq!(sim.model().turtles.set().len(Scope::Base), 21 * 21);
}

#[test]
fn droplets_respect_puddle_depth_on_entry() {
    let mut droplets = Droplets::new(bowl(21, 21));
    droplets.puddle_depth = 3;
    let mut sim = Simulation::new(small(2), droplets).unwrap();
    sim.setup().unwrap();
    let centre = sim.model().patches.patch_xy(0, 0).unwrap();
    for _ in 0..100 {
        sim.step().unwrap();
        assert!(sim.model_mut().turtles_here(centre).len() <= 3);
    }
}

#[test]
fn droplets_step_types_all_run() {
    for step_type in [
        StepType::MinNeighbor,
        StepType::PatchAspect,
        StepType::DataSetAspect { nearest: true },
        StepType::DataSetAspect { nearest: false },
    ] {
        let mut droplets = Droplets::new(terrain(21, 21, 9));
        droplets.step_type = step_type;
        droplets.kill_offworld = true;
        let mut sim = Simulation::new(small(4), droplets).unwrap();
        sim.setup().unwrap();
        sim.run(30).unwrap();
        let m = sim.model();
        assert!(m.turtles.set().len(Scope::Base) <= 21 * 21);
        for &t in m.turtles.set().members(Scope::Base).iter() {
            let (x, y) = m.turtles.xy(t).unwrap();
            assert!(m.world.is_on_world(x, y, None), "{step_type:?}");
        }
    }
}

#[test]
fn kill_offworld_installs_dying_edge() {
    let mut droplets = Droplets::new(bowl(21, 21));
    droplets.kill_offworld = true;
    let mut sim = Simulation::new(small(8), droplets).unwrap();
    sim.setup().unwrap();
    let m = sim.model_mut();
    let t = m.turtles.set().members(Scope::Base)[0];
    assert_eq!(m.setxy(t, 40.0, 0.0, None).unwrap(), EdgeOutcome::Die);
    assert!(!m.turtles.set().is_live(t));
    assert_eq!(m.turtles.set().len(Scope::Base), 21 * 21 - 1);

    let mut clamped = Simulation::new(small(8), Droplets::new(bowl(21, 21))).unwrap();
    clamped.setup().unwrap();
    let m = clamped.model_mut();
    let t = m.turtles.set().members(Scope::Base)[0];
    assert_eq!(m.setxy(t, 40.0, 0.0, None).unwrap(), EdgeOutcome::Keep);
    assert!(m.turtles.set().is_live(t));
}

#[test]
fn reference_profile_builds() {
    let m = Model::new(reference_config(0)).unwrap();
    assert_eq!(m.patches.len(), 101 * 101);
}

#[test]
fn custom_edge_on_single_turtle_overrides_default() {
    let mut m = Model::new(small(0)).unwrap();
    m.turtles.set_default_edge(EdgePolicy::Wrap);
    let made = m.create_turtles(Scope::Base, 2, |_, _| Ok(())).unwrap();
    let doomed = made[0];
    let die = |_: &mut TurtleState, _: &World| EdgeOutcome::Die;
    if let Some(s) = m.turtles.set_mut().state_mut(doomed) {
        s.at_edge = Some(EdgePolicy::Custom(Arc::new(die)));
    }
    assert_eq!(m.setxy(doomed, 30.0, 0.0, None).unwrap(), EdgeOutcome::Die);
    assert_eq!(m.setxy(made[1], 30.0, 0.0, None).unwrap(), EdgeOutcome::Keep);
    assert!(!m.turtles.set().is_live(doomed));
    let (x, _) = m.turtles.xy(made[1]).unwrap();
    assert!((x - 9.0).abs() < 1e-9);
}
