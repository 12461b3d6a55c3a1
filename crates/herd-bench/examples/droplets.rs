//! Droplets running downhill over a synthetic terrain.
//!
//! Every 50 steps prints how many droplets have pooled in local minima.

use herd_bench::{terrain, Droplets, StepType};
use herd_core::WorldOptions;
use herd_engine::{ModelConfig, Simulation};

fn main() {
    let config = ModelConfig {
        seed: 7,
        ..ModelConfig::with_world(WorldOptions::centered(25, 25, 0))
    };
    let mut droplets = Droplets::new(terrain(51, 51, 7));
    droplets.step_type = StepType::MinNeighbor;
    let mut sim = Simulation::new(config, droplets).unwrap();
    sim.setup().unwrap();
    println!("local minima: {}", sim.behavior().local_mins().len());

    for _ in 0..10 {
        sim.run(50).unwrap();
        let pooled = sim.behavior().turtles_on_local_mins(sim.model());
        println!("tick {}: {pooled} droplets on local minima", sim.model().ticks());
    }
}
