//! Wandering turtles whose population drifts between 5 and 25.
//!
//! Runs the reference `HelloPlus` model for 500 steps, printing the
//! population every 50 ticks.

use herd_agents::Scope;
use herd_bench::HelloPlus;
use herd_core::WorldOptions;
use herd_engine::{ModelConfig, Simulation};

fn main() {
    let config = ModelConfig {
        seed: 3,
        ..ModelConfig::with_world(WorldOptions::centered(16, 16, 0))
    };
    let mut sim = Simulation::new(config, HelloPlus::default()).unwrap();
    sim.setup().unwrap();
    for _ in 0..10 {
        sim.run(50).unwrap();
        let model = sim.model_mut();
        println!(
            "ticks={} turtles={} links={}",
            model.ticks(),
            model.turtles.set().len(Scope::Base),
            model.links.set().len(Scope::Base),
        );
    }
}
