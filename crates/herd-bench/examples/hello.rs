//! Wandering turtles joined by links.
//!
//! Runs the reference `Hello` model for 500 steps and prints a JSON
//! sample of the final state.

use herd_bench::Hello;
use herd_core::WorldOptions;
use herd_engine::{sample_model, ModelConfig, Simulation};

fn main() {
    let config = ModelConfig {
        seed: 1,
        ..ModelConfig::with_world(WorldOptions::centered(16, 16, 0))
    };
    let mut sim = Simulation::new(config, Hello::default()).unwrap();
    sim.setup().unwrap();
    sim.run(500).unwrap();

    let model = sim.model_mut();
    println!(
        "ticks={} turtles={} links={}",
        model.ticks(),
        model.turtles.set().len(herd_agents::Scope::Base),
        model.links.set().len(herd_agents::Scope::Base),
    );
    let sample = sample_model(model);
    println!("{}", serde_json::to_string_pretty(&sample).unwrap());
}
