//! Reusable worlds, rasters and random helpers.
//!
//! - [`small_world`]: the `-2..=2` square used by most grid tests.
//! - [`ramp`]: a raster rising linearly to the east.
//! - [`bowl`]: a raster with its single minimum in the centre.

use herd_core::random::random_float;
use herd_core::{World, WorldOptions};
use herd_dataset::DataSet;
use rand_chacha::ChaCha8Rng;

/// `-2..=2` on x and y, flat z.
pub fn small_world() -> World {
    World::new(WorldOptions::centered(2, 2, 0)).expect("valid bounds")
}

/// Square world of side `2 * max + 1`.
pub fn square_world(max: i32) -> World {
    World::new(WorldOptions::centered(max, max, 0)).expect("valid bounds")
}

/// `width` x `height` raster whose value is its column index.
pub fn ramp(width: usize, height: usize) -> DataSet {
    DataSet::from_fn(width, height, |x, _| x as f64)
}

/// `width` x `height` raster of squared distance from the centre.
pub fn bowl(width: usize, height: usize) -> DataSet {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    DataSet::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f64 - cx, y as f64 - cy);
        dx * dx + dy * dy
    })
}

/// Uniform direction in `[0, 2π)`.
pub fn random_theta(rng: &mut ChaCha8Rng) -> f64 {
    random_float(rng, std::f64::consts::TAU)
}
