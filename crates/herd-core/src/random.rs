//! Seeded random helpers.
//!
//! Every random draw in the kernel goes through an explicit generator so
//! runs are reproducible from a seed. Models own a [`ChaCha8Rng`] built
//! by [`seeded_rng`]; the helpers here accept any [`Rng`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build the deterministic generator used by models.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform integer in `[0, max)`. Returns 0 when `max` is 0.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        rng.random_range(0..max)
    }
}

/// Uniform integer in `[min, max)`. Returns `min` for an empty range.
pub fn random_int2<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    if max <= min {
        min
    } else {
        rng.random_range(min..max)
    }
}

/// Uniform float in `[0, max)`.
pub fn random_float<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    rng.random::<f64>() * max
}

/// Uniform float in `[min, max)`.
pub fn random_float2<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + (max - min) * rng.random::<f64>()
}

/// Uniform float in `[-r/2, r/2)`.
pub fn random_centered<R: Rng + ?Sized>(rng: &mut R, r: f64) -> f64 {
    random_float2(rng, -r / 2.0, r / 2.0)
}

/// Normally distributed sample via the Box-Muller transform.
pub fn random_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + sd * z
}
