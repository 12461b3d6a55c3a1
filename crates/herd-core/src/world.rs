//! The world coordinate system.
//!
//! A [`World`] is defined by integer patch bounds on each axis. Patch
//! centres sit on integer coordinates, so the continuous extent of the
//! world runs half a patch beyond the outermost centres: on the x axis
//! from `min_x - 0.5` to `max_x + 0.5`. Those float bounds are the
//! `*cor` values and are what turtles are kept inside.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

// ── WorldOptions ────────────────────────────────────────────────

/// Integer patch bounds used to build a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldOptions {
    /// Smallest patch x coordinate.
    pub min_x: i32,
    /// Largest patch x coordinate.
    pub max_x: i32,
    /// Smallest patch y coordinate.
    pub min_y: i32,
    /// Largest patch y coordinate.
    pub max_y: i32,
    /// Smallest z coordinate.
    pub min_z: i32,
    /// Largest z coordinate.
    pub max_z: i32,
}

impl WorldOptions {
    /// Bounds symmetric about the origin: `-max_x..=max_x` and so on.
    ///
    /// A negative argument gives inverted bounds, which
    /// [`validate`](Self::validate) rejects.
    pub fn centered(max_x: i32, max_y: i32, max_z: i32) -> Self {
        Self {
            min_x: max_x.saturating_neg(),
            max_x,
            min_y: max_y.saturating_neg(),
            max_y,
            min_z: max_z.saturating_neg(),
            max_z,
        }
    }

    /// Build options from float bounds, rejecting non-integral values.
    ///
    /// Order is `[min_x, max_x, min_y, max_y, min_z, max_z]`.
    pub fn from_f64_bounds(bounds: [f64; 6]) -> Result<Self, WorldError> {
        const NAMES: [&str; 6] = ["min_x", "max_x", "min_y", "max_y", "min_z", "max_z"];
        let mut ints = [0i32; 6];
        for (i, (&value, name)) in bounds.iter().zip(NAMES).enumerate() {
            if value.fract() != 0.0 || !value.is_finite() || value.abs() > i32::MAX as f64 {
                return Err(WorldError::NonIntegerBound { name, value });
            }
            ints[i] = value as i32;
        }
        Ok(Self {
            min_x: ints[0],
            max_x: ints[1],
            min_y: ints[2],
            max_y: ints[3],
            min_z: ints[4],
            max_z: ints[5],
        })
    }

    /// Check that every axis has `min <= max` and that the patch count
    /// fits in a `u32` agent id.
    pub fn validate(&self) -> Result<(), WorldError> {
        for (axis, min, max) in [
            ('x', self.min_x, self.max_x),
            ('y', self.min_y, self.max_y),
            ('z', self.min_z, self.max_z),
        ] {
            if min > max {
                return Err(WorldError::InvertedBounds { axis, min, max });
            }
        }
        let count = span(self.min_x, self.max_x)
            .checked_mul(span(self.min_y, self.max_y))
            .unwrap_or(u64::MAX);
        if count > u64::from(u32::MAX) {
            return Err(WorldError::TooManyPatches { count });
        }
        Ok(())
    }
}

/// Number of integer positions in `min..=max`; `min <= max` is assumed.
fn span(min: i32, max: i32) -> u64 {
    (i64::from(max) - i64::from(min) + 1) as u64
}

impl Default for WorldOptions {
    fn default() -> Self {
        Self::centered(16, 16, 16)
    }
}

// ── World ───────────────────────────────────────────────────────

/// Immutable coordinate system shared by every agent in a model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct World {
    options: WorldOptions,
    num_x: usize,
    num_y: usize,
    num_z: usize,
    min_xcor: f64,
    max_xcor: f64,
    min_ycor: f64,
    max_ycor: f64,
    min_zcor: f64,
    max_zcor: f64,
    center_x: f64,
    center_y: f64,
    center_z: f64,
}

impl World {
    /// Build a world from validated bounds.
    pub fn new(options: WorldOptions) -> Result<Self, WorldError> {
        options.validate()?;
        let WorldOptions {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        } = options;
        Ok(Self {
            options,
            num_x: span(min_x, max_x) as usize,
            num_y: span(min_y, max_y) as usize,
            num_z: span(min_z, max_z) as usize,
            min_xcor: min_x as f64 - 0.5,
            max_xcor: max_x as f64 + 0.5,
            min_ycor: min_y as f64 - 0.5,
            max_ycor: max_y as f64 + 0.5,
            min_zcor: min_z as f64 - 0.5,
            max_zcor: max_z as f64 + 0.5,
            center_x: (f64::from(min_x) + f64::from(max_x)) / 2.0,
            center_y: (f64::from(min_y) + f64::from(max_y)) / 2.0,
            center_z: (f64::from(min_z) + f64::from(max_z)) / 2.0,
        })
    }

    /// The bounds this world was built from.
    pub fn options(&self) -> WorldOptions {
        self.options
    }

    /// Smallest patch x coordinate.
    pub fn min_x(&self) -> i32 {
        self.options.min_x
    }

    /// Largest patch x coordinate.
    pub fn max_x(&self) -> i32 {
        self.options.max_x
    }

    /// Smallest patch y coordinate.
    pub fn min_y(&self) -> i32 {
        self.options.min_y
    }

    /// Largest patch y coordinate.
    pub fn max_y(&self) -> i32 {
        self.options.max_y
    }

    /// Smallest z coordinate.
    pub fn min_z(&self) -> i32 {
        self.options.min_z
    }

    /// Largest z coordinate.
    pub fn max_z(&self) -> i32 {
        self.options.max_z
    }

    /// Number of patch columns.
    pub fn num_x(&self) -> usize {
        self.num_x
    }

    /// Number of patch rows.
    pub fn num_y(&self) -> usize {
        self.num_y
    }

    /// Number of z layers.
    pub fn num_z(&self) -> usize {
        self.num_z
    }

    /// Total patch count, `num_x * num_y`.
    pub fn num_patches(&self) -> usize {
        self.num_x * self.num_y
    }

    /// Left edge of the world.
    pub fn min_xcor(&self) -> f64 {
        self.min_xcor
    }

    /// Right edge of the world.
    pub fn max_xcor(&self) -> f64 {
        self.max_xcor
    }

    /// Bottom edge of the world.
    pub fn min_ycor(&self) -> f64 {
        self.min_ycor
    }

    /// Top edge of the world.
    pub fn max_ycor(&self) -> f64 {
        self.max_ycor
    }

    /// Lower z edge.
    pub fn min_zcor(&self) -> f64 {
        self.min_zcor
    }

    /// Upper z edge.
    pub fn max_zcor(&self) -> f64 {
        self.max_zcor
    }

    /// Centre x.
    pub fn center_x(&self) -> f64 {
        self.center_x
    }

    /// Centre y.
    pub fn center_y(&self) -> f64 {
        self.center_y
    }

    /// Centre z.
    pub fn center_z(&self) -> f64 {
        self.center_z
    }

    /// Whether the point lies inside the float bounds (inclusive).
    ///
    /// A missing `z` is treated as `center_z`.
    pub fn is_on_world(&self, x: f64, y: f64, z: Option<f64>) -> bool {
        let z = z.unwrap_or(self.center_z);
        self.min_xcor <= x
            && x <= self.max_xcor
            && self.min_ycor <= y
            && y <= self.max_ycor
            && self.min_zcor <= z
            && z <= self.max_zcor
    }

    /// Uniform random point within the float bounds.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        (
            self.min_xcor + rng.random::<f64>() * (self.max_xcor - self.min_xcor),
            self.min_ycor + rng.random::<f64>() * (self.max_ycor - self.min_ycor),
        )
    }

    /// Uniform random point within the 3D float bounds.
    pub fn random_point3<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64, f64) {
        let (x, y) = self.random_point(rng);
        let z = self.min_zcor + rng.random::<f64>() * (self.max_zcor - self.min_zcor);
        (x, y, z)
    }

    /// Uniform random patch centre.
    pub fn random_patch_point<R: Rng + ?Sized>(&self, rng: &mut R) -> (i32, i32) {
        (
            rng.random_range(self.min_x()..=self.max_x()),
            rng.random_range(self.min_y()..=self.max_y()),
        )
    }

    /// Integer patch coordinate containing `v` on an axis whose upper
    /// float edge is `max_cor` and largest patch is `max`.
    ///
    /// Halves round up, except that the upper edge itself belongs to the
    /// last patch rather than a phantom one beyond it.
    pub fn cell_of(v: f64, max_cor: f64, max: i32) -> i32 {
        if v == max_cor {
            max
        } else {
            (v + 0.5).floor() as i32
        }
    }

    /// Grid index of the patch containing `(x, y)`, or `None` off-world.
    ///
    /// Index 0 is the top-left patch; rows run left to right, top to bottom.
    pub fn xy_to_patch_index(&self, x: f64, y: f64) -> Option<usize> {
        if !self.is_on_world(x, y, None) {
            return None;
        }
        let ix = Self::cell_of(x, self.max_xcor, self.max_x());
        let iy = Self::cell_of(y, self.max_ycor, self.max_y());
        let col = (i64::from(ix) - i64::from(self.min_x())) as usize;
        let row = (i64::from(self.max_y()) - i64::from(iy)) as usize;
        Some(col + self.num_x * row)
    }

    /// A linear transform between world coordinates and `bbox`.
    pub fn bbox_transform(&self, bbox: BBox) -> BBoxTransform {
        BBoxTransform::new(bbox, self)
    }
}

// ── BBoxTransform ───────────────────────────────────────────────

/// An axis-aligned box in some external coordinate system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Minimum x (west).
    pub west: f64,
    /// Minimum y (south).
    pub south: f64,
    /// Maximum x (east).
    pub east: f64,
    /// Maximum y (north).
    pub north: f64,
}

/// Maps the world's float bounds onto a [`BBox`] and back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBoxTransform {
    mx: f64,
    my: f64,
    bx: f64,
    by: f64,
}

impl BBoxTransform {
    /// Fit `bbox` over the float bounds of `world`.
    pub fn new(bbox: BBox, world: &World) -> Self {
        let mx = (bbox.east - bbox.west) / (world.max_xcor - world.min_xcor);
        let my = (bbox.north - bbox.south) / (world.max_ycor - world.min_ycor);
        let bx = (bbox.west + bbox.east - mx * (world.max_xcor + world.min_xcor)) / 2.0;
        let by = (bbox.south + bbox.north - my * (world.max_ycor + world.min_ycor)) / 2.0;
        Self { mx, my, bx, by }
    }

    /// Box coordinates to world coordinates.
    pub fn to_world(&self, point: (f64, f64)) -> (f64, f64) {
        ((point.0 - self.bx) / self.mx, (point.1 - self.by) / self.my)
    }

    /// World coordinates to box coordinates.
    pub fn to_bbox(&self, point: (f64, f64)) -> (f64, f64) {
        (self.mx * point.0 + self.bx, self.my * point.1 + self.by)
    }
}
