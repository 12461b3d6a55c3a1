//! 3x3 neighbourhood convolution and the terrain operators built on it.

use herd_core::math::distance;

use crate::dataset::DataSet;

/// A 3x3 convolution kernel, row-major from the top-left.
pub type Kernel = [f64; 9];

/// Slope and aspect rasters derived from an elevation data set.
#[derive(Clone, Debug, PartialEq)]
pub struct SlopeAspect {
    /// Slope in radians, divided by the cell size.
    pub slope: DataSet,
    /// Downhill direction in radians.
    pub aspect: DataSet,
    /// Horizontal gradient (`dzdx`).
    pub dzdx: DataSet,
    /// Vertical gradient (`dzdy`).
    pub dzdy: DataSet,
}

impl DataSet {
    /// The 3x3 block around `(x, y)`, row-major, with edge cells repeated
    /// where the block hangs off the lattice.
    pub fn neighborhood(&self, x: usize, y: usize) -> [f64; 9] {
        let mut out = [0.0; 9];
        let max_x = self.width().saturating_sub(1) as isize;
        let max_y = self.height().saturating_sub(1) as isize;
        let mut k = 0;
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                let x0 = (x as isize + dx).clamp(0, max_x) as usize;
                let y0 = (y as isize + dy).clamp(0, max_y) as usize;
                out[k] = self.data()[self.to_index(x0, y0)];
                k += 1;
            }
        }
        out
    }

    /// Convolve with `kernel`, scaling each result by `factor`.
    ///
    /// With `crop` the one-cell border is dropped, so the output is two
    /// cells narrower and shorter; otherwise edges are replicated and the
    /// size is preserved.
    pub fn convolve(&self, kernel: &Kernel, factor: f64, crop: bool) -> DataSet {
        if self.width() == 0 || self.height() == 0 {
            return DataSet::empty(0, 0);
        }
        let (x0, y0, x1, y1) = if crop {
            (1, 1, self.width().saturating_sub(1), self.height().saturating_sub(1))
        } else {
            (0, 0, self.width(), self.height())
        };
        let w = x1.saturating_sub(x0);
        let h = y1.saturating_sub(y0);
        let mut data = Vec::with_capacity(w * h);
        for y in y0..y1 {
            for x in x0..x1 {
                let nei = self.neighborhood(x, y);
                let sum: f64 = kernel.iter().zip(nei).map(|(k, v)| k * v).sum();
                data.push(sum * factor);
            }
        }
        DataSet::from_fn(w, h, |x, y| data[x + y * w])
    }

    /// Horizontal Sobel-style gradient, `n` weighting the centre row.
    pub fn dzdx(&self, n: f64, factor: f64) -> DataSet {
        self.convolve(&[-1.0, 0.0, 1.0, -n, 0.0, n, -1.0, 0.0, 1.0], factor, false)
    }

    /// Vertical Sobel-style gradient, top minus bottom.
    pub fn dzdy(&self, n: f64, factor: f64) -> DataSet {
        self.convolve(&[1.0, n, 1.0, 0.0, 0.0, 0.0, -1.0, -n, -1.0], factor, false)
    }

    /// 8-neighbour Laplacian.
    pub fn laplace8(&self) -> DataSet {
        self.convolve(&[-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0], 1.0, false)
    }

    /// 4-neighbour Laplacian.
    pub fn laplace4(&self) -> DataSet {
        self.convolve(&[0.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 0.0], 1.0, false)
    }

    /// Gaussian-like blur; `factor` of 1/16 preserves flat regions.
    pub fn blur(&self, factor: f64) -> DataSet {
        self.convolve(&[1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0], factor, false)
    }

    /// Edge detector.
    pub fn edge(&self) -> DataSet {
        self.convolve(&[1.0, 1.0, 1.0, 1.0, -7.0, 1.0, 1.0, 1.0, 1.0], 1.0, false)
    }

    /// Slope and aspect of this data set read as elevations.
    ///
    /// Gradients use `dzdx(2, 1/8)` and `dzdy(2, 1/8)`. Aspect points
    /// downhill; with `pos_angle` it is normalized to `[0, 2π)`.
    pub fn slope_and_aspect(&self, cell_size: f64, pos_angle: bool) -> SlopeAspect {
        let dzdx = self.dzdx(2.0, 1.0 / 8.0);
        let dzdy = self.dzdy(2.0, 1.0 / 8.0);
        let (w, h) = (dzdx.width(), dzdx.height());
        let mut slope = Vec::with_capacity(w * h);
        let mut aspect = Vec::with_capacity(w * h);
        for (&gx, &gy) in dzdx.data().iter().zip(dzdy.data()) {
            slope.push(distance(0.0, 0.0, gx, gy).atan() / cell_size);
            let mut rad = (-gy).atan2(-gx);
            if pos_angle && rad < 0.0 {
                rad += 2.0 * std::f64::consts::PI;
            }
            aspect.push(rad);
        }
        SlopeAspect {
            slope: DataSet::from_fn(w, h, |x, y| slope[x + y * w]),
            aspect: DataSet::from_fn(w, h, |x, y| aspect[x + y * w]),
            dzdx,
            dzdy,
        }
    }
}
