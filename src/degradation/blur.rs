//! Spatial box blur
//!
//! Each band is replaced by the mean over a `(2r + 1)^2` window clipped to
//! the canvas. The mean over a clipped rectangle factors into a row pass
//! followed by a column pass.

use rand::RngCore;
use serde_json::{json, Value};

use super::Degradation;
use crate::cube::Cube;
use crate::error::Result;

/// Box blur applied independently to every band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialBlur {
    radius: usize,
}

impl SpatialBlur {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }
}

/// Inclusive window `[lo, hi]` of `center +- radius` clipped to `0..len`
#[inline]
fn window(center: usize, radius: usize, len: usize) -> (usize, usize) {
    (center.saturating_sub(radius), (center + radius).min(len - 1))
}

impl Degradation for SpatialBlur {
    fn name(&self) -> &'static str {
        "spatial_blur"
    }

    fn apply(&self, cube: &Cube, _rng: &mut dyn RngCore) -> Result<Cube> {
        if self.radius == 0 {
            return Ok(cube.clone());
        }
        let (width, height, bands) = cube.shape();

        // Row pass
        let mut rows = Cube::zeros(width, height, bands)?;
        for y in 0..height {
            for x in 0..width {
                let (lo, hi) = window(x, self.radius, width);
                let count = (hi - lo + 1) as f64;
                let out = rows.pixel_mut(x, y);
                for nx in lo..=hi {
                    for (acc, v) in out.iter_mut().zip(cube.pixel(nx, y)) {
                        *acc += v;
                    }
                }
                out.iter_mut().for_each(|acc| *acc /= count);
            }
        }

        // Column pass
        let mut out = Cube::zeros(width, height, bands)?;
        for y in 0..height {
            let (lo, hi) = window(y, self.radius, height);
            let count = (hi - lo + 1) as f64;
            for x in 0..width {
                let dst = out.pixel_mut(x, y);
                for ny in lo..=hi {
                    for (acc, v) in dst.iter_mut().zip(rows.pixel(x, ny)) {
                        *acc += v;
                    }
                }
                dst.iter_mut().for_each(|acc| *acc /= count);
            }
        }
        Ok(out)
    }

    fn params(&self) -> Value {
        json!({ "radius": self.radius })
    }
}
