//! Layout Blending
//!
//! Softens hard class boundaries into fractional per-pixel class
//! memberships. Each pixel looks at the Euclidean disc of the blend radius
//! around it (clipped to the canvas, no wraparound) and weights every class
//! by how much of that disc it covers.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::layout::ImageLayout;

/// Blend radius used until the user picks another one (no blending)
pub const DEFAULT_BLEND_RADIUS: f64 = 0.0;

/// How neighbors inside the blend disc are weighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendKernel {
    /// Every neighbor counts once
    #[default]
    Uniform,
    /// Neighbors fall off as a Gaussian with sigma = radius / 2
    Gaussian,
}

impl BlendKernel {
    #[inline]
    fn weight(&self, distance_sq: f64, radius: f64) -> f64 {
        match self {
            BlendKernel::Uniform => 1.0,
            // The center tap is exact so a vanishing sigma cannot yield NaN
            BlendKernel::Gaussian if distance_sq == 0.0 => 1.0,
            BlendKernel::Gaussian => {
                let sigma = radius / 2.0;
                (-distance_sq / (2.0 * sigma * sigma)).exp()
            }
        }
    }
}

/// Per-pixel class membership weights.
///
/// Stored sparsely: each pixel keeps only the classes with a non-zero
/// weight, sorted by class index. Weights of a pixel sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendWeights {
    width: usize,
    height: usize,
    num_classes: usize,
    // offsets[i]..offsets[i + 1] indexes `entries` for pixel i (row-major)
    offsets: Vec<usize>,
    entries: Vec<(usize, f64)>,
}

impl BlendWeights {
    /// Hard weights: 1.0 on each pixel's layout class
    pub fn hard(layout: &ImageLayout) -> Result<Self> {
        let num_classes = assigned_class_count(layout)?;
        let mut offsets = Vec::with_capacity(layout.num_pixels() + 1);
        let mut entries = Vec::with_capacity(layout.num_pixels());
        offsets.push(0);
        for &cell in layout.cells() {
            entries.push((cell as usize, 1.0));
            offsets.push(entries.len());
        }
        Ok(Self {
            width: layout.width(),
            height: layout.height(),
            num_classes,
            offsets,
            entries,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// One past the largest class index referenced
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Non-zero `(class, weight)` pairs of pixel `(x, y)`, sorted by class
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[(usize, f64)] {
        let i = y * self.width + x;
        &self.entries[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Weight of `class` at `(x, y)`, zero when the class is absent
    pub fn weight(&self, x: usize, y: usize, class: usize) -> f64 {
        self.pixel(x, y)
            .iter()
            .find(|(c, _)| *c == class)
            .map_or(0.0, |&(_, w)| w)
    }

    /// Class with the largest weight at `(x, y)`; ties go to the lower index
    pub fn dominant_class(&self, x: usize, y: usize) -> Option<usize> {
        self.pixel(x, y)
            .iter()
            .fold(None, |best: Option<(usize, f64)>, &(c, w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((c, w)),
            })
            .map(|(c, _)| c)
    }

    /// Iterate `(x, y, weights)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &[(usize, f64)])> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y, self.pixel(x, y))))
    }
}

/// Computes soft class weights from a hard layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBlender {
    radius: f64,
    kernel: BlendKernel,
}

impl LayoutBlender {
    /// Blender with a uniform kernel
    pub fn new(radius: f64) -> Result<Self> {
        Self::with_kernel(radius, BlendKernel::Uniform)
    }

    pub fn with_kernel(radius: f64, kernel: BlendKernel) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SynthError::invalid(
                "radius",
                format!("must be a finite number >= 0, got {}", radius),
            ));
        }
        Ok(Self { radius, kernel })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn kernel(&self) -> BlendKernel {
        self.kernel
    }

    /// Compute the weights for `layout`.
    ///
    /// Radius 0 reproduces the layout exactly. Every pixel must be assigned.
    pub fn blend(&self, layout: &ImageLayout) -> Result<BlendWeights> {
        if self.radius == 0.0 {
            return BlendWeights::hard(layout);
        }
        let num_classes = assigned_class_count(layout)?;
        let (width, height) = (layout.width(), layout.height());
        let kernel = self.kernel_offsets(width.max(height) - 1);
        tracing::debug!(
            width,
            height,
            radius = self.radius,
            kernel = ?self.kernel,
            taps = kernel.len(),
            "blending layout"
        );

        let mut offsets = Vec::with_capacity(width * height + 1);
        let mut entries = Vec::with_capacity(width * height);
        let mut accum = vec![0.0_f64; num_classes];
        offsets.push(0);

        for y in 0..height {
            for x in 0..width {
                let mut total = 0.0;
                for &(dx, dy, w) in &kernel {
                    let nx = x as isize + dx;
                    let ny = y as isize + dy;
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    let class = layout.get(nx as usize, ny as usize) as usize;
                    accum[class] += w;
                    total += w;
                }
                for (class, slot) in accum.iter_mut().enumerate() {
                    if *slot > 0.0 {
                        entries.push((class, *slot / total));
                    }
                    *slot = 0.0;
                }
                offsets.push(entries.len());
            }
        }

        Ok(BlendWeights {
            width,
            height,
            num_classes,
            offsets,
            entries,
        })
    }

    /// `(dx, dy, weight)` for every offset inside the disc.
    ///
    /// Offsets beyond `max_reach` on either axis can never land on the
    /// canvas and are left out.
    fn kernel_offsets(&self, max_reach: usize) -> Vec<(isize, isize, f64)> {
        let reach = self.radius.floor().min(max_reach as f64) as isize;
        let radius_sq = self.radius * self.radius;
        let mut taps = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let distance_sq = (dx * dx + dy * dy) as f64;
                if distance_sq <= radius_sq {
                    taps.push((dx, dy, self.kernel.weight(distance_sq, self.radius)));
                }
            }
        }
        taps
    }
}

impl Default for LayoutBlender {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLEND_RADIUS,
            kernel: BlendKernel::Uniform,
        }
    }
}

/// Blend `layout` with a uniform disc of `radius`
pub fn blend(layout: &ImageLayout, radius: f64) -> Result<BlendWeights> {
    LayoutBlender::new(radius)?.blend(layout)
}

fn assigned_class_count(layout: &ImageLayout) -> Result<usize> {
    for y in 0..layout.height() {
        for x in 0..layout.width() {
            if layout.class_at(x, y).is_none() {
                return Err(SynthError::UnassignedPixel { x, y });
            }
        }
    }
    Ok(layout.max_class().map_or(0, |m| m + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutGenerator, LayoutPattern};
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn two_stripes() -> ImageLayout {
        ImageLayout::from_rows(&[
            vec![0, 0, 0, 1, 1, 1],
            vec![0, 0, 0, 1, 1, 1],
            vec![0, 0, 0, 1, 1, 1],
        ])
        .unwrap()
    }

    #[test]
    fn test_radius_zero_is_hard() {
        let layout = two_stripes();
        let weights = blend(&layout, 0.0).unwrap();
        for (x, y, pixel) in weights.iter() {
            let class = layout.class_at(x, y).unwrap();
            assert_eq!(pixel, &[(class, 1.0)]);
        }
    }

    #[test]
    fn test_sub_pixel_radius_only_sees_center() {
        let layout = two_stripes();
        assert_eq!(blend(&layout, 0.5).unwrap(), blend(&layout, 0.0).unwrap());
    }

    #[test]
    fn test_boundary_pixels_mix() {
        let weights = blend(&two_stripes(), 1.0).unwrap();
        // Middle row, x = 2: disc covers (1,1),(2,1),(3,1),(2,0),(2,2)
        assert_abs_diff_eq!(weights.weight(2, 1, 0), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(weights.weight(2, 1, 1), 0.2, epsilon = 1e-12);
        // Far from the edge stays pure
        assert_eq!(weights.pixel(0, 1), &[(0, 1.0)]);
        assert_eq!(weights.dominant_class(2, 1), Some(0));
    }

    #[test]
    fn test_kernel_clipped_at_canvas_edge() {
        // Corner (0,0) with radius 1 sees itself, right and below neighbors.
        let layout = ImageLayout::from_rows(&[vec![0, 1], vec![1, 1]]).unwrap();
        let weights = blend(&layout, 1.0).unwrap();
        assert_abs_diff_eq!(weights.weight(0, 0, 0), 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(weights.weight(0, 0, 1), 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test_case(0.0, BlendKernel::Uniform)]
    #[test_case(1.0, BlendKernel::Uniform)]
    #[test_case(2.5, BlendKernel::Uniform)]
    #[test_case(7.0, BlendKernel::Uniform)]
    #[test_case(1.5, BlendKernel::Gaussian)]
    #[test_case(4.0, BlendKernel::Gaussian)]
    fn test_weights_sum_to_one(radius: f64, kernel: BlendKernel) {
        let layout = LayoutGenerator::seeded(11)
            .generate(LayoutPattern::Random, 12, 9, 4)
            .unwrap();
        let weights = LayoutBlender::with_kernel(radius, kernel)
            .unwrap()
            .blend(&layout)
            .unwrap();
        for (_, _, pixel) in weights.iter() {
            let sum: f64 = pixel.iter().map(|(_, w)| w).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
            assert!(pixel.iter().all(|&(_, w)| w > 0.0 && w <= 1.0));
            assert!(pixel.windows(2).all(|p| p[0].0 < p[1].0));
        }
    }

    #[test]
    fn test_vanishing_gaussian_radius_is_hard() {
        let layout = ImageLayout::from_rows(&[vec![0, 1], vec![1, 0]]).unwrap();
        let weights = LayoutBlender::with_kernel(1e-200, BlendKernel::Gaussian)
            .unwrap()
            .blend(&layout)
            .unwrap();
        assert_eq!(weights, BlendWeights::hard(&layout).unwrap());
    }

    #[test_case(BlendKernel::Uniform)]
    #[test_case(BlendKernel::Gaussian)]
    fn test_radius_beyond_canvas_matches_diagonal(kernel: BlendKernel) {
        let layout = ImageLayout::from_rows(&[vec![0, 1], vec![1, 1]]).unwrap();
        let blender = LayoutBlender::with_kernel(1e5, kernel).unwrap();
        assert_eq!(blender.kernel_offsets(1).len(), 9);

        let wide = blender.blend(&layout).unwrap();
        let diagonal = LayoutBlender::with_kernel(2.0_f64.sqrt(), kernel)
            .unwrap()
            .blend(&layout)
            .unwrap();
        if kernel == BlendKernel::Uniform {
            assert_eq!(wide, diagonal);
        }
        for (x, y, pixel) in wide.iter() {
            let sum: f64 = pixel.iter().map(|(_, w)| w).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
            assert_eq!(pixel.len(), 2, "({}, {})", x, y);
        }
        assert_abs_diff_eq!(wide.weight(0, 0, 1), 0.75, epsilon = 1e-9);
    }

    #[test]
    fn test_gaussian_favors_center() {
        let layout = two_stripes();
        let uniform = blend(&layout, 2.0).unwrap();
        let gaussian = LayoutBlender::with_kernel(2.0, BlendKernel::Gaussian)
            .unwrap()
            .blend(&layout)
            .unwrap();
        assert!(gaussian.weight(2, 1, 0) > uniform.weight(2, 1, 0));
    }

    #[test]
    fn test_deterministic() {
        let layout = LayoutGenerator::seeded(5)
            .generate(LayoutPattern::Random, 10, 10, 3)
            .unwrap();
        assert_eq!(blend(&layout, 3.0).unwrap(), blend(&layout, 3.0).unwrap());
    }

    #[test_case(-1.0)]
    #[test_case(f64::NAN)]
    #[test_case(f64::INFINITY)]
    fn test_invalid_radius(radius: f64) {
        let err = blend(&two_stripes(), radius).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_unassigned_layout_rejected() {
        let layout = ImageLayout::new(3, 3).unwrap();
        assert!(matches!(
            blend(&layout, 1.0),
            Err(SynthError::UnassignedPixel { x: 0, y: 0 })
        ));
        assert!(blend(&layout, 0.0).is_err());
    }
}
