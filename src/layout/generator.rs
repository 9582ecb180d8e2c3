//! Layout Generator
//!
//! Fills an `ImageLayout` with one of the named patterns. Randomness comes
//! from an injected RNG so seeded runs are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::image_layout::{check_dimensions, ImageLayout};
use super::pattern::LayoutPattern;
use crate::error::{Result, SynthError};

/// Generates class layouts from patterns
#[derive(Debug, Clone)]
pub struct LayoutGenerator<R = StdRng> {
    rng: R,
}

impl LayoutGenerator<StdRng> {
    /// Reproducible generator for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> LayoutGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a new layout of the given size
    pub fn generate(
        &mut self,
        pattern: LayoutPattern,
        width: usize,
        height: usize,
        num_classes: usize,
    ) -> Result<ImageLayout> {
        check_dimensions(width, height)?;
        check_classes(num_classes)?;
        let mut layout = ImageLayout::new(width, height)?;
        self.fill(&mut layout, pattern, num_classes);
        Ok(layout)
    }

    /// Regenerate `layout` in place, keeping its dimensions.
    ///
    /// On error the layout is left untouched.
    pub fn generate_into(
        &mut self,
        layout: &mut ImageLayout,
        pattern: LayoutPattern,
        num_classes: usize,
    ) -> Result<()> {
        check_classes(num_classes)?;
        self.fill(layout, pattern, num_classes);
        Ok(())
    }

    fn fill(&mut self, layout: &mut ImageLayout, pattern: LayoutPattern, num_classes: usize) {
        let (width, height) = (layout.width(), layout.height());
        tracing::debug!(%pattern, width, height, num_classes, "generating layout");

        match pattern {
            LayoutPattern::HorizontalStripes => {
                for y in 0..height {
                    let class = stripe_index(y, height, num_classes);
                    for x in 0..width {
                        layout.set(x, y, class);
                    }
                }
            }
            LayoutPattern::VerticalStripes => {
                for y in 0..height {
                    for x in 0..width {
                        layout.set(x, y, stripe_index(x, width, num_classes));
                    }
                }
            }
            LayoutPattern::Grid => {
                let (rows, cols) = grid_shape(num_classes);
                for y in 0..height {
                    let tile_row = stripe_index(y, height, rows);
                    for x in 0..width {
                        let tile_col = stripe_index(x, width, cols);
                        let class = (tile_row * cols + tile_col).min(num_classes - 1);
                        layout.set(x, y, class);
                    }
                }
            }
            LayoutPattern::Random => {
                for y in 0..height {
                    for x in 0..width {
                        layout.set(x, y, self.rng.gen_range(0..num_classes));
                    }
                }
            }
        }
    }
}

fn check_classes(num_classes: usize) -> Result<()> {
    if num_classes == 0 {
        return Err(SynthError::invalid("num_classes", "must be greater than 0"));
    }
    // Cells store class indices as i32
    if num_classes > i32::MAX as usize {
        return Err(SynthError::invalid(
            "num_classes",
            format!("must be at most {}, got {}", i32::MAX, num_classes),
        ));
    }
    Ok(())
}

/// Which of `parts` equal bands `pos` falls into along an axis of `extent`.
///
/// Bands are `extent / parts` long and the last band absorbs the remainder.
/// When the axis is shorter than `parts`, every position gets its own band
/// and the trailing bands go unused.
#[inline]
pub fn stripe_index(pos: usize, extent: usize, parts: usize) -> usize {
    let band = (extent / parts).max(1);
    (pos / band).min(parts - 1)
}

/// Tile grid `(rows, cols)` for `num_classes`: `cols = ceil(sqrt(k))`,
/// `rows = ceil(k / cols)`. Tiles past the last class reuse the last class.
pub fn grid_shape(num_classes: usize) -> (usize, usize) {
    let mut cols = (num_classes as f64).sqrt().ceil() as usize;
    // Guard against sqrt rounding on large perfect squares.
    while cols * cols < num_classes {
        cols += 1;
    }
    while cols > 1 && (cols - 1) * (cols - 1) >= num_classes {
        cols -= 1;
    }
    let cols = cols.max(1);
    let rows = num_classes.div_ceil(cols);
    (rows, cols)
}
