//! Hyperspectral Cube
//!
//! The `Cube` holds `width x height x num_bands` samples in band-interleaved
//! by pixel order: for each row, for each pixel, all bands.
//! `CubeAssembler` mixes class spectra by the per-pixel blend weights.

mod assembler;

pub use assembler::{assemble, CubeAssembler};

use crate::error::{Result, SynthError};

/// Synthetic hyperspectral data cube
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    width: usize,
    height: usize,
    num_bands: usize,
    data: Vec<f64>,
}

impl Cube {
    /// All-zero cube
    pub fn zeros(width: usize, height: usize, num_bands: usize) -> Result<Self> {
        check_shape(width, height, num_bands)?;
        Ok(Self {
            width,
            height,
            num_bands,
            data: vec![0.0; width * height * num_bands],
        })
    }

    /// Wrap existing BIP-ordered samples
    pub fn from_vec(width: usize, height: usize, num_bands: usize, data: Vec<f64>) -> Result<Self> {
        check_shape(width, height, num_bands)?;
        let expected = width * height * num_bands;
        if data.len() != expected {
            return Err(SynthError::DimensionMismatch {
                expected: format!("{} samples ({}x{}x{})", expected, width, height, num_bands),
                actual: format!("{} samples", data.len()),
            });
        }
        Ok(Self {
            width,
            height,
            num_bands,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    /// `(width, height, num_bands)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.num_bands)
    }

    pub fn same_shape(&self, other: &Cube) -> bool {
        self.shape() == other.shape()
    }

    /// Raw samples in BIP order
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.num_bands
    }

    /// Band vector of pixel `(x, y)`
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[f64] {
        let start = self.offset(x, y);
        &self.data[start..start + self.num_bands]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [f64] {
        let start = self.offset(x, y);
        let end = start + self.num_bands;
        &mut self.data[start..end]
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, band: usize) -> f64 {
        self.data[self.offset(x, y) + band]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, band: usize, value: f64) {
        let i = self.offset(x, y) + band;
        self.data[i] = value;
    }

    /// One band as a row-major `width x height` image
    pub fn band_image(&self, band: usize) -> Result<Vec<f64>> {
        if band >= self.num_bands {
            return Err(SynthError::invalid(
                "band",
                format!("band {} does not exist ({} bands)", band, self.num_bands),
            ));
        }
        Ok(self
            .data
            .chunks_exact(self.num_bands)
            .map(|pixel| pixel[band])
            .collect())
    }

    /// Smallest and largest sample
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

fn check_shape(width: usize, height: usize, num_bands: usize) -> Result<()> {
    if width == 0 {
        return Err(SynthError::invalid("width", "must be greater than 0"));
    }
    if height == 0 {
        return Err(SynthError::invalid("height", "must be greater than 0"));
    }
    if num_bands == 0 {
        return Err(SynthError::invalid("num_bands", "must be greater than 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_shape() {
        let cube = Cube::zeros(3, 2, 4).unwrap();
        assert_eq!(cube.shape(), (3, 2, 4));
        assert_eq!(cube.data().len(), 24);
        assert!(Cube::zeros(3, 2, 0).is_err());
    }

    #[test]
    fn test_bip_indexing() {
        let data: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let cube = Cube::from_vec(2, 2, 3, data).unwrap();
        assert_eq!(cube.pixel(1, 0), &[3.0, 4.0, 5.0]);
        assert_eq!(cube.pixel(0, 1), &[6.0, 7.0, 8.0]);
        assert_eq!(cube.get(1, 1, 2), 11.0);
        assert_eq!(cube.band_image(1).unwrap(), vec![1.0, 4.0, 7.0, 10.0]);
        assert!(cube.band_image(3).is_err());
        assert_eq!(cube.min_max(), (0.0, 11.0));
    }

    #[test]
    fn test_from_vec_length_checked() {
        let err = Cube::from_vec(2, 2, 2, vec![0.0; 7]).unwrap_err();
        assert_eq!(err.error_code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn test_set_and_pixel_mut() {
        let mut cube = Cube::zeros(2, 1, 2).unwrap();
        cube.set(1, 0, 1, 0.5);
        cube.pixel_mut(0, 0)[0] = 0.25;
        assert_eq!(cube.data(), &[0.25, 0.0, 0.0, 0.5]);
    }
}
