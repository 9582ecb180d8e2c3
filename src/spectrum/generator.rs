//! Spectrum Generator
//!
//! Builds a reflectance curve by sampling a mixture of Gaussian peaks
//! at evenly spaced band positions, then scales it so the highest band
//! is exactly 1.0.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

/// One Gaussian term of a spectrum mixture.
///
/// All values live in the normalized spectral axis `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakDistribution {
    /// Mean of the Gaussian (x-position of the peak)
    #[serde(alias = "peak_position")]
    pub position: f64,
    /// Height of the peak, 0 is nothing and 1 is full height
    pub amplitude: f64,
    /// Standard deviation of the Gaussian
    pub width: f64,
}

impl PeakDistribution {
    /// Create a validated peak
    pub fn new(position: f64, amplitude: f64, width: f64) -> Result<Self> {
        let peak = Self {
            position,
            amplitude,
            width,
        };
        peak.validate(0)?;
        Ok(peak)
    }

    /// Check the peak's ranges; `index` is only used to label the error
    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.position.is_finite() || !(0.0..=1.0).contains(&self.position) {
            return Err(SynthError::invalid(
                format!("peaks[{}].position", index),
                format!("must be within [0, 1], got {}", self.position),
            ));
        }
        if !self.amplitude.is_finite() || !(0.0..=1.0).contains(&self.amplitude) {
            return Err(SynthError::invalid(
                format!("peaks[{}].amplitude", index),
                format!("must be within [0, 1], got {}", self.amplitude),
            ));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(SynthError::invalid(
                format!("peaks[{}].width", index),
                format!("must be greater than 0, got {}", self.width),
            ));
        }
        Ok(())
    }

    /// Value of this Gaussian term at `x`
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        let d = x - self.position;
        self.amplitude * (-(d * d) / (2.0 * self.width * self.width)).exp()
    }
}

/// Position on the normalized spectral axis sampled for band `index`.
///
/// Bands are spread over both edges: band `i` of `n` sits at `i / (n - 1)`.
/// A single-band spectrum is sampled at 0.0.
#[inline]
pub fn band_position(index: usize, num_bands: usize) -> f64 {
    if num_bands <= 1 {
        0.0
    } else {
        index as f64 / (num_bands - 1) as f64
    }
}

/// Generate a normalized spectrum of `num_bands` samples from `peaks`.
///
/// An empty peak list produces all zeros. Otherwise every band is divided
/// by the maximum sample, so the curve peaks at exactly 1.0.
pub fn generate_spectrum(peaks: &[PeakDistribution], num_bands: usize) -> Result<Vec<f64>> {
    if num_bands == 0 {
        return Err(SynthError::invalid("num_bands", "must be greater than 0"));
    }
    for (i, peak) in peaks.iter().enumerate() {
        peak.validate(i)?;
    }

    let mut bands: Vec<f64> = (0..num_bands)
        .map(|i| {
            let x = band_position(i, num_bands);
            peaks.iter().map(|p| p.evaluate(x)).sum()
        })
        .collect();

    let max = bands.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for value in bands.iter_mut() {
            *value /= max;
        }
    } else if !peaks.is_empty() {
        tracing::warn!(
            num_peaks = peaks.len(),
            num_bands,
            "peaks produced an all-zero spectrum"
        );
    }

    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn peak(position: f64, amplitude: f64, width: f64) -> PeakDistribution {
        PeakDistribution {
            position,
            amplitude,
            width,
        }
    }

    #[test]
    fn test_empty_peaks_yield_zeros() {
        let bands = generate_spectrum(&[], 100).unwrap();
        assert_eq!(bands.len(), 100);
        assert!(bands.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_bands_rejected() {
        let err = generate_spectrum(&[peak(0.5, 1.0, 0.1)], 0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[test_case(2)]
    #[test_case(3)]
    #[test_case(17)]
    #[test_case(100)]
    #[test_case(513)]
    fn test_max_is_one(num_bands: usize) {
        let peaks = [peak(0.2, 0.3, 0.05), peak(0.7, 0.8, 0.2), peak(0.7, 0.1, 0.01)];
        let bands = generate_spectrum(&peaks, num_bands).unwrap();
        let max = bands.iter().copied().fold(f64::MIN, f64::max);
        assert_abs_diff_eq!(max, 1.0, epsilon = 1e-12);
        assert!(bands.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_sample_positions_include_edges() {
        assert_eq!(band_position(0, 11), 0.0);
        assert_abs_diff_eq!(band_position(5, 11), 0.5, epsilon = 1e-15);
        assert_eq!(band_position(10, 11), 1.0);
        assert_eq!(band_position(0, 1), 0.0);
    }

    #[test]
    fn test_peak_at_edge_lands_on_first_band() {
        let bands = generate_spectrum(&[peak(0.0, 1.0, 0.05)], 11).unwrap();
        assert_eq!(bands[0], 1.0);
        assert!(bands[10] < 1e-6);
    }

    #[test]
    fn test_single_band() {
        let bands = generate_spectrum(&[peak(0.5, 1.0, 0.1)], 1).unwrap();
        assert_eq!(bands, vec![1.0]);
    }

    #[test]
    fn test_zero_amplitude_peaks_stay_zero() {
        let bands = generate_spectrum(&[peak(0.5, 0.0, 0.1)], 10).unwrap();
        assert!(bands.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_duplicate_peaks_superpose() {
        let single = generate_spectrum(&[peak(0.3, 0.5, 0.1)], 50).unwrap();
        let doubled = generate_spectrum(&[peak(0.3, 0.5, 0.1), peak(0.3, 0.5, 0.1)], 50).unwrap();
        for (a, b) in single.iter().zip(doubled.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_peak_order_does_not_matter() {
        let a = [peak(0.1, 0.4, 0.05), peak(0.9, 0.6, 0.1)];
        let b = [a[1], a[0]];
        let left = generate_spectrum(&a, 64).unwrap();
        let right = generate_spectrum(&b, 64).unwrap();
        for (l, r) in left.iter().zip(right.iter()) {
            assert_abs_diff_eq!(l, r, epsilon = 1e-12);
        }
    }

    #[test_case(peak(-0.1, 0.5, 0.1), "position")]
    #[test_case(peak(0.5, 1.5, 0.1), "amplitude")]
    #[test_case(peak(0.5, 0.5, 0.0), "width")]
    #[test_case(peak(0.5, 0.5, f64::NAN), "width")]
    fn test_invalid_peaks(bad: PeakDistribution, field: &str) {
        let err = generate_spectrum(&[peak(0.5, 0.5, 0.1), bad], 10).unwrap_err();
        match err {
            SynthError::InvalidArgument { param, .. } => {
                assert_eq!(param, format!("peaks[1].{}", field));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deterministic() {
        let peaks = [peak(0.25, 0.9, 0.07), peak(0.6, 0.4, 0.2)];
        assert_eq!(
            generate_spectrum(&peaks, 128).unwrap(),
            generate_spectrum(&peaks, 128).unwrap()
        );
    }
}
