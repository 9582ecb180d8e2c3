//! Class spectrum model
//!
//! A `Spectrum` is the identity of one material class: its name, display
//! color and peak list. The band values are derived from the peaks and
//! cached; every edit regenerates them.

use serde::{Deserialize, Serialize};

use super::generator::{generate_spectrum, PeakDistribution};
use crate::error::{Result, SynthError};

/// Display color of a class (visualization only, never exported)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form used in exported metadata
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A named class spectrum with cached band values.
///
/// Cloning copies the peak list, so a clone never shares peak storage
/// with the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    name: String,
    #[serde(default)]
    color: Rgb,
    #[serde(default)]
    peaks: Vec<PeakDistribution>,
    #[serde(skip)]
    bands: Vec<f64>,
}

impl Spectrum {
    /// Create an empty spectrum sampled at `num_bands` bands
    pub fn new(name: impl Into<String>, color: Rgb, num_bands: usize) -> Result<Self> {
        Self::with_peaks(name, color, Vec::new(), num_bands)
    }

    /// Create a spectrum from an existing peak list
    pub fn with_peaks(
        name: impl Into<String>,
        color: Rgb,
        peaks: Vec<PeakDistribution>,
        num_bands: usize,
    ) -> Result<Self> {
        let bands = generate_spectrum(&peaks, num_bands)?;
        Ok(Self {
            name: name.into(),
            color,
            peaks,
            bands,
        })
    }

    /// Peakless spectrum; cannot fail since no peaks means all zeros
    pub(crate) fn blank(name: &str, num_bands: usize) -> Self {
        Self {
            name: name.to_string(),
            color: Rgb::BLACK,
            peaks: Vec::new(),
            bands: vec![0.0; num_bands],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the spectrum. Empty names are ignored.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.name = name;
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn peaks(&self) -> &[PeakDistribution] {
        &self.peaks
    }

    /// Derived band values, one per band
    pub fn bands(&self) -> &[f64] {
        &self.bands
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    /// A spectrum with no peaks
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Resample at a new band count
    pub fn set_num_bands(&mut self, num_bands: usize) -> Result<()> {
        self.bands = generate_spectrum(&self.peaks, num_bands)?;
        Ok(())
    }

    /// Append a peak and regenerate the bands
    pub fn add_peak(&mut self, peak: PeakDistribution) -> Result<()> {
        peak.validate(self.peaks.len())?;
        self.peaks.push(peak);
        self.regenerate()
    }

    /// Remove the peak at `index`, returning it
    pub fn remove_peak(&mut self, index: usize) -> Result<PeakDistribution> {
        if index >= self.peaks.len() {
            return Err(SynthError::invalid(
                "index",
                format!("peak {} does not exist ({} peaks)", index, self.peaks.len()),
            ));
        }
        let peak = self.peaks.remove(index);
        self.regenerate()?;
        Ok(peak)
    }

    /// Replace the whole peak list. On failure the spectrum is unchanged.
    pub fn set_peaks(&mut self, peaks: Vec<PeakDistribution>) -> Result<()> {
        let bands = generate_spectrum(&peaks, self.sampling_bands())?;
        self.peaks = peaks;
        self.bands = bands;
        Ok(())
    }

    /// Drop every peak, leaving an all-zero curve
    pub fn clear_peaks(&mut self) {
        self.peaks.clear();
        self.bands.iter_mut().for_each(|v| *v = 0.0);
    }

    fn regenerate(&mut self) -> Result<()> {
        self.bands = generate_spectrum(&self.peaks, self.sampling_bands())?;
        Ok(())
    }

    // A deserialized spectrum has no cache until its owner resamples it.
    fn sampling_bands(&self) -> usize {
        self.bands.len().max(1)
    }
}
