//! Class spectra collection
//!
//! Single owner of every class spectrum in a project. Class indices used
//! by layouts are positions in this list.

use serde::{Deserialize, Serialize};

use super::model::{Rgb, Spectrum};
use crate::error::{Result, SynthError};

/// Band count used until the user picks another one
pub const DEFAULT_NUM_BANDS: usize = 100;

/// Name of the spectrum every new project starts with
pub const DEFAULT_SPECTRUM_NAME: &str = "Background";

/// Color given to newly created spectra
pub const DEFAULT_SPECTRUM_COLOR: Rgb = Rgb::BLACK;

/// Ordered list of class spectra sharing one band count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClassSpectraRecord", into = "ClassSpectraRecord")]
pub struct ClassSpectra {
    num_bands: usize,
    spectra: Vec<Spectrum>,
    next_spectrum_number: usize,
}

/// Serialized shape of [`ClassSpectra`]; band caches are rebuilt on load
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassSpectraRecord {
    #[serde(default = "default_num_bands")]
    num_bands: usize,
    #[serde(default)]
    spectra: Vec<Spectrum>,
    #[serde(default = "default_next_number")]
    next_spectrum_number: usize,
}

fn default_num_bands() -> usize {
    DEFAULT_NUM_BANDS
}

fn default_next_number() -> usize {
    1
}

impl TryFrom<ClassSpectraRecord> for ClassSpectra {
    type Error = SynthError;

    fn try_from(record: ClassSpectraRecord) -> Result<Self> {
        let mut collection = ClassSpectra {
            num_bands: record.num_bands,
            spectra: record.spectra,
            next_spectrum_number: record.next_spectrum_number,
        };
        collection.set_num_bands(record.num_bands)?;
        Ok(collection)
    }
}

impl From<ClassSpectra> for ClassSpectraRecord {
    fn from(collection: ClassSpectra) -> Self {
        Self {
            num_bands: collection.num_bands,
            spectra: collection.spectra,
            next_spectrum_number: collection.next_spectrum_number,
        }
    }
}

impl ClassSpectra {
    /// A fresh collection holding only the background spectrum
    pub fn new(num_bands: usize) -> Result<Self> {
        let background = Spectrum::new(DEFAULT_SPECTRUM_NAME, DEFAULT_SPECTRUM_COLOR, num_bands)?;
        Ok(Self {
            num_bands,
            spectra: vec![background],
            next_spectrum_number: 1,
        })
    }

    /// A collection with no spectra at all
    pub fn empty(num_bands: usize) -> Result<Self> {
        if num_bands == 0 {
            return Err(SynthError::invalid("num_bands", "must be greater than 0"));
        }
        Ok(Self {
            num_bands,
            spectra: Vec::new(),
            next_spectrum_number: 1,
        })
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Spectrum> {
        let len = self.spectra.len();
        self.spectra
            .get(index)
            .ok_or(SynthError::SpectrumNotFound { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Spectrum> {
        let len = self.spectra.len();
        self.spectra
            .get_mut(index)
            .ok_or(SynthError::SpectrumNotFound { index, len })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spectrum> {
        self.spectra.iter()
    }

    pub fn as_slice(&self) -> &[Spectrum] {
        &self.spectra
    }

    /// Band vectors in class-index order
    pub fn band_vectors(&self) -> Vec<&[f64]> {
        self.spectra.iter().map(|s| s.bands()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.spectra.iter().map(|s| s.name()).collect()
    }

    /// Add a spectrum, resampling it to this collection's band count.
    /// Returns its class index.
    pub fn push(&mut self, mut spectrum: Spectrum) -> Result<usize> {
        if spectrum.num_bands() != self.num_bands {
            spectrum.set_num_bands(self.num_bands)?;
        }
        self.spectra.push(spectrum);
        tracing::debug!(count = self.spectra.len(), "added class spectrum");
        Ok(self.spectra.len() - 1)
    }

    /// Add a blank spectrum named "New Spectrum N"
    pub fn add_new(&mut self) -> Result<usize> {
        let name = format!("New Spectrum {}", self.next_spectrum_number);
        self.next_spectrum_number += 1;
        let spectrum = Spectrum::new(name, DEFAULT_SPECTRUM_COLOR, self.num_bands)?;
        self.push(spectrum)
    }

    /// Append an independent copy of the spectrum at `index`
    pub fn duplicate(&mut self, index: usize) -> Result<usize> {
        let mut copy = self.get(index)?.clone();
        copy.set_name(format!("Copy of {}", copy.name()));
        self.push(copy)
    }

    /// Delete the spectrum at `index`.
    ///
    /// Layouts generated earlier may now refer to missing classes; assembly
    /// reports those as out-of-range.
    pub fn remove(&mut self, index: usize) -> Result<Spectrum> {
        self.get(index)?;
        let removed = self.spectra.remove(index);
        tracing::debug!(name = removed.name(), "removed class spectrum");
        Ok(removed)
    }

    /// Resample every spectrum. On failure nothing changes.
    pub fn set_num_bands(&mut self, num_bands: usize) -> Result<()> {
        if num_bands == 0 {
            return Err(SynthError::invalid("num_bands", "must be greater than 0"));
        }
        let mut resampled = self.spectra.clone();
        for spectrum in resampled.iter_mut() {
            spectrum.set_num_bands(num_bands)?;
        }
        self.spectra = resampled;
        self.num_bands = num_bands;
        Ok(())
    }

    /// Back to a single background spectrum at the current band count
    pub fn reset(&mut self) -> Result<()> {
        *self = Self::new(self.num_bands)?;
        Ok(())
    }
}

impl Default for ClassSpectra {
    fn default() -> Self {
        Self {
            num_bands: DEFAULT_NUM_BANDS,
            spectra: vec![Spectrum::blank(DEFAULT_SPECTRUM_NAME, DEFAULT_NUM_BANDS)],
            next_spectrum_number: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::PeakDistribution;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_has_background() {
        let spectra = ClassSpectra::new(DEFAULT_NUM_BANDS).unwrap();
        assert_eq!(spectra.len(), 1);
        assert_eq!(spectra.get(0).unwrap().name(), "Background");
        assert_eq!(spectra.get(0).unwrap().color(), Rgb::BLACK);
    }

    #[test]
    fn test_add_new_numbers_names() {
        let mut spectra = ClassSpectra::new(10).unwrap();
        spectra.add_new().unwrap();
        spectra.add_new().unwrap();
        spectra.remove(1).unwrap();
        spectra.add_new().unwrap();
        assert_eq!(
            spectra.names(),
            vec!["Background", "New Spectrum 2", "New Spectrum 3"]
        );
    }

    #[test]
    fn test_duplicate() {
        let mut spectra = ClassSpectra::new(10).unwrap();
        spectra
            .get_mut(0)
            .unwrap()
            .add_peak(PeakDistribution::new(0.3, 0.9, 0.1).unwrap())
            .unwrap();
        let index = spectra.duplicate(0).unwrap();
        assert_eq!(index, 1);
        assert_eq!(spectra.get(1).unwrap().name(), "Copy of Background");
        assert_eq!(spectra.get(1).unwrap().bands(), spectra.get(0).unwrap().bands());

        spectra.get_mut(1).unwrap().clear_peaks();
        assert!(!spectra.get(0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_index() {
        let mut spectra = ClassSpectra::new(10).unwrap();
        assert!(matches!(
            spectra.remove(4),
            Err(SynthError::SpectrumNotFound { index: 4, len: 1 })
        ));
        assert!(spectra.duplicate(2).is_err());
    }

    #[test]
    fn test_set_num_bands_resamples_all() {
        let mut spectra = ClassSpectra::new(10).unwrap();
        spectra.add_new().unwrap();
        spectra.set_num_bands(64).unwrap();
        assert!(spectra.iter().all(|s| s.num_bands() == 64));
        assert!(spectra.set_num_bands(0).is_err());
        assert_eq!(spectra.num_bands(), 64);
    }

    #[test]
    fn test_push_resamples() {
        let mut spectra = ClassSpectra::new(20).unwrap();
        let foreign = Spectrum::new("Foreign", Rgb::BLACK, 5).unwrap();
        spectra.push(foreign).unwrap();
        assert_eq!(spectra.get(1).unwrap().num_bands(), 20);
    }

    #[test]
    fn test_reset() {
        let mut spectra = ClassSpectra::new(30).unwrap();
        spectra.add_new().unwrap();
        spectra.add_new().unwrap();
        spectra.reset().unwrap();
        assert_eq!(spectra.names(), vec!["Background"]);
        assert_eq!(spectra.num_bands(), 30);
        spectra.add_new().unwrap();
        assert_eq!(spectra.get(1).unwrap().name(), "New Spectrum 1");
    }

    #[test]
    fn test_serde_rebuilds_bands() {
        let mut spectra = ClassSpectra::new(16).unwrap();
        spectra
            .get_mut(0)
            .unwrap()
            .add_peak(PeakDistribution::new(0.5, 1.0, 0.2).unwrap())
            .unwrap();
        let json = serde_json::to_string(&spectra).unwrap();
        let restored: ClassSpectra = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, spectra);
    }

    #[test]
    fn test_serde_rejects_zero_bands() {
        let json = r#"{"num_bands": 0, "spectra": []}"#;
        assert!(serde_json::from_str::<ClassSpectra>(json).is_err());
    }
}
