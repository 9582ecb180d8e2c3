//! Spectrum Module
//!
//! Class spectra built from Gaussian peak mixtures:
//! - Generator: peaks -> normalized band values
//! - Model: a named, colored spectrum with cached bands
//! - Collection: the ordered list every layout indexes into

pub mod collection;
pub mod generator;
pub mod model;

pub use collection::{ClassSpectra, DEFAULT_NUM_BANDS, DEFAULT_SPECTRUM_COLOR, DEFAULT_SPECTRUM_NAME};
pub use generator::{band_position, generate_spectrum, PeakDistribution};
pub use model::{Rgb, Spectrum};
