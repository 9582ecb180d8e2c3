//! hsi-synth - Synthetic Hyperspectral Cube Generator
//!
//! Builds labelled hyperspectral test data from a handful of parameters:
//! 1. Class spectra - each class is a normalized mixture of Gaussian peaks
//!    sampled at `num_bands` points of the unit spectral range
//! 2. Layout - a class index per pixel from a stripe, grid or random pattern
//! 3. Blending - hard class boundaries softened into per-pixel weights
//! 4. Assembly - `cube[y][x][b] = sum_c w[y][x][c] * spectrum[c][b]`
//!
//! # Pipeline
//!
//! `ProjectState` holds everything needed to reproduce a cube and runs
//! generate -> blend -> assemble -> degrade. Cubes are stored
//! band-interleaved by pixel and can be exported as ENVI files.

pub mod blend;
pub mod cli;
pub mod cube;
pub mod degradation;
pub mod error;
pub mod export;
pub mod layout;
pub mod project;
pub mod spectrum;

pub use blend::{blend, BlendKernel, BlendWeights, LayoutBlender};
pub use cube::{assemble, Cube, CubeAssembler};
pub use degradation::{DegradationChain, DegradationConfig};
pub use error::{ErrorKind, Result, SynthError};
pub use layout::{ImageLayout, LayoutGenerator, LayoutPattern};
pub use project::ProjectState;
pub use spectrum::{generate_spectrum, ClassSpectra, PeakDistribution, Spectrum};
