//! Cube Assembler
//!
//! `cube[y][x][b] = sum_c weights[y][x][c] * spectra[c][b]`, optionally
//! followed by a degradation chain. The cube is built in a fresh buffer
//! and only returned once every check has passed.

use super::Cube;
use crate::blend::BlendWeights;
use crate::degradation::DegradationChain;
use crate::error::{Result, SynthError};

/// Combines blend weights with class spectra
#[derive(Debug)]
pub struct CubeAssembler {
    num_bands: usize,
    degradation: Option<DegradationChain>,
}

impl CubeAssembler {
    pub fn new(num_bands: usize) -> Result<Self> {
        if num_bands == 0 {
            return Err(SynthError::invalid("num_bands", "must be greater than 0"));
        }
        Ok(Self {
            num_bands,
            degradation: None,
        })
    }

    /// Degrade the assembled cube before returning it
    pub fn with_degradation(mut self, chain: DegradationChain) -> Self {
        self.degradation = Some(chain).filter(|c| !c.is_empty());
        self
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    /// Assemble the cube. `spectra[c]` is the band vector of class `c`.
    pub fn assemble<S: AsRef<[f64]>>(&self, weights: &BlendWeights, spectra: &[S]) -> Result<Cube> {
        let cube = assemble(weights, spectra, self.num_bands)?;
        match &self.degradation {
            Some(chain) => chain.apply(&cube),
            None => Ok(cube),
        }
    }
}

/// Assemble a clean cube from weights and per-class band vectors
pub fn assemble<S: AsRef<[f64]>>(
    weights: &BlendWeights,
    spectra: &[S],
    num_bands: usize,
) -> Result<Cube> {
    if num_bands == 0 {
        return Err(SynthError::invalid("num_bands", "must be greater than 0"));
    }
    for (i, spectrum) in spectra.iter().enumerate() {
        let actual = spectrum.as_ref().len();
        if actual != num_bands {
            return Err(SynthError::BandCountMismatch {
                spectrum: format!("class {}", i),
                expected: num_bands,
                actual,
            });
        }
    }
    if weights.num_classes() > spectra.len() {
        return Err(first_out_of_range(weights, spectra.len()));
    }

    let (width, height) = (weights.width(), weights.height());
    tracing::debug!(width, height, num_bands, classes = spectra.len(), "assembling cube");

    let mut data = vec![0.0_f64; width * height * num_bands];
    for (pixel, (_, _, mix)) in data.chunks_exact_mut(num_bands).zip(weights.iter()) {
        for &(class, weight) in mix {
            let bands = spectra[class].as_ref();
            for (out, &value) in pixel.iter_mut().zip(bands) {
                *out += weight * value;
            }
        }
    }

    Cube::from_vec(width, height, num_bands, data)
}

fn first_out_of_range(weights: &BlendWeights, available: usize) -> SynthError {
    weights
        .iter()
        .find_map(|(x, y, mix)| {
            mix.iter()
                .find(|&&(class, _)| class >= available)
                .map(|&(index, _)| SynthError::ClassIndexOutOfRange {
                    index,
                    available,
                    x,
                    y,
                })
        })
        .unwrap_or(SynthError::ClassIndexOutOfRange {
            index: weights.num_classes() - 1,
            available,
            x: 0,
            y: 0,
        })
}
