//! Gaussian noise

use rand::RngCore;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Degradation;
use crate::cube::Cube;
use crate::error::{Result, SynthError};

/// How noise combines with the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseModel {
    /// `v + n`
    #[default]
    Additive,
    /// `v * (1 + n)`
    Multiplicative,
}

/// Zero-mean Gaussian noise with standard deviation `amount`
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    amount: f64,
    model: NoiseModel,
    distribution: Normal<f64>,
}

impl GaussianNoise {
    pub fn new(amount: f64, model: NoiseModel) -> Result<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SynthError::invalid(
                "noise_amount",
                format!("must be a finite number >= 0, got {}", amount),
            ));
        }
        let distribution = Normal::new(0.0, amount)
            .map_err(|e| SynthError::invalid("noise_amount", e.to_string()))?;
        Ok(Self {
            amount,
            model,
            distribution,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn model(&self) -> NoiseModel {
        self.model
    }
}

impl Degradation for GaussianNoise {
    fn name(&self) -> &'static str {
        "gaussian_noise"
    }

    fn apply(&self, cube: &Cube, rng: &mut dyn RngCore) -> Result<Cube> {
        let mut out = cube.clone();
        for value in out.data_mut() {
            let n = self.distribution.sample(&mut *rng);
            *value = match self.model {
                NoiseModel::Additive => *value + n,
                NoiseModel::Multiplicative => *value * (1.0 + n),
            };
        }
        Ok(out)
    }

    fn params(&self) -> Value {
        json!({
            "amount": self.amount,
            "model": self.model,
        })
    }
}
