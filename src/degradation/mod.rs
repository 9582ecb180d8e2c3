//! Image Degradation
//!
//! Finishing touches that make an exported cube a harder evaluation set.
//! Every step reads a cube and returns a new one of identical shape; the
//! input is never modified, so callers can keep the clean cube around.
//!
//! Order in a chain: blur first, then noise.

mod blur;
mod noise;

pub use blur::SpatialBlur;
pub use noise::{GaussianNoise, NoiseModel};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cube::Cube;
use crate::error::{Result, SynthError};

/// Base trait for all degradation steps
pub trait Degradation: Send + Sync {
    /// Step type identifier
    fn name(&self) -> &'static str;

    /// Produce a degraded copy of `cube`
    fn apply(&self, cube: &Cube, rng: &mut dyn RngCore) -> Result<Cube>;

    /// Parameters as JSON (for metadata and logging)
    fn params(&self) -> Value;
}

/// Named degradation options. Everything is off by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegradationConfig {
    /// Standard deviation of the Gaussian noise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_amount: Option<f64>,
    /// Whether noise is added or scales the signal
    pub noise_model: NoiseModel,
    /// Spatial box blur radius in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur_radius: Option<usize>,
    /// Seed for reproducible noise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl DegradationConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.noise_amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(SynthError::invalid(
                    "noise_amount",
                    format!("must be a finite number >= 0, got {}", amount),
                ));
            }
        }
        Ok(())
    }

    /// True when no step would change the cube
    pub fn is_off(&self) -> bool {
        self.noise_amount.map_or(true, |a| a == 0.0) && self.blur_radius.map_or(true, |r| r == 0)
    }
}

/// Ordered list of degradation steps
#[derive(Default)]
pub struct DegradationChain {
    steps: Vec<Box<dyn Degradation>>,
    seed: Option<u64>,
}

impl DegradationChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain described by `config`, skipping options that are off
    pub fn from_config(config: &DegradationConfig) -> Result<Self> {
        config.validate()?;
        let mut chain = Self {
            steps: Vec::new(),
            seed: config.seed,
        };
        if let Some(radius) = config.blur_radius.filter(|&r| r > 0) {
            chain.push(Box::new(SpatialBlur::new(radius)));
        }
        if let Some(amount) = config.noise_amount.filter(|&a| a > 0.0) {
            chain.push(Box::new(GaussianNoise::new(amount, config.noise_model)?));
        }
        Ok(chain)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn push(&mut self, step: Box<dyn Degradation>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Degradation> {
        self.steps.iter().map(|s| s.as_ref())
    }

    /// Run every step, seeding the RNG from the chain's seed if it has one
    pub fn apply(&self, cube: &Cube) -> Result<Cube> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.apply_with_rng(cube, &mut rng)
    }

    pub fn apply_with_rng(&self, cube: &Cube, rng: &mut dyn RngCore) -> Result<Cube> {
        let mut current = cube.clone();
        for step in &self.steps {
            tracing::debug!(step = step.name(), params = %step.params(), "applying degradation");
            current = step.apply(&current, rng)?;
        }
        Ok(current)
    }

    /// Parameters of every step, in order
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.steps
                .iter()
                .map(|s| serde_json::json!({ "type": s.name(), "params": s.params() }))
                .collect(),
        )
    }
}

impl std::fmt::Debug for DegradationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DegradationChain")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_off() {
        let config = DegradationConfig::default();
        assert!(config.is_off());
        assert!(DegradationChain::from_config(&config).unwrap().is_empty());
    }

    #[test]
    fn test_chain_order_blur_then_noise() {
        let config = DegradationConfig {
            noise_amount: Some(0.01),
            blur_radius: Some(1),
            ..Default::default()
        };
        let chain = DegradationChain::from_config(&config).unwrap();
        let names: Vec<&str> = chain.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["spatial_blur", "gaussian_noise"]);
    }

    #[test]
    fn test_zero_amounts_are_skipped() {
        let config = DegradationConfig {
            noise_amount: Some(0.0),
            blur_radius: Some(0),
            ..Default::default()
        };
        assert!(config.is_off());
        assert!(DegradationChain::from_config(&config).unwrap().is_empty());
    }

    #[test]
    fn test_negative_noise_rejected() {
        let config = DegradationConfig {
            noise_amount: Some(-0.5),
            ..Default::default()
        };
        assert!(DegradationChain::from_config(&config).is_err());
    }

    #[test]
    fn test_empty_chain_returns_equal_copy() {
        let cube = Cube::from_vec(1, 1, 2, vec![0.25, 0.75]).unwrap();
        let out = DegradationChain::new().apply(&cube).unwrap();
        assert_eq!(out, cube);
    }

    #[test]
    fn test_seeded_chain_is_reproducible() {
        let cube = Cube::from_vec(2, 2, 2, vec![0.5; 8]).unwrap();
        let config = DegradationConfig {
            noise_amount: Some(0.1),
            seed: Some(9),
            ..Default::default()
        };
        let chain = DegradationChain::from_config(&config).unwrap();
        assert_eq!(chain.apply(&cube).unwrap(), chain.apply(&cube).unwrap());
        assert_eq!(cube.data(), &[0.5; 8]);
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: DegradationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DegradationConfig::default());
        let config: DegradationConfig =
            serde_json::from_str(r#"{"noise_amount": 0.2, "noise_model": "multiplicative"}"#)
                .unwrap();
        assert_eq!(config.noise_model, NoiseModel::Multiplicative);
    }
}
