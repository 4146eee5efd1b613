//! Noise distribution specs shared by reward and transition noise.

use crate::{PlaygroundError, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// A scalar noise distribution.
///
/// ```json
/// {"distribution": "normal", "mean": 0.0, "std": 0.1}
/// {"distribution": "uniform", "low": -0.1, "high": 0.1}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case", deny_unknown_fields)]
pub enum NoiseSpec {
    Normal {
        #[serde(default)]
        mean: f64,
        std: f64,
    },
    Uniform {
        low: f64,
        high: f64,
    },
}

impl NoiseSpec {
    /// Zero-mean Gaussian with the given standard deviation.
    pub fn gaussian(std: f64) -> Self {
        NoiseSpec::Normal { mean: 0.0, std }
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        match *self {
            NoiseSpec::Normal { mean, std } => {
                if !mean.is_finite() || !std.is_finite() || std < 0.0 {
                    return Err(PlaygroundError::config(format!(
                        "{}: normal noise needs a finite mean and std >= 0 (got mean={}, std={})",
                        field, mean, std
                    )));
                }
            }
            NoiseSpec::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(PlaygroundError::config(format!(
                        "{}: uniform noise needs finite low <= high (got low={}, high={})",
                        field, low, high
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draw one value. A degenerate distribution returns its single point
    /// without consuming randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            NoiseSpec::Normal { mean, std } => {
                if std == 0.0 {
                    return mean;
                }
                match Normal::new(mean, std) {
                    Ok(dist) => dist.sample(rng),
                    Err(_) => mean,
                }
            }
            NoiseSpec::Uniform { low, high } => {
                if low >= high {
                    low
                } else {
                    rng.gen_range(low..high)
                }
            }
        }
    }

    /// True when every draw is zero.
    pub fn is_zero(&self) -> bool {
        match *self {
            NoiseSpec::Normal { mean, std } => mean == 0.0 && std == 0.0,
            NoiseSpec::Uniform { low, high } => low == 0.0 && high == 0.0,
        }
    }
}

/// Transition noise: a bare number or a full distribution spec.
///
/// Discrete environments read a bare number as the substitution probability.
/// Continuous environments read it as the std of zero-mean Gaussian noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionNoise {
    Scalar(f64),
    Distribution(NoiseSpec),
}

impl TransitionNoise {
    /// Interpret as a substitution probability in [0, 1].
    pub fn probability(&self) -> Result<f64> {
        match *self {
            TransitionNoise::Scalar(p) if (0.0..=1.0).contains(&p) => Ok(p),
            TransitionNoise::Scalar(p) => Err(PlaygroundError::config(format!(
                "transition_noise: probability must be in [0, 1], got {}",
                p
            ))),
            TransitionNoise::Distribution(_) => Err(PlaygroundError::config(
                "transition_noise: discrete spaces take a probability, not a distribution",
            )),
        }
    }

    /// Interpret as additive noise on continuous values.
    pub fn additive(&self) -> Result<NoiseSpec> {
        let spec = match self {
            TransitionNoise::Scalar(std) => NoiseSpec::gaussian(*std),
            TransitionNoise::Distribution(spec) => spec.clone(),
        };
        spec.validate("transition_noise")?;
        Ok(spec)
    }
}
