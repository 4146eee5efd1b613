//! Difficulty transforms.
//!
//! The reward delay, density schedule, reward noise and transition noise used
//! by toy environments, packaged so the same code can be applied to any `Env`
//! through `DifficultyWrapper`.

mod delay;
mod noise;
mod pipeline;
mod schedule;

pub use delay::DelayLine;
pub use noise::{NoiseSpec, TransitionNoise};
pub use pipeline::{ProcessedReward, RewardPipeline, RewardTransforms};
pub use schedule::RewardSchedule;

use crate::{PlaygroundError, Result};
use serde::{Deserialize, Serialize};

/// Settings for `DifficultyWrapper`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DifficultyConfig {
    pub seed: Option<u64>,
    pub delay: usize,
    pub reward_density: f64,
    pub make_denser: bool,
    pub reward_scale: f64,
    pub reward_shift: f64,
    pub reward_noise: Option<NoiseSpec>,
    pub transition_noise: Option<TransitionNoise>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            seed: None,
            delay: 0,
            reward_density: 1.0,
            make_denser: false,
            reward_scale: 1.0,
            reward_shift: 0.0,
            reward_noise: None,
            transition_noise: None,
        }
    }
}

impl DifficultyConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PlaygroundError::config(e.to_string()))
    }

    pub fn reward_transforms(&self) -> RewardTransforms {
        RewardTransforms {
            scale: self.reward_scale,
            shift: self.reward_shift,
            noise: self.reward_noise.clone(),
            density: self.reward_density,
            make_denser: self.make_denser,
            delay: self.delay,
        }
    }
}
