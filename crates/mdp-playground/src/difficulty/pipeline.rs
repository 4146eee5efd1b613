//! Reward post-processing shared by toy environments and wrapped simulators.

use super::{DelayLine, NoiseSpec, RewardSchedule};
use crate::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Reward-side difficulty settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardTransforms {
    pub scale: f64,
    pub shift: f64,
    pub noise: Option<NoiseSpec>,
    pub density: f64,
    pub make_denser: bool,
    pub delay: usize,
}

impl Default for RewardTransforms {
    fn default() -> Self {
        Self {
            scale: 1.0,
            shift: 0.0,
            noise: None,
            density: 1.0,
            make_denser: false,
            delay: 0,
        }
    }
}

/// What one `process` call produced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProcessedReward {
    /// Emitted reward for this step
    pub reward: f64,
    /// `base * scale + shift + noise`
    pub contribution: f64,
    /// The reward-noise draw (0 without noise)
    pub noise: f64,
    /// Amount held by the density schedule after this step
    pub held: f64,
    /// Amount in flight in the delay line after this step
    pub pending: f64,
}

/// Contribution -> density schedule -> delay line.
#[derive(Clone, Debug)]
pub struct RewardPipeline {
    transforms: RewardTransforms,
    schedule: RewardSchedule,
    delay_line: DelayLine,
    step: u64,
    noise_count: u64,
    noise_sum: f64,
    noise_sq_sum: f64,
}

impl RewardPipeline {
    pub fn new(transforms: RewardTransforms) -> Result<Self> {
        if let Some(noise) = &transforms.noise {
            noise.validate("reward_noise")?;
        }
        if !transforms.scale.is_finite() || !transforms.shift.is_finite() {
            return Err(crate::PlaygroundError::config(
                "reward_scale and reward_shift must be finite",
            ));
        }
        let schedule = RewardSchedule::new(transforms.density, transforms.make_denser)?;
        let delay_line = DelayLine::new(transforms.delay);
        Ok(Self {
            transforms,
            schedule,
            delay_line,
            step: 0,
            noise_count: 0,
            noise_sum: 0.0,
            noise_sq_sum: 0.0,
        })
    }

    /// Steps processed this episode.
    pub fn step_index(&self) -> u64 {
        self.step
    }

    /// Process one step's base reward. `episode_end` flushes the schedule.
    pub fn process<R: Rng + ?Sized>(
        &mut self,
        base: f64,
        rng: &mut R,
        episode_end: bool,
    ) -> ProcessedReward {
        self.step += 1;
        let noise = match &self.transforms.noise {
            Some(spec) => spec.sample(rng),
            None => 0.0,
        };
        if self.transforms.noise.is_some() {
            self.noise_count += 1;
            self.noise_sum += noise;
            self.noise_sq_sum += noise * noise;
        }

        let contribution = base * self.transforms.scale + self.transforms.shift + noise;
        let released = self.schedule.release(self.step, contribution, episode_end);
        let reward = self.delay_line.push(released);

        ProcessedReward {
            reward,
            contribution,
            noise,
            held: self.schedule.held(),
            pending: self.delay_line.pending(),
        }
    }

    /// Mean and standard deviation of the reward-noise draws this episode.
    pub fn noise_stats(&self) -> Option<(f64, f64)> {
        if self.noise_count == 0 {
            return None;
        }
        let n = self.noise_count as f64;
        let mean = self.noise_sum / n;
        let var = (self.noise_sq_sum / n - mean * mean).max(0.0);
        Some((mean, var.sqrt()))
    }

    /// Start a new episode: clears the schedule, the delay line and the step count.
    pub fn reset(&mut self) {
        self.schedule.reset();
        self.delay_line.reset();
        self.step = 0;
        self.noise_count = 0;
        self.noise_sum = 0.0;
        self.noise_sq_sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(transforms: RewardTransforms, bases: &[f64]) -> Vec<f64> {
        let mut pipeline = RewardPipeline::new(transforms).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let n = bases.len();
        bases
            .iter()
            .enumerate()
            .map(|(i, &b)| pipeline.process(b, &mut rng, i + 1 == n).reward)
            .collect()
    }

    #[test]
    fn test_identity_transforms() {
        let bases = [0.1, 0.2, 0.3];
        assert_eq!(run(RewardTransforms::default(), &bases), bases.to_vec());
    }

    #[test]
    fn test_scale_and_shift() {
        let transforms = RewardTransforms {
            scale: 2.0,
            shift: -1.0,
            ..Default::default()
        };
        assert_eq!(run(transforms, &[1.0, 0.5]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_delay_shifts_rewards() {
        let bases = [0.1, 0.2, 0.3, 0.4, 0.5];
        let delayed = run(
            RewardTransforms {
                delay: 2,
                ..Default::default()
            },
            &bases,
        );
        assert_eq!(delayed, vec![0.0, 0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_sparse_and_dense_totals_agree() {
        let bases = [0.3, 0.1, 0.8, 0.2, 0.6, 0.9, 0.4];
        let sparse: f64 = run(
            RewardTransforms {
                density: 0.25,
                ..Default::default()
            },
            &bases,
        )
        .iter()
        .sum();
        let dense: f64 = run(
            RewardTransforms {
                density: 0.25,
                make_denser: true,
                ..Default::default()
            },
            &bases,
        )
        .iter()
        .sum();
        assert_float_eq!(sparse, dense, abs <= 1e-12);
    }

    #[test]
    fn test_noise_is_recorded() {
        let mut pipeline = RewardPipeline::new(RewardTransforms {
            noise: Some(NoiseSpec::gaussian(1.0)),
            ..Default::default()
        })
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let out = pipeline.process(0.0, &mut rng, false);
        assert_eq!(out.reward, out.noise);
        assert!(pipeline.noise_stats().is_some());
        pipeline.reset();
        assert!(pipeline.noise_stats().is_none());
        assert_eq!(pipeline.step_index(), 0);
    }
}
