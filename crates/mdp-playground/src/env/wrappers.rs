//! Environment wrappers for common functionality.

use super::{Env, EnvInfo, StepResult};
use crate::difficulty::{DifficultyConfig, NoiseSpec, RewardPipeline};
use crate::rng::RandomStreams;
use crate::spaces::{Discrete, DynSpace};
use crate::{PlaygroundError, Result};
use ndarray::{ArrayD, IxDyn};
use rand::Rng;

/// Wrapper that tracks episode statistics (return and length).
///
/// Adds `episode_return` and `episode_length` to info on episode completion.
pub struct EpisodeStats<E: Env> {
    env: E,
    episode_return: f64,
    episode_length: u32,
}

impl<E: Env> EpisodeStats<E> {
    /// Wrap an environment with episode statistics tracking
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode_return: 0.0,
            episode_length: 0,
        }
    }

    /// Get a reference to the inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Get a mutable reference to the inner environment
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

impl<E: Env> Env for EpisodeStats<E> {
    fn observation_space(&self) -> DynSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.env.action_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(ArrayD<f32>, EnvInfo)> {
        self.episode_return = 0.0;
        self.episode_length = 0;
        self.env.reset(seed)
    }

    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
        let mut result = self.env.step(action)?;

        self.episode_return += result.reward;
        self.episode_length += 1;

        if result.done() {
            result.info = result
                .info
                .with_episode_stats(self.episode_return, self.episode_length);

            // Reset internal counters (env will be reset externally)
            self.episode_return = 0.0;
            self.episode_length = 0;
        }

        Ok(result)
    }

    fn seed(&mut self, seed: u64) {
        self.env.seed(seed)
    }

    fn render(&self) -> Option<String> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.env.is_done()
    }
}

/// Where transition noise is injected for a wrapped environment.
#[derive(Clone, Debug)]
enum NoiseTarget {
    None,
    /// Substitute a different discrete action with this probability
    Action(Discrete, f64),
    /// Add noise to every element of a box observation
    Observation(NoiseSpec),
}

/// Applies the toy-environment difficulty transforms to any `Env`.
///
/// Rewards go through the same `RewardPipeline` the toy environments use
/// (scale, shift, noise, density schedule, delay), drawing from the reward
/// stream. Transition noise substitutes actions for discrete action spaces
/// and perturbs observations for box observation spaces, drawing from the
/// transition stream.
pub struct DifficultyWrapper<E: Env> {
    env: E,
    streams: RandomStreams,
    pipeline: RewardPipeline,
    noise: NoiseTarget,
    needs_reset: bool,
}

impl<E: Env> DifficultyWrapper<E> {
    pub fn new(env: E, config: DifficultyConfig) -> Result<Self> {
        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = RandomStreams::entropy_seed();
                tracing::warn!(seed, "DifficultyWrapper has no seed; drew one from entropy");
                seed
            }
        };
        let pipeline = RewardPipeline::new(config.reward_transforms())?;

        let noise = match &config.transition_noise {
            None => NoiseTarget::None,
            Some(tn) => match (env.action_space(), env.observation_space()) {
                (DynSpace::Discrete(space), _) => NoiseTarget::Action(space, tn.probability()?),
                (_, DynSpace::Box(_)) => NoiseTarget::Observation(tn.additive()?),
                (action, observation) => {
                    return Err(PlaygroundError::config(format!(
                        "transition_noise needs a discrete action or box observation space \
                         (got {} actions, {} observations)",
                        action.kind(),
                        observation.kind()
                    )))
                }
            },
        };

        tracing::info!(
            seed,
            delay = config.delay,
            density = config.reward_density,
            "Difficulty wrapper ready"
        );

        Ok(Self {
            env,
            streams: RandomStreams::new(seed),
            pipeline,
            noise,
            needs_reset: true,
        })
    }

    /// Get a reference to the inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    fn perturb_action(&mut self, action: &ArrayD<f32>, info: &mut EnvInfo) -> Result<ArrayD<f32>> {
        let (space, p) = match &self.noise {
            NoiseTarget::Action(space, p) => (space, *p),
            _ => return Ok(action.clone()),
        };
        let chosen = space.decode(action)?;
        let mut substituted = chosen;
        if space.n > 1 && self.streams.transition.gen::<f64>() < p {
            let mut other = self.streams.transition.gen_range(0..space.n - 1);
            if other >= chosen {
                other += 1;
            }
            substituted = other;
            tracing::debug!(chosen, substituted, "Injected action noise");
        }
        let flipped = (substituted != chosen) as u8 as f64;
        *info = std::mem::take(info).with_extra("noisy_transition", flipped);
        Ok(ArrayD::from_elem(IxDyn(&[1]), substituted as f32))
    }

    fn perturb_observation(&mut self, observation: &mut ArrayD<f32>) -> Option<f64> {
        let spec = match &self.noise {
            NoiseTarget::Observation(spec) => spec,
            _ => return None,
        };
        let mut total = 0.0;
        for x in observation.iter_mut() {
            let n = spec.sample(&mut self.streams.transition);
            total += n.abs();
            *x += n as f32;
        }
        Some(total)
    }
}

impl<E: Env> Env for DifficultyWrapper<E> {
    fn observation_space(&self) -> DynSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.env.action_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(ArrayD<f32>, EnvInfo)> {
        if let Some(seed) = seed {
            self.streams.reseed(seed);
        }
        let (mut observation, info) = self.env.reset(seed)?;
        if let Some((mean, std)) = self.pipeline.noise_stats() {
            tracing::debug!(mean, std, "Reward noise over previous episode");
        }
        self.pipeline.reset();
        self.needs_reset = false;
        self.perturb_observation(&mut observation);
        Ok((observation, info))
    }

    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
        if self.needs_reset {
            return Err(PlaygroundError::EpisodeExhausted);
        }
        // A failed inner step must leave the noise stream where it was
        let checkpoint = self.streams.transition.clone();
        let mut noise_info = EnvInfo::new();
        let action = self.perturb_action(action, &mut noise_info)?;
        let mut result = match self.env.step(&action) {
            Ok(result) => result,
            Err(err) => {
                self.streams.transition = checkpoint;
                return Err(err);
            }
        };

        let processed = self
            .pipeline
            .process(result.reward, &mut self.streams.reward, result.done());
        let base = result.reward;
        result.reward = processed.reward;
        result.info = noise_info
            .extra
            .iter()
            .fold(result.info, |info, &(k, v)| info.with_extra(k, v))
            .with_extra("base_reward", base)
            .with_extra("reward_noise", processed.noise)
            .with_extra("held_reward", processed.held)
            .with_extra("pending_reward", processed.pending);

        if let Some(total) = self.perturb_observation(&mut result.observation) {
            result.info = result.info.with_extra("transition_noise_abs", total);
        }
        if result.done() {
            self.needs_reset = true;
        }
        Ok(result)
    }

    fn seed(&mut self, seed: u64) {
        self.streams.reseed(seed);
        self.env.seed(seed);
    }

    fn render(&self) -> Option<String> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.needs_reset
    }
}
