//! Toy environment facade.

use crate::config::{
    ContinuousSpec, DiscreteSpec, MdpKind, RewardFunction, ToyEnvConfig, ToyEnvSpec,
};
use crate::reward::{ContinuousReward, SequenceRewardTable};
use crate::space_builder::{DecodedAction, SpaceLayout};
use crate::terminal::{EpisodePhase, TerminalController, TerminalRegions};
use crate::transition::{ContinuousDynamics, ContinuousState, DiscreteTransition, TransitionTable};
use mdp_playground::difficulty::RewardPipeline;
use mdp_playground::env::{Env, EnvInfo, StepResult};
use mdp_playground::rng::RandomStreams;
use mdp_playground::spaces::DynSpace;
use mdp_playground::{PlaygroundError, Result};
use ndarray::{Array1, ArrayD};
use rand::Rng;
use std::collections::VecDeque;

/// Initial continuous states are resampled at most this many times.
pub const MAX_INITIAL_STATE_ATTEMPTS: usize = 10_000;

/// Internal state plus the history the reward depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentedState {
    /// Discrete: `[state]` or `[state, irrelevant_state]`; continuous: the position
    pub current: Vec<f64>,
    /// Discrete: trailing `[state, action]` pairs; continuous: trailing relevant positions
    pub history: Vec<Vec<f64>>,
    /// Continuous only: derivative rows, position first
    pub derivatives: Option<Vec<Vec<f64>>>,
}

struct DiscreteCore {
    spec: DiscreteSpec,
    transition: DiscreteTransition,
    irrelevant: Option<DiscreteTransition>,
    rewards: SequenceRewardTable,
    state: usize,
    irrelevant_state: Option<usize>,
    window: VecDeque<(usize, usize)>,
}

struct ContinuousCore {
    spec: ContinuousSpec,
    dynamics: ContinuousDynamics,
    rewards: ContinuousReward,
    regions: TerminalRegions,
    state: ContinuousState,
    positions: VecDeque<Vec<f64>>,
}

impl ContinuousCore {
    fn reached_target(&self, position: &[f64]) -> bool {
        self.spec.reward_function == RewardFunction::MoveToAPoint
            && self.rewards.distance_to_target(position) < self.spec.target_radius
    }

    fn sample_initial_position(&self, streams: &mut RandomStreams) -> Result<Array1<f64>> {
        let max = self.spec.state_space_max;
        for _ in 0..MAX_INITIAL_STATE_ATTEMPTS {
            let mut position = Vec::with_capacity(self.spec.total_dim());
            position.extend(
                (0..self.spec.state_space_dim).map(|_| streams.space.gen_range(-max..=max)),
            );
            position.extend(
                (0..self.spec.irrelevant_dims).map(|_| streams.irrelevant.gen_range(-max..=max)),
            );
            if !self.regions.contains(&position) && !self.reached_target(&position) {
                return Ok(Array1::from(position));
            }
        }
        Err(PlaygroundError::config(format!(
            "no initial state outside terminal regions after {} attempts",
            MAX_INITIAL_STATE_ATTEMPTS
        )))
    }
}

enum Core {
    Discrete(DiscreteCore),
    Continuous(ContinuousCore),
}

/// A generated toy MDP behind the `Env` interface.
///
/// Construction draws, in order: relabeling permutations (representation
/// stream), the transition table (space stream), the irrelevant sub-MDP table
/// (irrelevant stream) and the reward table (reward stream). Everything after
/// that is per-episode randomness.
///
/// # Example
///
/// ```rust,ignore
/// let config = ToyEnvConfig {
///     seed: Some(42),
///     state_space_size: Some(10),
///     action_space_size: Some(3),
///     delay: 2,
///     ..Default::default()
/// };
/// let mut env = ToyEnv::new(config)?;
/// let (obs, _) = env.reset(None)?;
/// let result = env.step(&ArrayD::from_elem(IxDyn(&[1]), 0.0))?;
/// ```
pub struct ToyEnv {
    spec: ToyEnvSpec,
    streams: RandomStreams,
    layout: SpaceLayout,
    core: Core,
    pipeline: RewardPipeline,
    controller: TerminalController,
}

impl ToyEnv {
    /// Validate `config` and generate the MDP. The config is consumed; the
    /// environment keeps only the resolved `ToyEnvSpec`.
    pub fn new(config: ToyEnvConfig) -> Result<Self> {
        let spec = config.validate()?;
        if spec.seed_from_entropy {
            tracing::warn!(seed = spec.seed, "No seed configured; drew one from entropy");
        }

        let mut streams = RandomStreams::new(spec.seed);
        let layout = SpaceLayout::build(&spec, &mut streams);

        let core = match &spec.kind {
            MdpKind::Discrete(d) => {
                let table = TransitionTable::generate(
                    d.state_space_size,
                    d.action_space_size,
                    d.num_terminal_states,
                    d.completely_connected,
                    &mut streams.space,
                );
                let irrelevant = d.irrelevant.map(|(states, actions)| {
                    let table = TransitionTable::generate(
                        states,
                        actions,
                        0,
                        false,
                        &mut streams.irrelevant,
                    );
                    DiscreteTransition::new(table, d.transition_noise)
                });
                let rewards = SequenceRewardTable::generate(
                    d.state_space_size,
                    d.action_space_size,
                    spec.sequence_length,
                    &mut streams.reward,
                );
                tracing::info!(
                    seed = spec.seed,
                    states = d.state_space_size,
                    actions = d.action_space_size,
                    terminal_states = d.num_terminal_states,
                    reward_entries = rewards.len(),
                    "Generated discrete toy MDP"
                );
                Core::Discrete(DiscreteCore {
                    spec: d.clone(),
                    transition: DiscreteTransition::new(table, d.transition_noise),
                    irrelevant,
                    rewards,
                    state: 0,
                    irrelevant_state: None,
                    window: VecDeque::new(),
                })
            }
            MdpKind::Continuous(c) => {
                let dynamics = ContinuousDynamics::new(
                    c.state_space_dim,
                    c.transition_dynamics_order,
                    c.inertia,
                    c.time_unit,
                    c.state_space_max,
                    c.transition_noise.clone(),
                );
                let rewards = ContinuousReward {
                    function: c.reward_function,
                    target: c.target_point.clone(),
                    relevant_dim: c.state_space_dim,
                    penalty: c.irrelevant_penalty,
                    action_loss_weight: c.action_loss_weight,
                    time_unit: c.time_unit,
                    line_length: spec.sequence_length,
                };
                tracing::info!(
                    seed = spec.seed,
                    dim = c.state_space_dim,
                    irrelevant_dims = c.irrelevant_dims,
                    order = c.transition_dynamics_order,
                    time_unit = c.time_unit,
                    "Generated continuous toy MDP"
                );
                Core::Continuous(ContinuousCore {
                    spec: c.clone(),
                    dynamics,
                    rewards,
                    regions: TerminalRegions::new(c.terminal_states.clone(), c.term_state_edge),
                    state: ContinuousState::at_rest(
                        Array1::zeros(c.total_dim()),
                        c.transition_dynamics_order,
                    ),
                    positions: VecDeque::new(),
                })
            }
        };

        let pipeline = RewardPipeline::new(spec.reward.clone())?;
        let controller = TerminalController::new(spec.horizon);

        Ok(Self {
            spec,
            streams,
            layout,
            core,
            pipeline,
            controller,
        })
    }

    /// Parse a JSON config and build the environment.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(ToyEnvConfig::from_json_str(json)?)
    }

    pub fn spec(&self) -> &ToyEnvSpec {
        &self.spec
    }

    /// Seed the per-episode streams currently derive from.
    pub fn current_seed(&self) -> u64 {
        self.streams.seed()
    }

    /// Steps taken in the current episode.
    pub fn steps(&self) -> u64 {
        self.controller.steps()
    }

    /// Discrete transition table, fixed for the lifetime of the instance.
    pub fn transition_table(&self) -> Option<&TransitionTable> {
        match &self.core {
            Core::Discrete(core) => Some(core.transition.table()),
            Core::Continuous(_) => None,
        }
    }

    /// Discrete terminal state ids (empty for continuous environments).
    pub fn terminal_states(&self) -> Vec<usize> {
        match &self.core {
            Core::Discrete(core) => {
                (core.spec.num_non_terminal()..core.spec.state_space_size).collect()
            }
            Core::Continuous(_) => Vec::new(),
        }
    }

    /// Underlying state before relabeling or image rendering.
    pub fn raw_state(&self) -> Vec<f64> {
        match &self.core {
            Core::Discrete(core) => {
                let mut raw = vec![core.state as f64];
                raw.extend(core.irrelevant_state.map(|s| s as f64));
                raw
            }
            Core::Continuous(core) => core.state.position().to_vec(),
        }
    }

    pub fn augmented_state(&self) -> AugmentedState {
        match &self.core {
            Core::Discrete(core) => AugmentedState {
                current: self.raw_state(),
                history: core
                    .window
                    .iter()
                    .map(|&(s, a)| vec![s as f64, a as f64])
                    .collect(),
                derivatives: None,
            },
            Core::Continuous(core) => AugmentedState {
                current: self.raw_state(),
                history: core.positions.iter().cloned().collect(),
                derivatives: Some(
                    core.state
                        .derivatives
                        .rows()
                        .into_iter()
                        .map(|row| row.to_vec())
                        .collect(),
                ),
            },
        }
    }

    fn observe(&mut self) -> ArrayD<f32> {
        match &self.core {
            Core::Discrete(core) => self.layout.observe_discrete(
                core.state,
                core.irrelevant_state,
                &mut self.streams.representation,
            ),
            Core::Continuous(core) => self
                .layout
                .observe_continuous(core.state.derivatives.row(0).as_slice().unwrap_or(&[])),
        }
    }
}

impl Env for ToyEnv {
    fn observation_space(&self) -> DynSpace {
        self.layout.observation_space().clone()
    }

    fn action_space(&self) -> DynSpace {
        self.layout.action_space().clone()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(ArrayD<f32>, EnvInfo)> {
        if let Some(seed) = seed {
            self.seed(seed);
        }

        match &mut self.core {
            Core::Discrete(core) => {
                let state = self.streams.space.gen_range(0..core.spec.num_non_terminal());
                let irrelevant_state = core
                    .irrelevant
                    .as_ref()
                    .map(|t| self.streams.irrelevant.gen_range(0..t.table().num_states()));
                core.state = state;
                core.irrelevant_state = irrelevant_state;
                core.window.clear();
            }
            Core::Continuous(core) => {
                let position = core.sample_initial_position(&mut self.streams)?;
                let relevant = position
                    .iter()
                    .take(core.spec.state_space_dim)
                    .copied()
                    .collect();
                core.state =
                    ContinuousState::at_rest(position, core.spec.transition_dynamics_order);
                core.positions.clear();
                core.positions.push_back(relevant);
            }
        }

        if let Some((mean, std)) = self.pipeline.noise_stats() {
            tracing::debug!(mean, std, "Reward noise over previous episode");
        }
        self.pipeline.reset();
        self.controller.begin_episode();

        let observation = self.observe();
        Ok((observation, EnvInfo::new().with_raw_state(self.raw_state())))
    }

    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
        self.controller.ensure_active()?;
        let decoded = self.layout.decode_action(action)?;

        let mut info = EnvInfo::new();
        let (base, reached_terminal) = match (&mut self.core, decoded) {
            (Core::Discrete(core), DecodedAction::Discrete { relevant, irrelevant }) => {
                let state = core.state;
                let outcome = core.transition.step(state, relevant, &mut self.streams.transition);
                if let (Some(t), Some(s), Some(a)) =
                    (&core.irrelevant, core.irrelevant_state, irrelevant)
                {
                    core.irrelevant_state = Some(t.step(s, a, &mut self.streams.irrelevant).next);
                }

                core.window.push_back((state, relevant));
                while core.window.len() > core.rewards.sequence_length() {
                    core.window.pop_front();
                }
                let base = core.rewards.reward(&core.window);
                core.state = outcome.next;

                tracing::trace!(state, action = relevant, next = outcome.next, base, "step");
                info = info.with_extra("noisy_transition", if outcome.noisy { 1.0 } else { 0.0 });
                (base, core.spec.is_terminal(outcome.next))
            }
            (Core::Continuous(core), DecodedAction::Continuous { values, clipped }) => {
                if clipped {
                    tracing::debug!(?action, "Clipped out-of-range action");
                }
                let outcome = core.dynamics.step(
                    &mut core.state,
                    &values,
                    &mut self.streams.transition,
                    &mut self.streams.irrelevant,
                );
                let position = core.state.position().to_vec();
                core.positions
                    .push_back(position[..core.spec.state_space_dim].to_vec());
                while core.positions.len() > core.rewards.line_length.max(1) {
                    core.positions.pop_front();
                }
                let base = core.rewards.reward(&core.positions, &position, &values.to_vec());
                let distance = core.rewards.distance_to_target(&position);
                let reached = core.regions.contains(&position) || core.reached_target(&position);

                if outcome.clipped_dims > 0 {
                    tracing::debug!(dims = outcome.clipped_dims, "Clipped state to bounds");
                }
                tracing::trace!(?position, base, distance, "step");
                info = info
                    .with_extra("transition_noise_abs", outcome.noise_abs)
                    .with_extra("clipped_action", if clipped { 1.0 } else { 0.0 })
                    .with_extra("distance_to_target", distance);
                (base, reached)
            }
            (_, decoded) => {
                return Err(PlaygroundError::InvalidAction(format!(
                    "action {:?} does not match the environment kind",
                    decoded
                )))
            }
        };

        let (terminated, truncated) = self.controller.evaluate(reached_terminal);
        let done = terminated || truncated;
        let processed = self.pipeline.process(base, &mut self.streams.reward, done);

        let mut reward = processed.reward;
        if terminated {
            reward += self.spec.term_state_reward * self.spec.reward.scale;
        }
        if done {
            tracing::debug!(
                steps = self.controller.steps(),
                terminated,
                truncated,
                "Episode finished"
            );
        }

        let observation = self.observe();
        let info = info
            .with_raw_state(self.raw_state())
            .with_extra("step", self.controller.steps() as f64)
            .with_extra("base_reward", base)
            .with_extra("reward_noise", processed.noise)
            .with_extra("held_reward", processed.held)
            .with_extra("pending_reward", processed.pending);

        Ok(StepResult {
            observation,
            reward,
            terminated,
            truncated,
            info,
        })
    }

    fn seed(&mut self, seed: u64) {
        tracing::debug!(seed, "Reseeding episode streams");
        self.streams.reseed(seed);
    }

    fn render(&self) -> Option<String> {
        let state = match &self.core {
            Core::Discrete(core) => match core.irrelevant_state {
                Some(irr) => format!("state {} (irrelevant {})", core.state, irr),
                None => format!("state {}", core.state),
            },
            Core::Continuous(core) => {
                let position: Vec<String> = core
                    .state
                    .position()
                    .iter()
                    .map(|x| format!("{:.3}", x))
                    .collect();
                format!("position [{}]", position.join(", "))
            }
        };
        Some(format!(
            "Step {}/{}: {}",
            self.controller.steps(),
            self.controller.horizon(),
            state
        ))
    }

    fn is_done(&self) -> bool {
        self.controller.phase() == EpisodePhase::Done
    }
}
