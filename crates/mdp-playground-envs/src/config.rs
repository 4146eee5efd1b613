//! Toy environment configuration and validation.
//!
//! `ToyEnvConfig` is the serde-facing mapping users write; `validate` turns it
//! into an immutable, fully-resolved `ToyEnvSpec`.

use mdp_playground::difficulty::{NoiseSpec, RewardPipeline, RewardTransforms, TransitionNoise};
use mdp_playground::rng::RandomStreams;
use mdp_playground::{PlaygroundError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HORIZON: u64 = 100;
pub const DEFAULT_SEQUENCE_LENGTH: usize = 1;
pub const DEFAULT_REWARD_DENSITY: f64 = 1.0;
pub const DEFAULT_REWARD_SCALE: f64 = 1.0;
pub const DEFAULT_ACTION_SPACE_SIZE: usize = 6;
pub const DEFAULT_IMAGE_SIZE: usize = 32;
pub const DEFAULT_IMAGE_SCALE_RANGE: (f64, f64) = (0.5, 1.5);
pub const DEFAULT_STATE_SPACE_DIM: usize = 2;
pub const DEFAULT_TRANSITION_DYNAMICS_ORDER: usize = 1;
pub const DEFAULT_INERTIA: f64 = 1.0;
pub const DEFAULT_TIME_UNIT: f64 = 1.0;
pub const DEFAULT_SPACE_MAX: f64 = 1.0;
pub const DEFAULT_TARGET_RADIUS: f64 = 0.05;
pub const DEFAULT_TERM_STATE_EDGE: f64 = 1.0;

/// Reward tables above this many entries are rejected.
pub const MAX_REWARD_TABLE_ENTRIES: u128 = 1 << 20;
/// Upper bound on states x actions of the irrelevant discrete sub-MDP.
pub const MAX_TRANSITION_TABLE_ENTRIES: u128 = 1 << 20;
/// Upper bound on (order + 1) x dimensions of a continuous derivative stack.
pub const MAX_CONTINUOUS_STATE_ENTRIES: u128 = 1 << 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    #[default]
    Discrete,
    Continuous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardFunction {
    #[default]
    MoveToAPoint,
    MoveAlongALine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageTransform {
    Shift,
    Scale,
    Rotate,
    Flip,
}

/// Distractor sub-space.
///
/// Discrete environments use `state_space_size` / `action_space_size`,
/// continuous ones use `dims` / `penalty`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrrelevantFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_space_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_space_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dims: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<f64>,
}

/// User-facing configuration of a toy environment.
///
/// Fields that only make sense for one `state_space_type` are `Option`s so
/// that setting them for the other type can be rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToyEnvConfig {
    pub state_space_type: SpaceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub strict_determinism: bool,
    pub horizon: u64,
    pub delay: usize,
    pub sequence_length: usize,
    pub reward_density: f64,
    pub make_denser: bool,
    pub reward_scale: f64,
    pub reward_shift: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_noise: Option<NoiseSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_noise: Option<TransitionNoise>,
    pub term_state_reward: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irrelevant_features: Option<IrrelevantFeatures>,

    // Discrete only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_space_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_space_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_state_density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completely_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_representations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_transforms: Option<Vec<ImageTransform>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_shift_quantum: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_rotation_quantum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_scale_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_representations: Option<bool>,

    // Continuous only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_space_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_space_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_dynamics_order: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inertia: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_space_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_space_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_function: Option<RewardFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_point: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_states: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_state_edge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_loss_weight: Option<f64>,
}

impl Default for ToyEnvConfig {
    fn default() -> Self {
        Self {
            state_space_type: SpaceType::Discrete,
            seed: None,
            strict_determinism: false,
            horizon: DEFAULT_HORIZON,
            delay: 0,
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            reward_density: DEFAULT_REWARD_DENSITY,
            make_denser: false,
            reward_scale: DEFAULT_REWARD_SCALE,
            reward_shift: 0.0,
            reward_noise: None,
            transition_noise: None,
            term_state_reward: 0.0,
            irrelevant_features: None,
            state_space_size: None,
            action_space_size: None,
            terminal_state_density: None,
            completely_connected: None,
            image_representations: None,
            image_width: None,
            image_height: None,
            image_transforms: None,
            image_shift_quantum: None,
            image_rotation_quantum: None,
            image_scale_range: None,
            shuffle_representations: None,
            state_space_dim: None,
            action_space_dim: None,
            transition_dynamics_order: None,
            inertia: None,
            time_unit: None,
            state_space_max: None,
            action_space_max: None,
            reward_function: None,
            target_point: None,
            target_radius: None,
            terminal_states: None,
            term_state_edge: None,
            action_loss_weight: None,
        }
    }
}

/// Resolved settings of a discrete image representation.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSpec {
    pub width: usize,
    pub height: usize,
    pub transforms: Vec<ImageTransform>,
    pub shift_quantum: usize,
    pub rotation_quantum: f64,
    pub scale_range: (f64, f64),
}

impl ImageSpec {
    pub fn has(&self, transform: ImageTransform) -> bool {
        self.transforms.contains(&transform)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteSpec {
    pub state_space_size: usize,
    pub action_space_size: usize,
    /// Number of terminal states; they are the highest state ids
    pub num_terminal_states: usize,
    pub completely_connected: bool,
    /// Probability of substituting a random different successor
    pub transition_noise: f64,
    /// (state_space_size, action_space_size) of the distractor sub-MDP
    pub irrelevant: Option<(usize, usize)>,
    pub image: Option<ImageSpec>,
    pub shuffle_representations: bool,
}

impl DiscreteSpec {
    pub fn is_terminal(&self, state: usize) -> bool {
        state >= self.state_space_size - self.num_terminal_states
    }

    pub fn num_non_terminal(&self) -> usize {
        self.state_space_size - self.num_terminal_states
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousSpec {
    pub state_space_dim: usize,
    pub transition_dynamics_order: usize,
    pub inertia: f64,
    pub time_unit: f64,
    pub state_space_max: f64,
    pub action_space_max: f64,
    pub reward_function: RewardFunction,
    pub target_point: Vec<f64>,
    pub target_radius: f64,
    pub terminal_states: Vec<Vec<f64>>,
    pub term_state_edge: f64,
    pub action_loss_weight: f64,
    pub transition_noise: Option<NoiseSpec>,
    pub irrelevant_dims: usize,
    pub irrelevant_penalty: f64,
}

impl ContinuousSpec {
    /// Relevant plus irrelevant dimensions
    pub fn total_dim(&self) -> usize {
        self.state_space_dim + self.irrelevant_dims
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MdpKind {
    Discrete(DiscreteSpec),
    Continuous(ContinuousSpec),
}

/// Validated, immutable configuration of one environment instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ToyEnvSpec {
    pub seed: u64,
    pub seed_from_entropy: bool,
    pub horizon: u64,
    pub sequence_length: usize,
    pub reward: RewardTransforms,
    pub term_state_reward: f64,
    pub kind: MdpKind,
}

impl ToyEnvSpec {
    pub fn is_discrete(&self) -> bool {
        matches!(self.kind, MdpKind::Discrete(_))
    }
}

fn reject_set<T>(field: &Option<T>, name: &str, space: &str) -> Result<()> {
    if field.is_some() {
        return Err(PlaygroundError::config(format!(
            "{} is not valid for {} state spaces",
            name, space
        )));
    }
    Ok(())
}

fn require(cond: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(PlaygroundError::config(msg()))
    }
}

fn positive_finite(value: f64, name: &str) -> Result<f64> {
    require(value.is_finite() && value > 0.0, || {
        format!("{} must be a positive finite number, got {}", name, value)
    })?;
    Ok(value)
}

impl ToyEnvConfig {
    /// Defaults for a discrete environment with every discrete-only key filled in.
    pub fn discrete_defaults() -> Self {
        Self {
            action_space_size: Some(DEFAULT_ACTION_SPACE_SIZE),
            terminal_state_density: Some(0.0),
            completely_connected: Some(false),
            image_representations: Some(false),
            shuffle_representations: Some(false),
            ..Default::default()
        }
    }

    /// Defaults for a continuous environment with every continuous-only key filled in.
    pub fn continuous_defaults() -> Self {
        Self {
            state_space_type: SpaceType::Continuous,
            state_space_dim: Some(DEFAULT_STATE_SPACE_DIM),
            action_space_dim: Some(DEFAULT_STATE_SPACE_DIM),
            transition_dynamics_order: Some(DEFAULT_TRANSITION_DYNAMICS_ORDER),
            inertia: Some(DEFAULT_INERTIA),
            time_unit: Some(DEFAULT_TIME_UNIT),
            state_space_max: Some(DEFAULT_SPACE_MAX),
            action_space_max: Some(DEFAULT_SPACE_MAX),
            reward_function: Some(RewardFunction::MoveToAPoint),
            target_point: Some(vec![0.0; DEFAULT_STATE_SPACE_DIM]),
            target_radius: Some(DEFAULT_TARGET_RADIUS),
            terminal_states: Some(Vec::new()),
            term_state_edge: Some(DEFAULT_TERM_STATE_EDGE),
            action_loss_weight: Some(0.0),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PlaygroundError::config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PlaygroundError::config(e.to_string()))
    }

    fn reward_transforms(&self) -> RewardTransforms {
        RewardTransforms {
            scale: self.reward_scale,
            shift: self.reward_shift,
            noise: self.reward_noise.clone(),
            density: self.reward_density,
            make_denser: self.make_denser,
            delay: self.delay,
        }
    }

    /// Validate every field and resolve defaults.
    pub fn validate(&self) -> Result<ToyEnvSpec> {
        require(self.horizon >= 1, || "horizon must be at least 1".into())?;
        require(self.sequence_length >= 1, || {
            "sequence_length must be at least 1".into()
        })?;
        require(self.term_state_reward.is_finite(), || {
            "term_state_reward must be finite".into()
        })?;
        let reward = self.reward_transforms();
        RewardPipeline::new(reward.clone())?;

        let (seed, seed_from_entropy) = match self.seed {
            Some(seed) => (seed, false),
            None if self.strict_determinism => {
                return Err(PlaygroundError::config(
                    "strict_determinism requires an explicit seed",
                ))
            }
            None => (RandomStreams::entropy_seed(), true),
        };

        let kind = match self.state_space_type {
            SpaceType::Discrete => MdpKind::Discrete(self.validate_discrete()?),
            SpaceType::Continuous => MdpKind::Continuous(self.validate_continuous()?),
        };

        Ok(ToyEnvSpec {
            seed,
            seed_from_entropy,
            horizon: self.horizon,
            sequence_length: self.sequence_length,
            reward,
            term_state_reward: self.term_state_reward,
            kind,
        })
    }

    fn validate_discrete(&self) -> Result<DiscreteSpec> {
        const SPACE: &str = "discrete";
        reject_set(&self.state_space_dim, "state_space_dim", SPACE)?;
        reject_set(&self.action_space_dim, "action_space_dim", SPACE)?;
        reject_set(&self.transition_dynamics_order, "transition_dynamics_order", SPACE)?;
        reject_set(&self.inertia, "inertia", SPACE)?;
        reject_set(&self.time_unit, "time_unit", SPACE)?;
        reject_set(&self.state_space_max, "state_space_max", SPACE)?;
        reject_set(&self.action_space_max, "action_space_max", SPACE)?;
        reject_set(&self.reward_function, "reward_function", SPACE)?;
        reject_set(&self.target_point, "target_point", SPACE)?;
        reject_set(&self.target_radius, "target_radius", SPACE)?;
        reject_set(&self.terminal_states, "terminal_states", SPACE)?;
        reject_set(&self.term_state_edge, "term_state_edge", SPACE)?;
        reject_set(&self.action_loss_weight, "action_loss_weight", SPACE)?;

        let action_space_size = self.action_space_size.unwrap_or(DEFAULT_ACTION_SPACE_SIZE);
        require(action_space_size >= 1, || {
            "action_space_size must be at least 1".into()
        })?;
        let min_states = self
            .sequence_length
            .checked_add(self.delay)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                PlaygroundError::config(
                    "sequence_length + delay overflows the derived state_space_size",
                )
            })?;
        let derived = action_space_size.max(min_states).max(2);
        let state_space_size = self.state_space_size.unwrap_or(derived);
        require(state_space_size >= 1, || {
            "state_space_size must be at least 1".into()
        })?;

        let density = self.terminal_state_density.unwrap_or(0.0);
        require((0.0..=1.0).contains(&density), || {
            format!("terminal_state_density must be in [0, 1], got {}", density)
        })?;
        let num_terminal_states = if density == 0.0 {
            0
        } else {
            ((density * state_space_size as f64).floor() as usize).max(1)
        };
        require(num_terminal_states < state_space_size, || {
            format!(
                "terminal_state_density {} leaves no non-terminal state out of {}",
                density, state_space_size
            )
        })?;

        let completely_connected = self.completely_connected.unwrap_or(false);
        require(!completely_connected || action_space_size <= state_space_size, || {
            format!(
                "completely_connected needs action_space_size ({}) <= state_space_size ({})",
                action_space_size, state_space_size
            )
        })?;

        let length = u32::try_from(self.sequence_length).map_err(|_| {
            PlaygroundError::config(format!(
                "sequence_length {} is too large",
                self.sequence_length
            ))
        })?;
        let entries = (state_space_size as u128 * action_space_size as u128)
            .checked_pow(length)
            .unwrap_or(u128::MAX);
        require(entries <= MAX_REWARD_TABLE_ENTRIES, || {
            format!(
                "reward table of (S*A)^L = ({}*{})^{} entries exceeds {}",
                state_space_size,
                action_space_size,
                self.sequence_length,
                MAX_REWARD_TABLE_ENTRIES
            )
        })?;

        let transition_noise = match &self.transition_noise {
            Some(noise) => noise.probability()?,
            None => 0.0,
        };

        let irrelevant = match &self.irrelevant_features {
            None => None,
            Some(irr) => {
                reject_set(&irr.dims, "irrelevant_features.dims", SPACE)?;
                reject_set(&irr.penalty, "irrelevant_features.penalty", SPACE)?;
                let states = irr.state_space_size.ok_or_else(|| {
                    PlaygroundError::config("irrelevant_features.state_space_size is required")
                })?;
                let actions = irr.action_space_size.unwrap_or(states);
                require(states >= 1 && actions >= 1, || {
                    "irrelevant_features sizes must be at least 1".into()
                })?;
                require(
                    states as u128 * actions as u128 <= MAX_TRANSITION_TABLE_ENTRIES,
                    || {
                        format!(
                            "irrelevant transition table of {}*{} entries exceeds {}",
                            states, actions, MAX_TRANSITION_TABLE_ENTRIES
                        )
                    },
                )?;
                Some((states, actions))
            }
        };

        let image = if self.image_representations.unwrap_or(false) {
            let width = self.image_width.unwrap_or(DEFAULT_IMAGE_SIZE);
            let height = self.image_height.unwrap_or(DEFAULT_IMAGE_SIZE);
            require((4..=1024).contains(&width) && (4..=1024).contains(&height), || {
                format!("image size {}x{} must be within 4..=1024", width, height)
            })?;
            let shift_quantum = self.image_shift_quantum.unwrap_or(1);
            require(shift_quantum >= 1, || "image_shift_quantum must be at least 1".into())?;
            let rotation_quantum = positive_finite(
                self.image_rotation_quantum.unwrap_or(1.0),
                "image_rotation_quantum",
            )?;
            let scale_range = self.image_scale_range.unwrap_or(DEFAULT_IMAGE_SCALE_RANGE);
            require(
                scale_range.0 > 0.0 && scale_range.0 <= scale_range.1 && scale_range.1.is_finite(),
                || format!("image_scale_range {:?} must satisfy 0 < low <= high", scale_range),
            )?;
            Some(ImageSpec {
                width,
                height,
                transforms: self.image_transforms.clone().unwrap_or_default(),
                shift_quantum,
                rotation_quantum,
                scale_range,
            })
        } else {
            for (set, name) in [
                (self.image_width.is_some(), "image_width"),
                (self.image_height.is_some(), "image_height"),
                (self.image_transforms.is_some(), "image_transforms"),
                (self.image_shift_quantum.is_some(), "image_shift_quantum"),
                (self.image_rotation_quantum.is_some(), "image_rotation_quantum"),
                (self.image_scale_range.is_some(), "image_scale_range"),
            ] {
                require(!set, || format!("{} requires image_representations", name))?;
            }
            None
        };

        Ok(DiscreteSpec {
            state_space_size,
            action_space_size,
            num_terminal_states,
            completely_connected,
            transition_noise,
            irrelevant,
            image,
            shuffle_representations: self.shuffle_representations.unwrap_or(false),
        })
    }

    fn validate_continuous(&self) -> Result<ContinuousSpec> {
        const SPACE: &str = "continuous";
        reject_set(&self.state_space_size, "state_space_size", SPACE)?;
        reject_set(&self.action_space_size, "action_space_size", SPACE)?;
        reject_set(&self.terminal_state_density, "terminal_state_density", SPACE)?;
        reject_set(&self.completely_connected, "completely_connected", SPACE)?;
        reject_set(&self.image_representations, "image_representations", SPACE)?;
        reject_set(&self.image_width, "image_width", SPACE)?;
        reject_set(&self.image_height, "image_height", SPACE)?;
        reject_set(&self.image_transforms, "image_transforms", SPACE)?;
        reject_set(&self.image_shift_quantum, "image_shift_quantum", SPACE)?;
        reject_set(&self.image_rotation_quantum, "image_rotation_quantum", SPACE)?;
        reject_set(&self.image_scale_range, "image_scale_range", SPACE)?;
        reject_set(&self.shuffle_representations, "shuffle_representations", SPACE)?;

        let dim = self.state_space_dim.unwrap_or(DEFAULT_STATE_SPACE_DIM);
        require(dim >= 1, || "state_space_dim must be at least 1".into())?;
        if let Some(action_dim) = self.action_space_dim {
            require(action_dim == dim, || {
                format!(
                    "action_space_dim ({}) must equal state_space_dim ({})",
                    action_dim, dim
                )
            })?;
        }
        let order = self
            .transition_dynamics_order
            .unwrap_or(DEFAULT_TRANSITION_DYNAMICS_ORDER);
        require(order >= 1, || "transition_dynamics_order must be at least 1".into())?;

        let inertia = positive_finite(self.inertia.unwrap_or(DEFAULT_INERTIA), "inertia")?;
        let time_unit = positive_finite(self.time_unit.unwrap_or(DEFAULT_TIME_UNIT), "time_unit")?;
        let state_space_max = positive_finite(
            self.state_space_max.unwrap_or(DEFAULT_SPACE_MAX),
            "state_space_max",
        )?;
        let action_space_max = positive_finite(
            self.action_space_max.unwrap_or(DEFAULT_SPACE_MAX),
            "action_space_max",
        )?;
        let target_radius = positive_finite(
            self.target_radius.unwrap_or(DEFAULT_TARGET_RADIUS),
            "target_radius",
        )?;
        let term_state_edge = positive_finite(
            self.term_state_edge.unwrap_or(DEFAULT_TERM_STATE_EDGE),
            "term_state_edge",
        )?;
        let action_loss_weight = self.action_loss_weight.unwrap_or(0.0);
        require(action_loss_weight.is_finite() && action_loss_weight >= 0.0, || {
            format!("action_loss_weight must be >= 0, got {}", action_loss_weight)
        })?;

        let reward_function = self.reward_function.unwrap_or_default();
        match reward_function {
            RewardFunction::MoveToAPoint => require(self.sequence_length == 1, || {
                "move_to_a_point needs sequence_length = 1".into()
            })?,
            RewardFunction::MoveAlongALine => require(self.sequence_length >= 2, || {
                "move_along_a_line needs sequence_length >= 2".into()
            })?,
        }

        let target_point = self.target_point.clone().unwrap_or_else(|| vec![0.0; dim]);
        require(target_point.len() == dim, || {
            format!(
                "target_point has {} components, expected {}",
                target_point.len(),
                dim
            )
        })?;
        require(target_point.iter().all(|x| x.is_finite()), || {
            "target_point must be finite".into()
        })?;

        let terminal_states = self.terminal_states.clone().unwrap_or_default();
        for centre in &terminal_states {
            require(centre.len() == dim && centre.iter().all(|x| x.is_finite()), || {
                format!("terminal state centre {:?} must have {} finite components", centre, dim)
            })?;
        }

        let transition_noise = match &self.transition_noise {
            Some(noise) => Some(noise.additive()?),
            None => None,
        };

        let (irrelevant_dims, irrelevant_penalty) = match &self.irrelevant_features {
            None => (0, 0.0),
            Some(irr) => {
                reject_set(&irr.state_space_size, "irrelevant_features.state_space_size", SPACE)?;
                reject_set(&irr.action_space_size, "irrelevant_features.action_space_size", SPACE)?;
                let dims = irr.dims.ok_or_else(|| {
                    PlaygroundError::config("irrelevant_features.dims is required")
                })?;
                let penalty = irr.penalty.unwrap_or(0.0);
                require(penalty.is_finite() && penalty >= 0.0, || {
                    format!("irrelevant_features.penalty must be >= 0, got {}", penalty)
                })?;
                (dims, penalty)
            }
        };
        let entries = (order as u128 + 1) * (dim as u128 + irrelevant_dims as u128);
        require(entries <= MAX_CONTINUOUS_STATE_ENTRIES, || {
            format!(
                "continuous state of order {} over {} dimensions exceeds {} entries",
                order,
                dim as u128 + irrelevant_dims as u128,
                MAX_CONTINUOUS_STATE_ENTRIES
            )
        })?;

        Ok(ContinuousSpec {
            state_space_dim: dim,
            transition_dynamics_order: order,
            inertia,
            time_unit,
            state_space_max,
            action_space_max,
            reward_function,
            target_point,
            target_radius,
            terminal_states,
            term_state_edge,
            action_loss_weight,
            transition_noise,
            irrelevant_dims,
            irrelevant_penalty,
        })
    }
}
