//! The `Env` interaction protocol and its step/reset payloads.

use crate::spaces::DynSpace;
use crate::Result;
use ndarray::ArrayD;

/// Side-channel data attached to every reset and step.
#[derive(Clone, Debug, Default)]
pub struct EnvInfo {
    /// Set on the final step by `EpisodeStats`
    pub episode_return: Option<f64>,
    pub episode_length: Option<f64>,
    /// Raw underlying state before any projection to an observation
    pub raw_state: Option<Vec<f64>>,
    /// Diagnostic scalars (noise draws, held reward, ...)
    pub extra: smallvec::SmallVec<[(&'static str, f64); 8]>,
}

impl EnvInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_episode_stats(mut self, ret: f64, len: u32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len as f64);
        self
    }

    pub fn with_raw_state(mut self, state: Vec<f64>) -> Self {
        self.raw_state = Some(state);
        self
    }

    /// Add a diagnostic value, replacing an existing one with the same key
    pub fn with_extra(mut self, key: &'static str, value: f64) -> Self {
        match self.extra.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.extra.push((key, value)),
        }
        self
    }

    /// Look up `episode_return`, `episode_length` or an extra by name.
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length,
            _ => self.extra.iter().find(|(k, _)| *k == key).map(|(_, v)| *v),
        }
    }
}

/// Outcome of one `Env::step`.
#[derive(Clone, Debug)]
pub struct StepResult {
    pub observation: ArrayD<f32>,
    /// Emitted reward after delay, density and noise
    pub reward: f64,
    /// Whether episode terminated (terminal state, target reached)
    pub terminated: bool,
    /// Whether episode truncated (horizon reached)
    pub truncated: bool,
    pub info: EnvInfo,
}

impl StepResult {
    /// The episode is over and `reset` must be called next.
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Capability interface shared by toy environments and wrapped simulators.
///
/// Observations and actions cross the boundary as flat `ArrayD<f32>`; a
/// discrete action is a one-element array holding the index.
///
/// # Example
///
/// ```rust,ignore
/// use mdp_playground::prelude::*;
///
/// struct Coin {
///     heads: bool,
/// }
///
/// impl Env for Coin {
///     fn observation_space(&self) -> DynSpace {
///         DynSpace::Discrete(Discrete::new(2))
///     }
///
///     fn action_space(&self) -> DynSpace {
///         DynSpace::Discrete(Discrete::new(2))
///     }
///
///     fn reset(&mut self, _seed: Option<u64>) -> Result<(ArrayD<f32>, EnvInfo)> {
///         self.heads = true;
///         Ok((ArrayD::from_elem(IxDyn(&[1]), 1.0), EnvInfo::new()))
///     }
///
///     fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
///         let guess = DynSpace::Discrete(Discrete::new(2)).contains(action);
///         Ok(StepResult {
///             observation: ArrayD::from_elem(IxDyn(&[1]), 1.0),
///             reward: if guess { 1.0 } else { 0.0 },
///             terminated: true,
///             truncated: false,
///             info: EnvInfo::new(),
///         })
///     }
///
///     fn seed(&mut self, _seed: u64) {}
/// }
/// ```
pub trait Env: Send {
    fn observation_space(&self) -> DynSpace;

    fn action_space(&self) -> DynSpace;

    /// Start a new episode. `Some(seed)` behaves like `seed(seed)` followed
    /// by `reset(None)`.
    fn reset(&mut self, seed: Option<u64>) -> Result<(ArrayD<f32>, EnvInfo)>;

    /// Advance one step. Fails without mutating any state when the action
    /// is invalid or the episode is not active.
    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult>;

    /// Re-derive the per-episode random streams from `seed`
    fn seed(&mut self, seed: u64);

    /// Text snapshot of the current state.
    fn render(&self) -> Option<String> {
        None
    }

    fn close(&mut self) {}

    /// Whether `step` would fail with `EpisodeExhausted`.
    fn is_done(&self) -> bool {
        false
    }
}
