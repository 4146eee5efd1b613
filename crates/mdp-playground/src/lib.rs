//! # MDP Playground
//!
//! Building blocks for environments whose difficulty dimensions can be dialed
//! independently.
//!
//! ## Overview
//!
//! This crate provides:
//! - The `Env` capability trait shared by generated toy environments and
//!   wrapped third-party simulators
//! - Gymnasium-style spaces (`Discrete`, `MultiDiscrete`, `Box`)
//! - Independent seeded random streams, one per difficulty dimension
//! - The difficulty transforms (reward delay, density schedule, noise) and the
//!   `DifficultyWrapper` that injects them into any `Env`
//! - Metric loggers for runners
//!
//! The toy environment generator itself lives in `mdp-playground-envs`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mdp_playground::prelude::*;
//! use mdp_playground_envs::{ToyEnv, ToyEnvConfig};
//!
//! let config = ToyEnvConfig { seed: Some(42), ..Default::default() };
//! let mut env = ToyEnv::new(config)?;
//! let (obs, _) = env.reset(None)?;
//!
//! let action = ArrayD::from_elem(IxDyn(&[1]), 0.0);
//! let result = env.step(&action)?;
//! ```

pub mod difficulty;
pub mod env;
pub mod log;
pub mod rng;
pub mod spaces;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::difficulty::{
        DifficultyConfig, NoiseSpec, RewardPipeline, RewardTransforms, TransitionNoise,
    };
    pub use crate::env::{DifficultyWrapper, Env, EnvInfo, EpisodeStats, StepResult};
    pub use crate::log::{CompositeLogger, ConsoleLogger, MetricLogger, NoOpLogger};
    pub use crate::rng::{RandomStreams, StreamPurpose};
    pub use crate::spaces::*;
    pub use crate::{PlaygroundError, Result};

    pub use ndarray::{ArrayD, IxDyn};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    /// Invalid, missing or contradictory configuration. Raised at construction.
    #[error("Config error: {0}")]
    Config(String),

    /// Discrete action index outside the declared action space.
    #[error("Action {action} outside action space of size {n}")]
    ActionDomain { action: i64, n: usize },

    /// `step` was called on an episode that is not active.
    #[error("Episode exhausted: call reset() before stepping again")]
    EpisodeExhausted,

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaygroundError {
    /// Shorthand used by config validation.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = core::result::Result<T, PlaygroundError>;
