//! Toy environment generator.
//!
//! Builds discrete or continuous MDPs from a declarative `ToyEnvConfig`:
//! - `config` - keys, defaults and validation into a `ToyEnvSpec`
//! - `space_builder` - observation/action spaces, relabeling, action decoding
//! - `image` - polygon rendering of discrete states
//! - `transition` - seeded transition tables and continuous dynamics
//! - `reward` - sequence reward tables and continuous task costs
//! - `terminal` - episode lifecycle and terminal conditions
//! - `toy_env` - the `ToyEnv` facade implementing `Env`

pub mod config;
pub mod image;
pub mod reward;
pub mod space_builder;
pub mod terminal;
pub mod transition;
mod toy_env;

pub use config::{
    ImageTransform, IrrelevantFeatures, RewardFunction, SpaceType, ToyEnvConfig, ToyEnvSpec,
};
pub use toy_env::{AugmentedState, ToyEnv, MAX_INITIAL_STATE_ATTEMPTS};
