//! Environment traits and wrappers.
//!
//! Provides the `Env` capability trait implemented by toy environments and
//! wrapped simulators, plus wrappers for episode statistics and difficulty
//! injection.

mod traits;
mod wrappers;

pub use traits::{Env, EnvInfo, StepResult};
pub use wrappers::{DifficultyWrapper, EpisodeStats};
