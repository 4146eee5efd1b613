//! Observation and action space types.
//!
//! Provides Gymnasium-compatible space definitions. Every space also knows how
//! to decode the flat `ArrayD<f32>` actions that cross the `Env` boundary.

mod r#box;
mod discrete;
mod multi_discrete;

pub use discrete::Discrete;
pub use multi_discrete::MultiDiscrete;
pub use r#box::Box;

use ndarray::{Array1, ArrayD};
use rand::Rng;

/// A set of observations or actions with its native sample type.
pub trait Space: Clone + Send + Sync {
    type Sample;

    /// Uniform draw; which stream `rng` is decides reproducibility.
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    fn contains(&self, value: &Self::Sample) -> bool;

    /// Shape of the encoded `ArrayD<f32>` form.
    fn shape(&self) -> &[usize];
}

/// Type-erased space as exposed by `Env::observation_space`/`action_space`.
#[derive(Clone, Debug, PartialEq)]
pub enum DynSpace {
    Discrete(Discrete),
    MultiDiscrete(MultiDiscrete),
    Box(Box),
}

impl DynSpace {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            DynSpace::Discrete(s) => s.shape().to_vec(),
            DynSpace::MultiDiscrete(s) => s.shape().to_vec(),
            DynSpace::Box(s) => s.shape().to_vec(),
        }
    }

    /// Short semantic type name ("discrete", "multi_discrete", "box")
    pub fn kind(&self) -> &'static str {
        match self {
            DynSpace::Discrete(_) => "discrete",
            DynSpace::MultiDiscrete(_) => "multi_discrete",
            DynSpace::Box(_) => "box",
        }
    }

    /// Sample from this space, encoded the way actions and observations
    /// cross the `Env` boundary.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ArrayD<f32> {
        match self {
            DynSpace::Discrete(s) => Array1::from(vec![s.sample(rng) as f32]).into_dyn(),
            DynSpace::MultiDiscrete(s) => {
                let v: Vec<f32> = s.sample(rng).into_iter().map(|x| x as f32).collect();
                Array1::from(v).into_dyn()
            }
            DynSpace::Box(s) => s.sample(rng),
        }
    }

    /// Whether `value` is a valid encoded member. Discrete ids must be
    /// integral after rounding and in range.
    pub fn contains(&self, value: &ArrayD<f32>) -> bool {
        match self {
            DynSpace::Discrete(s) => s.decode(value).is_ok(),
            DynSpace::MultiDiscrete(s) => s.decode(value).is_ok(),
            DynSpace::Box(s) => s.contains(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_dyn_space_sample_is_contained() {
        let spaces = [
            DynSpace::Discrete(Discrete::new(5)),
            DynSpace::MultiDiscrete(MultiDiscrete::new(vec![3, 4])),
            DynSpace::Box(Box::symmetric(&[3])),
        ];
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);

        for space in &spaces {
            for _ in 0..50 {
                let sample = space.sample(&mut rng);
                assert!(space.contains(&sample), "{} sample escaped", space.kind());
                assert_eq!(sample.shape(), space.shape().as_slice());
            }
        }
    }
}
