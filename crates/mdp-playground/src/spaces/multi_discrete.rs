//! Product of discrete ranges.

use super::{Discrete, Space};
use crate::{PlaygroundError, Result};
use ndarray::ArrayD;
use rand::Rng;

/// Component `i` ranges over `0..nvec[i]`. Toy environments use it for
/// (relevant, irrelevant) state and action pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiDiscrete {
    pub nvec: Vec<usize>,
    shape: Vec<usize>,
}

impl MultiDiscrete {
    pub fn new(nvec: Vec<usize>) -> Self {
        assert!(!nvec.is_empty(), "MultiDiscrete must have at least 1 dimension");
        assert!(nvec.iter().all(|&n| n > 0), "All dimensions must have at least 1 element");
        let shape = vec![nvec.len()];
        Self { nvec, shape }
    }

    pub fn ndim(&self) -> usize {
        self.nvec.len()
    }

    /// Decode a flat array into one index per dimension.
    pub fn decode(&self, value: &ArrayD<f32>) -> Result<Vec<usize>> {
        if value.len() != self.nvec.len() {
            return Err(PlaygroundError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: value.shape().to_vec(),
            });
        }
        value
            .iter()
            .zip(self.nvec.iter())
            .map(|(&v, &n)| Discrete::new(n).index_of(v))
            .collect()
    }
}

impl Space for MultiDiscrete {
    type Sample = Vec<usize>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.nvec.iter().map(|&n| rng.gen_range(0..n)).collect()
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.len() != self.nvec.len() {
            return false;
        }
        value.iter().zip(self.nvec.iter()).all(|(&v, &n)| v < n)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}
