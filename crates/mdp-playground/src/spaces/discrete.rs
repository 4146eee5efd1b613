//! Finite set of ids: toy-environment states and actions.

use super::Space;
use crate::{PlaygroundError, Result};
use ndarray::ArrayD;
use rand::Rng;

/// Ids `0..n`, encoded as a one-element array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    pub n: usize,
    shape: Vec<usize>,
}

impl Discrete {
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "Discrete space must have at least 1 element");
        Self { n, shape: vec![1] }
    }

    /// Decode a single encoded index.
    ///
    /// Values are rounded to the nearest integer; anything outside `0..n`
    /// (including non-finite values) is an `ActionDomain` error.
    pub fn index_of(&self, value: f32) -> Result<usize> {
        if !value.is_finite() {
            return Err(PlaygroundError::ActionDomain {
                action: i64::MIN,
                n: self.n,
            });
        }
        let rounded = value.round() as i64;
        if rounded < 0 || rounded as usize >= self.n {
            return Err(PlaygroundError::ActionDomain {
                action: rounded,
                n: self.n,
            });
        }
        Ok(rounded as usize)
    }

    /// Decode a one-element array into an index.
    pub fn decode(&self, value: &ArrayD<f32>) -> Result<usize> {
        match value.iter().next() {
            Some(&v) if value.len() == 1 => self.index_of(v),
            _ => Err(PlaygroundError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: value.shape().to_vec(),
            }),
        }
    }
}

impl Space for Discrete {
    type Sample = usize;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        rng.gen_range(0..self.n)
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        *value < self.n
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;
    use rand::SeedableRng;

    #[test]
    fn test_samples_cover_every_id() {
        let space = Discrete::new(4);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[space.sample(&mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert!(!space.contains(&4));
    }

    #[test]
    fn test_index_rounds_to_nearest() {
        let space = Discrete::new(5);
        assert_eq!(space.index_of(1.4).unwrap(), 1);
        assert_eq!(space.index_of(3.6).unwrap(), 4);
    }

    #[test]
    fn test_discrete_decode_rejects_out_of_range() {
        let space = Discrete::new(3);
        assert_eq!(space.index_of(2.0).unwrap(), 2);
        assert!(matches!(
            space.index_of(3.0),
            Err(PlaygroundError::ActionDomain { action: 3, n: 3 })
        ));
        assert!(matches!(
            space.index_of(-1.0),
            Err(PlaygroundError::ActionDomain { action: -1, n: 3 })
        ));
        assert!(space.index_of(f32::NAN).is_err());
    }

    #[test]
    fn test_discrete_decode_shape() {
        let space = Discrete::new(3);
        let ok = ArrayD::from_elem(IxDyn(&[1]), 1.0);
        let wide = ArrayD::from_elem(IxDyn(&[2]), 1.0);
        assert_eq!(space.decode(&ok).unwrap(), 1);
        assert!(matches!(
            space.decode(&wide),
            Err(PlaygroundError::ShapeMismatch { .. })
        ));
    }
}
