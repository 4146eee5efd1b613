//! Bounded real-valued space: continuous states and actions, image frames.

use super::Space;
use crate::{PlaygroundError, Result};
use ndarray::{Array1, ArrayD, IxDyn};
use rand::Rng;

/// Per-element bounds `low[i] <= x[i] <= high[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Box {
    pub low: ArrayD<f32>,
    pub high: ArrayD<f32>,
    shape: Vec<usize>,
}

impl Box {
    /// Same bounds for every element.
    pub fn uniform(shape: &[usize], low: f32, high: f32) -> Self {
        Self {
            low: ArrayD::from_elem(IxDyn(shape), low),
            high: ArrayD::from_elem(IxDyn(shape), high),
            shape: shape.to_vec(),
        }
    }

    /// Pixel range `[0, 1]`.
    pub fn unit(shape: &[usize]) -> Self {
        Self::uniform(shape, 0.0, 1.0)
    }

    pub fn symmetric(shape: &[usize]) -> Self {
        Self::uniform(shape, -1.0, 1.0)
    }

    /// Decode a flat action vector, clipping each element into the bounds.
    ///
    /// Wrong length is a `ShapeMismatch`, non-finite elements are rejected.
    /// Returns the clipped vector and whether any element had to be clipped.
    pub fn clip_decode(&self, value: &ArrayD<f32>) -> Result<(Array1<f64>, bool)> {
        if value.len() != self.low.len() {
            return Err(PlaygroundError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: value.shape().to_vec(),
            });
        }
        if let Some(bad) = value.iter().find(|v| !v.is_finite()) {
            return Err(PlaygroundError::InvalidAction(format!(
                "non-finite action component {}",
                bad
            )));
        }
        let mut clipped = false;
        let out: Array1<f64> = value
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(&v, (&l, &h))| {
                let c = v.max(l).min(h);
                clipped |= c != v;
                c as f64
            })
            .collect();
        Ok((out, clipped))
    }
}

impl Space for Box {
    type Sample = ArrayD<f32>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        ndarray::Zip::from(&self.low)
            .and(&self.high)
            .map_collect(|&l, &h| {
                if l < h && l.is_finite() && h.is_finite() {
                    rng.gen_range(l..h)
                } else {
                    l.max(0.0).min(h)
                }
            })
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.shape() == self.shape.as_slice()
            && ndarray::Zip::from(value)
                .and(&self.low)
                .and(&self.high)
                .all(|&v, &l, &h| (l..=h).contains(&v))
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_samples_stay_in_bounds() {
        let frame = Box::unit(&[8, 16]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let sample = frame.sample(&mut rng);
            assert_eq!(sample.shape(), &[8, 16]);
            assert!(frame.contains(&sample));
        }
    }

    #[test]
    fn test_degenerate_bounds_sample_the_bound() {
        let pinned = Box::uniform(&[2], 0.5, 0.5);
        let sample = pinned.sample(&mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(sample.iter().copied().collect::<Vec<_>>(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_contains_checks_shape_and_bounds() {
        let space = Box::uniform(&[2], -2.0, 2.0);
        assert!(space.contains(&Array1::from(vec![-2.0f32, 2.0]).into_dyn()));
        assert!(!space.contains(&Array1::from(vec![0.0f32, 2.5]).into_dyn()));
        assert!(!space.contains(&Array1::from(vec![0.0f32, 0.0, 0.0]).into_dyn()));
    }

    #[test]
    fn test_box_clip_decode() {
        let space = Box::symmetric(&[2]);
        let (inside, clipped) = space
            .clip_decode(&Array1::from(vec![0.25f32, -0.5]).into_dyn())
            .unwrap();
        assert!(!clipped);
        assert_eq!(inside.to_vec(), vec![0.25, -0.5]);

        let (outside, clipped) = space
            .clip_decode(&Array1::from(vec![3.0f32, -2.0]).into_dyn())
            .unwrap();
        assert!(clipped);
        assert_eq!(outside.to_vec(), vec![1.0, -1.0]);

        assert!(space
            .clip_decode(&Array1::from(vec![f32::NAN, 0.0]).into_dyn())
            .is_err());
        assert!(matches!(
            space.clip_decode(&Array1::from(vec![0.0f32]).into_dyn()),
            Err(PlaygroundError::ShapeMismatch { .. })
        ));
    }
}
