//! Reward engine: base rewards before the difficulty pipeline.

use crate::config::RewardFunction;
use rand::Rng;
use std::collections::VecDeque;

/// Base reward for every window of `length` trailing (state, action) pairs.
///
/// Entries are drawn uniformly from (0, 1] at construction. The window index
/// is the mixed-radix number of its pairs, oldest pair most significant.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceRewardTable {
    num_states: usize,
    num_actions: usize,
    length: usize,
    values: Vec<f64>,
}

impl SequenceRewardTable {
    pub fn generate<R: Rng + ?Sized>(
        num_states: usize,
        num_actions: usize,
        length: usize,
        rng: &mut R,
    ) -> Self {
        let size = (num_states * num_actions).pow(length as u32);
        let values = (0..size).map(|_| 1.0 - rng.gen::<f64>()).collect();
        Self {
            num_states,
            num_actions,
            length,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sequence_length(&self) -> usize {
        self.length
    }

    fn index(&self, window: impl Iterator<Item = (usize, usize)>) -> usize {
        let radix = self.num_states * self.num_actions;
        window.fold(0, |idx, (s, a)| idx * radix + s * self.num_actions + a)
    }

    /// Base reward of the trailing window; 0 until `length` pairs exist.
    pub fn reward(&self, window: &VecDeque<(usize, usize)>) -> f64 {
        if window.len() < self.length {
            return 0.0;
        }
        let skip = window.len() - self.length;
        self.values[self.index(window.iter().skip(skip).copied())]
    }
}

/// Instantaneous-cost reward of continuous tasks, already scaled by `time_unit`.
#[derive(Clone, Debug)]
pub struct ContinuousReward {
    pub function: RewardFunction,
    pub target: Vec<f64>,
    pub relevant_dim: usize,
    pub penalty: f64,
    pub action_loss_weight: f64,
    pub time_unit: f64,
    pub line_length: usize,
}

fn norm(xs: impl Iterator<Item = f64>) -> f64 {
    xs.map(|x| x * x).sum::<f64>().sqrt()
}

impl ContinuousReward {
    pub fn distance_to_target(&self, position: &[f64]) -> f64 {
        norm(
            position[..self.relevant_dim]
                .iter()
                .zip(self.target.iter())
                .map(|(x, t)| x - t),
        )
    }

    /// `positions` holds the trailing relevant positions, newest last.
    pub fn reward(&self, positions: &VecDeque<Vec<f64>>, position: &[f64], action: &[f64]) -> f64 {
        let task_cost = match self.function {
            RewardFunction::MoveToAPoint => self.distance_to_target(position),
            RewardFunction::MoveAlongALine => {
                if positions.len() < self.line_length {
                    return 0.0;
                }
                let skip = positions.len() - self.line_length;
                let window: Vec<&Vec<f64>> = positions.iter().skip(skip).collect();
                mean_distance_from_principal_axis(&window)
            }
        };
        let distractor: f64 = position[self.relevant_dim..].iter().map(|x| x.abs()).sum();
        let effort = norm(action.iter().copied());
        let cost = task_cost + self.penalty * distractor + self.action_loss_weight * effort;
        -cost * self.time_unit
    }
}

/// Mean orthogonal distance of `points` from their best-fit line.
///
/// The line runs through the centroid along the principal axis, found by
/// power iteration on the scatter matrix.
pub fn mean_distance_from_principal_axis(points: &[&Vec<f64>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let dim = points[0].len();
    let mut mean = vec![0.0; dim];
    for p in points {
        for (m, x) in mean.iter_mut().zip(p.iter()) {
            *m += x / n as f64;
        }
    }
    let centred: Vec<Vec<f64>> = points
        .iter()
        .map(|p| p.iter().zip(mean.iter()).map(|(x, m)| x - m).collect())
        .collect();

    let mut scatter = vec![vec![0.0; dim]; dim];
    for c in &centred {
        for i in 0..dim {
            for j in 0..dim {
                scatter[i][j] += c[i] * c[j];
            }
        }
    }

    // Start from the point farthest from the centroid
    let mut axis = match centred
        .iter()
        .max_by(|a, b| norm(a.iter().copied()).total_cmp(&norm(b.iter().copied())))
    {
        Some(c) => c.clone(),
        None => return 0.0,
    };
    let start_norm = norm(axis.iter().copied());
    if start_norm < 1e-12 {
        return 0.0;
    }
    axis.iter_mut().for_each(|x| *x /= start_norm);

    for _ in 0..100 {
        let next: Vec<f64> = (0..dim)
            .map(|i| (0..dim).map(|j| scatter[i][j] * axis[j]).sum())
            .collect();
        let len = norm(next.iter().copied());
        if len < 1e-12 {
            break;
        }
        axis = next.into_iter().map(|x| x / len).collect();
    }

    centred
        .iter()
        .map(|c| {
            let along: f64 = c.iter().zip(axis.iter()).map(|(x, u)| x * u).sum();
            norm(c.iter().zip(axis.iter()).map(|(x, u)| x - along * u))
        })
        .sum::<f64>()
        / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_table_values_in_unit_interval() {
        let table = SequenceRewardTable::generate(5, 3, 2, &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(table.len(), 225);
        assert!(table.values.iter().all(|&v| v > 0.0 && v <= 1.0));
    }

    #[test]
    fn test_short_window_gives_zero() {
        let table = SequenceRewardTable::generate(4, 2, 3, &mut ChaCha8Rng::seed_from_u64(0));
        let window: VecDeque<_> = vec![(0, 1), (2, 0)].into();
        assert_eq!(table.reward(&window), 0.0);
    }

    #[test]
    fn test_window_index_uses_trailing_pairs() {
        let table = SequenceRewardTable::generate(3, 2, 2, &mut ChaCha8Rng::seed_from_u64(0));
        let long: VecDeque<_> = vec![(2, 1), (1, 0), (0, 1)].into();
        let short: VecDeque<_> = vec![(1, 0), (0, 1)].into();
        assert_eq!(table.reward(&long), table.reward(&short));
        // (1,0) -> 2, (0,1) -> 1, radix 6
        assert_eq!(table.reward(&short), table.values[2 * 6 + 1]);
    }

    fn point_reward(time_unit: f64) -> ContinuousReward {
        ContinuousReward {
            function: RewardFunction::MoveToAPoint,
            target: vec![0.0, 0.0],
            relevant_dim: 2,
            penalty: 0.5,
            action_loss_weight: 0.0,
            time_unit,
            line_length: 1,
        }
    }

    #[test]
    fn test_move_to_a_point_scales_with_time_unit() {
        let r = point_reward(0.5);
        let position = vec![3.0, 4.0, -2.0];
        let reward = r.reward(&VecDeque::new(), &position, &[0.0, 0.0, 0.0]);
        // (5 + 0.5 * 2) * 0.5
        assert_float_eq!(reward, -3.0, abs <= 1e-12);
    }

    #[test]
    fn test_points_on_a_line_have_zero_distance() {
        let pts = [vec![0.0, 0.0], vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]];
        let refs: Vec<&Vec<f64>> = pts.iter().collect();
        assert_float_eq!(mean_distance_from_principal_axis(&refs), 0.0, abs <= 1e-9);
    }

    #[test]
    fn test_off_line_point_has_positive_distance() {
        let pts = [vec![0.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0], vec![1.0, 1.0]];
        let refs: Vec<&Vec<f64>> = pts.iter().collect();
        assert!(mean_distance_from_principal_axis(&refs) > 0.1);
    }

    #[test]
    fn test_move_along_a_line_waits_for_full_window() {
        let r = ContinuousReward {
            function: RewardFunction::MoveAlongALine,
            line_length: 3,
            ..point_reward(1.0)
        };
        let positions: VecDeque<Vec<f64>> = vec![vec![0.0, 0.0], vec![1.0, 1.0]].into();
        assert_eq!(r.reward(&positions, &[1.0, 1.0], &[0.0, 0.0]), 0.0);
    }
}
