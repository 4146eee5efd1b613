//! Transition engine.
//!
//! Discrete MDPs use a dense `(state, action) -> next_state` table generated
//! once per instance. Continuous MDPs integrate a stack of derivatives with a
//! Taylor update whose highest derivative is set by the action.

use mdp_playground::difficulty::NoiseSpec;
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::Rng;

/// Dense transition table, row-major over states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionTable {
    num_states: usize,
    num_actions: usize,
    next: Vec<usize>,
}

impl TransitionTable {
    /// Generate a table. The last `num_terminal` states loop back to themselves.
    ///
    /// With `completely_connected` every non-terminal state reaches
    /// `num_actions` distinct successors.
    pub fn generate<R: Rng + ?Sized>(
        num_states: usize,
        num_actions: usize,
        num_terminal: usize,
        completely_connected: bool,
        rng: &mut R,
    ) -> Self {
        let first_terminal = num_states - num_terminal;
        let mut next = Vec::with_capacity(num_states * num_actions);
        for state in 0..num_states {
            if state >= first_terminal {
                next.extend(std::iter::repeat(state).take(num_actions));
            } else if completely_connected {
                next.extend(index::sample(rng, num_states, num_actions).into_iter());
            } else {
                next.extend((0..num_actions).map(|_| rng.gen_range(0..num_states)));
            }
        }
        Self {
            num_states,
            num_actions,
            next,
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn next_state(&self, state: usize, action: usize) -> usize {
        self.next[state * self.num_actions + action]
    }

    pub fn row(&self, state: usize) -> &[usize] {
        let start = state * self.num_actions;
        &self.next[start..start + self.num_actions]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscreteOutcome {
    pub next: usize,
    /// The table successor was replaced by noise
    pub noisy: bool,
}

/// Table lookup plus substitution noise.
#[derive(Clone, Debug)]
pub struct DiscreteTransition {
    table: TransitionTable,
    noise: f64,
}

impl DiscreteTransition {
    pub fn new(table: TransitionTable, noise: f64) -> Self {
        Self { table, noise }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// With probability `noise` the successor is a uniformly random state
    /// different from the table's. `rng` is only consumed when noise is on.
    pub fn step<R: Rng + ?Sized>(
        &self,
        state: usize,
        action: usize,
        rng: &mut R,
    ) -> DiscreteOutcome {
        let intended = self.table.next_state(state, action);
        let n = self.table.num_states;
        if self.noise > 0.0 && n > 1 && rng.gen::<f64>() < self.noise {
            let mut other = rng.gen_range(0..n - 1);
            if other >= intended {
                other += 1;
            }
            tracing::debug!(
                state,
                action,
                intended,
                substituted = other,
                "Injected transition noise"
            );
            return DiscreteOutcome {
                next: other,
                noisy: true,
            };
        }
        DiscreteOutcome {
            next: intended,
            noisy: false,
        }
    }
}

/// Derivative stack of a continuous point mass.
///
/// Row `i` holds the `i`-th time derivative of the position for every
/// dimension (relevant dimensions first, then irrelevant ones).
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousState {
    pub derivatives: Array2<f64>,
}

impl ContinuousState {
    /// At rest at `position`.
    pub fn at_rest(position: Array1<f64>, order: usize) -> Self {
        let mut derivatives = Array2::zeros((order + 1, position.len()));
        derivatives.row_mut(0).assign(&position);
        Self { derivatives }
    }

    pub fn position(&self) -> Array1<f64> {
        self.derivatives.row(0).to_owned()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContinuousOutcome {
    /// Sum of absolute noise added to positions
    pub noise_abs: f64,
    /// Number of dimensions that hit the state bounds
    pub clipped_dims: usize,
}

#[derive(Clone, Debug)]
pub struct ContinuousDynamics {
    relevant_dim: usize,
    order: usize,
    inertia: f64,
    state_max: f64,
    noise: Option<NoiseSpec>,
    /// `time_unit^j / j!` for j = 0..=order
    taylor: Vec<f64>,
}

impl ContinuousDynamics {
    pub fn new(
        relevant_dim: usize,
        order: usize,
        inertia: f64,
        time_unit: f64,
        state_max: f64,
        noise: Option<NoiseSpec>,
    ) -> Self {
        let mut taylor = Vec::with_capacity(order + 1);
        let mut coeff = 1.0;
        taylor.push(coeff);
        for j in 1..=order {
            coeff *= time_unit / j as f64;
            taylor.push(coeff);
        }
        Self {
            relevant_dim,
            order,
            inertia,
            state_max,
            noise,
            taylor,
        }
    }

    /// Advance `state` by one step under `action`.
    ///
    /// Noise on relevant dimensions comes from `transition_rng`, noise on
    /// irrelevant dimensions from `irrelevant_rng`.
    pub fn step<R1, R2>(
        &self,
        state: &mut ContinuousState,
        action: &Array1<f64>,
        transition_rng: &mut R1,
        irrelevant_rng: &mut R2,
    ) -> ContinuousOutcome
    where
        R1: Rng + ?Sized,
        R2: Rng + ?Sized,
    {
        let d = &mut state.derivatives;
        let order = self.order;
        d.row_mut(order).assign(&(action / self.inertia));

        for i in 0..order {
            for j in 0..(order - i) {
                let higher = d.row(i + j + 1).to_owned();
                d.row_mut(i).scaled_add(self.taylor[j + 1], &higher);
            }
        }

        let mut outcome = ContinuousOutcome::default();
        if let Some(spec) = &self.noise {
            for (k, x) in d.row_mut(0).iter_mut().enumerate() {
                let n = if k < self.relevant_dim {
                    spec.sample(transition_rng)
                } else {
                    spec.sample(irrelevant_rng)
                };
                outcome.noise_abs += n.abs();
                *x += n;
            }
        }

        let dims = d.ncols();
        for k in 0..dims {
            let x = d[[0, k]];
            if x.abs() > self.state_max {
                d[[0, k]] = x.clamp(-self.state_max, self.state_max);
                for i in 1..=order {
                    d[[i, k]] = 0.0;
                }
                outcome.clipped_dims += 1;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_table_is_seeded() {
        let a = TransitionTable::generate(10, 3, 0, false, &mut ChaCha8Rng::seed_from_u64(1));
        let b = TransitionTable::generate(10, 3, 0, false, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a, b);
        assert!((0..10).all(|s| a.row(s).iter().all(|&n| n < 10)));
    }

    #[test]
    fn test_terminal_rows_self_loop() {
        let table = TransitionTable::generate(6, 4, 2, false, &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(table.row(4), &[4, 4, 4, 4]);
        assert_eq!(table.row(5), &[5, 5, 5, 5]);
    }

    #[test]
    fn test_completely_connected_rows_are_distinct() {
        let table = TransitionTable::generate(5, 5, 0, true, &mut ChaCha8Rng::seed_from_u64(3));
        for s in 0..5 {
            let mut row = table.row(s).to_vec();
            row.sort_unstable();
            assert_eq!(row, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_noise_free_transition_skips_rng() {
        let table = TransitionTable::generate(4, 2, 0, false, &mut ChaCha8Rng::seed_from_u64(0));
        let transition = DiscreteTransition::new(table.clone(), 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let before = rng.clone();
        let out = transition.step(1, 1, &mut rng);
        assert_eq!(out.next, table.next_state(1, 1));
        assert!(!out.noisy);
        assert_eq!(rng, before);
    }

    #[test]
    fn test_certain_noise_always_substitutes() {
        let table = TransitionTable::generate(4, 2, 0, false, &mut ChaCha8Rng::seed_from_u64(0));
        let transition = DiscreteTransition::new(table.clone(), 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let out = transition.step(0, 0, &mut rng);
            assert!(out.noisy);
            assert_ne!(out.next, table.next_state(0, 0));
            assert!(out.next < 4);
        }
    }

    #[test]
    fn test_first_order_moves_by_action_times_dt() {
        let dynamics = ContinuousDynamics::new(2, 1, 1.0, 0.1, 1.0, None);
        let mut state = ContinuousState::at_rest(array![0.0, 0.0], 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut irr = ChaCha8Rng::seed_from_u64(1);
        dynamics.step(&mut state, &array![0.5, -1.0], &mut rng, &mut irr);
        assert_float_eq!(state.position()[0], 0.05, abs <= 1e-12);
        assert_float_eq!(state.position()[1], -0.1, abs <= 1e-12);
    }

    #[test]
    fn test_second_order_integrates_velocity() {
        let dynamics = ContinuousDynamics::new(1, 2, 2.0, 1.0, 100.0, None);
        let mut state = ContinuousState::at_rest(array![0.0], 2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut irr = ChaCha8Rng::seed_from_u64(1);

        // acceleration 1.0 after dividing by inertia
        dynamics.step(&mut state, &array![2.0], &mut rng, &mut irr);
        assert_float_eq!(state.derivatives[[0, 0]], 0.5, abs <= 1e-12);
        assert_float_eq!(state.derivatives[[1, 0]], 1.0, abs <= 1e-12);

        dynamics.step(&mut state, &array![2.0], &mut rng, &mut irr);
        assert_float_eq!(state.derivatives[[0, 0]], 2.0, abs <= 1e-12);
        assert_float_eq!(state.derivatives[[1, 0]], 2.0, abs <= 1e-12);
    }

    #[test]
    fn test_clipping_zeroes_higher_derivatives() {
        let dynamics = ContinuousDynamics::new(1, 2, 1.0, 1.0, 1.0, None);
        let mut state = ContinuousState::at_rest(array![0.9], 2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut irr = ChaCha8Rng::seed_from_u64(1);
        let out = dynamics.step(&mut state, &array![1.0], &mut rng, &mut irr);
        assert_eq!(out.clipped_dims, 1);
        assert_eq!(state.derivatives[[0, 0]], 1.0);
        assert_eq!(state.derivatives[[1, 0]], 0.0);
        assert_eq!(state.derivatives[[2, 0]], 0.0);
    }

    #[test]
    fn test_irrelevant_noise_uses_its_own_stream() {
        let dynamics =
            ContinuousDynamics::new(1, 1, 1.0, 1.0, 10.0, Some(NoiseSpec::gaussian(0.1)));
        let mut a = ContinuousState::at_rest(array![0.0, 0.0], 1);
        let mut b = a.clone();
        let mut t1 = ChaCha8Rng::seed_from_u64(0);
        let mut t2 = ChaCha8Rng::seed_from_u64(0);
        dynamics.step(&mut a, &array![0.0, 0.0], &mut t1, &mut ChaCha8Rng::seed_from_u64(1));
        dynamics.step(&mut b, &array![0.0, 0.0], &mut t2, &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(a.derivatives[[0, 0]], b.derivatives[[0, 0]]);
        assert_ne!(a.derivatives[[0, 1]], b.derivatives[[0, 1]]);
    }
}
