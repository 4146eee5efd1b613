//! Walkthrough of a small delayed-reward discrete environment.

use mdp_playground::env::Env;
use mdp_playground_envs::{ToyEnv, ToyEnvConfig};
use ndarray::{ArrayD, IxDyn};

fn config() -> ToyEnvConfig {
    ToyEnvConfig {
        seed: Some(42),
        state_space_size: Some(10),
        action_space_size: Some(3),
        delay: 2,
        sequence_length: 1,
        reward_density: 1.0,
        ..Default::default()
    }
}

fn action_zero() -> ArrayD<f32> {
    ArrayD::from_elem(IxDyn(&[1]), 0.0)
}

#[test]
fn test_initial_state_is_fixed_by_seed() {
    let mut a = ToyEnv::new(config()).unwrap();
    let mut b = ToyEnv::new(config()).unwrap();
    let (obs_a, _) = a.reset(None).unwrap();
    let (obs_b, _) = b.reset(None).unwrap();
    assert_eq!(obs_a, obs_b);
    let s0 = obs_a[[0]] as usize;
    assert!(s0 < 10);
}

#[test]
fn test_delayed_rewards_follow_the_table() {
    let mut env = ToyEnv::new(config()).unwrap();
    env.reset(None).unwrap();

    let mut states = vec![env.raw_state()[0] as usize];
    let mut rewards = Vec::new();
    let mut base = Vec::new();
    for _ in 0..3 {
        let result = env.step(&action_zero()).unwrap();
        states.push(result.info.raw_state.as_ref().unwrap()[0] as usize);
        rewards.push(result.reward);
        base.push(result.info.get("base_reward").unwrap());
        if result.done() {
            break;
        }
    }

    assert_eq!(rewards.len(), 3);
    assert_eq!(rewards[0], 0.0);
    assert_eq!(rewards[1], 0.0);
    assert_eq!(rewards[2], base[0]);
    assert!(base[0] > 0.0 && base[0] <= 1.0);

    let table = env.transition_table().unwrap();
    for w in states.windows(2) {
        assert_eq!(table.next_state(w[0], 0), w[1]);
    }
}

#[test]
fn test_trajectory_reproduces_across_instances() {
    let run = || {
        let mut env = ToyEnv::new(config()).unwrap();
        env.reset(None).unwrap();
        (0..3)
            .map(|_| {
                let result = env.step(&action_zero()).unwrap();
                (result.observation[[0]], result.reward)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
