//! Periodic reward-density schedule.
//!
//! For `density > 0` the period is `P = max(1, round(1 / density))`; for
//! `density == 0` nothing is released until the episode ends. Step indices are
//! 1-based within the episode.

use crate::{PlaygroundError, Result};

#[derive(Clone, Debug)]
pub struct RewardSchedule {
    period: Option<u64>,
    make_denser: bool,
    held: f64,
}

impl RewardSchedule {
    pub fn new(density: f64, make_denser: bool) -> Result<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(PlaygroundError::config(format!(
                "reward_density must be in [0, 1], got {}",
                density
            )));
        }
        let period = if density == 0.0 {
            None
        } else {
            Some(((1.0 / density).round() as u64).max(1))
        };
        Ok(Self {
            period,
            make_denser,
            held: 0.0,
        })
    }

    pub fn period(&self) -> Option<u64> {
        self.period
    }

    /// Whether step `t` is a scheduled release step.
    pub fn is_release_step(&self, t: u64) -> bool {
        self.period.map_or(false, |p| t % p == 0)
    }

    /// Feed step `t`'s contribution and return the amount released now.
    pub fn release(&mut self, t: u64, contribution: f64, episode_end: bool) -> f64 {
        if self.make_denser {
            return contribution;
        }
        self.held += contribution;
        if self.is_release_step(t) || episode_end {
            std::mem::take(&mut self.held)
        } else {
            0.0
        }
    }

    /// Contribution accrued but not yet released.
    pub fn held(&self) -> f64 {
        self.held
    }

    pub fn reset(&mut self) {
        self.held = 0.0;
    }
}
