//! Episode lifecycle and terminal conditions.

use mdp_playground::{PlaygroundError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodePhase {
    Active,
    Done,
}

/// Tracks the step counter and the ACTIVE/DONE phase of the current episode.
///
/// A fresh controller is `Done`: stepping before the first reset fails.
#[derive(Clone, Debug)]
pub struct TerminalController {
    horizon: u64,
    steps: u64,
    phase: EpisodePhase,
}

impl TerminalController {
    pub fn new(horizon: u64) -> Self {
        Self {
            horizon,
            steps: 0,
            phase: EpisodePhase::Done,
        }
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn ensure_active(&self) -> Result<()> {
        match self.phase {
            EpisodePhase::Active => Ok(()),
            EpisodePhase::Done => Err(PlaygroundError::EpisodeExhausted),
        }
    }

    pub fn begin_episode(&mut self) {
        self.steps = 0;
        self.phase = EpisodePhase::Active;
    }

    /// Count one step and decide `(terminated, truncated)`.
    ///
    /// Truncation is only reported when the step did not also terminate.
    pub fn evaluate(&mut self, reached_terminal: bool) -> (bool, bool) {
        self.steps += 1;
        let terminated = reached_terminal;
        let truncated = !terminated && self.steps >= self.horizon;
        if terminated || truncated {
            self.phase = EpisodePhase::Done;
        }
        (terminated, truncated)
    }
}

/// Axis-aligned terminal hypercubes of a continuous task.
#[derive(Clone, Debug, Default)]
pub struct TerminalRegions {
    centres: Vec<Vec<f64>>,
    half_edge: f64,
}

impl TerminalRegions {
    pub fn new(centres: Vec<Vec<f64>>, edge: f64) -> Self {
        Self {
            centres,
            half_edge: edge / 2.0,
        }
    }

    /// `position` may carry trailing irrelevant dimensions; only the leading
    /// ones are compared.
    pub fn contains(&self, position: &[f64]) -> bool {
        self.centres.iter().any(|centre| {
            centre
                .iter()
                .zip(position.iter())
                .all(|(c, x)| (x - c).abs() <= self.half_edge)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_before_reset_is_exhausted() {
        let controller = TerminalController::new(3);
        assert!(matches!(
            controller.ensure_active(),
            Err(PlaygroundError::EpisodeExhausted)
        ));
    }

    #[test]
    fn test_truncates_at_horizon() {
        let mut controller = TerminalController::new(3);
        controller.begin_episode();
        assert_eq!(controller.evaluate(false), (false, false));
        assert_eq!(controller.evaluate(false), (false, false));
        assert_eq!(controller.evaluate(false), (false, true));
        assert_eq!(controller.phase(), EpisodePhase::Done);
        assert!(controller.ensure_active().is_err());

        controller.begin_episode();
        assert!(controller.ensure_active().is_ok());
        assert_eq!(controller.steps(), 0);
    }

    #[test]
    fn test_termination_wins_over_truncation() {
        let mut controller = TerminalController::new(1);
        controller.begin_episode();
        assert_eq!(controller.evaluate(true), (true, false));
    }

    #[test]
    fn test_terminal_regions() {
        let regions = TerminalRegions::new(vec![vec![0.5, 0.5]], 0.2);
        assert!(regions.contains(&[0.45, 0.59, 100.0]));
        assert!(!regions.contains(&[0.45, 0.61]));
        assert!(!TerminalRegions::default().contains(&[0.0, 0.0]));
    }
}
