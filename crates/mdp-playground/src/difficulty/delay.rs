use std::collections::VecDeque;

/// FIFO that emits each pushed value `delay` pushes later.
///
/// Only values actually pushed are stored, each tagged with the push index it
/// falls due at, so memory follows the episode length rather than `delay`.
/// The first `delay` pushes emit 0. Whatever is still in flight when the
/// episode ends is dropped by `reset`.
#[derive(Clone, Debug)]
pub struct DelayLine {
    delay: usize,
    pushes: u64,
    in_flight: VecDeque<(u64, f64)>,
}

impl DelayLine {
    pub fn new(delay: usize) -> Self {
        Self {
            delay,
            pushes: 0,
            in_flight: VecDeque::new(),
        }
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Push this step's value and return the one due now.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.delay == 0 {
            return value;
        }
        self.pushes += 1;
        let due = self
            .pushes
            .saturating_add(u64::try_from(self.delay).unwrap_or(u64::MAX));
        self.in_flight.push_back((due, value));
        match self.in_flight.front() {
            Some(&(due, _)) if due <= self.pushes => {
                self.in_flight.pop_front().map_or(0.0, |(_, v)| v)
            }
            _ => 0.0,
        }
    }

    /// Sum of values still in flight.
    pub fn pending(&self) -> f64 {
        self.in_flight.iter().map(|(_, v)| v).sum()
    }

    pub fn reset(&mut self) {
        self.in_flight.clear();
        self.pushes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_passthrough() {
        let mut line = DelayLine::new(0);
        assert_eq!(line.push(1.5), 1.5);
        assert_eq!(line.pending(), 0.0);
    }

    #[test]
    fn test_values_emerge_after_delay() {
        let mut line = DelayLine::new(2);
        let out: Vec<f64> = [1.0, 2.0, 3.0, 4.0].iter().map(|&v| line.push(v)).collect();
        assert_eq!(out, vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(line.pending(), 7.0);
    }

    #[test]
    fn test_huge_delay_holds_only_pushed_values() {
        let mut line = DelayLine::new(usize::MAX);
        for v in 1..=100 {
            assert_eq!(line.push(v as f64), 0.0);
        }
        assert_eq!(line.in_flight.len(), 100);
        assert_eq!(line.pending(), 5050.0);
    }

    #[test]
    fn test_reset_drops_in_flight_values() {
        let mut line = DelayLine::new(3);
        line.push(5.0);
        line.reset();
        assert_eq!(line.pending(), 0.0);
        assert_eq!(line.push(1.0), 0.0);
    }
}
