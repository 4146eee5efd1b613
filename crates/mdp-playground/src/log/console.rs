//! Console logging backend.

use super::MetricLogger;
use std::collections::BTreeMap;

/// Logger that prints metrics via tracing.
pub struct ConsoleLogger;

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self
    }
}

impl MetricLogger for ConsoleLogger {
    fn log_scalar(&self, name: &str, value: f64, episode: u64) {
        tracing::info!("Episode {}: {} = {:.4}", episode, name, value);
    }

    fn log_metrics(&self, metrics: &BTreeMap<String, f64>, episode: u64) {
        // One line per episode, keys in sorted order
        let fields: Vec<String> = metrics
            .iter()
            .map(|(key, value)| format!("{}={:.4}", key, value))
            .collect();
        tracing::info!("Episode {}: {}", episode, fields.join(", "));
    }
}
