//! Metric logger traits and composites.

use crate::env::EnvInfo;
use std::collections::BTreeMap;

/// Trait for logging metrics to various backends.
///
/// `episode` is the 0-based index of the episode the metrics belong to.
pub trait MetricLogger: Send + Sync {
    /// Log a scalar value (e.g. episode return).
    fn log_scalar(&self, name: &str, value: f64, episode: u64);

    /// Log a set of named metrics at once.
    fn log_metrics(&self, metrics: &BTreeMap<String, f64>, episode: u64);

    /// Log the episode statistics and diagnostics carried by a final `EnvInfo`.
    fn log_info(&self, info: &EnvInfo, episode: u64) {
        let mut metrics = BTreeMap::new();
        if let Some(ret) = info.episode_return {
            metrics.insert("episode_return".to_string(), ret);
        }
        if let Some(len) = info.episode_length {
            metrics.insert("episode_length".to_string(), len);
        }
        for (key, value) in &info.extra {
            metrics.insert((*key).to_string(), *value);
        }
        self.log_metrics(&metrics, episode);
    }

    /// Close the logger and flush any pending writes.
    fn close(&self) {}
}

/// A logger that does nothing (default).
pub struct NoOpLogger;

impl MetricLogger for NoOpLogger {
    fn log_scalar(&self, _name: &str, _value: f64, _episode: u64) {}
    fn log_metrics(&self, _metrics: &BTreeMap<String, f64>, _episode: u64) {}
}

/// A composite logger that dispatches to multiple backends.
pub struct CompositeLogger {
    loggers: Vec<Box<dyn MetricLogger>>,
}

impl CompositeLogger {
    pub fn new(loggers: Vec<Box<dyn MetricLogger>>) -> Self {
        Self { loggers }
    }

    pub fn add(&mut self, logger: Box<dyn MetricLogger>) {
        self.loggers.push(logger);
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl MetricLogger for CompositeLogger {
    fn log_scalar(&self, name: &str, value: f64, episode: u64) {
        for logger in &self.loggers {
            logger.log_scalar(name, value, episode);
        }
    }

    fn log_metrics(&self, metrics: &BTreeMap<String, f64>, episode: u64) {
        for logger in &self.loggers {
            logger.log_metrics(metrics, episode);
        }
    }

    fn close(&self) {
        for logger in &self.loggers {
            logger.close();
        }
    }
}
