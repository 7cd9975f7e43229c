//! Execution context passed to callbacks
//!
//! Callbacks never hold a reference back to the training loop. Instead the
//! loop builds a [`TrainContext`] and passes it explicitly to every hook
//! call, so a callback's view of the loop is exactly what the context
//! carries: loop position, recorded metrics, and a stop-request flag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named metric series recorded over the course of a run
///
/// Thin history keyed by metric name, e.g. `"loss"` or `"val_loss"`.
/// Callbacks such as early stopping monitor a series by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricHistory {
    series: BTreeMap<String, Vec<f64>>,
}

impl MetricHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to a named series, creating it if absent
    pub fn record(&mut self, name: impl Into<String>, value: f64) {
        self.series.entry(name.into()).or_default().push(value);
    }

    /// Most recent value of a series, if any was recorded
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.series.get(name).and_then(|values| values.last().copied())
    }

    /// Full series for a metric name
    pub fn series(&self, name: &str) -> &[f64] {
        self.series.get(name).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct metric names
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether no metric has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// State the training loop exposes to callbacks at each lifecycle point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Total epochs planned
    pub max_epochs: usize,
    /// Current batch within the epoch
    pub batch: usize,
    /// Total batches per epoch
    pub batches_per_epoch: usize,
    /// Global batch count across epochs
    pub global_step: usize,
    /// Training duration in seconds
    pub elapsed_secs: f64,
    /// Recorded metric series
    pub history: MetricHistory,
    /// Set when a callback asks the loop to stop training
    pub early_stop: bool,
}

impl Default for TrainContext {
    fn default() -> Self {
        Self {
            epoch: 0,
            max_epochs: 0,
            batch: 0,
            batches_per_epoch: 0,
            global_step: 0,
            elapsed_secs: 0.0,
            history: MetricHistory::new(),
            early_stop: false,
        }
    }
}

impl TrainContext {
    /// Create a fresh context
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop training after the current lifecycle point
    pub fn request_stop(&mut self) {
        self.early_stop = true;
    }

    /// Whether any callback has requested a stop
    pub fn stop_requested(&self) -> bool {
        self.early_stop
    }

    /// Clear a previously requested stop, used when a loop is reused
    pub fn reset_stop(&mut self) {
        self.early_stop = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_record_and_latest() {
        let mut history = MetricHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.latest("loss"), None);

        history.record("loss", 1.0);
        history.record("loss", 0.5);
        assert_eq!(history.latest("loss"), Some(0.5));
        assert_eq!(history.series("loss"), &[1.0, 0.5]);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_history_missing_series_is_empty() {
        let history = MetricHistory::new();
        assert_eq!(history.series("val_loss"), &[] as &[f64]);
    }

    #[test]
    fn test_context_default() {
        let ctx = TrainContext::default();
        assert_eq!(ctx.epoch, 0);
        assert_eq!(ctx.global_step, 0);
        assert!(!ctx.stop_requested());
        assert!(ctx.history.is_empty());
    }

    #[test]
    fn test_context_stop_request() {
        let mut ctx = TrainContext::new();
        assert!(!ctx.stop_requested());
        ctx.request_stop();
        assert!(ctx.stop_requested());
        ctx.reset_stop();
        assert!(!ctx.stop_requested());
    }

    #[test]
    fn test_context_serde_roundtrip() {
        let mut ctx = TrainContext { epoch: 3, max_epochs: 10, ..Default::default() };
        ctx.history.record("loss", 0.25);
        let json = serde_json::to_string(&ctx).expect("serialize");
        let back: TrainContext = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.epoch, 3);
        assert_eq!(back.history.latest("loss"), Some(0.25));
    }
}
