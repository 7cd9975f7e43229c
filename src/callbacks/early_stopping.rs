//! Early stopping callback to halt training when a monitored metric plateaus

use crate::callback::{Hook, HookSet, TrainerCallback};
use crate::context::TrainContext;

/// Early stopping callback to halt training when performance plateaus
///
/// Monitors a named metric series from the context history and requests a
/// stop if no improvement is seen for `patience` epochs. The improvement
/// direction is inferred from the monitored name: names containing `loss`
/// or `error` improve downward, everything else upward.
///
/// Runs with execution order 99 so that metric-producing callbacks sharing
/// the epoch-end hook have already recorded their results.
///
/// # Example
///
/// ```rust
/// use convocar::callbacks::EarlyStopping;
///
/// // Stop if val_loss fails to improve by 0.001 for 5 epochs
/// let early_stop = EarlyStopping::new("val_loss", 0.001, 5);
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    /// Metric series tracked to decide whether performance is improving
    monitor: String,
    /// By how much the metric has to improve to reset patience
    min_delta: f64,
    /// Epochs to wait after the metric stopped improving
    patience: usize,
    patience_count: isize,
    best_performance: Option<f64>,
    pub(crate) best_epoch: usize,
}

impl EarlyStopping {
    /// Order 99 so metric producers on the same hook run first
    pub const EXECUTION_ORDER: i32 = 99;

    /// Create an early stopper watching `monitor`
    pub fn new(monitor: impl Into<String>, min_delta: f64, patience: usize) -> Self {
        Self {
            monitor: monitor.into(),
            min_delta,
            patience,
            patience_count: patience as isize,
            best_performance: None,
            best_epoch: 0,
        }
    }

    /// Reset internal state, used when a loop is reused
    pub fn reset(&mut self) {
        self.patience_count = self.patience as isize;
        self.best_performance = None;
        self.best_epoch = 0;
    }

    /// Whether the monitored metric improves downward
    fn lower_is_better(&self) -> bool {
        let monitor = self.monitor.to_lowercase();
        monitor.contains("loss") || monitor.contains("error")
    }

    fn improved(&self, current: f64, best: f64) -> bool {
        if self.lower_is_better() {
            current < best - self.min_delta
        } else {
            current > best + self.min_delta
        }
    }
}

impl TrainerCallback for EarlyStopping {
    fn name(&self) -> &str {
        "EarlyStopping"
    }

    fn execution_order(&self) -> i32 {
        Self::EXECUTION_ORDER
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::EpochEnd])
    }

    fn on_epoch_end(&mut self, ctx: &mut TrainContext) {
        let Some(current) = ctx.history.latest(&self.monitor) else {
            return;
        };

        match self.best_performance {
            None => {
                self.best_performance = Some(current);
                self.best_epoch = ctx.epoch;
            }
            Some(best) => {
                if self.improved(current, best) {
                    self.best_performance = Some(current);
                    self.best_epoch = ctx.epoch;
                    self.patience_count = self.patience as isize;
                } else {
                    self.patience_count -= 1;
                }

                if self.patience_count < 0 {
                    eprintln!(
                        "Early stopping at epoch: {}. Best recorded epoch: {}.",
                        ctx.epoch, self.best_epoch
                    );
                    ctx.request_stop();
                }
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A flat loss series always triggers a stop after patience + 1
        /// epochs beyond the baseline
        #[test]
        fn flat_loss_stops_after_patience(
            patience in 0usize..8,
            loss in 0.1f64..10.0,
        ) {
            let mut es = EarlyStopping::new("loss", 0.001, patience);
            let mut ctx = TrainContext::new();

            ctx.history.record("loss", loss);
            es.on_epoch_end(&mut ctx);

            for epoch in 1..=patience + 1 {
                ctx.epoch = epoch;
                ctx.history.record("loss", loss);
                es.on_epoch_end(&mut ctx);
                if epoch <= patience {
                    prop_assert!(!ctx.stop_requested());
                }
            }
            prop_assert!(ctx.stop_requested());
        }

        /// A strictly improving loss series never triggers a stop
        #[test]
        fn improving_loss_never_stops(
            epochs in 1usize..30,
            start in 1.0f64..10.0,
        ) {
            let mut es = EarlyStopping::new("loss", 0.001, 0);
            let mut ctx = TrainContext::new();

            for epoch in 0..epochs {
                ctx.epoch = epoch;
                ctx.history.record("loss", start / (epoch + 1) as f64);
                es.on_epoch_end(&mut ctx);
                prop_assert!(!ctx.stop_requested());
            }
        }
    }
}
