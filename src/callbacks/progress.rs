//! Progress callback for logging training progress

use crate::callback::{Hook, HookSet, TrainerCallback};
use crate::context::TrainContext;

/// Progress callback for logging training progress
///
/// Prints an epoch line at epoch begin and end, plus a batch line every
/// `log_interval` batches. Loss values are pulled from the context history
/// (`loss`, and `val_loss` when present).
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N batches
    log_interval: usize,
}

impl ProgressCallback {
    /// Create progress callback
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval }
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn name(&self) -> &str {
        "ProgressCallback"
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::EpochBegin, Hook::EpochEnd, Hook::BatchEnd])
    }

    fn on_epoch_begin(&mut self, ctx: &mut TrainContext) {
        println!("Epoch {}/{} starting", ctx.epoch + 1, ctx.max_epochs);
    }

    fn on_epoch_end(&mut self, ctx: &mut TrainContext) {
        let loss = ctx.history.latest("loss").unwrap_or(f64::NAN);
        let val_str = ctx
            .history
            .latest("val_loss")
            .map(|v| format!(", val_loss: {v:.4}"))
            .unwrap_or_default();

        println!(
            "Epoch {}/{}: loss: {:.4}{} ({:.1}s)",
            ctx.epoch + 1,
            ctx.max_epochs,
            loss,
            val_str,
            ctx.elapsed_secs
        );
    }

    fn on_batch_end(&mut self, ctx: &mut TrainContext) {
        if self.log_interval > 0 && ctx.batch > 0 && ctx.batch % self.log_interval == 0 {
            let loss = ctx.history.latest("loss").unwrap_or(f64::NAN);
            println!("  Batch {}/{}: loss: {:.4}", ctx.batch, ctx.batches_per_epoch, loss);
        }
    }
}
