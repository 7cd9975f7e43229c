//! Guard callback that halts training on a degenerate loss

use crate::callback::{Hook, HookSet, TrainerCallback};
use crate::context::TrainContext;

/// Requests a stop when the monitored loss turns NaN or infinite
///
/// A diverged run keeps burning compute without a chance of recovering;
/// this guard checks the latest value of a loss series after every batch
/// and epoch and asks the loop to stop on the first degenerate value.
#[derive(Clone, Debug)]
pub struct LossGuard {
    monitor: String,
    tripped: bool,
}

impl LossGuard {
    /// Guard the given loss series
    pub fn new(monitor: impl Into<String>) -> Self {
        Self { monitor: monitor.into(), tripped: false }
    }

    /// Whether the guard has fired
    pub fn tripped(&self) -> bool {
        self.tripped
    }

    fn check(&mut self, ctx: &mut TrainContext) {
        let Some(loss) = ctx.history.latest(&self.monitor) else {
            return;
        };
        if loss.is_nan() || loss.is_infinite() {
            if !self.tripped {
                eprintln!("LossGuard: degenerate {} value {loss}, stopping training", self.monitor);
            }
            self.tripped = true;
            ctx.request_stop();
        }
    }
}

impl Default for LossGuard {
    fn default() -> Self {
        Self::new("loss")
    }
}

impl TrainerCallback for LossGuard {
    fn name(&self) -> &str {
        "LossGuard"
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::BatchEnd, Hook::EpochEnd])
    }

    fn on_batch_end(&mut self, ctx: &mut TrainContext) {
        self.check(ctx);
    }

    fn on_epoch_end(&mut self, ctx: &mut TrainContext) {
        self.check(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_loss_passes() {
        let mut guard = LossGuard::default();
        let mut ctx = TrainContext::new();
        ctx.history.record("loss", 0.5);
        guard.on_batch_end(&mut ctx);
        assert!(!guard.tripped());
        assert!(!ctx.stop_requested());
    }

    #[test]
    fn test_nan_loss_trips() {
        let mut guard = LossGuard::default();
        let mut ctx = TrainContext::new();
        ctx.history.record("loss", f64::NAN);
        guard.on_batch_end(&mut ctx);
        assert!(guard.tripped());
        assert!(ctx.stop_requested());
    }

    #[test]
    fn test_infinite_loss_trips_on_epoch_end() {
        let mut guard = LossGuard::default();
        let mut ctx = TrainContext::new();
        ctx.history.record("loss", f64::INFINITY);
        guard.on_epoch_end(&mut ctx);
        assert!(guard.tripped());
        assert!(ctx.stop_requested());
    }

    #[test]
    fn test_missing_series_is_ignored() {
        let mut guard = LossGuard::new("val_loss");
        let mut ctx = TrainContext::new();
        guard.on_batch_end(&mut ctx);
        assert!(!guard.tripped());
    }

    #[test]
    fn test_custom_monitor() {
        let mut guard = LossGuard::new("aux_loss");
        let mut ctx = TrainContext::new();
        ctx.history.record("loss", f64::NAN);
        ctx.history.record("aux_loss", 0.1);
        guard.on_batch_end(&mut ctx);
        assert!(!guard.tripped());
    }
}
