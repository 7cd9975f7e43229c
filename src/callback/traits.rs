//! The callback contract: lifecycle hook methods and dispatch metadata
//!
//! All hook methods have default no-op implementations, so a callback only
//! implements the events it cares about. Membership in the handler's
//! dispatch lists is driven by the explicit [`hooks`](TrainerCallback::hooks)
//! declaration, not by which methods happen to be overridden.

use std::any::Any;

use super::hooks::HookSet;
use crate::context::TrainContext;

/// Trait for training callbacks
///
/// Callbacks are built with their configuration only and never hold a
/// reference to the training loop; the loop's state arrives as a
/// [`TrainContext`] at every hook call. A callback that wants to influence
/// the loop does so through the context, e.g. `ctx.request_stop()`.
///
/// # Example
///
/// ```rust
/// use convocar::callback::{Hook, HookSet, TrainerCallback};
/// use convocar::TrainContext;
///
/// struct PrintEpoch;
///
/// impl TrainerCallback for PrintEpoch {
///     fn hooks(&self) -> HookSet {
///         HookSet::of(&[Hook::EpochEnd])
///     }
///
///     fn on_epoch_end(&mut self, ctx: &mut TrainContext) {
///         println!("epoch {} done", ctx.epoch);
///     }
/// }
/// ```
pub trait TrainerCallback: Any + Send {
    /// Callback name for logging and lookup, defaults to the type name
    fn name(&self) -> &str {
        self.type_name()
    }

    /// Concrete type name, used by the handler's dispatch dump
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Dispatch rank among callbacks sharing a hook, lower runs earlier
    fn execution_order(&self) -> i32 {
        0
    }

    /// Restrict execution to one device index, `None` runs everywhere
    fn device_affinity(&self) -> Option<usize> {
        None
    }

    /// The lifecycle hooks this callback implements
    ///
    /// Authoritative for dispatch-list membership: a hook absent from this
    /// set is never invoked on the callback, even if the method body is
    /// overridden.
    fn hooks(&self) -> HookSet {
        HookSet::EMPTY
    }

    /// Fired exactly once when the handler accepts the callback
    ///
    /// May prepare the callback's own state or the shared context; the
    /// handler's dispatch lists are not yet visible at this point.
    fn on_registration(&mut self, _ctx: &mut TrainContext) {}

    /// Called before each epoch
    fn on_epoch_begin(&mut self, _ctx: &mut TrainContext) {}

    /// Called after each epoch
    fn on_epoch_end(&mut self, _ctx: &mut TrainContext) {}

    /// Called before training starts
    fn on_train_begin(&mut self, _ctx: &mut TrainContext) {}

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &mut TrainContext) {}

    /// Called before each batch
    fn on_batch_begin(&mut self, _ctx: &mut TrainContext) {}

    /// Called after each batch
    fn on_batch_end(&mut self, _ctx: &mut TrainContext) {}

    /// Called after gradients are computed for one optimizer/loss group
    fn on_after_gradient_update(&mut self, _ctx: &mut TrainContext, _optimizer_idx: usize) {}

    /// Called after one optimizer applies its step
    fn on_after_optimizer_step(&mut self, _ctx: &mut TrainContext, _optimizer_idx: usize) {}

    /// Called once per worker process before training starts on that worker
    fn on_multiprocess_start(&mut self, _ctx: &mut TrainContext) {}
}
