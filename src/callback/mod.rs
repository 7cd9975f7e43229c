//! Callback dispatch: hooks, the callback contract, and the handler
//!
//! The handler classifies registered callbacks by their declared hook sets,
//! orders them by execution order, filters them by device affinity, and
//! fans out one method call per lifecycle point.
//!
//! # Example
//!
//! ```rust
//! use convocar::callback::{CallbackHandler, Hook, HookSet, TrainerCallback};
//! use convocar::{DeviceBinding, TrainContext};
//!
//! struct EpochLogger;
//!
//! impl TrainerCallback for EpochLogger {
//!     fn hooks(&self) -> HookSet {
//!         HookSet::of(&[Hook::EpochEnd])
//!     }
//!     fn on_epoch_end(&mut self, ctx: &mut TrainContext) {
//!         println!("epoch {} finished", ctx.epoch);
//!     }
//! }
//!
//! let mut handler = CallbackHandler::new(DeviceBinding::unbound(1));
//! let mut ctx = TrainContext::new();
//! handler.register(vec![Box::new(EpochLogger)], &mut ctx)?;
//! handler.on_epoch_end(&mut ctx);
//! # Ok::<(), convocar::CallbackError>(())
//! ```

mod handler;
mod hooks;
mod traits;

pub use handler::CallbackHandler;
pub use hooks::{Hook, HookSet};
pub use traits::TrainerCallback;
