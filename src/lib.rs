//! # convocar
//!
//! Callback orchestration for training loops.
//!
//! A training loop exposes nine lifecycle points; `convocar` classifies a
//! heterogeneous set of callbacks by which points they implement, orders
//! them by execution rank, filters them by compute-device affinity in
//! multi-process runs, and fans events out at each point. The loop itself
//! stays outside this crate: it drives a [`CallbackHandler`] and shares its
//! state with callbacks through an explicit [`TrainContext`].
//!
//! - [`callback`] — hook points, the [`TrainerCallback`] contract, and the
//!   dispatching [`CallbackHandler`]
//! - [`callbacks`] — ready-made callbacks: early stopping, progress
//!   logging, loss guarding
//! - [`context`] — the execution context and metric history callbacks see
//! - [`device`] — device binding and affinity filtering
//!
//! # Example
//!
//! ```rust
//! use convocar::callback::{CallbackHandler, Hook};
//! use convocar::callbacks::EarlyStopping;
//! use convocar::{DeviceBinding, TrainContext};
//!
//! let mut handler = CallbackHandler::new(DeviceBinding::unbound(1));
//! let mut ctx = TrainContext::new();
//! handler.register(vec![Box::new(EarlyStopping::new("val_loss", 0.001, 5))], &mut ctx)?;
//!
//! // Inside the training loop, per epoch:
//! ctx.history.record("val_loss", 0.42);
//! handler.on_epoch_end(&mut ctx);
//! if ctx.stop_requested() {
//!     // stop training
//! }
//! # Ok::<(), convocar::CallbackError>(())
//! ```

pub mod callback;
pub mod callbacks;
pub mod context;
pub mod device;
pub mod error;

pub use callback::{CallbackHandler, Hook, HookSet, TrainerCallback};
pub use context::{MetricHistory, TrainContext};
pub use device::DeviceBinding;
pub use error::{CallbackError, Result};
