//! Callback handler: registration, ordering, device filtering, and dispatch
//!
//! The handler turns a stream of callback registrations into nine dispatch
//! lists, one per lifecycle hook, each holding only the callbacks that
//! declare that hook, filtered by device affinity and ordered by execution
//! order. At each lifecycle point the loop calls a single handler method,
//! which fans out over the matching list.

use std::any::Any;
use std::fmt;

use super::hooks::{Hook, HookSet};
use super::traits::TrainerCallback;
use crate::context::TrainContext;
use crate::device::DeviceBinding;
use crate::error::Result;

/// Dispatches lifecycle events to registered callbacks
///
/// Created once per training loop with the loop's [`DeviceBinding`].
/// Callbacks are registered incrementally; every registration call
/// re-derives all dispatch lists from the full accumulated set, so the
/// ordering and filtering invariants hold at any point.
///
/// # Example
///
/// ```rust
/// use convocar::callback::{CallbackHandler, Hook, HookSet, TrainerCallback};
/// use convocar::{DeviceBinding, TrainContext};
///
/// struct Notice;
///
/// impl TrainerCallback for Notice {
///     fn name(&self) -> &str {
///         "Notice"
///     }
///     fn hooks(&self) -> HookSet {
///         HookSet::of(&[Hook::TrainBegin])
///     }
///     fn on_train_begin(&mut self, _ctx: &mut TrainContext) {
///         println!("training starts");
///     }
/// }
///
/// let mut handler = CallbackHandler::new(DeviceBinding::unbound(1));
/// let mut ctx = TrainContext::new();
/// handler.register(vec![Box::new(Notice)], &mut ctx)?;
/// handler.on_train_begin(&mut ctx);
/// # Ok::<(), convocar::CallbackError>(())
/// ```
pub struct CallbackHandler {
    device: DeviceBinding,
    /// Callbacks staged by deferred registration, flushed by the next
    /// non-deferred call
    cache: Vec<Box<dyn TrainerCallback>>,
    /// Master list of accepted callbacks, kept sorted by execution order
    callbacks: Vec<Box<dyn TrainerCallback>>,
    /// Per-hook dispatch lists of indices into the master list
    dispatch: [Vec<usize>; Hook::COUNT],
}

impl CallbackHandler {
    /// Create a handler for a loop with the given device binding
    pub fn new(device: DeviceBinding) -> Self {
        Self {
            device,
            cache: Vec::new(),
            callbacks: Vec::new(),
            dispatch: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// The device binding this handler filters against
    pub fn device(&self) -> DeviceBinding {
        self.device
    }

    /// Pin the handler to a device index
    ///
    /// Used by a worker process in a multi-process run before narrowing
    /// with [`mp_filter`](Self::mp_filter).
    pub fn bind_device(&mut self, index: usize) {
        self.device.index = Some(index);
    }

    /// Stage callbacks without registering them
    ///
    /// Cached callbacks are flushed, ahead of any newly supplied ones, by
    /// the next [`register`](Self::register) call. Nothing else is
    /// observable until then.
    pub fn register_deferred(&mut self, callbacks: Vec<Box<dyn TrainerCallback>>) {
        self.cache.extend(callbacks);
    }

    /// Register callbacks and re-derive all dispatch lists
    ///
    /// Any previously cached callbacks are drained first and registered
    /// ahead of `callbacks`. The whole effective list is validated before
    /// anything is accepted: a device affinity out of range fails the call
    /// with no callback registered. Callbacks whose affinity the binding
    /// rejects are silently excluded from this run entirely; they exist for
    /// a different device. Each accepted callback gets `on_registration`
    /// fired exactly once.
    pub fn register(
        &mut self,
        callbacks: Vec<Box<dyn TrainerCallback>>,
        ctx: &mut TrainContext,
    ) -> Result<()> {
        let mut effective: Vec<Box<dyn TrainerCallback>> = self.cache.drain(..).collect();
        effective.extend(callbacks);

        // Fail fast, before any callback is accepted.
        for cb in &effective {
            self.device.validate_affinity(cb.name(), cb.device_affinity())?;
        }

        for mut cb in effective {
            if self.device.accepts(cb.device_affinity()) {
                cb.on_registration(ctx);
                self.callbacks.push(cb);
            }
        }

        // Stable sort: ties keep registration order, and an all-zero list
        // comes out exactly as registered.
        self.callbacks.sort_by_key(|cb| cb.execution_order());
        self.rebuild_dispatch_lists();
        Ok(())
    }

    /// Register a single callback
    pub fn add<C: TrainerCallback>(&mut self, callback: C, ctx: &mut TrainContext) -> Result<()> {
        self.register(vec![Box::new(callback)], ctx)
    }

    fn rebuild_dispatch_lists(&mut self) {
        self.dispatch = std::array::from_fn(|_| Vec::new());
        for (i, cb) in self.callbacks.iter().enumerate() {
            for hook in cb.hooks().iter() {
                self.dispatch[hook.index()].push(i);
            }
        }
    }

    /// Narrow all dispatch lists to callbacks runnable on this device
    ///
    /// Called by each worker process of a multi-process run after it is
    /// pinned to its device. Applies the affinity predicate once per list;
    /// the master list is left untouched, so [`len`](Self::len) is
    /// unaffected.
    pub fn mp_filter(&mut self) {
        let device = self.device;
        let callbacks = &self.callbacks;
        for list in &mut self.dispatch {
            list.retain(|&i| device.accepts(callbacks[i].device_affinity()));
        }
    }

    /// Number of registered callbacks, independent of the dispatch lists
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callback is registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Whether a callback with the given name is registered
    pub fn contains_name(&self, name: &str) -> bool {
        self.callbacks.iter().any(|cb| cb.name() == name)
    }

    /// Whether a callback of the given concrete type is registered
    pub fn contains<T: TrainerCallback>(&self) -> bool {
        self.callbacks.iter().any(|cb| {
            let any: &dyn Any = cb.as_ref();
            any.is::<T>()
        })
    }

    /// The callbacks dispatched at one hook, in execution order
    pub fn hook_callbacks(&self, hook: Hook) -> impl Iterator<Item = &dyn TrainerCallback> {
        self.dispatch[hook.index()].iter().map(|&i| self.callbacks[i].as_ref())
    }

    /// The hooks this handler currently dispatches anything at
    pub fn active_hooks(&self) -> HookSet {
        Hook::ALL
            .into_iter()
            .filter(|hook| !self.dispatch[hook.index()].is_empty())
            .collect()
    }

    fn fan_out(&mut self, hook: Hook, mut call: impl FnMut(&mut dyn TrainerCallback)) {
        // Indices stay valid during dispatch: registration is the only
        // operation that reshapes the master list.
        for &i in &self.dispatch[hook.index()] {
            call(self.callbacks[i].as_mut());
        }
    }

    /// Fire the epoch-begin event
    pub fn on_epoch_begin(&mut self, ctx: &mut TrainContext) {
        self.fan_out(Hook::EpochBegin, |cb| cb.on_epoch_begin(ctx));
    }

    /// Fire the epoch-end event
    pub fn on_epoch_end(&mut self, ctx: &mut TrainContext) {
        self.fan_out(Hook::EpochEnd, |cb| cb.on_epoch_end(ctx));
    }

    /// Fire the train-begin event
    pub fn on_train_begin(&mut self, ctx: &mut TrainContext) {
        self.fan_out(Hook::TrainBegin, |cb| cb.on_train_begin(ctx));
    }

    /// Fire the train-end event
    pub fn on_train_end(&mut self, ctx: &mut TrainContext) {
        self.fan_out(Hook::TrainEnd, |cb| cb.on_train_end(ctx));
    }

    /// Fire the batch-begin event
    pub fn on_batch_begin(&mut self, ctx: &mut TrainContext) {
        self.fan_out(Hook::BatchBegin, |cb| cb.on_batch_begin(ctx));
    }

    /// Fire the batch-end event
    pub fn on_batch_end(&mut self, ctx: &mut TrainContext) {
        self.fan_out(Hook::BatchEnd, |cb| cb.on_batch_end(ctx));
    }

    /// Fire the gradient-update event for one optimizer/loss group
    pub fn on_after_gradient_update(&mut self, ctx: &mut TrainContext, optimizer_idx: usize) {
        self.fan_out(Hook::AfterGradientUpdate, |cb| {
            cb.on_after_gradient_update(ctx, optimizer_idx);
        });
    }

    /// Fire the optimizer-step event for one optimizer/loss group
    pub fn on_after_optimizer_step(&mut self, ctx: &mut TrainContext, optimizer_idx: usize) {
        self.fan_out(Hook::AfterOptimizerStep, |cb| {
            cb.on_after_optimizer_step(ctx, optimizer_idx);
        });
    }

    /// Fire the multiprocess-start event on this worker
    pub fn on_multiprocess_start(&mut self, ctx: &mut TrainContext) {
        self.fan_out(Hook::MultiprocessStart, |cb| cb.on_multiprocess_start(ctx));
    }
}

impl Default for CallbackHandler {
    fn default() -> Self {
        Self::new(DeviceBinding::default())
    }
}

impl fmt::Display for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CALLBACKS")?;
        for hook in Hook::ALL {
            writeln!(f, "At {hook}:")?;
            for cb in self.hook_callbacks(hook) {
                writeln!(
                    f,
                    "\t{}: {}, execution_order: {}",
                    cb.name(),
                    cb.type_name(),
                    cb.execution_order()
                )?;
            }
        }
        Ok(())
    }
}
