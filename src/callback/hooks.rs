//! Lifecycle hook points and capability sets
//!
//! A training loop exposes nine lifecycle points. Each callback declares,
//! at construction, the set of hooks it implements via [`HookSet`]; the
//! handler uses that declaration to decide dispatch-list membership instead
//! of inspecting method bodies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lifecycle point of the training loop at which callbacks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hook {
    /// Before each epoch
    EpochBegin,
    /// After each epoch
    EpochEnd,
    /// Before training starts
    TrainBegin,
    /// After training ends
    TrainEnd,
    /// Before each batch
    BatchBegin,
    /// After each batch
    BatchEnd,
    /// After gradients for one optimizer/loss group are computed
    AfterGradientUpdate,
    /// After one optimizer applies its step
    AfterOptimizerStep,
    /// Once per worker process in a multi-process run, before training
    MultiprocessStart,
}

impl Hook {
    /// All hooks in canonical dispatch order
    pub const ALL: [Hook; 9] = [
        Hook::EpochBegin,
        Hook::EpochEnd,
        Hook::TrainBegin,
        Hook::TrainEnd,
        Hook::BatchBegin,
        Hook::BatchEnd,
        Hook::AfterGradientUpdate,
        Hook::AfterOptimizerStep,
        Hook::MultiprocessStart,
    ];

    /// Number of lifecycle hooks
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the canonical order, used to index dispatch lists
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// The callback method name for this hook
    pub fn method_name(self) -> &'static str {
        match self {
            Hook::EpochBegin => "on_epoch_begin",
            Hook::EpochEnd => "on_epoch_end",
            Hook::TrainBegin => "on_train_begin",
            Hook::TrainEnd => "on_train_end",
            Hook::BatchBegin => "on_batch_begin",
            Hook::BatchEnd => "on_batch_end",
            Hook::AfterGradientUpdate => "on_after_gradient_update",
            Hook::AfterOptimizerStep => "on_after_optimizer_step",
            Hook::MultiprocessStart => "on_multiprocess_start",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Set of lifecycle hooks a callback implements
///
/// Stored as a bitmask over the nine [`Hook`] variants. A callback whose set
/// omits a hook never enters that hook's dispatch list, even if the trait
/// method body is overridden; the declaration is authoritative.
///
/// # Example
///
/// ```rust
/// use convocar::callback::{Hook, HookSet};
///
/// let hooks = HookSet::of(&[Hook::EpochEnd, Hook::BatchEnd]);
/// assert!(hooks.contains(Hook::EpochEnd));
/// assert!(!hooks.contains(Hook::TrainBegin));
/// assert_eq!(hooks.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookSet(u16);

impl HookSet {
    /// Set containing no hooks
    pub const EMPTY: HookSet = HookSet(0);

    /// Set containing every hook
    pub const ALL: HookSet = HookSet((1 << Hook::COUNT as u16) - 1);

    /// Create an empty set
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Create a set from a slice of hooks
    pub fn of(hooks: &[Hook]) -> Self {
        let mut set = Self::EMPTY;
        for &hook in hooks {
            set.insert(hook);
        }
        set
    }

    /// Add a hook to the set
    pub fn insert(&mut self, hook: Hook) {
        self.0 |= 1 << hook.index();
    }

    /// Builder-style insertion
    #[must_use]
    pub fn with(mut self, hook: Hook) -> Self {
        self.insert(hook);
        self
    }

    /// Whether the set contains the hook
    pub fn contains(self, hook: Hook) -> bool {
        self.0 & (1 << hook.index()) != 0
    }

    /// Number of hooks in the set
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained hooks in canonical order
    pub fn iter(self) -> impl Iterator<Item = Hook> {
        Hook::ALL.into_iter().filter(move |&h| self.contains(h))
    }
}

impl FromIterator<Hook> for HookSet {
    fn from_iter<I: IntoIterator<Item = Hook>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for hook in iter {
            set.insert(hook);
        }
        set
    }
}

impl fmt::Display for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, hook) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{hook}")?;
        }
        write!(f, "}}")
    }
}

impl Serialize for HookSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for HookSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hooks = Vec::<Hook>::deserialize(deserializer)?;
        Ok(hooks.into_iter().collect())
    }
}
