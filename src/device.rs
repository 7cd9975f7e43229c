//! Compute device binding for per-device callback filtering

use serde::{Deserialize, Serialize};

use crate::error::{CallbackError, Result};

/// The loop's compute device assignment
///
/// Carries the device index the loop is pinned to (or `None` when the loop
/// is not device-specific) and the number of available compute devices.
/// Callbacks with a device affinity only run on handlers whose binding
/// accepts that affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceBinding {
    /// Device index the loop runs on, `None` for single-device/CPU runs
    pub index: Option<usize>,
    /// Number of available compute devices
    pub count: usize,
}

impl DeviceBinding {
    /// Binding for a loop with no specific device
    pub fn unbound(count: usize) -> Self {
        Self { index: None, count }
    }

    /// Binding for a loop pinned to one device
    pub fn bound(index: usize, count: usize) -> Self {
        Self { index: Some(index), count }
    }

    /// Whether a callback with the given affinity runs under this binding
    ///
    /// True when the affinity is unset, the binding has no device index,
    /// or the two indices match.
    pub fn accepts(&self, affinity: Option<usize>) -> bool {
        match (self.index, affinity) {
            (Some(device), Some(affinity)) => device == affinity,
            _ => true,
        }
    }

    /// Range-check a callback's device affinity against this binding
    ///
    /// Only enforced when both the affinity and the binding's device index
    /// are set; an unbound loop accepts any affinity value.
    pub fn validate_affinity(&self, callback: &str, affinity: Option<usize>) -> Result<()> {
        if let (Some(_), Some(affinity)) = (self.index, affinity) {
            if affinity >= self.count {
                return Err(CallbackError::DeviceAffinityOutOfRange {
                    callback: callback.to_string(),
                    affinity,
                    device_count: self.count,
                });
            }
        }
        Ok(())
    }
}

impl Default for DeviceBinding {
    fn default() -> Self {
        Self::unbound(0)
    }
}
