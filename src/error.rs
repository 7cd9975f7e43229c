//! Callback registration error types

use thiserror::Error;

/// Errors raised while registering callbacks
///
/// Registration failures are fatal and surface before training starts;
/// nothing in this crate retries or defers a misconfiguration to dispatch
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error(
        "device affinity {affinity} of callback `{callback}` is too high: \
         only {device_count} devices available, select an index from 0 to {max}",
        max = .device_count.saturating_sub(1)
    )]
    DeviceAffinityOutOfRange {
        /// Name of the offending callback
        callback: String,
        /// The requested device index
        affinity: usize,
        /// Number of available compute devices
        device_count: usize,
    },
}

/// Result alias for callback registration operations
pub type Result<T> = std::result::Result<T, CallbackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_affinity_error_display() {
        let err = CallbackError::DeviceAffinityOutOfRange {
            callback: "GradClip".to_string(),
            affinity: 5,
            device_count: 2,
        };
        let message = err.to_string();
        assert!(message.contains("GradClip"));
        assert!(message.contains("affinity 5"));
        assert!(message.contains("2 devices"));
        assert!(message.contains("0 to 1"));
    }
}
