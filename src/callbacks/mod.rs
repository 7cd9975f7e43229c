//! Ready-made callbacks for common training concerns

mod early_stopping;
mod loss_guard;
mod progress;

pub use early_stopping::EarlyStopping;
pub use loss_guard::LossGuard;
pub use progress::ProgressCallback;
