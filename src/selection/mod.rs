//! Page selection: the shared requested index and the smoother that walks
//! the displayed page toward it.

pub mod signal;
pub mod smoother;
pub mod timer;

pub use signal::{PageSignal, SubscriptionId};
pub use smoother::{PageSmoother, StepEvent};
pub use timer::{ScheduleHandle, StepTimer};
