//! Page bend animation.
//!
//! Every frame each page computes target rotations for its bones from its
//! open/closed state ([`bend`]), then eases its bones toward them with
//! critically damped springs ([`damp`]).

pub mod bend;
pub mod damp;
pub mod highlight;
pub mod page;

pub use bend::{bone_target, bone_targets, turning_progress, BendInput};
pub use damp::Damped;
pub use highlight::Highlight;
pub use page::{FrameTime, PageAnimator, PageState};
