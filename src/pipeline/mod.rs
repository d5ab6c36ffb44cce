//! The check pipeline.
//!
//! - `detect`: classify probed releases against the cached baseline
//! - `compose`: batch change records into one notification message
//! - `check`: sequence a whole monitoring run

pub mod check;
pub mod compose;
pub mod detect;

pub use check::{run_check, CheckOutcome};
pub use compose::{compose, BatchKind, Message};
pub use detect::{Change, ChangeDetector, ChangeRecord};
