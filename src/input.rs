//! Input subsystem.
//!
//! `raw` turns device transitions into held durations, `script` reads recorded
//! traces of those transitions and `tracker` keeps the filtered and unfiltered
//! views the evaluation engine scans.

pub mod raw;
pub mod script;
pub mod tracker;

// Public re-exports for convenience. Modules outside this crate should prefer importing
// from `crate::input` rather than reaching into submodules.
pub use raw::{HoldClock, RawInputEvent};
pub use script::{parse_script, ScriptStep};
pub use tracker::InputTracker;
