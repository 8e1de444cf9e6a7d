//! Social interactions on events: attendance, saves, summaries
//!
//! Writes go through [`ToggleController`] so the UI state flips immediately
//! and rolls back if the backend rejects the change.

mod actions;
mod toggle;

pub use actions::{
    attendance_toggle, load_social_summary, save_toggle, AttendanceBackend, AttendanceToggle,
    SaveBackend, SaveToggle,
};
pub use toggle::{OptimisticToggle, ToggleBackend, ToggleController, ToggleError, TogglePhase};
