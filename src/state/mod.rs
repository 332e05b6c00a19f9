//! State management module
//!
//! This module contains the timer actions, the reducer state and its view
//! projection, startup recovery, and the reducer that ties them together.

pub mod action;
pub mod recovery;
pub mod reducer;
pub mod timer_state;
pub mod view_state;

// Re-export main types
pub use action::Action;
pub use recovery::{load_expiry, recovery_action, TIMESTAMP_KEY, TIMESTAMP_NONE};
pub use reducer::{Event, TimerReducer};
pub use timer_state::{InputError, TimerState, INPUT_ERROR_MESSAGE};
pub use view_state::{format_remaining, InputErrorTracker, ViewState, EXPIRED_TEXT};
