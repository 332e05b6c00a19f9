//! Basic Timer - a countdown timer driven by a unidirectional state reducer
//!
//! User input and ticker events are folded into a timer state, which is
//! projected into a deduplicated view state for display. The expiry time of
//! the running countdown is persisted so it resumes after a restart.

pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use services::{Clock, JsonFileStore, KeyValueStore, MemoryStore, SystemClock};
pub use state::{Action, InputErrorTracker, TimerReducer, ViewState};
pub use utils::signals::shutdown_signal;
