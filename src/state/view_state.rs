//! UI-facing projection of the timer state

use chrono::DateTime;
use serde::Serialize;

use super::{InputError, TimerState};

/// Text shown in place of the remaining time once the countdown finished
pub const EXPIRED_TEXT: &str = "Timer expired";

/// What the UI renders. Recomputed on every state change and published only
/// when it differs from the previous projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub start_enabled: bool,
    pub input_error: Option<InputError>,
    pub is_expired: bool,
    pub remaining_time_text: String,
}

impl ViewState {
    /// Project the reducer state into a view state
    pub fn project(state: &TimerState) -> Self {
        Self {
            start_enabled: state.input_minutes != 0,
            input_error: state.input_error.clone(),
            is_expired: state.is_expired,
            remaining_time_text: format_remaining(state.remaining_millis),
        }
    }

    /// Line of text the countdown display shows
    pub fn display_text(&self) -> String {
        if self.is_expired {
            EXPIRED_TEXT.to_string()
        } else {
            format!("{} remaining", self.remaining_time_text)
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::project(&TimerState::default())
    }
}

/// Format milliseconds as `mm:ss` of a UTC clock started at the epoch.
///
/// Durations of an hour or more wrap: 61 minutes renders as `01:00`.
pub fn format_remaining(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis.max(0))
        .map(|instant| instant.format("%M:%S").to_string())
        .unwrap_or_else(|| "00:00".to_string())
}

/// Hands each input error occurrence to a renderer exactly once.
#[derive(Debug, Default)]
pub struct InputErrorTracker {
    last_seen: Option<u64>,
}

impl InputErrorTracker {
    /// Return the view's error if this occurrence has not been taken yet
    pub fn take<'a>(&mut self, view: &'a ViewState) -> Option<&'a InputError> {
        let error = view.input_error.as_ref()?;
        if self.last_seen == Some(error.occurrence) {
            return None;
        }
        self.last_seen = Some(error.occurrence);
        Some(error)
    }
}
