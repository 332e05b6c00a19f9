//! Timer state structure and the pure reduction rules

use tracing::debug;

use super::Action;

/// Message shown when the minutes field holds something other than a number
pub const INPUT_ERROR_MESSAGE: &str = "Input must be a number";

/// Milliseconds in one minute
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// A single occurrence of an invalid-input error.
///
/// Every raise gets a fresh `occurrence` number, so two errors with the same
/// message still compare unequal and reach the UI as separate events.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct InputError {
    pub occurrence: u64,
    pub message: String,
}

/// Reducer-owned model of the timer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimerState {
    /// Last successfully parsed minutes value (0 when empty or invalid)
    pub input_minutes: i64,
    pub input_error: Option<InputError>,
    pub is_expired: bool,
    pub remaining_millis: i64,
    /// Number of input errors raised so far in this session
    pub errors_raised: u64,
}

impl TimerState {
    /// Create the default state: no input, nothing running
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration a start request arms, derived from the held minutes value
    pub fn start_duration_millis(&self) -> i64 {
        self.input_minutes.saturating_mul(MILLIS_PER_MINUTE)
    }

    /// Apply one action and return the next state
    pub fn reduce(mut self, action: &Action) -> Self {
        match action {
            Action::InputChanged { text } => match parse_minutes(text) {
                Some(minutes) => {
                    self.input_minutes = minutes;
                    self.input_error = None;
                }
                None => {
                    self.errors_raised += 1;
                    self.input_minutes = 0;
                    self.input_error = Some(InputError {
                        occurrence: self.errors_raised,
                        message: INPUT_ERROR_MESSAGE.to_string(),
                    });
                }
            },
            // Remaining time only changes once the first tick arrives
            Action::StartTimer { .. } => {
                self.is_expired = false;
            }
            Action::Tick { remaining_millis } => {
                if self.is_expired {
                    debug!("Ignoring tick of {}ms on an expired timer", remaining_millis);
                } else {
                    self.remaining_millis = (*remaining_millis).max(0);
                }
            }
            Action::Expired => {
                self.is_expired = true;
                self.remaining_millis = 0;
            }
        }
        self
    }
}

/// Parse the minutes field. Empty text is a valid zero.
fn parse_minutes(text: &str) -> Option<i64> {
    if text.is_empty() {
        return Some(0);
    }
    text.parse::<i64>().ok().filter(|minutes| *minutes >= 0)
}
