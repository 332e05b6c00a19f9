//! Actions fed into the timer reducer

/// A discrete user or system event. Consumed exactly once by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The minutes field changed to `text`
    InputChanged { text: String },
    /// Arm a countdown for `duration_millis`
    StartTimer { duration_millis: i64 },
    /// The active ticker reported the remaining time
    Tick { remaining_millis: i64 },
    /// The active countdown finished
    Expired,
}

impl Action {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Action::InputChanged { .. } => "input-changed",
            Action::StartTimer { .. } => "start-timer",
            Action::Tick { .. } => "tick",
            Action::Expired => "expired",
        }
    }
}
