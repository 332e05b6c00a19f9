//! Recovery of a countdown that was running when the process last exited
//!
//! The persisted expiry lives under a single key; at startup it is turned into
//! the action the reducer replays.

use tracing::{info, warn};

use crate::{services::KeyValueStore, state::Action};

/// Store key holding the absolute expiry time in epoch milliseconds
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Stored value meaning "no timer scheduled"
pub const TIMESTAMP_NONE: i64 = -1;

/// Read the persisted expiry timestamp, if any
pub fn load_expiry(store: &dyn KeyValueStore) -> Option<i64> {
    match store.get(TIMESTAMP_KEY) {
        Ok(Some(TIMESTAMP_NONE)) | Ok(None) => None,
        Ok(Some(timestamp)) => Some(timestamp),
        Err(e) => {
            warn!("Failed to read persisted expiry, starting fresh: {}", e);
            None
        }
    }
}

/// Decide what the reducer should replay at startup
pub fn recovery_action(expiry: Option<i64>, now_millis: i64) -> Option<Action> {
    let expiry = expiry?;

    if expiry <= now_millis {
        info!("Persisted timer expired {}ms ago", now_millis - expiry);
        Some(Action::Expired)
    } else {
        let remaining = expiry - now_millis;
        info!("Resuming persisted timer with {}ms remaining", remaining);
        Some(Action::StartTimer {
            duration_millis: remaining,
        })
    }
}
