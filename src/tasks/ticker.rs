//! Countdown ticker background task

use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::{debug, info};

use crate::state::Action;

/// Fixed interval between two ticks
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// An action produced by the ticker with the given generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerEvent {
    pub generation: u64,
    pub action: Action,
}

/// Owned handle to the running ticker task. Dropping it stops the task.
#[derive(Debug)]
pub struct TickerHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the ticker. No event is sent by it afterwards.
    pub fn cancel(self) {
        debug!("Cancelling ticker generation {}", self.generation);
        // Drop aborts the task
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a ticker counting down `duration_millis`.
///
/// Sends `Tick` at every interval boundary with the exact remaining time,
/// ceil(duration / interval) ticks in total with the last one at zero, then
/// a single `Expired`. Must be called from within a Tokio runtime.
pub fn spawn_ticker<E>(
    generation: u64,
    duration_millis: i64,
    interval: Duration,
    tx: mpsc::UnboundedSender<E>,
) -> TickerHandle
where
    E: From<TickerEvent> + Send + 'static,
{
    let total = u64::try_from(duration_millis).unwrap_or(0);
    let step = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1);
    let ticks = total.div_ceil(step);

    info!(
        "Starting ticker generation {} for {}ms ({} ticks)",
        generation, total, ticks
    );

    let task = tokio::spawn(async move {
        let start = Instant::now();
        let send = |action: Action| tx.send(TickerEvent { generation, action }.into()).is_ok();

        for k in 1..=ticks {
            let elapsed = k.saturating_mul(step).min(total);
            sleep_until(start + Duration::from_millis(elapsed)).await;
            if !send(Action::Tick {
                remaining_millis: (total - elapsed) as i64,
            }) {
                debug!("Ticker generation {} lost its receiver", generation);
                return;
            }
        }

        debug!("Ticker generation {} finished", generation);
        send(Action::Expired);
    });

    TickerHandle { generation, task }
}
