#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use basic_timer::{
    services::{KeyValueStore, ManualClock},
    TimerReducer, ViewState,
};
use futures::{Stream, StreamExt};

pub const NOW: i64 = 1_700_000_000_000;

pub fn reducer_at(store: Arc<dyn KeyValueStore>, now: i64) -> (TimerReducer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    let reducer = TimerReducer::new(store, clock.clone());
    (reducer, clock)
}

/// Next view state, failing the test if none arrives within ten virtual minutes
pub async fn next_view<S>(views: &mut S) -> ViewState
where
    S: Stream<Item = ViewState> + Unpin,
{
    tokio::time::timeout(Duration::from_secs(600), views.next())
        .await
        .expect("timed out waiting for a view state")
        .expect("view stream ended")
}

/// Collect view states up to and including the first expired one
pub async fn views_until_expired<S>(views: &mut S) -> Vec<ViewState>
where
    S: Stream<Item = ViewState> + Unpin,
{
    let mut seen = Vec::new();
    loop {
        let view = next_view(views).await;
        let expired = view.is_expired;
        seen.push(view);
        if expired {
            return seen;
        }
    }
}

/// Seconds encoded in an `mm:ss` text
pub fn seconds(text: &str) -> u32 {
    let (minutes, seconds) = text.split_once(':').expect("mm:ss");
    minutes.parse::<u32>().unwrap() * 60 + seconds.parse::<u32>().unwrap()
}
