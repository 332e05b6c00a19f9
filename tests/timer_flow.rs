mod common;

use std::{sync::Arc, time::Duration};

use basic_timer::{
    services::{KeyValueStore, MemoryStore},
    state::{InputErrorTracker, EXPIRED_TEXT, INPUT_ERROR_MESSAGE, TIMESTAMP_KEY},
};
use common::{next_view, reducer_at, seconds, views_until_expired, NOW};
use futures::StreamExt;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn default_view_when_nothing_was_persisted() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store.clone(), NOW);

    let view = reducer.current_view();
    assert!(!view.start_enabled);
    assert!(!view.is_expired);
    assert_eq!(view.input_error, None);
    assert_eq!(view.remaining_time_text, "00:00");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn timer_that_expired_while_closed_shows_expired_first() {
    let store = Arc::new(MemoryStore::with_value(TIMESTAMP_KEY, NOW - 5_000));
    let (reducer, _clock) = reducer_at(store.clone(), NOW);
    let mut views = reducer.observe_view_state();

    let first = next_view(&mut views).await;
    assert!(first.is_expired);
    assert_eq!(first.remaining_time_text, "00:00");
    assert_eq!(first.display_text(), EXPIRED_TEXT);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn running_timer_resumes_with_the_remaining_time() {
    let store = Arc::new(MemoryStore::with_value(TIMESTAMP_KEY, NOW + 125_000));
    let started = Instant::now();
    let (reducer, _clock) = reducer_at(store.clone(), NOW);
    let mut views = reducer.observe_view_state();

    let initial = next_view(&mut views).await;
    assert!(!initial.is_expired);

    let views = views_until_expired(&mut views).await;
    assert_eq!(started.elapsed(), Duration::from_secs(125));
    assert_eq!(views[0].remaining_time_text, "02:04");

    let (last, ticks) = views.split_last().unwrap();
    assert!(last.is_expired);
    assert!(ticks.iter().all(|view| !view.is_expired));
    for pair in ticks.windows(2) {
        assert!(seconds(&pair[1].remaining_time_text) < seconds(&pair[0].remaining_time_text));
    }

    // Resuming rewrites nothing: the stored expiry is already correct
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.get(TIMESTAMP_KEY).unwrap(), Some(NOW + 125_000));
}

#[tokio::test(start_paused = true)]
async fn start_counts_down_the_entered_minutes() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store.clone(), NOW);
    let mut views = reducer.observe_view_state();
    next_view(&mut views).await;

    reducer.submit_input("1");
    let ready = next_view(&mut views).await;
    assert!(ready.start_enabled);

    let started = Instant::now();
    reducer.submit_start();

    let first_tick = next_view(&mut views).await;
    assert_eq!(first_tick.remaining_time_text, "00:59");
    assert_eq!(first_tick.display_text(), "00:59 remaining");
    assert_eq!(started.elapsed(), Duration::from_secs(1));
    assert_eq!(store.get(TIMESTAMP_KEY).unwrap(), Some(NOW + 60_000));

    let rest = views_until_expired(&mut views).await;
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    assert!(rest.iter().all(|view| view.start_enabled));
}

#[tokio::test(start_paused = true)]
async fn start_uses_input_queued_just_before_it() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store.clone(), NOW);
    let mut views = reducer.observe_view_state();
    next_view(&mut views).await;

    reducer.submit_input("3");
    reducer.submit_start();

    loop {
        let view = next_view(&mut views).await;
        if view.remaining_time_text != "00:00" {
            assert_eq!(view.remaining_time_text, "02:59");
            break;
        }
    }
    assert_eq!(store.get(TIMESTAMP_KEY).unwrap(), Some(NOW + 180_000));
}

#[tokio::test(start_paused = true)]
async fn starting_with_empty_input_expires_immediately() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store.clone(), NOW);
    let mut views = reducer.observe_view_state();
    assert!(!next_view(&mut views).await.start_enabled);

    let started = Instant::now();
    reducer.submit_input("");
    reducer.submit_start();

    let expired = next_view(&mut views).await;
    assert!(expired.is_expired);
    assert!(!expired.start_enabled);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(store.get(TIMESTAMP_KEY).unwrap(), Some(NOW));
}

#[tokio::test(start_paused = true)]
async fn restarting_replaces_the_running_countdown() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, clock) = reducer_at(store.clone(), NOW);
    let mut views = reducer.observe_view_state();
    next_view(&mut views).await;

    let started = Instant::now();
    reducer.submit_input("1");
    reducer.submit_start();
    loop {
        if next_view(&mut views).await.remaining_time_text == "00:50" {
            break;
        }
    }
    assert_eq!(started.elapsed(), Duration::from_secs(10));

    clock.advance(10_000);
    reducer.submit_input("2");
    reducer.submit_start();

    // The old countdown would tick 00:49 next
    let first = next_view(&mut views).await;
    assert_eq!(first.remaining_time_text, "01:59");
    assert_eq!(store.get(TIMESTAMP_KEY).unwrap(), Some(NOW + 10_000 + 120_000));

    let rest = views_until_expired(&mut views).await;
    assert_eq!(rest.iter().filter(|view| view.is_expired).count(), 1);
    assert_eq!(started.elapsed(), Duration::from_secs(130));
}

#[tokio::test(start_paused = true)]
async fn invalid_input_is_reported_once_per_occurrence() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store, NOW);
    let mut views = reducer.observe_view_state();
    let mut errors = InputErrorTracker::default();
    next_view(&mut views).await;

    reducer.submit_input("12");
    assert!(next_view(&mut views).await.start_enabled);

    reducer.submit_input("twelve");
    let invalid = next_view(&mut views).await;
    assert!(!invalid.start_enabled);
    let message = errors.take(&invalid).map(|e| e.message.clone());
    assert_eq!(message.as_deref(), Some(INPUT_ERROR_MESSAGE));
    assert!(errors.take(&invalid).is_none());

    reducer.submit_input("twelve");
    let again = next_view(&mut views).await;
    assert!(errors.take(&again).is_some());

    reducer.submit_input("5");
    let fixed = next_view(&mut views).await;
    assert!(fixed.start_enabled);
    assert_eq!(fixed.input_error, None);
    assert!(errors.take(&fixed).is_none());
}

#[tokio::test(start_paused = true)]
async fn superseded_error_is_conflated_away() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store, NOW);
    let mut views = reducer.observe_view_state();
    let mut errors = InputErrorTracker::default();
    next_view(&mut views).await;

    // Both are applied before the observer polls, so only the latest view is seen
    reducer.submit_input("abc");
    reducer.submit_input("5");

    let latest = next_view(&mut views).await;
    assert!(latest.start_enabled);
    assert_eq!(latest.input_error, None);
    assert!(errors.take(&latest).is_none());
}

#[tokio::test(start_paused = true)]
async fn identical_input_is_published_once() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store, NOW);
    let mut views = reducer.observe_view_state();
    next_view(&mut views).await;

    reducer.submit_input("10");
    assert!(next_view(&mut views).await.start_enabled);

    reducer.submit_input("10");
    let repeat = tokio::time::timeout(Duration::from_secs(5), views.next()).await;
    assert!(repeat.is_err(), "unchanged view was published again");

    reducer.submit_input("");
    assert!(!next_view(&mut views).await.start_enabled);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_reducer_ends_observers() {
    let store = Arc::new(MemoryStore::new());
    let (reducer, _clock) = reducer_at(store, NOW);
    let mut views = reducer.observe_view_state();
    next_view(&mut views).await;

    drop(reducer);
    assert_eq!(views.next().await, None);
}
