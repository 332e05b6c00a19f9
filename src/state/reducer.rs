//! Timer reducer: serializes actions, owns the ticker, publishes view states

use std::sync::Arc;
use futures::stream::{self, Stream};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use super::{Action, TimerState, ViewState};
use super::recovery::{load_expiry, recovery_action, TIMESTAMP_KEY};
use crate::{
    services::{Clock, KeyValueStore},
    tasks::{spawn_ticker, TickerEvent, TickerHandle, TICK_INTERVAL},
};

/// Everything that travels through the reducer's single queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An action submitted from outside
    Action(Action),
    /// Start pressed; resolved against the minutes held in state when processed
    StartRequested,
    /// An action from the ticker with the given generation
    Ticker(TickerEvent),
}

impl From<TickerEvent> for Event {
    fn from(event: TickerEvent) -> Self {
        Event::Ticker(event)
    }
}

/// Single consumer of the event queue. Holds all mutable timer state.
struct TimerCore {
    state: TimerState,
    view: ViewState,
    ticker: Option<TickerHandle>,
    next_generation: u64,
    last_persisted: Option<i64>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    events_tx: mpsc::UnboundedSender<Event>,
}

impl TimerCore {
    fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        events_tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let state = TimerState::new();
        Self {
            view: ViewState::project(&state),
            state,
            ticker: None,
            next_generation: 0,
            last_persisted: None,
            store,
            clock,
            events_tx,
        }
    }

    /// Replay the persisted timer, if there is one
    fn recover(&mut self) {
        let expiry = load_expiry(self.store.as_ref());
        self.last_persisted = expiry;
        // One reading of the clock, so a resume arms exactly the stored expiry
        let now = self.clock.now_millis();
        if let Some(action) = recovery_action(expiry, now) {
            self.apply_at(action, now);
        }
    }

    /// Process one event. Returns the new view state if the projection changed.
    fn handle(&mut self, event: Event) -> Option<ViewState> {
        match event {
            Event::Action(action) => self.apply(action),
            Event::StartRequested => {
                let duration_millis = self.state.start_duration_millis();
                self.apply(Action::StartTimer { duration_millis })
            }
            Event::Ticker(TickerEvent { generation, action }) => {
                let active = self.ticker.as_ref().map(TickerHandle::generation);
                if active != Some(generation) {
                    debug!(
                        "Dropping {} from stale ticker generation {} (active: {:?})",
                        action.name(),
                        generation,
                        active
                    );
                    return None;
                }
                if action == Action::Expired {
                    info!("Timer expired");
                    self.ticker = None;
                }
                self.apply(action)
            }
        }
    }

    fn apply(&mut self, action: Action) -> Option<ViewState> {
        let now = self.clock.now_millis();
        self.apply_at(action, now)
    }

    /// Apply `action` with `now_millis` as the start time of any timer it arms
    fn apply_at(&mut self, action: Action, now_millis: i64) -> Option<ViewState> {
        if let Action::StartTimer { duration_millis } = action {
            self.arm(duration_millis, now_millis);
        }

        debug!("Reducing {}", action.name());
        self.state = std::mem::take(&mut self.state).reduce(&action);

        let view = ViewState::project(&self.state);
        if view == self.view {
            return None;
        }
        self.view = view.clone();
        Some(view)
    }

    /// Cancel the running ticker, persist the new expiry and start a fresh ticker
    fn arm(&mut self, duration_millis: i64, now_millis: i64) {
        let duration_millis = duration_millis.max(0);

        if let Some(previous) = self.ticker.take() {
            info!("Replacing running timer");
            previous.cancel();
        }

        let expiry = now_millis.saturating_add(duration_millis);
        self.persist(expiry);

        self.next_generation += 1;
        info!("Starting timer for {}ms", duration_millis);
        self.ticker = Some(spawn_ticker(
            self.next_generation,
            duration_millis,
            TICK_INTERVAL,
            self.events_tx.clone(),
        ));
    }

    fn persist(&mut self, expiry: i64) {
        if self.last_persisted == Some(expiry) {
            debug!("Expiry {} already persisted", expiry);
            return;
        }
        match self.store.set(TIMESTAMP_KEY, expiry) {
            Ok(()) => self.last_persisted = Some(expiry),
            Err(e) => error!("Failed to persist timer expiry: {}", e),
        }
    }
}

/// The timer state reducer. One instance per session.
///
/// Actions are queued and applied one at a time by a single background task;
/// the resulting view states are published through a watch channel, deduplicated
/// by content.
#[derive(Debug)]
pub struct TimerReducer {
    events_tx: mpsc::UnboundedSender<Event>,
    view_rx: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl TimerReducer {
    /// Create the reducer and recover any persisted timer.
    ///
    /// Recovery runs before this returns, so the first observed view state
    /// already reflects it. Must be called from within a Tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let mut core = TimerCore::new(store, clock, events_tx.clone());
        core.recover();

        let (view_tx, view_rx) = watch::channel(core.view.clone());

        let task = tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                if let Some(view) = core.handle(event) {
                    view_tx.send_replace(view);
                }
            }
        });

        Self {
            events_tx,
            view_rx,
            task,
        }
    }

    /// Report new contents of the minutes field
    pub fn submit_input(&self, text: impl Into<String>) {
        self.dispatch(Event::Action(Action::InputChanged { text: text.into() }));
    }

    /// Start a countdown for the minutes currently held in state
    pub fn submit_start(&self) {
        self.dispatch(Event::StartRequested);
    }

    /// Latest published view state
    pub fn current_view(&self) -> ViewState {
        self.view_rx.borrow().clone()
    }

    /// Stream of view states: the current one first, then every distinct change.
    ///
    /// Slow observers only see the latest value, so an input error that is
    /// superseded before the observer polls may never be shown. The stream
    /// ends when the reducer is dropped.
    pub fn observe_view_state(&self) -> impl Stream<Item = ViewState> + Send + Unpin + 'static {
        let rx = self.view_rx.clone();
        Box::pin(stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let view = rx.borrow_and_update().clone();
            Some((view, (rx, false)))
        }))
    }

    fn dispatch(&self, event: Event) {
        if let Err(e) = self.events_tx.send(event) {
            warn!("Reducer is gone, dropping {:?}", e.0);
        }
    }
}

impl Drop for TimerReducer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
