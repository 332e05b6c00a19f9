//! Basic Timer - a countdown timer driven by a unidirectional state reducer
//!
//! This is the terminal front end: every stdin line is the new contents of
//! the minutes field, `:start` starts the countdown and `:quit` exits.

use std::sync::Arc;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use basic_timer::{
    config::Config,
    services::{JsonFileStore, SystemClock},
    state::{InputErrorTracker, TimerReducer, ViewState},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr, stdout is the display
    tracing_subscriber::fmt()
        .with_env_filter(format!("basic_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting basic-timer v1.0.0");

    let store = Arc::new(JsonFileStore::open(config.store_path())?);
    let reducer = TimerReducer::new(store, Arc::new(SystemClock));

    let mut views = reducer.observe_view_state();
    let json = config.json;
    tokio::spawn(async move {
        let mut errors = InputErrorTracker::default();
        while let Some(view) = views.next().await {
            render(&view, &mut errors, json);
        }
    });

    info!("Type a number of minutes, then :start (:quit to exit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == ":start" => reducer.submit_start(),
                    Some(line) if line.trim() == ":quit" => break,
                    Some(line) => reducer.submit_input(line),
                    None => break,
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Timer shutdown complete");
    Ok(())
}

fn render(view: &ViewState, errors: &mut InputErrorTracker, json: bool) {
    if json {
        match serde_json::to_string(view) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to encode view state: {}", e),
        }
        return;
    }

    if let Some(error) = errors.take(view) {
        println!("! {}", error.message);
    }
    let start = if view.start_enabled { "ready" } else { "disabled" };
    println!("{}  [start {}]", view.display_text(), start);
}
