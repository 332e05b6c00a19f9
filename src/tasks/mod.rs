//! Background tasks module
//!
//! This module contains the countdown ticker that drives a running timer.

pub mod ticker;

// Re-export main functions
pub use ticker::{spawn_ticker, TickerEvent, TickerHandle, TICK_INTERVAL};
