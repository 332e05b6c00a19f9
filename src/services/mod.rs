//! External collaborators module
//!
//! This module contains the persistence store and the wall clock the reducer
//! depends on, each behind a narrow trait.

pub mod clock;
pub mod store;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
