// src/pipeline/mod.rs

//! Poll loop and the state it carries between cycles.
//!
//! - `Watcher::run`: poll forever with a jittered interval
//! - `Watcher::run_cycle`: one pass over the subscription file

pub mod state;
pub mod watch;

pub use state::{Backoff, NotifiedSet, WatchState};
pub use watch::{CycleReport, Watcher};
