// src/models/mod.rs

//! Domain models for the watcher application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod availability;
mod config;
pub mod subscription;

// Re-export all public types
pub use availability::{Availability, FetchOutcome};
pub use config::{
    BackoffConfig, BackoffPolicy, ClassifierRules, Config, DedupConfig, LoggingConfig,
    WatcherConfig,
};
pub use subscription::{NotificationKey, Subscription, SubscriptionList};
