// src/services/mod.rs

//! Service layer for the watcher application.
//!
//! This module contains the business logic for:
//! - Timetable queries (`TimetableClient`)
//! - Page classification (`AvailabilityClassifier`)
//! - Opening notifications (`WebhookNotifier`)

mod classifier;
mod notifier;
mod timetable;

pub use classifier::AvailabilityClassifier;
pub use notifier::{Notifier, WebhookNotifier, opening_message};
pub use timetable::{Timetable, TimetableClient, query_payload};
