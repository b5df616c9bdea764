// src/pipeline/watch.rs

//! Seat-watching poll loop.
//!
//! One cycle: reset the notified set when its window has elapsed, reload the
//! subscription file, then query, classify and maybe notify for each
//! subscription in file order. Subscriptions are checked one at a time; the
//! only suspensions are the backoff sleep after a failed query and the
//! jittered sleep between cycles.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::subscription::load_subscriptions;
use crate::models::{Availability, Config, FetchOutcome, Subscription};
use crate::pipeline::state::WatchState;
use crate::services::{
    AvailabilityClassifier, Notifier, Timetable, TimetableClient, WebhookNotifier,
};
use crate::utils::http;
use crate::utils::log::StatusLog;

/// What happened during one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Subscriptions loaded for this cycle
    pub checked: usize,
    /// Classification counts for successful queries
    pub outcomes: HashMap<Availability, usize>,
    /// Queries that ended in a non-200 status or a transport error
    pub transport_failures: usize,
    pub notifications_sent: usize,
    pub already_notified: usize,
    pub notification_failures: usize,
    /// The notified set was cleared at the start of this cycle
    pub dedup_reset: bool,
}

impl CycleReport {
    /// Number of subscriptions classified as `availability`.
    pub fn count(&self, availability: Availability) -> usize {
        self.outcomes.get(&availability).copied().unwrap_or(0)
    }

    fn record(&mut self, availability: Availability) {
        *self.outcomes.entry(availability).or_insert(0) += 1;
    }
}

/// Owns the loop state and the collaborators of the poll loop.
pub struct Watcher {
    timetable: Box<dyn Timetable>,
    notifier: Box<dyn Notifier>,
    classifier: AvailabilityClassifier,
    subscriptions_file: PathBuf,
    poll_lower: Duration,
    poll_upper: Duration,
    log: StatusLog,
    state: WatchState,
}

impl Watcher {
    /// Build a watcher around explicit collaborators.
    pub fn new(
        config: &Config,
        timetable: Box<dyn Timetable>,
        notifier: Box<dyn Notifier>,
        log: StatusLog,
    ) -> Result<Self> {
        let classifier = AvailabilityClassifier::new(&config.classifier)?;
        let state = WatchState::new(
            &config.backoff,
            Duration::from_secs(config.dedup.window_secs),
            Instant::now(),
        );

        Ok(Self {
            timetable,
            notifier,
            classifier,
            subscriptions_file: PathBuf::from(&config.watcher.subscriptions_file),
            poll_lower: Duration::from_secs(config.watcher.poll_lower_secs),
            poll_upper: Duration::from_secs(config.watcher.poll_upper_secs),
            log,
            state,
        })
    }

    /// Build a watcher that talks HTTP to the configured endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::create_client(&config.watcher)?;
        let timetable = TimetableClient::new(client.clone(), &config.watcher.target_url);
        log::debug!("Timetable endpoint: {}", timetable.url());
        let notifier = WebhookNotifier::new(client);

        Self::new(
            config,
            Box::new(timetable),
            Box::new(notifier),
            StatusLog::new(&config.logging),
        )
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Poll forever: cycle, sleep a jittered interval, repeat.
    pub async fn run(&mut self) {
        loop {
            self.log.info("Checking for course availability...");
            let report = self.run_cycle().await;
            log::debug!("Cycle finished: {report:?}");

            let interval = self.next_interval();
            self.log.info(&format!(
                "Sleeping for {:.2} seconds...",
                interval.as_secs_f64()
            ));
            tokio::time::sleep(interval).await;
        }
    }

    /// Run exactly one cycle against the subscription file.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let dedup_reset = self.state.notified.reset_if_due(Instant::now());
        if dedup_reset {
            self.log.info("Resetting notified set...");
        }

        let subscriptions = load_subscriptions(&self.subscriptions_file);
        self.log.debug(&format!(
            "Loaded {} subscriptions from {}",
            subscriptions.len(),
            self.subscriptions_file.display()
        ));
        let mut report = self.check_all(&subscriptions).await;
        report.dedup_reset = dedup_reset;
        report
    }

    /// Check a list of subscriptions in order.
    pub async fn check_all(&mut self, subscriptions: &[Subscription]) -> CycleReport {
        let mut report = CycleReport {
            checked: subscriptions.len(),
            ..CycleReport::default()
        };

        for subscription in subscriptions {
            self.check(subscription, &mut report).await;
        }
        report
    }

    async fn check(&mut self, subscription: &Subscription, report: &mut CycleReport) {
        let body = match self.timetable.query(subscription).await {
            FetchOutcome::Success(body) => body,
            failure => {
                report.transport_failures += 1;
                let sleep = self.state.backoff.record_failure();
                self.log.warn(&format!(
                    "{:<20} {:<8} Error: {} Backing off {}s.",
                    subscription.description,
                    subscription.crn,
                    failure,
                    sleep.as_secs()
                ));
                tokio::time::sleep(sleep).await;
                return;
            }
        };

        self.state.backoff.record_success();
        let availability = self.classifier.classify(&body, &subscription.crn);
        report.record(availability);

        if availability != Availability::OpenFound {
            self.log.status(
                &subscription.description,
                &subscription.crn,
                availability.message(),
            );
            return;
        }

        let key = subscription.key();
        let note = if self.state.notified.contains(&key) {
            report.already_notified += 1;
            "(User already notified)".to_string()
        } else {
            match self
                .notifier
                .notify(&subscription.notify_endpoint, &subscription.crn)
                .await
            {
                Ok(()) => {
                    self.state.notified.insert(key);
                    report.notifications_sent += 1;
                    "(Notification sent)".to_string()
                }
                Err(e) => {
                    report.notification_failures += 1;
                    format!("(Error sending notification: {e})")
                }
            }
        };

        self.log.status(
            &subscription.description,
            &subscription.crn,
            &format!("{} {}", availability.message(), note),
        );
    }

    /// Sleep before the next cycle, uniform between the configured bounds.
    pub fn next_interval(&self) -> Duration {
        let lower = self.poll_lower.as_secs_f64();
        let upper = self.poll_upper.as_secs_f64();
        if upper <= lower {
            return self.poll_lower;
        }
        Duration::from_secs_f64(rand::rng().random_range(lower..=upper))
    }
}
