// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream endpoint, subscription source and polling interval
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Sleep policy after failed upstream requests
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Re-notification window
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Markers used to interpret the timetable page
    #[serde(default)]
    pub classifier: ClassifierRules,

    /// Status log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.watcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("watcher.user_agent is empty"));
        }
        if self.watcher.timeout_secs == 0 {
            return Err(AppError::validation("watcher.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.watcher.target_url)?;
        if self.watcher.subscriptions_file.trim().is_empty() {
            return Err(AppError::validation("watcher.subscriptions_file is empty"));
        }
        if self.watcher.poll_lower_secs > self.watcher.poll_upper_secs {
            return Err(AppError::validation(format!(
                "watcher.poll_lower_secs ({}) exceeds watcher.poll_upper_secs ({})",
                self.watcher.poll_lower_secs, self.watcher.poll_upper_secs
            )));
        }
        if self.backoff.step_secs == 0 {
            return Err(AppError::validation("backoff.step_secs must be > 0"));
        }
        if self.backoff.max_failures == 0 {
            return Err(AppError::validation("backoff.max_failures must be > 0"));
        }
        if self.dedup.window_secs == 0 {
            return Err(AppError::validation("dedup.window_secs must be > 0"));
        }
        self.classifier.validate()
    }
}

/// Upstream query and polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Timetable search endpoint the form is POSTed to
    #[serde(default = "defaults::target_url")]
    pub target_url: String,

    /// CSV file listing the monitored sections
    #[serde(default = "defaults::subscriptions_file")]
    pub subscriptions_file: String,

    /// User-Agent header for upstream requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Lower bound of the sleep between cycles
    #[serde(default = "defaults::poll_lower")]
    pub poll_lower_secs: u64,

    /// Upper bound of the sleep between cycles
    #[serde(default = "defaults::poll_upper")]
    pub poll_upper_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            target_url: defaults::target_url(),
            subscriptions_file: defaults::subscriptions_file(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            poll_lower_secs: defaults::poll_lower(),
            poll_upper_secs: defaults::poll_upper(),
        }
    }
}

/// What happens to the failure counter once it passes `max_failures`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffPolicy {
    /// Drop the counter back to 1 (sleep jumps back to one step)
    #[default]
    Reset,
    /// Hold the counter at `max_failures`
    Clamp,
}

/// Backoff settings for failed upstream requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Seconds slept per consecutive failure
    #[serde(default = "defaults::backoff_step")]
    pub step_secs: u64,

    /// Failure count beyond which the policy applies
    #[serde(default = "defaults::max_failures")]
    pub max_failures: u32,

    #[serde(default)]
    pub policy: BackoffPolicy,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            step_secs: defaults::backoff_step(),
            max_failures: defaults::max_failures(),
            policy: BackoffPolicy::default(),
        }
    }
}

/// Notification dedup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Seconds between unconditional clears of the notified set
    #[serde(default = "defaults::dedup_window")]
    pub window_secs: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_secs: defaults::dedup_window(),
        }
    }
}

/// Selectors and banner texts that drive availability classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// Results table; its absence means the CRN is not in the timetable
    #[serde(default = "defaults::results_table_selector")]
    pub results_table_selector: String,

    /// Elements carrying the campus/term error banner
    #[serde(default = "defaults::timetable_error_selector")]
    pub timetable_error_selector: String,

    #[serde(default = "defaults::timetable_error_text")]
    pub timetable_error_text: String,

    /// Elements carrying the "no sections" banner
    #[serde(default = "defaults::no_sections_selector")]
    pub no_sections_selector: String,

    #[serde(default = "defaults::no_sections_text")]
    pub no_sections_text: String,
}

impl ClassifierRules {
    /// Check that every selector parses.
    pub fn validate(&self) -> Result<()> {
        for selector in [
            &self.results_table_selector,
            &self.timetable_error_selector,
            &self.no_sections_selector,
        ] {
            Selector::parse(selector)
                .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Ok(())
    }
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            results_table_selector: defaults::results_table_selector(),
            timetable_error_selector: defaults::timetable_error_selector(),
            timetable_error_text: defaults::timetable_error_text(),
            no_sections_selector: defaults::no_sections_selector(),
            no_sections_text: defaults::no_sections_text(),
        }
    }
}

/// Status log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Print status lines and append them to `log_file`
    #[serde(default = "defaults::debug")]
    pub debug: bool,

    #[serde(default = "defaults::log_file")]
    pub log_file: String,

    /// Minimum level written: debug, info, warn or error
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: defaults::debug(),
            log_file: defaults::log_file(),
            level: defaults::level(),
        }
    }
}

mod defaults {
    // Watcher defaults
    pub fn target_url() -> String {
        "https://selfservice.banner.vt.edu/ssb/HZSKVTSC.P_ProcRequest".into()
    }
    pub fn subscriptions_file() -> String {
        "course_subscriptions.csv".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; VTTT-SCPR/v0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn poll_lower() -> u64 {
        30
    }
    pub fn poll_upper() -> u64 {
        90
    }

    // Backoff defaults
    pub fn backoff_step() -> u64 {
        30
    }
    pub fn max_failures() -> u32 {
        30
    }

    pub fn dedup_window() -> u64 {
        600
    }

    // Classifier defaults
    pub fn results_table_selector() -> String {
        "table.dataentrytable".into()
    }
    pub fn timetable_error_selector() -> String {
        "b.red_msg".into()
    }
    pub fn timetable_error_text() -> String {
        "Information for this CAMPUS is not currently available for the TERM selected.".into()
    }
    pub fn no_sections_selector() -> String {
        "li.red_msg".into()
    }
    pub fn no_sections_text() -> String {
        "NO SECTIONS FOUND FOR THIS INQUIRY.".into()
    }

    // Logging defaults
    pub fn debug() -> bool {
        true
    }
    pub fn log_file() -> String {
        "debug_output.log".into()
    }
    pub fn level() -> String {
        "info".into()
    }
}
