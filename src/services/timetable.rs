// src/services/timetable.rs

//! Timetable search client.
//!
//! Posts the class-search form for one subscription and reports the raw
//! outcome. Only the campus, term and CRN come from the subscription; every
//! other form field is a fixed filter that restricts results to open sections.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::models::{FetchOutcome, Subscription};

/// Source of timetable pages.
#[async_trait]
pub trait Timetable: Send + Sync {
    /// Query the timetable for one subscription.
    async fn query(&self, subscription: &Subscription) -> FetchOutcome;
}

/// Build the form payload for a subscription, in upstream field order.
pub fn query_payload(subscription: &Subscription) -> Vec<(&'static str, String)> {
    vec![
        ("CAMPUS", subscription.campus.clone()),
        ("TERMYEAR", subscription.term_year.clone()),
        ("CORE_CODE", "AR%".into()),
        ("subj_code", "%".into()),
        ("SCHDTYPE", "%".into()),
        ("CRSE_NUMBER", String::new()),
        ("crn", subscription.crn.clone()),
        // "on" limits results to sections with open seats
        ("open_only", "on".into()),
        ("disp_comments_in", "Y".into()),
        ("sess_code", "%".into()),
        ("BTN_PRESSED", "FIND class sections".into()),
        ("inst_name", String::new()),
    ]
}

/// HTTP implementation backed by a shared `reqwest` client.
pub struct TimetableClient {
    client: Client,
    url: String,
}

impl TimetableClient {
    /// Create a client that posts to `url`.
    ///
    /// The client is expected to carry the configured User-Agent and timeout.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Endpoint the search form is posted to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Timetable for TimetableClient {
    async fn query(&self, subscription: &Subscription) -> FetchOutcome {
        let payload = query_payload(subscription);
        let response = match self.client.post(&self.url).form(&payload).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Transport(e.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return FetchOutcome::HttpStatus(status.as_u16());
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success(body),
            Err(e) => FetchOutcome::Transport(e.to_string()),
        }
    }
}
