// src/services/notifier.rs

//! Opening notifications.
//!
//! One plain-text POST per opening to the subscription's webhook. The
//! webhook is provider-agnostic (ntfy, a chat hook, or anything that accepts
//! a text body).

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};

/// Message body sent for an opening.
pub fn opening_message(crn: &str) -> String {
    format!("COURSE OPENING FOR CRN: {crn}")
}

/// Delivers opening notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one notification for `crn` to `endpoint`.
    ///
    /// `Ok` means the endpoint accepted the message.
    async fn notify(&self, endpoint: &str, crn: &str) -> Result<()>;
}

/// Webhook notifier posting UTF-8 text.
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, endpoint: &str, crn: &str) -> Result<()> {
        let response = self
            .client
            .post(endpoint)
            .body(opening_message(crn))
            .send()
            .await
            .map_err(|e| AppError::notify(endpoint, e))?;

        response
            .error_for_status()
            .map_err(|e| AppError::notify(endpoint, e))?;

        log::debug!("Notification for CRN {crn} delivered to {endpoint}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[test]
    fn test_opening_message() {
        assert_eq!(opening_message("12345"), "COURSE OPENING FOR CRN: 12345");
    }

    #[tokio::test]
    async fn test_posts_text_body() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/hook")
                    .body("COURSE OPENING FOR CRN: 12345");
                then.status(200);
            })
            .await;

        let notifier = WebhookNotifier::new(Client::new());
        notifier.notify(&server.url("/hook"), "12345").await.unwrap();

        hook.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(500);
            })
            .await;

        let notifier = WebhookNotifier::new(Client::new());
        let result = notifier.notify(&server.url("/hook"), "12345").await;

        assert!(matches!(result, Err(AppError::Notify { .. })));
    }

    #[tokio::test]
    async fn test_bad_endpoint_is_failure() {
        let notifier = WebhookNotifier::new(Client::new());
        let result = notifier.notify("not a url", "12345").await;
        assert!(result.is_err());
    }
}
