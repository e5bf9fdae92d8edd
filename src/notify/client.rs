//! HTTP client for the progress webhook.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::models::ProgressEvent;

/// Webhook delivery errors.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Posts progress events to a single endpoint.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    endpoint: String,
    timeout: Duration,
    client: Client,
}

impl WebhookClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            client: Client::new(),
        }
    }

    /// Send one event as a single-element JSON array. One attempt, no retry.
    pub async fn deliver(&self, event: &ProgressEvent) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&[event])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
