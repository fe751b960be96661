//! Outbound notification relay
//!
//! Email and push deliveries are handed to an HTTP relay that owns the
//! actual mail and push providers.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Client for the notification relay
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

/// Payload posted to the relay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryRequest {
    pub channel: String,
    pub to: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RelayErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

impl WebhookClient {
    /// Create a new relay client
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver one message through the relay
    pub async fn deliver(&self, request: &DeliveryRequest) -> AppResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Relay request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let error: RelayErrorResponse = response
            .json()
            .await
            .unwrap_or(RelayErrorResponse { message: None });
        Err(AppError::ExternalService(format!(
            "Relay returned {}: {}",
            status,
            error.message.unwrap_or_else(|| "Unknown error".to_string())
        )))
    }
}
