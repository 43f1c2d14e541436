//! HTTP prediction client
//!
//! Sends each question as a JSON `POST` to the configured endpoint using
//! `reqwest`, and decodes the `{"response": ...}` body.

use crate::config::PredictionConfig;
use crate::error::{Result, ShambaError};
use crate::prediction::{PredictRequest, Prediction, PredictionClient};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Prediction client backed by an HTTP endpoint
///
/// # Examples
///
/// ```
/// use shamba::config::PredictionConfig;
/// use shamba::prediction::{HttpPredictionClient, PredictionClient};
///
/// let client = HttpPredictionClient::new(&PredictionConfig::default()).unwrap();
/// assert_eq!(client.endpoint(), "http://127.0.0.1:8000/predict");
/// ```
pub struct HttpPredictionClient {
    client: Client,
    endpoint: String,
}

impl HttpPredictionClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint URL and timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &PredictionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("shamba/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ShambaError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(
            "Initialized prediction client: endpoint={}, timeout={}s",
            config.endpoint,
            config.timeout_seconds
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, question: &str) -> Result<Prediction> {
        tracing::debug!("Sending prediction request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest::new(question))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Prediction request failed: {}", e);
                ShambaError::RemoteUnavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Prediction endpoint returned {}: {}", status, error_text);
            return Err(ShambaError::RemoteUnavailable(format!(
                "endpoint returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let prediction: Prediction = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse prediction response: {}", e);
            ShambaError::RemoteUnavailable(format!("unreadable response: {}", e))
        })?;

        tracing::debug!(
            has_response = prediction.response.is_some(),
            "Prediction received"
        );

        Ok(prediction)
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
