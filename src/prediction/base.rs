//! Prediction client trait and wire types
//!
//! The prediction service accepts `POST {"question": "..."}` and answers with
//! `{"response": "..."}`. A missing `response` field is not an error; the
//! caller substitutes [`NO_RESPONSE_TEXT`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Answer text used when the service replies without a `response` field
pub const NO_RESPONSE_TEXT: &str = "No response received";

/// Request body sent to the prediction endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// The user's question, verbatim
    pub question: String,
}

impl PredictRequest {
    /// Build a request for a question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Response body returned by the prediction endpoint
///
/// # Examples
///
/// ```
/// use shamba::prediction::{Prediction, NO_RESPONSE_TEXT};
///
/// let p: Prediction = serde_json::from_str(r#"{"response": "Water at dawn"}"#).unwrap();
/// assert_eq!(p.answer_text(), "Water at dawn");
///
/// let empty: Prediction = serde_json::from_str("{}").unwrap();
/// assert_eq!(empty.answer_text(), NO_RESPONSE_TEXT);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Generated advice, if the service produced any
    #[serde(default)]
    pub response: Option<String>,
}

impl Prediction {
    /// Wrap an answer
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    /// The answer, or [`NO_RESPONSE_TEXT`] when the service sent none
    ///
    /// An empty string counts as no response.
    pub fn answer_text(&self) -> String {
        match self.response.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => NO_RESPONSE_TEXT.to_string(),
        }
    }
}

/// Remote question answering service
///
/// Implementations must map every failure (transport, HTTP status, body
/// decoding) to [`crate::error::ShambaError::RemoteUnavailable`].
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Ask the service one question
    ///
    /// # Errors
    ///
    /// Returns `RemoteUnavailable` if no answer could be obtained
    async fn predict(&self, question: &str) -> Result<Prediction>;

    /// Where requests are sent, for status display
    fn endpoint(&self) -> String;
}
