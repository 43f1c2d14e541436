//! Two-tier answer resolution
//!
//! A question is first looked up in the local [`KnowledgeBase`]. Only on a
//! miss is the remote [`PredictionClient`] called. Tier selection
//! ([`AnswerResolver::route`]) is separate from execution so each tier can be
//! tested on its own.

use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::prediction::PredictionClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which tier produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// The local question/answer table
    Local,
    /// The prediction endpoint
    Remote,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// A resolved answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Where the answer came from
    pub source: AnswerSource,
    /// Answer text shown to the user
    pub answer: String,
}

/// The tier chosen for a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Answer known locally
    Local(String),
    /// Ask the prediction endpoint
    Remote,
}

/// Resolves questions against the local table, then the remote endpoint
pub struct AnswerResolver {
    knowledge: Arc<KnowledgeBase>,
    client: Arc<dyn PredictionClient>,
    local_delay: Duration,
}

impl AnswerResolver {
    /// Create a resolver
    ///
    /// # Arguments
    ///
    /// * `knowledge` - Local question/answer table
    /// * `client` - Remote prediction client
    pub fn new(knowledge: Arc<KnowledgeBase>, client: Arc<dyn PredictionClient>) -> Self {
        Self {
            knowledge,
            client,
            local_delay: Duration::ZERO,
        }
    }

    /// Delay local answers by `delay`, so they pace like remote ones
    pub fn with_local_delay(mut self, delay: Duration) -> Self {
        self.local_delay = delay;
        self
    }

    /// Pick the tier for a question without doing any I/O
    pub fn route(&self, question: &str) -> Route {
        match self.knowledge.lookup(question) {
            Some(answer) => Route::Local(answer.to_string()),
            None => Route::Remote,
        }
    }

    /// Resolve a question to an answer
    ///
    /// # Errors
    ///
    /// Returns `RemoteUnavailable` if the question needed the endpoint and
    /// the call failed
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let resolution = resolver.resolve("What pressure for tomatoes?").await?;
    /// assert_eq!(resolution.source, AnswerSource::Local);
    /// ```
    pub async fn resolve(&self, question: &str) -> Result<Resolution> {
        match self.route(question) {
            Route::Local(answer) => {
                tracing::debug!("Answered from local table");
                if !self.local_delay.is_zero() {
                    tokio::time::sleep(self.local_delay).await;
                }
                Ok(Resolution {
                    source: AnswerSource::Local,
                    answer,
                })
            }
            Route::Remote => {
                tracing::debug!("No local answer, asking {}", self.client.endpoint());
                let prediction = self.client.predict(question).await?;
                Ok(Resolution {
                    source: AnswerSource::Remote,
                    answer: prediction.answer_text(),
                })
            }
        }
    }

    /// The local table
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// The remote endpoint address
    pub fn endpoint(&self) -> String {
        self.client.endpoint()
    }
}
