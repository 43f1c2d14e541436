//! Scripted prediction client for unit tests
//!
//! [`ScriptedClient`] answers from a queue of canned replies, optionally
//! after a delay, and records every question it was asked.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, ShambaError};
use crate::prediction::{Prediction, PredictionClient};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed with this response text
    Answer(String),
    /// Succeed without a `response` field
    Empty,
    /// Fail with `RemoteUnavailable`
    Fail(String),
}

#[derive(Debug)]
struct Step {
    reply: Reply,
    delay: Duration,
}

/// Fake [`PredictionClient`] driven by a script
#[derive(Debug, Default)]
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedClient {
    /// Create a client with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply returned immediately
    pub fn then(self, reply: Reply) -> Self {
        self.then_after(reply, Duration::ZERO)
    }

    /// Queue a reply returned after `delay`
    pub fn then_after(self, reply: Reply, delay: Duration) -> Self {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(Step { reply, delay });
        }
        self
    }

    /// Questions received so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Number of calls received
    pub fn calls(&self) -> usize {
        self.asked().len()
    }
}

#[async_trait]
impl PredictionClient for ScriptedClient {
    async fn predict(&self, question: &str) -> Result<Prediction> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }

        let step = self
            .steps
            .lock()
            .ok()
            .and_then(|mut steps| steps.pop_front())
            .unwrap_or(Step {
                reply: Reply::Fail("script exhausted".to_string()),
                delay: Duration::ZERO,
            });

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }

        match step.reply {
            Reply::Answer(text) => Ok(Prediction::new(text)),
            Reply::Empty => Ok(Prediction::default()),
            Reply::Fail(reason) => Err(ShambaError::RemoteUnavailable(reason).into()),
        }
    }

    fn endpoint(&self) -> String {
        "fake://scripted".to_string()
    }
}
