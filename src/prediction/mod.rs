//! Prediction module for Shamba
//!
//! This module contains the remote prediction client abstraction and its
//! HTTP implementation. Questions that the local table cannot answer are
//! sent through a [`PredictionClient`].

pub mod base;
pub mod http;

#[cfg(test)]
pub mod fake;

pub use base::{PredictRequest, Prediction, PredictionClient, NO_RESPONSE_TEXT};
pub use http::HttpPredictionClient;

use crate::config::PredictionConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the prediction client described by the configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_client(config: &PredictionConfig) -> Result<Arc<dyn PredictionClient>> {
    Ok(Arc::new(HttpPredictionClient::new(config)?))
}
