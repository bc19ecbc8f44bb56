//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, chunk size within the ledger cap)
//! - Check that URLs and socket addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PublisherConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::chain::metadata::MAX_CHUNK_SIZE;
use crate::config::schema::PublisherConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &PublisherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let chunk_size = config.publish.chunk_size;
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        errors.push(ValidationError::new(
            "publish.chunk_size",
            format!("must be between 1 and {}, got {}", MAX_CHUNK_SIZE, chunk_size),
        ));
    }
    if config.publish.min_lovelace == 0 {
        errors.push(ValidationError::new("publish.min_lovelace", "must be greater than 0"));
    }

    if config.poller.interval_secs == 0 {
        errors.push(ValidationError::new("poller.interval_secs", "must be greater than 0"));
    }
    if config.poller.max_attempts == 0 {
        errors.push(ValidationError::new("poller.max_attempts", "must be greater than 0"));
    }
    if config.poller.max_elapsed_secs == 0 {
        errors.push(ValidationError::new("poller.max_elapsed_secs", "must be greater than 0"));
    }
    if config.poller.max_backoff_secs < config.poller.interval_secs {
        errors.push(ValidationError::new(
            "poller.max_backoff_secs",
            "must not be smaller than poller.interval_secs",
        ));
    }

    check_url(&mut errors, "indexer.base_url", &config.indexer.base_url);
    check_url(&mut errors, "indexer.explorer_tx_url", &config.indexer.explorer_tx_url);
    check_url(&mut errors, "wallet.bridge_url", &config.wallet.bridge_url);

    if config.indexer.project_id_env.trim().is_empty() {
        errors.push(ValidationError::new("indexer.project_id_env", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = url::Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}
