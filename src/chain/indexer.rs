//! Block-explorer client used to observe transaction confirmation.
//!
//! # Responsibilities
//! - Look a transaction up by hash (`GET {base}/txs/{hash}`)
//! - Authenticate with the `project_id` header
//! - Classify responses so the poller can tell "not yet" from "never"
//!
//! # Classification
//! ```text
//! 2xx                       → Confirmed
//! 404                       → NotFound (not indexed yet)
//! 429, 5xx, network, timeout → IndexerError::Transient
//! other 4xx                 → IndexerError::Permanent
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::chain::types::{IndexerError, TxHash, TxInfo, TxLookup};
use crate::config::IndexerConfig;

/// Header carrying the indexer project id.
pub const PROJECT_ID_HEADER: &str = "project_id";

/// Anything that can report whether a transaction is on chain.
#[async_trait]
pub trait TxIndexer: Send + Sync {
    async fn lookup(&self, tx_hash: &TxHash) -> Result<TxLookup, IndexerError>;
}

/// Blockfrost-compatible indexer client.
#[derive(Clone)]
pub struct BlockfrostClient {
    client: Client,
    base_url: String,
    project_id: String,
}

impl BlockfrostClient {
    /// Create a client with an explicit project id.
    pub fn new(config: &IndexerConfig, project_id: impl Into<String>) -> Result<Self, IndexerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| IndexerError::NotConfigured(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: project_id.into(),
        })
    }

    /// Create a client reading the project id from the configured environment variable.
    pub fn from_env(config: &IndexerConfig) -> Result<Self, IndexerError> {
        let project_id = std::env::var(&config.project_id_env).map_err(|_| {
            IndexerError::NotConfigured(format!(
                "Environment variable {} not set",
                config.project_id_env
            ))
        })?;

        Self::new(config, project_id)
    }

    fn tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/txs/{}", self.base_url, tx_hash)
    }
}

#[async_trait]
impl TxIndexer for BlockfrostClient {
    async fn lookup(&self, tx_hash: &TxHash) -> Result<TxLookup, IndexerError> {
        let res = self
            .client
            .get(self.tx_url(tx_hash))
            .header(PROJECT_ID_HEADER, &self.project_id)
            .send()
            .await
            .map_err(|e| IndexerError::Transient(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            // Presence is what matters; block placement is best effort.
            let info = res.json::<TxInfo>().await.unwrap_or_default();
            return Ok(TxLookup::Confirmed(info));
        }

        if status == StatusCode::NOT_FOUND {
            return Ok(TxLookup::NotFound);
        }

        let message = res.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(IndexerError::Transient(format!("{}: {}", status, message)));
        }

        Err(IndexerError::Permanent {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for BlockfrostClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockfrostClient")
            .field("base_url", &self.base_url)
            .field("project_id", &"<redacted>")
            .finish()
    }
}
