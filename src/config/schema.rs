//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the publisher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the DID publisher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PublisherConfig {
    /// Block-explorer / indexer settings.
    pub indexer: IndexerConfig,

    /// Confirmation polling bounds.
    pub poller: PollerConfig,

    /// Transaction and metadata parameters.
    pub publish: PublishConfig,

    /// Wallet bridge connection.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Indexer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Base URL of the indexer API (no trailing slash needed).
    pub base_url: String,

    /// Name of the environment variable holding the project id.
    pub project_id_env: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Explorer URL prefix used to link a transaction hash.
    pub explorer_tx_url: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cardano-mainnet.blockfrost.io/api/v0".to_string(),
            project_id_env: "BLOCKFROST_PROJECT_ID".to_string(),
            request_timeout_secs: 10,
            explorer_tx_url: "https://cardanoscan.io/transaction/".to_string(),
        }
    }
}

/// Confirmation poller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Delay between polls in seconds.
    pub interval_secs: u64,

    /// Maximum number of indexer queries before giving up.
    pub max_attempts: u32,

    /// Maximum wall-clock time spent polling, in seconds.
    pub max_elapsed_secs: u64,

    /// Upper bound for the backoff applied after transient failures.
    pub max_backoff_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 15,
            max_attempts: 240,
            max_elapsed_secs: 3600,
            max_backoff_secs: 120,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_secs(self.max_elapsed_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

/// Publish transaction parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Transaction metadata label the DID payload is attached under.
    pub metadata_label: u64,

    /// Version number written to the `v` field of the metadata body.
    pub metadata_version: u32,

    /// Chunk size in bytes (ledger caps metadata byte strings at 64).
    pub chunk_size: usize,

    /// Lovelace sent back to the wallet's own change address.
    pub min_lovelace: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            metadata_label: 21325,
            metadata_version: 1,
            chunk_size: 64,
            min_lovelace: 1_000_000,
        }
    }
}

/// Wallet bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Base URL of the local wallet bridge.
    pub bridge_url: String,

    /// Per-request timeout in seconds. Signing waits on the user, so keep it generous.
    pub request_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            bridge_url: "http://127.0.0.1:8090".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
