//! Ledger-facing types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::chain::metadata::MetadataBody;

/// Transaction hash as reported by the wallet and the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxHash {
    fn from(hash: &str) -> Self {
        Self::new(hash)
    }
}

/// Bech32 ledger address, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wallet the connector can offer to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDescriptor {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A single transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: Address,
    pub lovelace: u64,
}

/// Everything the wallet needs to balance and build a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub outputs: Vec<TxOutput>,
    pub metadata_label: u64,
    pub metadata: MetadataBody,
}

/// Unsigned transaction body as produced by the wallet (CBOR hex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub cbor_hex: String,
}

/// Signed transaction ready for submission (CBOR hex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub cbor_hex: String,
}

/// Errors raised by the wallet collaborator.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No wallet handle is available.
    #[error("No wallet connected")]
    NotConnected,

    /// The named wallet is not offered by the connector.
    #[error("Wallet '{0}' is not available")]
    UnknownWallet(String),

    /// The user declined the request in the wallet.
    #[error("Wallet request refused: {0}")]
    Refused(String),

    /// Building, signing or submitting failed inside the wallet.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The wallet bridge could not be reached.
    #[error("Wallet bridge error: {0}")]
    Transport(String),
}

/// Errors raised by the indexer collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexerError {
    /// Worth retrying: network failure, rate limiting, server errors.
    #[error("Indexer temporarily unavailable: {0}")]
    Transient(String),

    /// Retrying will not help: malformed hash, bad credentials.
    #[error("Indexer rejected the request ({status}): {message}")]
    Permanent { status: u16, message: String },

    /// The client could not be set up.
    #[error("Indexer not configured: {0}")]
    NotConfigured(String),
}

impl IndexerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, IndexerError::Transient(_))
    }
}

/// Block placement of a confirmed transaction, when the indexer reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfo {
    #[serde(default)]
    pub block: Option<String>,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_time: Option<u64>,
}

/// Result of a single indexer lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxLookup {
    /// The transaction is on chain.
    Confirmed(TxInfo),
    /// The indexer does not know the transaction yet.
    NotFound,
}
