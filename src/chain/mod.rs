//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! anchoring payload
//!     → metadata.rs (64-byte chunks, { v, c } body)
//!     → transaction.rs (self payment + metadata label, build/sign/submit)
//!     → wallet.rs (user's wallet via the bridge)
//!     → confirm.rs (bounded polling) → indexer.rs (block explorer)
//! ```
//!
//! # Security Constraints
//! - Spending keys stay inside the wallet
//! - Indexer project id ONLY from the environment, never logged
//! - All HTTP calls have configurable timeouts

pub mod confirm;
pub mod indexer;
pub mod metadata;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use confirm::{Confirmation, ConfirmationPoller, PollError, PollPolicy};
pub use indexer::{BlockfrostClient, TxIndexer};
pub use metadata::{chunk_bytes, ChunkError, MetadataBody};
pub use transaction::TxBuilder;
pub use types::{Address, IndexerError, TxHash, TxLookup, WalletDescriptor, WalletError};
pub use wallet::{HttpWalletBridge, WalletConnector, WalletHandle};
