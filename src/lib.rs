//! Prism DID publisher library.
//!
//! Connects a wallet, creates a DID master key, and anchors the DID on the
//! ledger by attaching chunked DID data to a transaction's metadata, then
//! waits for an indexer to report the transaction.

pub mod chain;
pub mod config;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod publish;
pub mod resilience;
pub mod wizard;

pub use config::PublisherConfig;
pub use lifecycle::Shutdown;
pub use publish::{PublishStatus, Publisher, Session};
pub use wizard::Wizard;
