//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PublisherConfig (validated, immutable)
//!     → handed to the indexer, wallet bridge, poller and publisher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets are never read from the file, only from the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::IndexerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::PollerConfig;
pub use schema::PublishConfig;
pub use schema::PublisherConfig;
pub use schema::WalletConfig;
