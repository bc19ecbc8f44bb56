//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Indexer lookup fails transiently (network, 429, 5xx):
//!     → backoff.rs (exponential delay with jitter, floored at the poll interval)
//!     → poller retries until the lookup settles or the attempts run out
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline (reqwest client timeouts)
//! - Only transient failures back off; permanent ones surface immediately

pub mod backoff;
