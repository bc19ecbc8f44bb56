//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Publisher, poller, wallet bridge produce:
//!     → logging.rs (structured log events, session id as a field)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Key material, seeds and project ids are never logged
//! - Metrics without an installed exporter are no-ops

pub mod logging;
pub mod metrics;
