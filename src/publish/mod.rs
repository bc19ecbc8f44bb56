//! DID publishing subsystem.
//!
//! # Data Flow
//! ```text
//! Session (wallet, master key, DID)
//!     → workflow.rs (Publisher: preconditions, chunk, submit, confirm)
//!     → status.rs (single watched PublishStatus)
//!     → wizard / CLI re-render on every change
//! ```

pub mod session;
pub mod status;
pub mod workflow;

pub use session::Session;
pub use status::{PublishStatus, StatusTracker};
pub use workflow::{Precondition, PublishError, Publisher};
