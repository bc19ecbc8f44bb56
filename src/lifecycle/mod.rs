//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl-C (signals.rs) or wizard exit
//!     → Shutdown::trigger (shutdown.rs)
//!     → every subscribed confirmation wait returns Cancelled
//!     → Session::end drops key material
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
