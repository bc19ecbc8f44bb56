//! Identity subsystem.
//!
//! # Data Flow
//! ```text
//! Seed (OS RNG, zeroized)
//!     → key.rs (secp256k1 master key)
//!     → agent.rs (DID from public key, anchoring payload from key + DID)
//!     → did.rs (validated DID, short form for display)
//! ```

pub mod agent;
pub mod did;
pub mod key;

pub use agent::{DidAgent, LocalPrismAgent};
pub use did::{Did, DidError};
pub use key::{MasterKey, Seed};
