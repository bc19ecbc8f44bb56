//! Publish status observed by the UI.
//!
//! # State Transitions
//! ```text
//! Idle → Publishing → Confirming → Completed
//!          └─ Publishing (message update)
//! any       → Error
//! Error     → Publishing (retry)
//! Completed → Publishing (another DID)
//! ```
//!
//! A run starts through [`StatusTracker::begin`], which refuses while another
//! run is in flight.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::chain::types::TxHash;

pub const MSG_CREATING_OPERATION: &str = "Creating DID operation...";
pub const MSG_BUILDING_TX: &str = "Building and signing transaction...";
pub const MSG_WAITING_CONFIRMATION: &str = "Transaction submitted. Waiting for confirmation...";
pub const MSG_PUBLISHED: &str = "DID successfully published!";

/// Where a publish run currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Idle,
    Publishing {
        message: Option<String>,
    },
    Confirming {
        message: Option<String>,
        #[serde(rename = "txHash")]
        tx_hash: Option<TxHash>,
    },
    Completed {
        message: Option<String>,
        #[serde(rename = "txHash")]
        tx_hash: Option<TxHash>,
    },
    Error {
        message: Option<String>,
        #[serde(rename = "txHash")]
        tx_hash: Option<TxHash>,
    },
}

impl PublishStatus {
    pub fn publishing(message: &str) -> Self {
        Self::Publishing {
            message: Some(message.to_string()),
        }
    }

    pub fn confirming(tx_hash: TxHash) -> Self {
        Self::Confirming {
            message: Some(MSG_WAITING_CONFIRMATION.to_string()),
            tx_hash: Some(tx_hash),
        }
    }

    pub fn completed(tx_hash: TxHash) -> Self {
        Self::Completed {
            message: Some(MSG_PUBLISHED.to_string()),
            tx_hash: Some(tx_hash),
        }
    }

    pub fn error(message: impl Into<String>, tx_hash: Option<TxHash>) -> Self {
        Self::Error {
            message: Some(message.into()),
            tx_hash,
        }
    }

    /// Lowercase state name, as shown to the user.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Publishing { .. } => "publishing",
            Self::Confirming { .. } => "confirming",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Publishing { message }
            | Self::Confirming { message, .. }
            | Self::Completed { message, .. }
            | Self::Error { message, .. } => message.as_deref(),
        }
    }

    pub fn tx_hash(&self) -> Option<&TxHash> {
        match self {
            Self::Idle | Self::Publishing { .. } => None,
            Self::Confirming { tx_hash, .. }
            | Self::Completed { tx_hash, .. }
            | Self::Error { tx_hash, .. } => tx_hash.as_ref(),
        }
    }

    /// A run is underway and must not be started again.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Publishing { .. } | Self::Confirming { .. })
    }

    pub fn can_transition_to(&self, next: &PublishStatus) -> bool {
        use PublishStatus::*;
        matches!(
            (self, next),
            (_, Error { .. })
                | (Idle | Error { .. } | Completed { .. } | Publishing { .. }, Publishing { .. })
                | (Publishing { .. }, Confirming { .. })
                | (Confirming { .. }, Completed { .. })
        )
    }
}

/// Single owner of the current status; the UI subscribes to changes.
#[derive(Debug)]
pub struct StatusTracker {
    tx: watch::Sender<PublishStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(PublishStatus::Idle);
        Self { tx }
    }

    pub fn current(&self) -> PublishStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PublishStatus> {
        self.tx.subscribe()
    }

    /// Start a run by moving to `next`, unless a run is already in flight.
    ///
    /// The check and the update happen under the channel's write lock, so two
    /// callers can never both start. On refusal the blocking status is returned.
    pub fn begin(&self, next: PublishStatus) -> Result<(), PublishStatus> {
        let mut blocked = None;
        self.tx.send_if_modified(|current| {
            if current.is_in_flight() {
                blocked = Some(current.clone());
                return false;
            }
            tracing::debug!(from = current.name(), to = next.name(), message = ?next.message(), "Publish run started");
            *current = next;
            true
        });
        blocked.map_or(Ok(()), Err)
    }

    /// Move to `next` if the transition is allowed. Returns whether it was applied.
    pub fn advance(&self, next: PublishStatus) -> bool {
        let current = self.current();
        if !current.can_transition_to(&next) {
            tracing::warn!(from = current.name(), to = next.name(), "Ignoring invalid status transition");
            return false;
        }
        tracing::debug!(from = current.name(), to = next.name(), message = ?next.message(), "Publish status changed");
        self.tx.send_replace(next);
        true
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
