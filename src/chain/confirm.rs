//! Confirmation polling against the indexer.
//!
//! # Loop
//! ```text
//! wait interval ─▶ lookup ─┬─ Confirmed      → done
//!      ▲                   ├─ NotFound       → wait interval
//!      │                   ├─ Transient err  → wait backoff(streak) ≥ interval
//!      └───────────────────┤
//!                          └─ Permanent err  → Rejected
//! ```
//!
//! Polling stops after `max_attempts` lookups, after `max_elapsed`, or when
//! the shutdown signal fires, whichever comes first.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};

use crate::chain::indexer::TxIndexer;
use crate::chain::types::{IndexerError, TxHash, TxInfo, TxLookup};
use crate::config::PollerConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Bounds for a single confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub max_elapsed: Duration,
    pub max_backoff: Duration,
}

impl From<&PollerConfig> for PollPolicy {
    fn from(config: &PollerConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts,
            max_elapsed: config.max_elapsed(),
            max_backoff: config.max_backoff(),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollerConfig::default())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("Confirmation polling cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("Transaction not confirmed after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("Transaction not confirmed within {} seconds", .elapsed.as_secs())]
    TimedOut { elapsed: Duration },

    #[error(transparent)]
    Rejected(IndexerError),
}

/// A transaction observed on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub attempts: u32,
    pub info: TxInfo,
}

/// Polls the indexer until a transaction shows up.
#[derive(Clone)]
pub struct ConfirmationPoller {
    indexer: Arc<dyn TxIndexer>,
    policy: PollPolicy,
}

impl ConfirmationPoller {
    pub fn new(indexer: Arc<dyn TxIndexer>, policy: PollPolicy) -> Self {
        Self { indexer, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Wait for `tx_hash` to be confirmed.
    ///
    /// The first lookup happens one interval after the call, giving the
    /// transaction time to propagate.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: &TxHash,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<Confirmation, PollError> {
        let started = Instant::now();
        let interval_ms = self.policy.interval.as_millis() as u64;
        let max_backoff_ms = self.policy.max_backoff.as_millis() as u64;

        let mut delay = self.policy.interval;
        let mut transient_streak = 0u32;

        for attempt in 1..=self.policy.max_attempts {
            if started.elapsed() + delay > self.policy.max_elapsed {
                tracing::warn!(tx_hash = %tx_hash, attempts = attempt - 1, "Confirmation deadline reached");
                return Err(PollError::TimedOut {
                    elapsed: started.elapsed(),
                });
            }

            let lookup = tokio::select! {
                result = async {
                    sleep(delay).await;
                    self.indexer.lookup(tx_hash).await
                } => result,
                Ok(()) = shutdown.recv() => {
                    tracing::info!(tx_hash = %tx_hash, attempts = attempt - 1, "Confirmation polling cancelled");
                    return Err(PollError::Cancelled { attempts: attempt - 1 });
                }
            };

            match lookup {
                Ok(TxLookup::Confirmed(info)) => {
                    metrics::record_indexer_poll("confirmed");
                    tracing::info!(
                        tx_hash = %tx_hash,
                        attempts = attempt,
                        block_height = ?info.block_height,
                        "Transaction confirmed"
                    );
                    return Ok(Confirmation {
                        tx_hash: tx_hash.clone(),
                        attempts: attempt,
                        info,
                    });
                }
                Ok(TxLookup::NotFound) => {
                    metrics::record_indexer_poll("pending");
                    tracing::debug!(tx_hash = %tx_hash, attempt, "Transaction not indexed yet");
                    transient_streak = 0;
                    delay = self.policy.interval;
                }
                Err(e) if e.is_transient() => {
                    metrics::record_indexer_poll("transient");
                    transient_streak += 1;
                    delay = calculate_backoff(transient_streak, interval_ms, max_backoff_ms)
                        .max(self.policy.interval);
                    tracing::warn!(
                        tx_hash = %tx_hash,
                        attempt,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Indexer lookup failed, retrying"
                    );
                }
                Err(e) => {
                    metrics::record_indexer_poll("rejected");
                    tracing::error!(tx_hash = %tx_hash, attempt, error = %e, "Indexer rejected lookup");
                    return Err(PollError::Rejected(e));
                }
            }
        }

        Err(PollError::Exhausted {
            attempts: self.policy.max_attempts,
        })
    }
}
