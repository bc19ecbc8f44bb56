//! Publish workflow orchestration.
//!
//! # Steps
//! ```text
//! preconditions (key, wallet, DID)      ── fail → Err(Precondition), status untouched
//! DID not published yet, no run in flight ── fail → Err, status untouched
//!     → agent: anchoring payload         status: publishing "Creating DID operation..."
//!     → chunk into { v, c }
//!     → wallet: build / sign / submit    status: publishing "Building and signing transaction..."
//!     →                                  status: confirming (tx hash)
//!     → poller: wait for the indexer
//!     →                                  status: completed
//! any failure after the preconditions    status: error (message, tx hash if submitted)
//! ```
//!
//! Steps run strictly in sequence. Nothing is rolled back: a submitted
//! transaction stays submitted even if confirmation fails.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::Instrument;

use crate::chain::confirm::{Confirmation, ConfirmationPoller, PollError, PollPolicy};
use crate::chain::indexer::TxIndexer;
use crate::chain::metadata::{ChunkError, MetadataBody};
use crate::chain::transaction::TxBuilder;
use crate::chain::types::{TxHash, WalletError};
use crate::chain::wallet::WalletHandle;
use crate::config::PublisherConfig;
use crate::identity::{Did, DidAgent, DidError, MasterKey};
use crate::observability::metrics;
use crate::publish::session::Session;
use crate::publish::status::{PublishStatus, StatusTracker, MSG_BUILDING_TX, MSG_CREATING_OPERATION};

/// Something the user must do before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Precondition {
    #[error("Please create a master key first")]
    MasterKey,

    #[error("Please connect a wallet first")]
    Wallet,

    #[error("Please create a DID first")]
    Did,

    #[error("This DID has already been published")]
    AlreadyPublished,
}

#[derive(Debug, Error)]
pub enum PublishError {
    /// Rejected before anything ran; status is left unchanged.
    #[error(transparent)]
    Precondition(#[from] Precondition),

    #[error("A publish is already in progress")]
    InProgress,

    #[error(transparent)]
    Did(#[from] DidError),

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

/// Runs the publish workflow and owns the published status.
pub struct Publisher {
    agent: Arc<dyn DidAgent>,
    tx_builder: TxBuilder,
    poller: ConfirmationPoller,
    metadata_version: u32,
    chunk_size: usize,
    status: StatusTracker,
    published: Mutex<HashSet<Did>>,
}

impl Publisher {
    pub fn new(
        agent: Arc<dyn DidAgent>,
        tx_builder: TxBuilder,
        poller: ConfirmationPoller,
        metadata_version: u32,
        chunk_size: usize,
    ) -> Self {
        Self {
            agent,
            tx_builder,
            poller,
            metadata_version,
            chunk_size,
            status: StatusTracker::new(),
            published: Mutex::new(HashSet::new()),
        }
    }

    /// Wire a publisher from configuration.
    pub fn from_config(
        config: &PublisherConfig,
        agent: Arc<dyn DidAgent>,
        indexer: Arc<dyn TxIndexer>,
    ) -> Self {
        Self::new(
            agent,
            TxBuilder::new(&config.publish),
            ConfirmationPoller::new(indexer, PollPolicy::from(&config.poller)),
            config.publish.metadata_version,
            config.publish.chunk_size,
        )
    }

    pub fn status(&self) -> PublishStatus {
        self.status.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<PublishStatus> {
        self.status.subscribe()
    }

    /// Whether `did` was anchored by this publisher.
    pub fn is_published(&self, did: &Did) -> bool {
        self.published_dids().contains(did)
    }

    fn published_dids(&self) -> MutexGuard<'_, HashSet<Did>> {
        self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the session's DID and wait for the transaction to confirm.
    pub async fn publish(
        &self,
        session: &Session,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<Confirmation, PublishError> {
        let (master_key, did) = match check_preconditions(session) {
            Ok(ready) => ready,
            Err(missing) => {
                metrics::record_publish("rejected");
                tracing::info!(session_id = %session.id(), missing = %missing, "Publish rejected");
                return Err(missing.into());
            }
        };

        {
            // Held across both checks; a finishing run records its DID under
            // this lock before it leaves the in-flight states.
            let published = self.published_dids();
            if published.contains(did) {
                metrics::record_publish("rejected");
                tracing::info!(session_id = %session.id(), did = %did.short_form(), "DID already published");
                return Err(Precondition::AlreadyPublished.into());
            }
            if let Err(running) = self.status.begin(PublishStatus::publishing(MSG_CREATING_OPERATION)) {
                tracing::info!(session_id = %session.id(), status = running.name(), "Publish already in progress");
                return Err(PublishError::InProgress);
            }
        }

        let span = tracing::info_span!("publish", session_id = %session.id(), did = %did.short_form());
        let result = self
            .run(master_key, did, session.wallet(), shutdown)
            .instrument(span)
            .await;

        match &result {
            Ok(_) => metrics::record_publish("completed"),
            Err(e) => {
                let tx_hash = self.status.current().tx_hash().cloned();
                tracing::error!(session_id = %session.id(), error = %e, tx_hash = ?tx_hash, "Publish failed");
                self.status.advance(PublishStatus::error(e.to_string(), tx_hash));
                metrics::record_publish("error");
            }
        }

        result
    }

    async fn run(
        &self,
        master_key: &MasterKey,
        did: &Did,
        wallet: Option<&Arc<dyn WalletHandle>>,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<Confirmation, PublishError> {
        let payload = self.agent.create_atala_object(master_key, did).await?;
        let metadata = MetadataBody::from_payload(self.metadata_version, &payload, self.chunk_size)?;
        tracing::debug!(payload_len = payload.len(), chunks = metadata.c.len(), "Anchoring payload chunked");

        self.status.advance(PublishStatus::publishing(MSG_BUILDING_TX));
        let tx_hash: TxHash = self.tx_builder.submit(wallet, metadata).await?;

        self.status.advance(PublishStatus::confirming(tx_hash.clone()));
        let confirmation = self.poller.wait_for_confirmation(&tx_hash, shutdown).await?;

        self.published_dids().insert(did.clone());
        self.status.advance(PublishStatus::completed(tx_hash));
        Ok(confirmation)
    }
}

fn check_preconditions(session: &Session) -> Result<(&MasterKey, &Did), Precondition> {
    let master_key = session.master_key().ok_or(Precondition::MasterKey)?;
    if !session.is_connected() {
        return Err(Precondition::Wallet);
    }
    let did = session.did().ok_or(Precondition::Did)?;
    Ok((master_key, did))
}
