//! Per-run session state.
//!
//! A session holds everything one wizard run creates: the connected wallet,
//! the master key and its DID. Nothing outlives it; ending the session drops
//! the key, which wipes the secret scalar.

use std::sync::Arc;
use uuid::Uuid;

use crate::chain::types::WalletError;
use crate::chain::wallet::{WalletConnector, WalletHandle};
use crate::identity::{Did, DidAgent, DidError, MasterKey, Seed};

pub struct Session {
    id: Uuid,
    wallet: Option<Arc<dyn WalletHandle>>,
    master_key: Option<MasterKey>,
    did: Option<Did>,
}

impl Session {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, "Session started");
        Self {
            id,
            wallet: None,
            master_key: None,
            did: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Connect the named wallet through `connector`, replacing any previous one.
    pub async fn connect_wallet(
        &mut self,
        connector: &dyn WalletConnector,
        name: &str,
    ) -> Result<(), WalletError> {
        let handle = connector.connect(name).await?;
        self.attach_wallet(handle);
        Ok(())
    }

    pub fn attach_wallet(&mut self, handle: Arc<dyn WalletHandle>) {
        tracing::info!(session_id = %self.id, wallet = %handle.name(), "Wallet attached to session");
        self.wallet = Some(handle);
    }

    pub fn wallet(&self) -> Option<&Arc<dyn WalletHandle>> {
        self.wallet.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.is_some()
    }

    /// Generate a fresh master key from OS randomness and derive its DID.
    pub async fn create_master_key(&mut self, agent: &dyn DidAgent) -> Result<&Did, DidError> {
        let seed = Seed::random();
        self.create_master_key_from_seed(agent, &seed).await
    }

    /// Derive the master key and DID from a caller-supplied seed.
    pub async fn create_master_key_from_seed(
        &mut self,
        agent: &dyn DidAgent,
        seed: &Seed,
    ) -> Result<&Did, DidError> {
        let key = agent.create_master_key(seed)?;
        let did = agent.create_did(&key.public_key()).await?;

        tracing::info!(session_id = %self.id, did = %did.short_form(), "Master key created");

        self.master_key = Some(key);
        let did = self.did.insert(did);
        Ok(&*did)
    }

    pub fn master_key(&self) -> Option<&MasterKey> {
        self.master_key.as_ref()
    }

    pub fn did(&self) -> Option<&Did> {
        self.did.as_ref()
    }

    pub fn short_form_did(&self) -> Option<Did> {
        self.did.as_ref().map(Did::short_form)
    }

    /// End the session, dropping key material and the wallet handle.
    pub fn end(mut self) {
        let had_key = self.master_key.take().is_some();
        self.wallet = None;
        tracing::debug!(session_id = %self.id, had_key, "Session ended");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("wallet", &self.wallet.as_ref().map(|w| w.name()))
            .field("has_master_key", &self.master_key.is_some())
            .field("did", &self.did)
            .finish()
    }
}
