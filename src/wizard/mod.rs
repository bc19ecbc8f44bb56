//! Three-step publish wizard.
//!
//! # Steps
//! ```text
//! 1. Connect Wallet ──select──▶ 2. Create Master Key ──next (key exists)──▶ 3. Publish DID
//!        ◀──────────────previous──────────────┘◀──────────────previous──────────┘
//! ```
//!
//! The wizard only sequences user actions and renders state; the work is done
//! by the session, the DID agent and the publisher.

pub mod view;

use thiserror::Error;

use crate::chain::confirm::Confirmation;
use crate::chain::types::{WalletDescriptor, WalletError};
use crate::chain::wallet::WalletConnector;
use crate::identity::{Did, DidAgent, DidError};
use crate::lifecycle::Shutdown;
use crate::publish::{PublishError, Publisher, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ConnectWallet,
    CreateMasterKey,
    PublishDid,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::ConnectWallet, Step::CreateMasterKey, Step::PublishDid];

    pub fn index(self) -> usize {
        match self {
            Step::ConnectWallet => 0,
            Step::CreateMasterKey => 1,
            Step::PublishDid => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::ConnectWallet => "Connect Wallet",
            Step::CreateMasterKey => "Create Master Key",
            Step::PublishDid => "Publish DID",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::ConnectWallet => "Select your wallet to begin",
            Step::CreateMasterKey => "Generate your Prism DID master key",
            Step::PublishDid => "Publish your DID to the blockchain",
        }
    }

    pub fn next(self) -> Option<Step> {
        Step::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Step::ALL[i])
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Create a master key before continuing")]
    KeyRequired,

    #[error("Already on the last step")]
    LastStep,

    #[error("Already on the first step")]
    FirstStep,

    #[error("This action belongs to the '{0}' step")]
    WrongStep(&'static str),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Did(#[from] DidError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Wizard state for one session.
pub struct Wizard {
    step: Step,
    session: Session,
    wallets: Vec<WalletDescriptor>,
    shutdown: Shutdown,
}

impl Wizard {
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            step: Step::ConnectWallet,
            session: Session::new(),
            wallets: Vec::new(),
            shutdown,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn wallets(&self) -> &[WalletDescriptor] {
        &self.wallets
    }

    /// Refresh the list of wallets offered on the first step.
    pub async fn load_wallets(
        &mut self,
        connector: &dyn WalletConnector,
    ) -> Result<&[WalletDescriptor], WizardError> {
        self.wallets = connector.available_wallets().await?;
        Ok(&self.wallets)
    }

    /// Connect `name` and move on to key creation.
    pub async fn select_wallet(
        &mut self,
        connector: &dyn WalletConnector,
        name: &str,
    ) -> Result<(), WizardError> {
        self.session.connect_wallet(connector, name).await?;
        self.step = Step::CreateMasterKey;
        Ok(())
    }

    pub async fn create_master_key(&mut self, agent: &dyn DidAgent) -> Result<&Did, WizardError> {
        if self.step != Step::CreateMasterKey {
            return Err(WizardError::WrongStep(Step::CreateMasterKey.title()));
        }
        Ok(self.session.create_master_key(agent).await?)
    }

    /// Advance one step. Requires a master key.
    pub fn next(&mut self) -> Result<Step, WizardError> {
        let next = self.step.next().ok_or(WizardError::LastStep)?;
        if self.session.master_key().is_none() {
            return Err(WizardError::KeyRequired);
        }
        self.step = next;
        Ok(next)
    }

    pub fn previous(&mut self) -> Result<Step, WizardError> {
        let previous = self.step.previous().ok_or(WizardError::FirstStep)?;
        self.step = previous;
        Ok(previous)
    }

    pub fn can_go_next(&self) -> bool {
        self.step.next().is_some() && self.session.master_key().is_some()
    }

    /// Publish the session's DID. Cancelled when the wizard is closed.
    pub async fn publish(&self, publisher: &Publisher) -> Result<Confirmation, WizardError> {
        if self.step != Step::PublishDid {
            return Err(WizardError::WrongStep(Step::PublishDid.title()));
        }
        let mut shutdown = self.shutdown.subscribe();
        Ok(publisher.publish(&self.session, &mut shutdown).await?)
    }

    /// Cancel pending waits and end the session.
    pub fn close(self) {
        self.shutdown.trigger();
        self.session.end();
    }
}
