//! Publish transaction building, signing and submission.
//!
//! # Responsibilities
//! - Send the minimum output back to the wallet's own change address
//! - Attach the chunked metadata under the application label
//! - Drive the wallet through build → sign → submit
//!
//! Submission is irreversible; there is no local undo once a hash is returned.

use std::sync::Arc;

use crate::chain::metadata::MetadataBody;
use crate::chain::types::{TxHash, TxOutput, TxRequest, WalletError};
use crate::chain::wallet::WalletHandle;
use crate::config::PublishConfig;
use crate::observability::metrics;

/// Transaction builder for metadata-carrying self payments.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    metadata_label: u64,
    min_lovelace: u64,
}

impl TxBuilder {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            metadata_label: config.metadata_label,
            min_lovelace: config.min_lovelace,
        }
    }

    pub fn metadata_label(&self) -> u64 {
        self.metadata_label
    }

    /// Build the request the wallet will balance: one self payment plus metadata.
    pub async fn request(
        &self,
        wallet: &dyn WalletHandle,
        metadata: MetadataBody,
    ) -> Result<TxRequest, WalletError> {
        let change_address = wallet.change_address().await?;

        Ok(TxRequest {
            outputs: vec![TxOutput {
                address: change_address,
                lovelace: self.min_lovelace,
            }],
            metadata_label: self.metadata_label,
            metadata,
        })
    }

    /// Build, sign and submit the publish transaction.
    ///
    /// # Arguments
    /// * `wallet` - Connected wallet, `None` fails with [`WalletError::NotConnected`]
    /// * `metadata` - Chunked payload to attach
    pub async fn submit(
        &self,
        wallet: Option<&Arc<dyn WalletHandle>>,
        metadata: MetadataBody,
    ) -> Result<TxHash, WalletError> {
        let wallet = wallet.ok_or(WalletError::NotConnected)?;

        let chunks = metadata.c.len();
        let request = self.request(wallet.as_ref(), metadata).await?;

        let unsigned = wallet.build_tx(&request).await?;
        tracing::debug!(
            wallet = %wallet.name(),
            label = self.metadata_label,
            chunks,
            "Transaction built"
        );

        let signed = wallet.sign_tx(&unsigned).await?;
        let tx_hash = wallet.submit_tx(&signed).await?;

        metrics::record_tx_submitted();
        tracing::info!(tx_hash = %tx_hash, wallet = %wallet.name(), "Transaction submitted");

        Ok(tx_hash)
    }
}
