//! Wallet connector seam and the HTTP wallet bridge.
//!
//! # Security
//! - Signing happens inside the user's wallet; no spending key ever enters this process
//! - The bridge only relays unsigned and signed transaction bodies
//!
//! # Bridge protocol
//! ```text
//! GET  /wallets                        → [WalletDescriptor]
//! POST /wallets/{name}/enable          → { "enabled": bool }
//! GET  /wallets/{name}/change-address  → { "address": "addr1..." }
//! POST /wallets/{name}/build   TxRequest  → UnsignedTx
//! POST /wallets/{name}/sign    UnsignedTx → SignedTx
//! POST /wallets/{name}/submit  SignedTx   → { "tx_hash": "..." }
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::chain::types::{Address, SignedTx, TxHash, TxRequest, UnsignedTx, WalletDescriptor, WalletError};
use crate::config::WalletConfig;

/// Discovers and connects wallets.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// List the wallets the user can pick from.
    async fn available_wallets(&self) -> Result<Vec<WalletDescriptor>, WalletError>;

    /// Connect the wallet with the given name.
    async fn connect(&self, name: &str) -> Result<Arc<dyn WalletHandle>, WalletError>;
}

/// A connected wallet.
#[async_trait]
pub trait WalletHandle: Send + Sync {
    fn name(&self) -> &str;

    async fn change_address(&self) -> Result<Address, WalletError>;

    /// Balance and build an unsigned transaction for `request`.
    async fn build_tx(&self, request: &TxRequest) -> Result<UnsignedTx, WalletError>;

    async fn sign_tx(&self, tx: &UnsignedTx) -> Result<SignedTx, WalletError>;

    async fn submit_tx(&self, tx: &SignedTx) -> Result<TxHash, WalletError>;
}

/// Connector talking to a local wallet bridge over HTTP.
#[derive(Clone)]
pub struct HttpWalletBridge {
    client: Client,
    base_url: Url,
}

impl HttpWalletBridge {
    /// Create a bridge client from configuration.
    pub fn new(config: &WalletConfig) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| WalletError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.bridge_url)
            .map_err(|e| WalletError::Transport(format!("Invalid bridge URL '{}': {}", config.bridge_url, e)))?;

        Ok(Self { client, base_url })
    }
}

/// Append `segments` to `base`, percent-encoding each one.
///
/// Wallet names are user input; a `/`, `?` or `#` in a name stays inside its segment.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, WalletError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| WalletError::Transport(format!("Bridge URL '{}' cannot take a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Deserialize)]
struct EnableResponse {
    enabled: bool,
}

#[async_trait]
impl WalletConnector for HttpWalletBridge {
    async fn available_wallets(&self) -> Result<Vec<WalletDescriptor>, WalletError> {
        let res = self
            .client
            .get(endpoint(&self.base_url, &["wallets"])?)
            .send()
            .await
            .map_err(transport)?;
        decode(res).await
    }

    async fn connect(&self, name: &str) -> Result<Arc<dyn WalletHandle>, WalletError> {
        let res = self
            .client
            .post(endpoint(&self.base_url, &["wallets", name, "enable"])?)
            .send()
            .await
            .map_err(transport)?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(WalletError::UnknownWallet(name.to_string()));
        }
        let enable: EnableResponse = decode(res).await?;
        if !enable.enabled {
            return Err(WalletError::Refused(format!("user did not enable '{}'", name)));
        }

        tracing::info!(wallet = %name, "Wallet connected");

        Ok(Arc::new(BridgeWallet {
            client: self.client.clone(),
            base_url: endpoint(&self.base_url, &["wallets", name])?,
            name: name.to_string(),
        }))
    }
}

/// Wallet handle backed by the bridge.
struct BridgeWallet {
    client: Client,
    base_url: Url,
    name: String,
}

#[derive(Deserialize)]
struct AddressResponse {
    address: Address,
}

#[derive(Deserialize)]
struct SubmitResponse {
    tx_hash: TxHash,
}

#[async_trait]
impl WalletHandle for BridgeWallet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn change_address(&self) -> Result<Address, WalletError> {
        let res = self
            .client
            .get(endpoint(&self.base_url, &["change-address"])?)
            .send()
            .await
            .map_err(transport)?;
        let body: AddressResponse = decode(res).await?;
        Ok(body.address)
    }

    async fn build_tx(&self, request: &TxRequest) -> Result<UnsignedTx, WalletError> {
        let res = self
            .client
            .post(endpoint(&self.base_url, &["build"])?)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        decode(res).await
    }

    async fn sign_tx(&self, tx: &UnsignedTx) -> Result<SignedTx, WalletError> {
        let res = self
            .client
            .post(endpoint(&self.base_url, &["sign"])?)
            .json(tx)
            .send()
            .await
            .map_err(transport)?;
        decode(res).await
    }

    async fn submit_tx(&self, tx: &SignedTx) -> Result<TxHash, WalletError> {
        let res = self
            .client
            .post(endpoint(&self.base_url, &["submit"])?)
            .json(tx)
            .send()
            .await
            .map_err(transport)?;
        let body: SubmitResponse = decode(res).await?;
        Ok(body.tx_hash)
    }
}

fn transport(e: reqwest::Error) -> WalletError {
    WalletError::Transport(e.to_string())
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, WalletError> {
    let status = res.status();
    if status.is_success() {
        return res
            .json::<T>()
            .await
            .map_err(|e| WalletError::Transport(format!("Malformed bridge response: {}", e)));
    }

    let text = res.text().await.unwrap_or_default();
    match status {
        StatusCode::FORBIDDEN => Err(WalletError::Refused(text)),
        StatusCode::UNAUTHORIZED => Err(WalletError::NotConnected),
        s if s.is_server_error() => Err(WalletError::Transport(format!("bridge returned {}: {}", s, text))),
        s => Err(WalletError::Wallet(format!("bridge returned {}: {}", s, text))),
    }
}
