//! Shared utilities for integration testing.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use prism_publisher::chain::indexer::TxIndexer;
use prism_publisher::chain::types::{
    Address, IndexerError, SignedTx, TxHash, TxInfo, TxLookup, TxRequest, UnsignedTx,
    WalletDescriptor, WalletError,
};
use prism_publisher::chain::wallet::{WalletConnector, WalletHandle};
use prism_publisher::PublishStatus;

/// A request as seen by the programmable backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// The handler sees every request and returns `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// Indexer that replays a script and records the status seen at each lookup.
pub struct ScriptedIndexer {
    script: Mutex<VecDeque<Result<TxLookup, IndexerError>>>,
    pub lookups: Mutex<Vec<(TxHash, PublishStatus)>>,
    status: Mutex<Option<watch::Receiver<PublishStatus>>>,
}

impl ScriptedIndexer {
    pub fn new(script: Vec<Result<TxLookup, IndexerError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            lookups: Mutex::new(Vec::new()),
            status: Mutex::new(None),
        })
    }

    /// `n` not-found answers followed by a confirmation.
    pub fn confirms_after(n: usize) -> Arc<Self> {
        let mut script: Vec<_> = (0..n).map(|_| Ok(TxLookup::NotFound)).collect();
        script.push(Ok(TxLookup::Confirmed(TxInfo {
            block: Some("blockhash".into()),
            block_height: Some(10_000_000),
            block_time: None,
        })));
        Self::new(script)
    }

    pub fn watch_status(&self, rx: watch::Receiver<PublishStatus>) {
        *self.status.lock().unwrap() = Some(rx);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl TxIndexer for ScriptedIndexer {
    async fn lookup(&self, tx_hash: &TxHash) -> Result<TxLookup, IndexerError> {
        let seen = self
            .status
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| rx.borrow().clone())
            .unwrap_or_default();
        self.lookups.lock().unwrap().push((tx_hash.clone(), seen));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TxLookup::NotFound))
    }
}

/// In-memory wallet with a configurable submit outcome.
pub struct MockWallet {
    pub name: String,
    pub submit_results: Mutex<VecDeque<Result<TxHash, WalletError>>>,
    pub build_error: Mutex<Option<WalletError>>,
    pub built: Mutex<Vec<TxRequest>>,
    pub submitted: Mutex<usize>,
}

impl MockWallet {
    pub fn succeeding(hash: &str) -> Arc<Self> {
        Self::with_result(Ok(TxHash::new(hash)))
    }

    pub fn failing(err: WalletError) -> Arc<Self> {
        Self::with_result(Err(err))
    }

    /// Wallet that accepts one submission per hash, in order.
    pub fn succeeding_many(hashes: &[&str]) -> Arc<Self> {
        let wallet = Self::succeeding(hashes[0]);
        wallet
            .submit_results
            .lock()
            .unwrap()
            .extend(hashes[1..].iter().map(|h| Ok(TxHash::new(*h))));
        wallet
    }

    /// Wallet whose transaction builder fails with `err`.
    pub fn failing_build(err: WalletError) -> Arc<Self> {
        let wallet = Self::succeeding("abc123");
        *wallet.build_error.lock().unwrap() = Some(err);
        wallet
    }

    fn with_result(result: Result<TxHash, WalletError>) -> Arc<Self> {
        Arc::new(Self {
            name: "mockwallet".to_string(),
            submit_results: Mutex::new(VecDeque::from([result])),
            build_error: Mutex::new(None),
            built: Mutex::new(Vec::new()),
            submitted: Mutex::new(0),
        })
    }
}

#[async_trait]
impl WalletHandle for MockWallet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn change_address(&self) -> Result<Address, WalletError> {
        Ok(Address::new("addr1qmockchange"))
    }

    async fn build_tx(&self, request: &TxRequest) -> Result<UnsignedTx, WalletError> {
        if let Some(err) = self.build_error.lock().unwrap().take() {
            return Err(err);
        }
        self.built.lock().unwrap().push(request.clone());
        Ok(UnsignedTx {
            cbor_hex: "84a400".to_string(),
        })
    }

    async fn sign_tx(&self, tx: &UnsignedTx) -> Result<SignedTx, WalletError> {
        Ok(SignedTx {
            cbor_hex: format!("{}a100", tx.cbor_hex),
        })
    }

    async fn submit_tx(&self, _tx: &SignedTx) -> Result<TxHash, WalletError> {
        *self.submitted.lock().unwrap() += 1;
        self.submit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WalletError::Wallet("already submitted".into())))
    }
}

/// Connector offering a single mock wallet.
pub struct MockConnector {
    pub wallet: Arc<MockWallet>,
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn available_wallets(&self) -> Result<Vec<WalletDescriptor>, WalletError> {
        Ok(vec![WalletDescriptor {
            name: self.wallet.name.clone(),
            icon: None,
            version: Some("1.0".into()),
        }])
    }

    async fn connect(&self, name: &str) -> Result<Arc<dyn WalletHandle>, WalletError> {
        if name != self.wallet.name {
            return Err(WalletError::UnknownWallet(name.to_string()));
        }
        Ok(self.wallet.clone())
    }
}
