//! Publish workflow tests against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;
use prism_publisher::chain::confirm::{ConfirmationPoller, PollError, PollPolicy};
use prism_publisher::chain::metadata::ChunkError;
use prism_publisher::chain::TxBuilder;
use prism_publisher::config::PublishConfig;
use prism_publisher::chain::types::{IndexerError, TxHash, WalletError};
use prism_publisher::identity::agent::AtalaObject;
use prism_publisher::identity::key::SEED_LEN;
use prism_publisher::identity::{LocalPrismAgent, Seed};
use prism_publisher::lifecycle::Shutdown;
use prism_publisher::publish::{Precondition, PublishError};
use prism_publisher::{PublishStatus, Publisher, PublisherConfig, Session};

mod common;
use common::{MockWallet, ScriptedIndexer};

fn publisher(indexer: Arc<ScriptedIndexer>) -> Publisher {
    Publisher::from_config(
        &PublisherConfig::default(),
        Arc::new(LocalPrismAgent::new()),
        indexer,
    )
}

async fn session_with_key(wallet: Option<Arc<MockWallet>>) -> Session {
    session_with_seed(wallet, 7).await
}

async fn session_with_seed(wallet: Option<Arc<MockWallet>>, seed: u8) -> Session {
    let mut session = Session::new();
    if let Some(wallet) = wallet {
        session.attach_wallet(wallet);
    }
    session
        .create_master_key_from_seed(&LocalPrismAgent::new(), &Seed::from_bytes([seed; SEED_LEN]))
        .await
        .unwrap();
    session
}

#[tokio::test(start_paused = true)]
async fn test_publish_without_wallet_is_rejected() {
    let indexer = ScriptedIndexer::confirms_after(0);
    let publisher = publisher(indexer.clone());
    let session = session_with_key(None).await;
    let shutdown = Shutdown::new();

    let err = publisher
        .publish(&session, &mut shutdown.subscribe())
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Precondition(Precondition::Wallet)));
    assert_eq!(err.to_string(), "Please connect a wallet first");
    assert_eq!(publisher.status(), PublishStatus::Idle);
    assert_eq!(indexer.lookup_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_publish_without_master_key_is_rejected() {
    let wallet = MockWallet::succeeding("abc123");
    let indexer = ScriptedIndexer::confirms_after(0);
    let publisher = publisher(indexer.clone());

    let mut session = Session::new();
    session.attach_wallet(wallet.clone());

    let err = publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Precondition(Precondition::MasterKey)));
    assert_eq!(publisher.status(), PublishStatus::Idle);
    assert!(wallet.built.lock().unwrap().is_empty());
    assert_eq!(*wallet.submitted.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_confirming_is_visible_before_first_poll() {
    let wallet = MockWallet::succeeding("abc123");
    let indexer = ScriptedIndexer::confirms_after(0);
    let publisher = publisher(indexer.clone());
    indexer.watch_status(publisher.subscribe());
    let session = session_with_key(Some(wallet)).await;

    publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap();

    let lookups = indexer.lookups.lock().unwrap();
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].0, TxHash::new("abc123"));
    assert_eq!(lookups[0].1, PublishStatus::confirming(TxHash::new("abc123")));
    assert_eq!(
        lookups[0].1.message(),
        Some("Transaction submitted. Waiting for confirmation...")
    );
}

#[tokio::test(start_paused = true)]
async fn test_not_found_keeps_polling_until_confirmed() {
    let wallet = MockWallet::succeeding("abc123");
    let indexer = ScriptedIndexer::confirms_after(3);
    let publisher = publisher(indexer.clone());
    indexer.watch_status(publisher.subscribe());
    let session = session_with_key(Some(wallet)).await;

    let started = tokio::time::Instant::now();
    let confirmation = publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap();

    assert_eq!(confirmation.attempts, 4);
    assert_eq!(confirmation.info.block_height, Some(10_000_000));
    assert!(started.elapsed() >= std::time::Duration::from_secs(60));

    // Every lookup saw the transaction as still confirming, never as an error.
    for (_, seen) in indexer.lookups.lock().unwrap().iter() {
        assert!(matches!(seen, PublishStatus::Confirming { .. }));
    }

    let status = publisher.status();
    assert_eq!(status, PublishStatus::completed(TxHash::new("abc123")));
    assert_eq!(status.message(), Some("DID successfully published!"));
}

#[tokio::test(start_paused = true)]
async fn test_wallet_failure_stops_before_polling() {
    let wallet = MockWallet::failing_build(WalletError::NotConnected);
    let indexer = ScriptedIndexer::confirms_after(0);
    let publisher = publisher(indexer.clone());
    let session = session_with_key(Some(wallet.clone())).await;

    let err = publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Wallet(WalletError::NotConnected)));
    assert_eq!(
        publisher.status(),
        PublishStatus::error("No wallet connected", None)
    );
    assert_eq!(indexer.lookup_count(), 0);
    assert_eq!(*wallet.submitted.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_submit_failure_reports_wallet_message() {
    let wallet = MockWallet::failing(WalletError::Refused("user declined".into()));
    let indexer = ScriptedIndexer::confirms_after(0);
    let publisher = publisher(indexer.clone());
    let session = session_with_key(Some(wallet)).await;

    publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap_err();

    let status = publisher.status();
    assert_eq!(status.name(), "error");
    assert!(status.message().unwrap().contains("user declined"));
    assert_eq!(status.tx_hash(), None);
    assert_eq!(indexer.lookup_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_lookup_keeps_tx_hash() {
    let wallet = MockWallet::succeeding("abc123");
    let indexer = ScriptedIndexer::new(vec![Err(IndexerError::Permanent {
        status: 403,
        message: "Invalid project token".into(),
    })]);
    let publisher = publisher(indexer.clone());
    let session = session_with_key(Some(wallet)).await;

    let err = publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Poll(PollError::Rejected(_))));
    let status = publisher.status();
    assert_eq!(status.name(), "error");
    assert_eq!(status.tx_hash(), Some(&TxHash::new("abc123")));
}

#[tokio::test(start_paused = true)]
async fn test_published_metadata_carries_anchoring_payload() {
    let wallet = MockWallet::succeeding("abc123");
    let publisher = publisher(ScriptedIndexer::confirms_after(0));
    let session = session_with_key(Some(wallet.clone())).await;

    publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap();

    let built = wallet.built.lock().unwrap();
    assert_eq!(built.len(), 1);
    let request = &built[0];

    assert_eq!(request.metadata_label, 21325);
    assert_eq!(request.outputs.len(), 1);
    assert_eq!(request.outputs[0].address.as_str(), "addr1qmockchange");
    assert_eq!(request.outputs[0].lovelace, 1_000_000);

    assert_eq!(request.metadata.v, 1);
    assert!(request.metadata.c.len() > 1);
    assert!(request.metadata.c.iter().all(|c| !c.is_empty() && c.len() <= 64));

    let object = AtalaObject::from_bytes(&request.metadata.reassemble()).unwrap();
    assert_eq!(object.operations.len(), 1);
    assert_eq!(object.operations[0].signed_with, "master0");
}

#[tokio::test(start_paused = true)]
async fn test_second_publish_while_confirming_is_refused() {
    let wallet = MockWallet::succeeding("abc123");
    let publisher = publisher(ScriptedIndexer::confirms_after(1));
    let session = session_with_key(Some(wallet.clone())).await;
    let shutdown = Shutdown::new();
    let mut first_rx = shutdown.subscribe();
    let mut second_rx = shutdown.subscribe();
    let mut updates = publisher.subscribe();

    let (first, second) = tokio::join!(publisher.publish(&session, &mut first_rx), async {
        updates
            .wait_for(|s| matches!(s, PublishStatus::Confirming { .. }))
            .await
            .unwrap();
        publisher.publish(&session, &mut second_rx).await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(PublishError::InProgress)));
    assert_eq!(*wallet.submitted.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_completed_publish_cannot_be_repeated() {
    let wallet = MockWallet::succeeding("abc123");
    let publisher = publisher(ScriptedIndexer::confirms_after(0));
    let session = session_with_key(Some(wallet)).await;
    let shutdown = Shutdown::new();

    publisher.publish(&session, &mut shutdown.subscribe()).await.unwrap();
    let err = publisher
        .publish(&session, &mut shutdown.subscribe())
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Precondition(Precondition::AlreadyPublished)));
    assert_eq!(publisher.status().name(), "completed");
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_error_succeeds() {
    let wallet = MockWallet::failing_build(WalletError::Transport("bridge offline".into()));
    let publisher = publisher(ScriptedIndexer::confirms_after(0));
    let session = session_with_key(Some(wallet)).await;
    let shutdown = Shutdown::new();

    assert!(publisher.publish(&session, &mut shutdown.subscribe()).await.is_err());
    assert_eq!(publisher.status().name(), "error");

    publisher.publish(&session, &mut shutdown.subscribe()).await.unwrap();
    assert_eq!(publisher.status(), PublishStatus::completed(TxHash::new("abc123")));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_confirmation() {
    let wallet = MockWallet::succeeding("abc123");
    let indexer = ScriptedIndexer::new(vec![]);
    let publisher = publisher(indexer.clone());
    let session = session_with_key(Some(wallet)).await;
    let shutdown = Shutdown::new();
    let mut rx = shutdown.subscribe();
    let mut updates = publisher.subscribe();

    let (result, _) = tokio::join!(publisher.publish(&session, &mut rx), async {
        updates
            .wait_for(|s| matches!(s, PublishStatus::Confirming { .. }))
            .await
            .unwrap();
        shutdown.trigger();
    });

    assert!(matches!(
        result,
        Err(PublishError::Poll(PollError::Cancelled { attempts: 0 }))
    ));
    assert_eq!(indexer.lookup_count(), 0);
    let status = publisher.status();
    assert_eq!(status.name(), "error");
    assert_eq!(status.tx_hash(), Some(&TxHash::new("abc123")));
}

#[tokio::test(start_paused = true)]
async fn test_chunk_size_above_ledger_limit_fails_before_wallet() {
    let wallet = MockWallet::succeeding("abc123");
    let indexer = ScriptedIndexer::confirms_after(0);
    let publisher = Publisher::new(
        Arc::new(LocalPrismAgent::new()),
        TxBuilder::new(&PublishConfig::default()),
        ConfirmationPoller::new(indexer.clone(), PollPolicy::default()),
        1,
        100,
    );
    let session = session_with_key(Some(wallet.clone())).await;

    let err = publisher
        .publish(&session, &mut Shutdown::new().subscribe())
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Chunk(ChunkError::ChunkSizeTooLarge(100))));
    assert_eq!(publisher.status().name(), "error");
    assert!(wallet.built.lock().unwrap().is_empty());
    assert_eq!(indexer.lookup_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_new_did_can_be_published_after_completion() {
    let indexer = ScriptedIndexer::new(vec![
        Ok(prism_publisher::chain::TxLookup::Confirmed(Default::default())),
        Ok(prism_publisher::chain::TxLookup::Confirmed(Default::default())),
    ]);
    let publisher = publisher(indexer);
    let first = session_with_seed(Some(MockWallet::succeeding("abc123")), 7).await;
    let second = session_with_seed(Some(MockWallet::succeeding("def456")), 8).await;
    let shutdown = Shutdown::new();

    publisher.publish(&first, &mut shutdown.subscribe()).await.unwrap();
    assert!(publisher.is_published(first.did().unwrap()));
    assert!(!publisher.is_published(second.did().unwrap()));

    publisher.publish(&second, &mut shutdown.subscribe()).await.unwrap();
    assert_eq!(publisher.status(), PublishStatus::completed(TxHash::new("def456")));

    let err = publisher
        .publish(&first, &mut shutdown.subscribe())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Precondition(Precondition::AlreadyPublished)));
    assert_eq!(publisher.status().tx_hash(), Some(&TxHash::new("def456")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishes_start_one_run() {
    let wallet = MockWallet::succeeding("abc123");
    let publisher = Arc::new(Publisher::new(
        Arc::new(LocalPrismAgent::new()),
        TxBuilder::new(&PublishConfig::default()),
        ConfirmationPoller::new(
            ScriptedIndexer::confirms_after(1),
            PollPolicy {
                interval: Duration::from_millis(10),
                max_attempts: 10,
                max_elapsed: Duration::from_secs(5),
                max_backoff: Duration::from_millis(50),
            },
        ),
        1,
        64,
    ));
    let session = Arc::new(session_with_key(Some(wallet.clone())).await);
    let shutdown = Shutdown::new();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let publisher = publisher.clone();
        let session = session.clone();
        let mut rx = shutdown.subscribe();
        handles.push(tokio::spawn(async move { publisher.publish(&session, &mut rx).await }));
    }

    let mut completed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => completed += 1,
            Err(PublishError::InProgress)
            | Err(PublishError::Precondition(Precondition::AlreadyPublished)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(completed, 1);
    assert_eq!(*wallet.submitted.lock().unwrap(), 1);
    assert_eq!(publisher.status(), PublishStatus::completed(TxHash::new("abc123")));
}
