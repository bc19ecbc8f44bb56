//! Prism DID publisher (terminal wizard)
//!
//! # Architecture Overview
//!
//! ```text
//!   user ──commands──▶ wizard ──▶ session ──▶ DID agent (key, DID, payload)
//!                        │
//!                        ▼
//!                    publisher ──▶ metadata chunks ──▶ tx builder ──▶ wallet bridge ──▶ ledger
//!                        │
//!                        ▼
//!                  confirmation poller ──▶ indexer (GET /txs/{hash})
//!                        │
//!                        ▼
//!                   PublishStatus (watch) ──▶ status lines on screen
//! ```

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use prism_publisher::chain::{BlockfrostClient, HttpWalletBridge, TxIndexer};
use prism_publisher::config::load_or_default;
use prism_publisher::identity::{DidAgent, LocalPrismAgent};
use prism_publisher::lifecycle::{signals, Shutdown};
use prism_publisher::observability::{logging, metrics};
use prism_publisher::wizard::{view, Wizard};
use prism_publisher::Publisher;

const HELP: &str = "\
Commands:
  wallets            reload the wallet list
  connect <name>     connect a wallet (step 1)
  create-key         generate the master key and DID (step 2)
  next | previous    move between steps
  publish            publish the DID (step 3)
  status             print the publish status as JSON
  help               show this help
  quit               leave the wizard";

#[derive(Parser)]
#[command(name = "prism-publisher")]
#[command(about = "Publish a Prism DID through your wallet", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!("prism-publisher v0.1.0 starting");
    tracing::info!(
        indexer = %config.indexer.base_url,
        wallet_bridge = %config.wallet.bridge_url,
        poll_interval_secs = config.poller.interval_secs,
        max_attempts = config.poller.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let indexer: Arc<dyn TxIndexer> = Arc::new(BlockfrostClient::from_env(&config.indexer)?);
    let bridge = HttpWalletBridge::new(&config.wallet)?;
    let agent: Arc<dyn DidAgent> = Arc::new(LocalPrismAgent::new());
    let publisher = Publisher::from_config(&config, agent.clone(), indexer);
    let explorer = config.indexer.explorer_tx_url.clone();

    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c_handler(shutdown.clone());
    let mut exit = shutdown.subscribe();

    let mut wizard = Wizard::new(shutdown.clone());
    if let Err(e) = wizard.load_wallets(&bridge).await {
        tracing::warn!(error = %e, "Could not list wallets");
    }

    println!("{}", HELP);
    println!("\n{}", view::render(&wizard, &publisher.status(), &explorer));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = exit.recv() => break,
        };
        let Some(line) = line else { break };

        let mut words = line.split_whitespace();
        let outcome = match words.next() {
            None => continue,
            Some("wallets") => wizard.load_wallets(&bridge).await.map(|_| ()),
            Some("connect") => match words.next() {
                Some(name) => wizard.select_wallet(&bridge, name).await,
                None => {
                    println!("Usage: connect <name>");
                    continue;
                }
            },
            Some("create-key") => wizard.create_master_key(agent.as_ref()).await.map(|_| ()),
            Some("next") => wizard.next().map(|_| ()),
            Some("previous") | Some("back") => wizard.previous().map(|_| ()),
            Some("publish") => {
                let mut updates = publisher.subscribe();
                let explorer = explorer.clone();
                let printer = tokio::spawn(async move {
                    while updates.changed().await.is_ok() {
                        let status = updates.borrow_and_update().clone();
                        if let Some(line) = view::render_status(&status, &explorer) {
                            println!("  {}", line);
                        }
                    }
                });
                let result = wizard.publish(&publisher).await.map(|_| ());
                printer.abort();
                result
            }
            Some("status") => {
                println!("{}", serde_json::to_string_pretty(&publisher.status())?);
                continue;
            }
            Some("help") => {
                println!("{}", HELP);
                continue;
            }
            Some("quit") | Some("exit") => break,
            Some(other) => {
                println!("Unknown command '{}'. Type 'help'.", other);
                continue;
            }
        };

        if let Err(e) = outcome {
            println!("Error: {}", e);
        }
        println!("\n{}", view::render(&wizard, &publisher.status(), &explorer));
    }

    wizard.close();
    tracing::info!("Wizard closed");
    Ok(())
}
