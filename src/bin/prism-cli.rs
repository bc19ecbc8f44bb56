use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use prism_publisher::chain::confirm::{ConfirmationPoller, PollPolicy};
use prism_publisher::chain::types::{TxHash, TxLookup};
use prism_publisher::chain::{BlockfrostClient, MetadataBody, TxIndexer};
use prism_publisher::config::load_or_default;
use prism_publisher::lifecycle::{signals, Shutdown};
use prism_publisher::observability::logging;

#[derive(Parser)]
#[command(name = "prism-cli")]
#[command(about = "Scripting companion for the Prism DID publisher", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the metadata body for a payload file
    Chunk { file: PathBuf },
    /// Rebuild a payload from a metadata body file, printed as hex
    Reassemble { file: PathBuf },
    /// Look a transaction up once
    Check { tx_hash: String },
    /// Poll until a transaction is confirmed
    Wait { tx_hash: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    match cli.command {
        Commands::Chunk { file } => {
            let payload = tokio::fs::read(&file).await?;
            let body = MetadataBody::from_payload(
                config.publish.metadata_version,
                &payload,
                config.publish.chunk_size,
            )?;
            let mut labelled = serde_json::Map::new();
            labelled.insert(config.publish.metadata_label.to_string(), serde_json::to_value(&body)?);
            println!("{}", serde_json::to_string_pretty(&labelled)?);
        }
        Commands::Reassemble { file } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let body: MetadataBody = serde_json::from_str(&text)?;
            println!("{}", hex::encode(body.reassemble()));
        }
        Commands::Check { tx_hash } => {
            let client = BlockfrostClient::from_env(&config.indexer)?;
            match client.lookup(&TxHash::new(tx_hash)).await {
                Ok(TxLookup::Confirmed(info)) => {
                    println!("confirmed");
                    println!("{}", serde_json::to_string_pretty(&info)?);
                }
                Ok(TxLookup::NotFound) => println!("not found"),
                Err(e) if e.is_transient() => println!("unavailable: {}", e),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(2);
                }
            }
        }
        Commands::Wait { tx_hash } => {
            let client: Arc<dyn TxIndexer> = Arc::new(BlockfrostClient::from_env(&config.indexer)?);
            let poller = ConfirmationPoller::new(client, PollPolicy::from(&config.poller));

            let shutdown = Shutdown::new();
            let mut cancel = shutdown.subscribe();
            signals::spawn_ctrl_c_handler(shutdown.clone());

            let confirmation = poller
                .wait_for_confirmation(&TxHash::new(tx_hash), &mut cancel)
                .await?;
            println!(
                "confirmed after {} attempts (block height {})",
                confirmation.attempts,
                confirmation
                    .info
                    .block_height
                    .map(|h| h.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
        }
    }

    Ok(())
}
