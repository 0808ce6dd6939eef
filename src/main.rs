// peerbook CLI - inspect and maintain a node's peer directory

use clap::{Parser, Subcommand};
use peerbook::directory::PeerDirectory;
use peerbook::endpoint::BmaEndpoint;
use peerbook::peer::{PeerRecord, PeerStatus};
use peerbook::storage::{SledPeerStore, StoreConfig};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "peerbook")]
#[command(version)]
#[command(about = "Peer directory for a currency node", long_about = None)]
struct Args {
    /// Directory holding the peer database
    #[arg(short, long, default_value = "./data/peers")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Flush the database after every write
    #[arg(long)]
    sync_writes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a newly discovered peer
    Add {
        /// Peer public key
        #[arg(long = "pub")]
        public_key: String,
        #[arg(long)]
        currency: String,
        #[arg(long, default_value = "1")]
        version: String,
        /// Endpoint descriptor, repeatable; order matters
        #[arg(long = "endpoint")]
        endpoints: Vec<String>,
        #[arg(long, default_value = "NEW")]
        status: PeerStatus,
    },
    /// Show one peer
    Show { public_key: String },
    /// List peers
    List {
        /// Keys to leave out
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Change a peer's status
    Status { public_key: String, status: PeerStatus },
    /// Pick gossip targets among recently updated peers
    Gossip {
        /// Only NEW_BACK and UP peers
        #[arg(long)]
        up: bool,
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Parse an endpoint descriptor
    Endpoint { descriptor: String },
    /// Directory statistics
    Stats,
}

fn peer_json(peer: &PeerRecord) -> serde_json::Value {
    json!({
        "summary": peer.extract_summary(),
        "url": peer.url(),
        "reachable": peer.is_reachable(),
        "updated": chrono::DateTime::from_timestamp_millis(peer.updated_at() as i64)
            .map(|t| t.to_rfc3339()),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .init();

    if let Command::Endpoint { descriptor } = &args.command {
        let output = match BmaEndpoint::parse(descriptor) {
            Some(bma) => json!({
                "dns": bma.dns(),
                "ipv4": bma.ipv4(),
                "ipv6": bma.ipv6(),
                "port": bma.port(),
                "host": bma.host(),
                "url": bma.url(),
                "reachable": bma.is_reachable(),
            }),
            None => json!({}),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let config = StoreConfig::new()
        .with_path(&args.data_dir)
        .with_flush_on_write(args.sync_writes);
    let store = SledPeerStore::open_with_config(&config)?;
    debug!("Peer store opened at {:?}", args.data_dir);
    let directory = PeerDirectory::new(store);

    match args.command {
        Command::Add {
            public_key,
            currency,
            version,
            endpoints,
            status,
        } => {
            let record = PeerRecord::new(&public_key, &currency, status)
                .with_version(&version)
                .with_endpoints(endpoints);
            let record = directory.discover(record).await?;
            println!("{}", serde_json::to_string_pretty(&peer_json(&record))?);
        }
        Command::Show { public_key } => {
            let record = directory.get_one(&public_key).await?;
            println!("{}", serde_json::to_string_pretty(&peer_json(&record))?);
        }
        Command::List { exclude } => {
            let peers = directory.get_all_excluding(&exclude).await?;
            let listed: Vec<_> = peers.iter().map(peer_json).collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        Command::Status { public_key, status } => {
            let mut record = directory.get_one(&public_key).await?;
            if directory.set_status(&mut record, status).await? {
                info!("Peer {} is now {}", record.key_id(), status);
            } else {
                info!("Peer {} already {}", record.key_id(), status);
            }
        }
        Command::Gossip { up, exclude } => {
            let chosen = if up {
                directory.random_ups_without(&exclude).await?
            } else {
                directory.random_without(&exclude).await?
            };
            let urls: Vec<_> = chosen
                .iter()
                .map(|p| json!({ "pub": p.public_key(), "url": p.url(), "status": p.status() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&urls)?);
        }
        Command::Stats => {
            let stats = directory.stats().await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "total": stats.total_peers,
                    "up": stats.up_peers,
                    "down": stats.down_peers,
                    "new": stats.new_peers,
                    "reachable": stats.reachable_peers,
                }))?
            );
        }
        Command::Endpoint { .. } => {}
    }

    directory.store().flush()?;
    Ok(())
}
