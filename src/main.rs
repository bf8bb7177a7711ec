//! Open oracle price relay CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   price feed ──▶ openoracle ──▶ ledger::assembler ──▶ ledger::client ──▶ node
//!   (static/http)  (sign, verify)  (wallet sig, PoW)     (tip, submit)
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use oracle_relay::config::{load_config, RelayConfig};
use oracle_relay::feed::{self, BundleFeed, HttpFeed, PriceFeed, SignedHttpFeed, StaticFeed};
use oracle_relay::lifecycle::signals::spawn_signal_listener;
use oracle_relay::observability::{logging, metrics};
use oracle_relay::openoracle::PriceObservation;
use oracle_relay::{Cancel, PriceRelay, RelayError, Shutdown};

#[derive(Parser)]
#[command(name = "oracle-relay")]
#[command(about = "Relay signed open oracle prices to a ledger node", long_about = None)]
struct Cli {
    /// Path to the relay configuration.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish one observation given on the command line
    Send {
        #[arg(long)]
        asset: String,
        /// Decimal price, e.g. 42000.50
        #[arg(long)]
        price: String,
        /// Unix timestamp in seconds
        #[arg(long)]
        timestamp: u64,
    },
    /// Publish the current observations of the configured feed once.
    /// With `[feed] signed = true` the feed's signed bundle is relayed as is.
    Pull,
    /// Publish from the configured feed on every interval until stopped
    Watch,
    /// Print the node's current chain tip
    Tip,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        node = %config.node.address,
        key_index = config.wallet.key_index,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let relay = PriceRelay::from_config(&config)?;

    match cli.command {
        Commands::Send {
            asset,
            price,
            timestamp,
        } => {
            if asset.is_empty() || price.is_empty() || timestamp == 0 {
                return Err(RelayError::InvalidInput(
                    "asset, price and timestamp are required".to_string(),
                )
                .into());
            }
            let source = StaticFeed::new(vec![PriceObservation::new(asset, timestamp, price)]);
            publish(&relay, &Source::Prices(Box::new(source)), &Cancel::new()).await?;
        }
        Commands::Pull => {
            let source = http_source(&config)?;
            publish(&relay, &source, &Cancel::new()).await?;
        }
        Commands::Watch => {
            let source = http_source(&config)?;
            let interval = Duration::from_secs(config.feed.as_ref().map_or(60, |f| f.interval_secs));
            watch(&relay, &source, interval).await;
        }
        Commands::Tip => {
            let tip = relay.chain_tip().await?;
            println!("{:#?}", tip);
        }
    }

    Ok(())
}

/// Where a publish round gets its prices from.
enum Source {
    /// Observations the relay signs itself.
    Prices(Box<dyn PriceFeed>),
    /// Bundles a third party already signed.
    Signed(Box<dyn BundleFeed>),
}

fn http_source(config: &RelayConfig) -> Result<Source, RelayError> {
    let feed_config = config
        .feed
        .as_ref()
        .ok_or_else(|| RelayError::Configuration("missing [feed] section".to_string()))?;

    Ok(if feed_config.signed {
        Source::Signed(Box::new(SignedHttpFeed::new(feed_config)))
    } else {
        Source::Prices(Box::new(HttpFeed::new(feed_config)))
    })
}

async fn publish(
    relay: &PriceRelay,
    source: &Source,
    cancel: &Cancel,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match source {
        Source::Prices(prices) => {
            let observations = prices.pull().await?;
            let timestamp = feed::bundle_timestamp(&observations).ok_or_else(|| {
                RelayError::InvalidInput("feed returned no observations".to_string())
            })?;
            relay.send(timestamp, observations, cancel).await?
        }
        Source::Signed(bundles) => {
            let bundle = bundles.pull_bundle().await?;
            relay.relay_bundle(bundle, cancel).await?
        }
    };
    println!(
        "transaction result: success({}), hash({}), height({})",
        outcome.result.success, outcome.result.tx_hash, outcome.tip.height
    );
    Ok(())
}

async fn watch(relay: &PriceRelay, source: &Source, interval: Duration) {
    let shutdown = Shutdown::new();
    let _signals = spawn_signal_listener(&shutdown);
    let mut stop = shutdown.subscribe();
    let mut ticker = tokio::time::interval(interval);

    tracing::info!(interval_secs = interval.as_secs(), "Watching price feed");

    loop {
        tokio::select! {
            _ = stop.recv() => break,
            _ = ticker.tick() => {
                if let Err(e) = publish(relay, source, &shutdown.cancel_token()).await {
                    tracing::warn!(error = %e, "Publish round failed");
                }
            }
        }
    }

    tracing::info!("Shutdown complete");
}
