mod orders;
mod playlist;
mod send;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pagetally-cli")]
#[command(about = "Order history and playlist length tallies from saved pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Paginate and tally an order history snapshot (file or directory of frames)
    Orders {
        path: PathBuf,
        /// Print the aggregate as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Load-more button text (defaults to `PAGETALLY_SHOW_MORE_LABEL`)
        #[arg(long)]
        label: Option<String>,
        /// Wait after each load-more click, in milliseconds
        #[arg(long)]
        settle_ms: Option<u64>,
    },
    /// Total length of a playlist snapshot
    Playlist {
        path: PathBuf,
        /// Also report how many blocks of this many minutes cover the playlist
        #[arg(long)]
        chunk_minutes: Option<i64>,
    },
    /// Split a duration into fixed-size chunks
    Chunks {
        #[arg(long, allow_negative_numbers = true)]
        chunk_minutes: i64,
        #[arg(long, default_value = "0")]
        days: u64,
        #[arg(long, default_value = "0")]
        hours: u64,
        #[arg(long, default_value = "0")]
        minutes: u64,
        #[arg(long, default_value = "0")]
        seconds: u64,
    },
    /// Show the last persisted order tally
    Results {
        #[arg(long)]
        json: bool,
    },
    /// Dispatch one raw protocol message, e.g. '{"action":"ping"}'
    Send { message: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pagetally_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Orders {
            path,
            json,
            label,
            settle_ms,
        }) => orders::run_orders(&config, &path, json, label.as_deref(), settle_ms).await?,
        Some(Commands::Playlist {
            path,
            chunk_minutes,
        }) => playlist::run_playlist(&path, chunk_minutes).await?,
        Some(Commands::Chunks {
            chunk_minutes,
            days,
            hours,
            minutes,
            seconds,
        }) => {
            let raw = pagetally_core::Duration {
                days,
                hours,
                minutes,
                seconds,
            };
            let seconds = raw
                .checked_total_seconds()
                .ok_or_else(|| anyhow::anyhow!("duration is too large to measure in seconds"))?;
            let total = pagetally_core::Duration::from_total_seconds(seconds);
            playlist::run_chunks(&total, chunk_minutes)?;
        }
        Some(Commands::Results { json }) => orders::run_results(&config, json).await?,
        Some(Commands::Send { message }) => send::run_send(&config, &message).await?,
        None => println!("no command given; see `pagetally-cli --help`"),
    }

    Ok(())
}
