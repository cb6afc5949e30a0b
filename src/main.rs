use battleship_server::{
    init_logging,
    server::{self, ConnectionLimits, ServerConfig, DEFAULT_BIND},
    session::{SessionConfig, DEFAULT_MAX_SESSIONS},
    transport::tcp::DEFAULT_MAX_LINE_LEN,
};

use clap::Parser;
use tokio::time::Duration;

/// Turn-based Battleship over a line-oriented TCP protocol. Every client
/// plays its own game against the computer.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND)]
    bind: String,
    #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
    seed: Option<u64>,
    /// Refuse new clients beyond this many concurrent games.
    #[arg(long, default_value_t = DEFAULT_MAX_SESSIONS)]
    max_sessions: usize,
    /// Forfeit clients that stay silent this long. Waits forever when unset.
    #[arg(long)]
    idle_timeout_secs: Option<u64>,
    /// Longest accepted client line, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    max_line_len: usize,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        ServerConfig {
            bind: cli.bind,
            sessions: SessionConfig {
                seed: cli.seed,
                max_sessions: cli.max_sessions,
            },
            limits: ConnectionLimits {
                max_line_len: cli.max_line_len,
                idle_timeout: cli.idle_timeout_secs.map(Duration::from_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    server::run(cli.into()).await
}
