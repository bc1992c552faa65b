//! CLI module for the Paladium monitor
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the monitor
//! - `status` - Show the status of every service from a running monitor
//! - `logs` - Print a service's recent container logs
//! - `watch` - Follow live status updates over the push channel
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start the monitor with default config
//! paladium serve
//!
//! # Show service status as a table
//! paladium status --url http://pipeline-host:3000
//!
//! # Follow status changes live
//! paladium watch
//! ```

pub mod completions;
pub mod config;
pub mod logs;
pub mod output;
pub mod serve;
pub mod status;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default address of a running monitor, used by client commands.
pub const DEFAULT_MONITOR_URL: &str = "http://localhost:3000";

/// Paladium - media pipeline status monitor
#[derive(Parser, Debug)]
#[command(
    name = "paladium",
    version,
    about = "Status monitor and remote control for containerized media pipelines"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitor
    Serve(ServeArgs),
    /// Show the status of every service
    Status(StatusArgs),
    /// Print recent container logs for a service
    Logs(LogsArgs),
    /// Follow live status updates
    Watch(WatchArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "paladium.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "PALADIUM_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "PALADIUM_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PALADIUM_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable the periodic status poll
    #[arg(long)]
    pub no_poll: bool,

    /// Reject start/stop commands
    #[arg(long)]
    pub read_only: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Base URL of the running monitor
    #[arg(short, long, env = "PALADIUM_URL", default_value = DEFAULT_MONITOR_URL)]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Service id
    pub service: String,

    /// Number of lines to show
    #[arg(short = 'n', long)]
    pub lines: Option<usize>,

    /// Base URL of the running monitor
    #[arg(short, long, env = "PALADIUM_URL", default_value = DEFAULT_MONITOR_URL)]
    pub url: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Base URL of the running monitor
    #[arg(short, long, env = "PALADIUM_URL", default_value = DEFAULT_MONITOR_URL)]
    pub url: String,

    /// Print each snapshot as one JSON line
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "paladium.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
