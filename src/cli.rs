//! Command-line interface definitions.
//!
//! Every option can also come from the environment (a `.env` file in the
//! working directory is loaded first).

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments for the salon briefing service.
///
/// # Examples
///
/// ```sh
/// # Serve GET / on the default address
/// salon_briefing
///
/// # One run, briefing printed to stdout
/// GEMINI_API_KEY=... salon_briefing run
///
/// # Custom sources and keywords
/// salon_briefing --config ./salon.yaml serve --bind 127.0.0.1:3000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML file overriding sources and keywords
    #[arg(short, long, env = "SALON_BRIEFING_CONFIG")]
    pub config: Option<PathBuf>,

    /// API key for the Gemini generation API
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name (overrides the config file)
    #[arg(long, env = "GEMINI_MODEL")]
    pub model: Option<String>,

    /// Address `serve` listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080", global = true)]
    pub bind: SocketAddr,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve `GET /` on `--bind`, running the pipeline on every request (default)
    Serve,
    /// Run the pipeline once and print the briefing
    Run,
}

impl Cli {
    /// The subcommand to execute; `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
