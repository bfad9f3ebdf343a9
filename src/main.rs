//! # Salon Briefing
//!
//! Collects regulatory and market news for the beauty-salon industry,
//! keeps the items matching a keyword set and asks an LLM for a structured
//! executive briefing.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... salon_briefing serve --bind 0.0.0.0:8080
//! GEMINI_API_KEY=... salon_briefing run
//! ```
//!
//! ## Architecture
//!
//! Each run is a sequential pipeline:
//! 1. **Fetching**: request listing pages of every registered source
//! 2. **Extraction**: turn each page into candidate articles
//! 3. **Filtering**: keep the candidates matching a keyword
//! 4. **Aggregation**: join the matches into one corpus
//! 5. **Briefing**: send the corpus to Gemini inside a fixed prompt

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod api;
mod briefing;
mod cli;
mod config;
mod error;
mod filter;
mod models;
mod pipeline;
mod scrapers;
mod server;
mod utils;

use cli::{Cli, Command};
use config::Config;
use pipeline::{Gemini, Pipeline};
use scrapers::HttpTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    let args = Cli::parse();
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let mut config = Config::load(args.config.as_deref()).await?;
    if let Some(model) = &args.model {
        config.model = model.clone();
    }

    let transport = HttpTransport::new(config.fetch_timeout, &config.user_agent)?;
    let pipeline = Arc::new(Pipeline::new(
        config,
        transport,
        Gemini,
        args.gemini_api_key.clone(),
    ));
    for source in &pipeline.config().sources {
        debug!(
            source = %source.url,
            strategy = ?source.strategy,
            max_pages = source.max_pages,
            "Registered source"
        );
    }

    match args.command() {
        Command::Serve => {
            info!(bind = %args.bind, "salon_briefing starting up");
            server::serve(pipeline, args.bind).await?;
        }
        Command::Run => {
            let briefing = pipeline.run().await.inspect_err(|e| {
                error!(error = %e, "Run aborted");
            })?;
            println!(
                "INFORME DE INTELIGÊNCIA ESTRATÉGICA ({})\n",
                briefing.generated_at.format("%Y-%m-%d %H:%M")
            );
            println!("{}", briefing.text);
        }
    }

    Ok(())
}
