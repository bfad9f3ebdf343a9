//! Run orchestration.
//!
//! One run is one pass through:
//!
//! 1. **Credential check**: no API key means a configuration error before any
//!    network activity
//! 2. **Aggregation**: every source is fetched, extracted and filtered into a corpus
//! 3. **Briefing**: the corpus (or its absence) is sent to the model
//!
//! The briefing step always runs after aggregation, so a run that found no
//! news still answers with the model's "no updates" text.

use crate::aggregate::aggregate;
use crate::api::{AskAsync, GeminiClient};
use crate::briefing::generate_briefing;
use crate::config::Config;
use crate::error::PipelineError;
use crate::models::Briefing;
use crate::scrapers::Transport;
use chrono::Local;
use std::time::Instant;
use tracing::{info, instrument};

/// Environment variable holding the generation API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Builds the generation client for a run from the credential.
pub trait Connect: Send + Sync {
    type Client: AskAsync + Send + Sync;

    fn connect(&self, api_key: &str, config: &Config) -> Self::Client;
}

/// Connects to the hosted Gemini API.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gemini;

impl Connect for Gemini {
    type Client = GeminiClient;

    fn connect(&self, api_key: &str, config: &Config) -> GeminiClient {
        GeminiClient::new(api_key, &config.model).with_base_url(&config.api_base_url)
    }
}

/// Configuration, transport and credential for repeated runs.
pub struct Pipeline<T, C = Gemini> {
    config: Config,
    transport: T,
    connector: C,
    api_key: Option<String>,
}

impl<T, C> Pipeline<T, C>
where
    T: Transport + Send + Sync,
    C: Connect,
{
    /// A blank `api_key` counts as missing.
    pub fn new(config: Config, transport: T, connector: C, api_key: Option<String>) -> Self {
        Self {
            config,
            transport,
            connector,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute one run.
    ///
    /// Only a missing credential fails the run; source and generation
    /// failures are folded into the briefing.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<Briefing, PipelineError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(PipelineError::Configuration(format!(
                "{API_KEY_ENV} is not set"
            )));
        };

        let t0 = Instant::now();
        let aggregation = aggregate(
            &self.transport,
            &self.config.sources,
            &self.config.keywords,
        )
        .await;

        let client = self.connector.connect(api_key, &self.config);
        let text = generate_briefing(&client, aggregation.corpus.as_deref()).await;

        info!(
            articles = aggregation.articles,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Run complete"
        );

        Ok(Briefing {
            generated_at: Local::now(),
            text,
            corpus_articles: aggregation.articles,
        })
    }
}
