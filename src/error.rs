//! Error types for each stage of a run.
//!
//! Only [`PipelineError::Configuration`] ends a run. Fetch failures are
//! contained per source by the aggregator, and summarization failures are
//! turned into a failure report by the briefing generator.

use thiserror::Error;

/// Failure of a single outbound GET.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if let Some(status) = e.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// A listing page of one source could not be retrieved.
#[derive(Error, Debug)]
#[error("failed to fetch page {page} of {source_id}: {cause}")]
pub struct FetchFailure {
    pub source_id: String,
    pub page: usize,
    #[source]
    pub cause: TransportError,
}

/// The text-generation call failed or produced nothing usable.
#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("request to the generation API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("generation API returned no text")]
    EmptyResponse,

    #[error("generation API blocked the prompt: {0}")]
    Blocked(String),
}

/// Terminal errors for a run or for process startup.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),
}
