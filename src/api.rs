//! Text-generation API interaction.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait for sending a prompt and receiving text
//! - [`GeminiClient`]: [`AskAsync`] over the Gemini `generateContent` REST endpoint
//!
//! One prompt is one synchronous request: no streaming, no multi-turn
//! exchange and no retries.

use crate::error::SummarizationError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Default endpoint of the Generative Language API.
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a model and return its text output.
pub trait AskAsync {
    fn ask(&self, prompt: &str) -> impl Future<Output = Result<String, SummarizationError>> + Send;
}

/// Gemini client bound to one API key and model.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client for `model` on the public Generative Language API.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Sent as the `x-goog-api-key` header; never logged
    /// * `model` - Model name, e.g. `gemini-1.5-flash`
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let client = GeminiClient::new(&key, "gemini-1.5-flash");
    /// let text = client.ask("Resuma as notícias").await?;
    /// ```
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Point the client at another API root (a trailing `/` is ignored).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AskAsync for GeminiClient {
    #[instrument(
        level = "info",
        skip_all,
        fields(model = %self.model, prompt_chars = prompt.chars().count())
    )]
    async fn ask(&self, prompt: &str) -> Result<String, SummarizationError> {
        let t0 = Instant::now();
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "Generation API returned an error"
            );
            return Err(SummarizationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.into_text()?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "Generation succeeded"
        );
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, SummarizationError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(SummarizationError::Blocked(reason));
        }
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();
        if text.trim().is_empty() {
            Err(SummarizationError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}
