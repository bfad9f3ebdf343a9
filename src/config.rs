//! Run configuration.
//!
//! A [`Config`] is built once at startup, from built-in defaults optionally
//! overridden by a YAML file, and is then only read. The defaults watch the
//! Anvisa news listing; the trade-press sources are registered as
//! unsupported until they get an extraction path.
//!
//! # File format
//!
//! ```yaml
//! fetch_timeout_secs: 20
//! model: gemini-1.5-flash
//! sources:
//!   - url: https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa
//!     max_pages: 3
//!     strategy:
//!       kind: paginated-listing
//!       offset_param: b_start:int
//!       page_size: 20
//!   - url: https://www.cabeleireiros.com/
//!     strategy:
//!       kind: unsupported
//! keyword_groups:
//!   - name: regulatory
//!     keywords: [formaldeído, vigilância sanitária]
//! ```

use crate::api::GEMINI_API_URL;
use crate::error::PipelineError;
use crate::models::{KeywordSet, Source};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

const REGULATORY_SOURCES: &[&str] = &["https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa"];

const TRADE_PRESS_SOURCES: &[&str] = &[
    "https://beautyfair.com.br/negocios-e-noticias/",
    "https://esteticaemercado.com.br/",
    "https://www.cabeleireiros.com/",
];

const REGULATORY_KEYWORDS: &[&str] = &[
    "vigilância sanitária",
    "licença de funcionamento",
    "multa anvisa",
    "descarte de resíduos",
    "lei do salão-parceiro",
    "norma abnt salão",
    "fiscalização salão",
    "produto falsificado",
    "proibição de ativo",
    "cosmético irregular",
    "formaldeído",
    "autoclave norma",
];

const BUSINESS_KEYWORDS: &[&str] = &[
    "piso salarial cabeleireiro",
    "gestão de salão",
    "software para salão",
    "aumento de preço beleza",
    "impostos salão de beleza",
    "beleza limpa",
    "tendência coloração",
    "skincare",
    "terapia capilar",
    "mercado de estética",
];

/// Everything a run needs besides the API credential.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source registry, processed in order.
    pub sources: Vec<Source>,
    pub keywords: KeywordSet,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub model: String,
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let sources = REGULATORY_SOURCES
            .iter()
            .filter_map(|u| Url::parse(u).ok())
            .map(|url| Source::paginated(url, 2))
            .chain(
                TRADE_PRESS_SOURCES
                    .iter()
                    .filter_map(|u| Url::parse(u).ok())
                    .map(Source::unsupported),
            )
            .collect();

        Self {
            sources,
            keywords: KeywordSet::new(REGULATORY_KEYWORDS.iter().chain(BUSINESS_KEYWORDS)),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: GEMINI_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    sources: Option<Vec<Source>>,
    keyword_groups: Option<Vec<KeywordGroup>>,
    fetch_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    model: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordGroup {
    name: String,
    keywords: Vec<String>,
}

impl Config {
    /// Parse a YAML document on top of the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, PipelineError> {
        let file: ConfigFile = serde_yaml::from_str(yaml)
            .map_err(|e| PipelineError::Configuration(format!("invalid config file: {e}")))?;
        let mut config = Config::default();

        if let Some(sources) = file.sources {
            config.sources = sources;
        }
        if let Some(groups) = file.keyword_groups {
            config.keywords = KeywordSet::new(groups.into_iter().flat_map(|g| {
                debug!(group = %g.name, count = g.keywords.len(), "Keyword group");
                g.keywords
            }));
        }
        if let Some(secs) = file.fetch_timeout_secs {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = file.user_agent {
            config.user_agent = user_agent;
        }
        if let Some(model) = file.model {
            config.model = model;
        }
        if let Some(url) = file.api_base_url {
            config.api_base_url = url;
        }
        Ok(config)
    }

    /// Defaults, or the YAML file at `path` applied on top of them.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let config = match path {
            None => Config::default(),
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await.map_err(|e| {
                    PipelineError::Configuration(format!("cannot read {}: {e}", path.display()))
                })?;
                Config::from_yaml(&yaml)?
            }
        };
        info!(
            sources = config.sources.len(),
            keywords = config.keywords.len(),
            model = %config.model,
            "Loaded configuration"
        );
        Ok(config)
    }
}
