//! Corpus aggregation across all registered sources.
//!
//! Sources are processed strictly in registry order, one page at a time.
//! A failure while processing a source abandons that source only; records it
//! produced on earlier pages are kept and the next source is processed.

use crate::filter::is_relevant;
use crate::models::{KeywordSet, ListingPage, Source, SourceOutcome, Strategy};
use crate::scrapers::{self, Transport, fetch_listing};
use tracing::{debug, info, instrument, warn};

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Trimmed corpus text; `None` when no article matched.
    pub corpus: Option<String>,
    /// Number of relevant article records in the corpus.
    pub articles: usize,
    /// One entry per source, in registry order.
    pub outcomes: Vec<SourceOutcome>,
}

/// Fetch, extract and filter every source into a single corpus.
#[instrument(
    level = "info",
    skip_all,
    fields(sources = sources.len(), keywords = keywords.len())
)]
pub async fn aggregate<T>(
    transport: &T,
    sources: &[Source],
    keywords: &KeywordSet,
) -> Aggregation
where
    T: Transport + Sync,
{
    info!("Starting source sweep");
    if keywords.is_empty() {
        warn!("Keyword set is empty; no article can match");
    }
    let mut records = Vec::new();
    let mut outcomes = Vec::with_capacity(sources.len());

    for source in sources {
        let outcome = collect_source(transport, source, keywords, &mut records).await;
        match &outcome {
            SourceOutcome::Failed { .. } => warn!(%outcome, "Source abandoned for this run"),
            _ => info!(%outcome, "Source processed"),
        }
        outcomes.push(outcome);
    }

    let articles = records.len();
    let corpus = Some(records.join("\n").trim().to_string()).filter(|c| !c.is_empty());
    info!(articles, has_content = corpus.is_some(), "Source sweep complete");

    Aggregation {
        corpus,
        articles,
        outcomes,
    }
}

async fn collect_source<T>(
    transport: &T,
    source: &Source,
    keywords: &KeywordSet,
    records: &mut Vec<String>,
) -> SourceOutcome
where
    T: Transport + Sync,
{
    if source.strategy == Strategy::Unsupported {
        return SourceOutcome::Skipped {
            source: source.id().to_string(),
        };
    }

    let (mut pages, mut scanned, mut matched) = (0, 0, 0);

    for page in 0..source.max_pages {
        let body = match fetch_listing(transport, source, page).await {
            Ok(Some(body)) => body,
            Ok(None) => break,
            Err(e) => {
                return SourceOutcome::Failed {
                    source: source.id().to_string(),
                    matched,
                    cause: e.to_string(),
                };
            }
        };
        pages += 1;

        let ListingPage::Entries(entries) = scrapers::extract(source, &body) else {
            debug!(source = %source.url, page, "Listing exhausted; stop paging");
            break;
        };

        for candidate in entries {
            scanned += 1;
            if is_relevant(&candidate, keywords) {
                debug!(title = %candidate.title, "Relevant article");
                matched += 1;
                records.push(candidate.to_record());
            }
        }
    }

    SourceOutcome::Collected {
        source: source.id().to_string(),
        pages,
        scanned,
        matched,
    }
}
