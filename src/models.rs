//! Data models shared by every stage of the collection pipeline.
//!
//! - [`Source`]: one entry of the source registry, with its [`Strategy`]
//! - [`CandidateArticle`]: a listing entry as extracted, before filtering
//! - [`KeywordSet`]: lowercase keywords used by the relevance filter
//! - [`ListingPage`]: the result of extracting one listing page
//! - [`SourceOutcome`]: what happened to one source during aggregation
//! - [`Briefing`]: the final text produced for a run
//!
//! Everything here lives for a single run; nothing is persisted.

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Link value used when a listing entry carries no usable anchor.
pub const LINK_UNAVAILABLE: &str = "N/A";

/// How successive listing pages are requested from a source.
///
/// The extractor and the fetcher both match on this tag, so a source whose
/// layout has no extraction path is declared [`Strategy::Unsupported`] up
/// front instead of silently yielding nothing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Strategy {
    /// Plone-style listing (`article.tileItem` entries) paged with a numeric
    /// offset query parameter.
    PaginatedListing {
        /// Query parameter carrying the offset, e.g. `b_start:int`.
        offset_param: String,
        /// Entries per page; the offset for page `n` is `n * page_size`.
        page_size: usize,
    },
    /// Registered but not scraped.
    Unsupported,
}

/// A configured web location from which listing pages are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    /// Base URL of the listing; also the source identifier in records and logs.
    pub url: Url,
    pub strategy: Strategy,
    /// Upper bound on pages requested per run.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

pub(crate) fn default_max_pages() -> usize {
    2
}

impl Source {
    /// Source using the offset pagination of gov.br portals.
    pub fn paginated(url: Url, max_pages: usize) -> Self {
        Self {
            url,
            strategy: Strategy::PaginatedListing {
                offset_param: "b_start:int".to_string(),
                page_size: 20,
            },
            max_pages,
        }
    }

    /// Source kept in the registry for reporting but never requested.
    ///
    /// Aggregation reports it as [`SourceOutcome::Skipped`].
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let source = Source::unsupported(Url::parse("https://beautyfair.com.br/")?);
    /// assert_eq!(source.strategy, Strategy::Unsupported);
    /// ```
    pub fn unsupported(url: Url) -> Self {
        Self {
            url,
            strategy: Strategy::Unsupported,
            max_pages: default_max_pages(),
        }
    }

    /// Identifier used in `Fonte:` lines and logs: the base URL as written.
    pub fn id(&self) -> &str {
        self.url.as_str()
    }
}

/// One extracted, unfiltered listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArticle {
    /// Headline in its original case; empty when the entry has none.
    pub title: String,
    /// Teaser text; empty when the entry has none.
    pub description: String,
    /// Absolute link, or [`LINK_UNAVAILABLE`].
    pub link: String,
    /// Identifier of the source the entry was listed on.
    pub source: String,
}

impl CandidateArticle {
    /// Format the article as a corpus record block.
    ///
    /// The `Resumo` line is only present when the description is non-empty.
    pub fn to_record(&self) -> String {
        let mut record = format!("Fonte: {}\nTítulo: {}\n", self.source, self.title);
        if !self.description.is_empty() {
            record.push_str(&format!("Resumo: {}\n", self.description));
        }
        record.push_str(&format!("Link: {}\n", self.link));
        record
    }
}

/// Ordered set of lowercase keyword substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    /// Lowercases, trims and de-duplicates keywords, keeping first-seen order.
    /// Blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .unique()
                .collect(),
        )
    }

    /// Keywords in first-seen order, already lowercased.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of extracting one listing page.
///
/// [`ListingPage::Exhausted`] is the pagination stop signal: no further page
/// of that source is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingPage {
    Exhausted,
    Entries(Vec<CandidateArticle>),
}

impl ListingPage {
    pub fn from_entries(entries: Vec<CandidateArticle>) -> Self {
        if entries.is_empty() {
            ListingPage::Exhausted
        } else {
            ListingPage::Entries(entries)
        }
    }
}

impl IntoIterator for ListingPage {
    type Item = CandidateArticle;
    type IntoIter = std::vec::IntoIter<CandidateArticle>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            ListingPage::Exhausted => Vec::new().into_iter(),
            ListingPage::Entries(entries) => entries.into_iter(),
        }
    }
}

/// What happened to one source during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Pages were read until exhaustion or the page limit.
    Collected {
        source: String,
        pages: usize,
        scanned: usize,
        matched: usize,
    },
    /// Strategy is [`Strategy::Unsupported`]; nothing was requested.
    Skipped { source: String },
    /// The source was abandoned; `matched` counts records kept from earlier pages.
    Failed {
        source: String,
        matched: usize,
        cause: String,
    },
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Collected {
                source,
                pages,
                scanned,
                matched,
            } => write!(
                f,
                "{source}: {matched} relevant of {scanned} across {pages} page(s)"
            ),
            SourceOutcome::Skipped { source } => write!(f, "{source}: skipped (unsupported)"),
            SourceOutcome::Failed {
                source,
                matched,
                cause,
            } => write!(f, "{source}: failed after {matched} relevant ({cause})"),
        }
    }
}

/// The structured summary produced for one run.
#[derive(Debug, Clone)]
pub struct Briefing {
    pub generated_at: DateTime<Local>,
    /// Model output, or a failure report when the summarization call failed.
    pub text: String,
    /// Number of relevant articles that went into the prompt.
    pub corpus_articles: usize,
}
