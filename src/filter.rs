//! Keyword relevance filter.

use crate::models::{CandidateArticle, KeywordSet};

/// True when any keyword is a substring of the lowercased title or description.
///
/// Keywords in a [`KeywordSet`] are already lowercase. An article with an
/// empty title and empty description never matches.
pub fn is_relevant(candidate: &CandidateArticle, keywords: &KeywordSet) -> bool {
    let title = candidate.title.to_lowercase();
    let description = candidate.description.to_lowercase();
    keywords
        .iter()
        .any(|keyword| title.contains(keyword) || description.contains(keyword))
}
