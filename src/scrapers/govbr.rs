//! Extraction for gov.br (Plone) news listings.
//!
//! Listing pages such as
//! [Notícias Anvisa](https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa)
//! render each entry as:
//!
//! ```html
//! <article class="tileItem">
//!   <h2 class="tileHeadline"><a href="https://www.gov.br/...">Headline</a></h2>
//!   <span class="description">Teaser text</span>
//! </article>
//! ```
//!
//! Entries missing a field are still kept: the title and description fall
//! back to empty strings and the link to [`LINK_UNAVAILABLE`].

use crate::models::{CandidateArticle, LINK_UNAVAILABLE, ListingPage};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static ENTRY: Lazy<Selector> = Lazy::new(|| selector("article.tileItem"));
static HEADLINE: Lazy<Selector> = Lazy::new(|| selector("h2.tileHeadline"));
static ANY_H2: Lazy<Selector> = Lazy::new(|| selector("h2"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector("span.description"));
static HEADLINE_LINK: Lazy<Selector> = Lazy::new(|| selector("h2 a[href]"));
static ANY_LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

/// Extract every `article.tileItem` entry of a listing page.
///
/// `base` is the source URL, used to resolve relative links.
#[instrument(level = "debug", skip(body), fields(bytes = body.len()))]
pub fn extract(base: &Url, body: &str) -> ListingPage {
    let document = Html::parse_document(body);
    let entries = document
        .select(&ENTRY)
        .map(|entry| candidate(base, entry))
        .collect::<Vec<_>>();
    debug!(count = entries.len(), "Extracted listing entries");
    ListingPage::from_entries(entries)
}

fn candidate(base: &Url, entry: ElementRef<'_>) -> CandidateArticle {
    let title = entry
        .select(&HEADLINE)
        .next()
        .or_else(|| entry.select(&ANY_H2).next())
        .map(stripped_text)
        .unwrap_or_default();

    let description = entry
        .select(&DESCRIPTION)
        .next()
        .map(stripped_text)
        .unwrap_or_default();

    let link = entry
        .select(&HEADLINE_LINK)
        .next()
        .or_else(|| entry.select(&ANY_LINK).next())
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| LINK_UNAVAILABLE.to_string());

    if title.is_empty() || link == LINK_UNAVAILABLE {
        debug!(%title, %link, "Listing entry is missing fields");
    }

    CandidateArticle {
        title,
        description,
        link,
        source: base.to_string(),
    }
}

/// Element text with whitespace runs collapsed to single spaces.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div id="content-core">
            <article class="tileItem">
              <h2 class="tileHeadline">
                <a href="https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa/2025/anvisa-proibe-produto-x">
                  ANVISA proíbe   produto X
                </a>
              </h2>
              <span class="description">Produto continha <b>formaldeído</b> acima do permitido.</span>
            </article>
            <article class="tileItem">
              <h2 class="tileHeadline"><a href="/anvisa/pt-br/assuntos/noticias-anvisa/2025/consulta">Consulta pública</a></h2>
            </article>
            <article class="tileItem">
              <span class="description">Entrada sem título nem link</span>
            </article>
          </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa").unwrap()
    }

    #[test]
    fn test_extract_entries() {
        let entries: Vec<_> = extract(&base(), LISTING).into_iter().collect();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].title, "ANVISA proíbe produto X");
        assert_eq!(
            entries[0].description,
            "Produto continha formaldeído acima do permitido."
        );
        assert_eq!(
            entries[0].link,
            "https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa/2025/anvisa-proibe-produto-x"
        );
        assert_eq!(
            entries[0].source,
            "https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa"
        );
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let entries: Vec<_> = extract(&base(), LISTING).into_iter().collect();
        assert_eq!(entries[1].title, "Consulta pública");
        assert_eq!(entries[1].description, "");
    }

    #[test]
    fn test_relative_link_is_resolved() {
        let entries: Vec<_> = extract(&base(), LISTING).into_iter().collect();
        assert_eq!(
            entries[1].link,
            "https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa/2025/consulta"
        );
    }

    #[test]
    fn test_missing_title_and_link_use_defaults() {
        let entries: Vec<_> = extract(&base(), LISTING).into_iter().collect();
        assert_eq!(entries[2].title, "");
        assert_eq!(entries[2].link, LINK_UNAVAILABLE);
        assert_eq!(entries[2].description, "Entrada sem título nem link");
    }

    #[test]
    fn test_plain_h2_is_used_when_headline_class_missing() {
        let html = r#"<article class="tileItem"><h2>Norma ABNT salão</h2></article>"#;
        let entries: Vec<_> = extract(&base(), html).into_iter().collect();
        assert_eq!(entries[0].title, "Norma ABNT salão");
        assert_eq!(entries[0].link, LINK_UNAVAILABLE);
    }

    #[test]
    fn test_page_without_entries_is_exhausted() {
        let html = "<html><body><p>Nenhum resultado.</p></body></html>";
        assert_eq!(extract(&base(), html), ListingPage::Exhausted);
        assert_eq!(extract(&base(), ""), ListingPage::Exhausted);
    }
}
