//! Listing fetching and extraction.
//!
//! Every source goes through the same two steps per page:
//!
//! 1. **Fetching**: build the page URL from the source's [`Strategy`] and GET it
//!    through a [`Transport`]
//! 2. **Extraction**: turn the body into a [`ListingPage`]
//!
//! # Supported Strategies
//!
//! | Strategy | Module | Notes |
//! |----------|--------|-------|
//! | `paginated-listing` | [`govbr`] | Plone `article.tileItem` listings, offset pagination |
//! | `unsupported` | - | Registered only; never requested |

pub mod govbr;

use crate::error::{FetchFailure, TransportError};
use crate::models::{ListingPage, Source, Strategy};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Outbound GET returning the response body.
///
/// Implementations must treat non-success statuses as errors.
pub trait Transport {
    fn get(&self, url: &Url) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// [`Transport`] over a `reqwest` client with a fixed timeout and user agent.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the shared client used for every listing request of a run.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Whole-request timeout; exceeding it yields [`TransportError::Timeout`]
    /// * `user_agent` - Value sent as the `User-Agent` header on every request
    ///
    /// # Returns
    ///
    /// The transport, or the `reqwest` error raised while building the client
    /// (e.g. a user agent that is not a valid header value).
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &Url) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// URL of the zero-based `page` of `source`, or `None` when the strategy
/// does not support fetching.
///
/// The offset pair is appended verbatim (`?b_start:int=20`), so parameter
/// names containing `:` reach the server unescaped.
pub fn page_url(source: &Source, page: usize) -> Option<Url> {
    match &source.strategy {
        Strategy::PaginatedListing {
            offset_param,
            page_size,
        } => {
            let pair = format!("{offset_param}={}", page * page_size);
            let query = match source.url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{pair}"),
                _ => pair,
            };
            let mut url = source.url.clone();
            url.set_query(Some(&query));
            Some(url)
        }
        Strategy::Unsupported => None,
    }
}

/// Fetch one listing page of `source`.
///
/// Returns `Ok(None)` for unsupported sources without touching the network.
#[instrument(level = "info", skip(transport, source), fields(source = %source.url))]
pub async fn fetch_listing<T>(
    transport: &T,
    source: &Source,
    page: usize,
) -> Result<Option<String>, FetchFailure>
where
    T: Transport + Sync,
{
    let Some(url) = page_url(source, page) else {
        return Ok(None);
    };

    transport
        .get(&url)
        .await
        .map(Some)
        .map_err(|cause| FetchFailure {
            source_id: source.id().to_string(),
            page,
            cause,
        })
}

/// Extract candidates from a fetched page using the source's strategy.
pub fn extract(source: &Source, body: &str) -> ListingPage {
    match source.strategy {
        Strategy::PaginatedListing { .. } => govbr::extract(&source.url, body),
        Strategy::Unsupported => ListingPage::Exhausted,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode, Uri, header};
    use axum::routing::get;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use tokio::net::TcpListener;

    /// In-memory [`Transport`] keyed by full URL; records every request.
    /// Unknown URLs answer 404.
    #[derive(Debug, Default)]
    pub(crate) struct MockTransport {
        pages: HashMap<String, Result<String, u16>>,
        timeouts: Vec<String>,
        pub(crate) requests: Mutex<Vec<Url>>,
    }

    impl MockTransport {
        pub(crate) fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        pub(crate) fn with_status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        pub(crate) fn with_timeout(mut self, url: &str) -> Self {
            self.timeouts.push(url.to_string());
            self
        }

        pub(crate) fn requested(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(Url::to_string)
                .collect()
        }
    }

    impl Transport for MockTransport {
        async fn get(&self, url: &Url) -> Result<String, TransportError> {
            self.requests.lock().unwrap().push(url.clone());
            if self.timeouts.iter().any(|t| t == url.as_str()) {
                return Err(TransportError::Timeout);
            }
            match self.pages.get(url.as_str()) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(TransportError::Status(*status)),
                None => Err(TransportError::Status(404)),
            }
        }
    }

    /// Serve `router` on an ephemeral loopback port for the rest of the test.
    pub(crate) async fn serve_locally(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        addr
    }

    fn local_url(addr: SocketAddr, path: &str) -> Url {
        Url::parse(&format!("http://{addr}{path}")).unwrap()
    }

    fn anvisa() -> Source {
        Source::paginated(
            Url::parse("https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa").unwrap(),
            2,
        )
    }

    #[test]
    fn test_page_url_scales_offset() {
        let source = anvisa();
        let url = page_url(&source, 3).unwrap();
        let offset = url
            .query_pairs()
            .find(|(k, _)| k == "b_start:int")
            .map(|(_, v)| v.into_owned());
        assert_eq!(offset.as_deref(), Some("60"));
        assert_eq!(url.path(), "/anvisa/pt-br/assuntos/noticias-anvisa");
    }

    #[test]
    fn test_page_url_keeps_offset_param_literal() {
        let source = anvisa();
        assert_eq!(
            page_url(&source, 1).unwrap().as_str(),
            "https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa?b_start:int=20"
        );
        assert_eq!(
            page_url(&source, 0).unwrap().as_str(),
            "https://www.gov.br/anvisa/pt-br/assuntos/noticias-anvisa?b_start:int=0"
        );
    }

    #[test]
    fn test_page_url_extends_existing_query() {
        let source = Source::paginated(
            Url::parse("https://www.gov.br/saude/pt-br/assuntos/noticias?lang=pt").unwrap(),
            2,
        );
        assert_eq!(
            page_url(&source, 2).unwrap().as_str(),
            "https://www.gov.br/saude/pt-br/assuntos/noticias?lang=pt&b_start:int=40"
        );
    }

    #[test]
    fn test_page_url_unsupported() {
        let source = Source::unsupported(Url::parse("https://www.cabeleireiros.com/").unwrap());
        assert!(page_url(&source, 0).is_none());
    }

    #[tokio::test]
    async fn test_fetch_listing_unsupported_makes_no_request() {
        let transport = MockTransport::default();
        let source = Source::unsupported(Url::parse("https://esteticaemercado.com.br/").unwrap());
        let body = fetch_listing(&transport, &source, 0).await.unwrap();
        assert!(body.is_none());
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_listing_wraps_failure_with_context() {
        let source = anvisa();
        let url = page_url(&source, 0).unwrap();
        let transport = MockTransport::default().with_timeout(url.as_str());

        let err = fetch_listing(&transport, &source, 0).await.unwrap_err();
        assert_eq!(err.page, 0);
        assert_eq!(err.source_id, source.id());
        assert!(matches!(err.cause, TransportError::Timeout));
    }

    #[tokio::test]
    async fn test_fetch_listing_returns_body() {
        let source = anvisa();
        let url = page_url(&source, 1).unwrap();
        let transport = MockTransport::default().with_page(url.as_str(), "<html></html>");

        let body = fetch_listing(&transport, &source, 1).await.unwrap();
        assert_eq!(body.as_deref(), Some("<html></html>"));
        assert_eq!(transport.requested(), vec![url.to_string()]);
    }

    #[tokio::test]
    async fn test_http_transport_sends_user_agent() {
        let router = Router::new().route(
            "/noticias",
            get(|headers: HeaderMap| async move {
                headers
                    .get(header::USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        );
        let addr = serve_locally(router).await;
        let transport =
            HttpTransport::new(Duration::from_secs(5), "salon-briefing-test/1.0").unwrap();

        let body = transport.get(&local_url(addr, "/noticias")).await.unwrap();
        assert_eq!(body, "salon-briefing-test/1.0");
    }

    #[tokio::test]
    async fn test_http_transport_maps_error_status() {
        let router = Router::new().route(
            "/noticias",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "em manutenção") }),
        );
        let addr = serve_locally(router).await;
        let transport = HttpTransport::new(Duration::from_secs(5), "test").unwrap();

        let err = transport.get(&local_url(addr, "/noticias")).await.unwrap_err();
        assert!(matches!(err, TransportError::Status(503)));
    }

    #[tokio::test]
    async fn test_http_transport_maps_timeout() {
        let router = Router::new().route(
            "/noticias",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "tarde demais"
            }),
        );
        let addr = serve_locally(router).await;
        let transport = HttpTransport::new(Duration::from_millis(100), "test").unwrap();

        let err = transport.get(&local_url(addr, "/noticias")).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }

    #[tokio::test]
    async fn test_fetch_listing_over_http_sends_literal_offset() {
        let router = Router::new().route(
            "/noticias",
            get(|uri: Uri| async move { uri.query().unwrap_or_default().to_string() }),
        );
        let addr = serve_locally(router).await;
        let transport = HttpTransport::new(Duration::from_secs(5), "test").unwrap();
        let source = Source::paginated(local_url(addr, "/noticias"), 2);

        let body = fetch_listing(&transport, &source, 1).await.unwrap();
        assert_eq!(body.as_deref(), Some("b_start:int=20"));
    }
}
