//! HTTP trigger.
//!
//! `GET /` performs one full run and answers with the briefing as plain text
//! (200), or with the configuration error (500) when the API key is missing.

use crate::pipeline::{Connect, Pipeline};
use crate::scrapers::Transport;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// Build the application router.
///
/// # Arguments
///
/// * `pipeline` - Shared pipeline; every `GET /` calls [`Pipeline::run`] on it
///
/// # Returns
///
/// A [`Router`] with the single `/` route, ready for [`serve`] or for driving
/// directly with `tower::ServiceExt::oneshot`.
pub fn router<T, C>(pipeline: Arc<Pipeline<T, C>>) -> Router
where
    T: Transport + Send + Sync + 'static,
    C: Connect + 'static,
{
    Router::new()
        .route("/", get(run_briefing::<T, C>))
        .with_state(pipeline)
}

#[instrument(level = "info", skip_all)]
async fn run_briefing<T, C>(State(pipeline): State<Arc<Pipeline<T, C>>>) -> Response
where
    T: Transport + Send + Sync + 'static,
    C: Connect + 'static,
{
    match pipeline.run().await {
        Ok(briefing) => {
            info!(articles = briefing.corpus_articles, "Briefing served");
            (StatusCode::OK, briefing.text).into_response()
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve<T, C>(pipeline: Arc<Pipeline<T, C>>, addr: SocketAddr) -> std::io::Result<()>
where
    T: Transport + Send + Sync + 'static,
    C: Connect + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(pipeline)).await
}
