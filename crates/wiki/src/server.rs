// ABOUTME: The HTTP endpoint: GET /?page=<id> returns PageData as JSON, errors as {"Error": message}.
// ABOUTME: Wraps the router in CORS and request tracing layers and serves it with graceful shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::client::Client;
use crate::error::{ErrorCode, ScrapeError, ServerError};
use crate::options::SourceMode;

#[derive(Clone)]
pub(crate) struct AppState {
    client: Arc<Client>,
    legacy_status: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScrapeQuery {
    page: Option<String>,
    source: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "Error")]
    error: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// HTTP status for an error code. Legacy mode answers 200 for everything.
fn status_for(code: ErrorCode, legacy: bool) -> StatusCode {
    if legacy {
        return StatusCode::OK;
    }
    match code {
        ErrorCode::MissingInput => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Upstream => StatusCode::BAD_GATEWAY,
        ErrorCode::Structural => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn error_response(err: &ScrapeError, legacy: bool) -> Response {
    (
        status_for(err.code, legacy),
        Json(ErrorBody {
            error: err.user_message(),
        }),
    )
        .into_response()
}

async fn scrape_handler(State(state): State<AppState>, Query(query): Query<ScrapeQuery>) -> Response {
    let Some(page) = query.page.filter(|p| !p.is_empty()) else {
        let err = ScrapeError::missing_input("Scrape");
        tracing::info!("rejected request without a page id");
        return error_response(&err, state.legacy_status);
    };

    let default_source = state.client.options().source;
    let source = match query.source.as_deref() {
        None => default_source,
        Some(raw) => raw.parse::<SourceMode>().unwrap_or_else(|e| {
            tracing::warn!(page = %page, "{}; using {}", e, default_source);
            default_source
        }),
    };

    match state.client.scrape_with(&page, source).await {
        Ok(data) => {
            tracing::info!(page = %page, %source, sections = data.sections.len(), "scraped");
            Json(data).into_response()
        }
        Err(err) => {
            match err.code {
                ErrorCode::Upstream | ErrorCode::Structural => {
                    tracing::error!(page = %page, error = %err, "scrape failed")
                }
                _ => tracing::info!(page = %page, error = %err, "scrape failed"),
            }
            error_response(&err, state.legacy_status)
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(scrape_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The scrape endpoint server.
pub struct ScrapeServer {
    addr: SocketAddr,
    client: Arc<Client>,
    legacy_status: bool,
}

impl ScrapeServer {
    #[must_use]
    pub fn new(bind: &str, port: u16, client: Client) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        Self {
            addr,
            client: Arc::new(client),
            legacy_status: false,
        }
    }

    /// Answer every error with HTTP 200 and let clients read the `Error` key.
    #[must_use]
    pub fn with_legacy_status(mut self, legacy: bool) -> Self {
        self.legacy_status = legacy;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The router without a listener, for embedding or testing.
    pub fn router(&self) -> Router {
        build_router(AppState {
            client: Arc::clone(&self.client),
            legacy_status: self.legacy_status,
        })
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::Bind(self.addr.to_string(), e))?;
        tracing::info!("LIVE @ http://{}/", self.addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("server shutting down");
            })
            .await
            .map_err(ServerError::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(ErrorCode::MissingInput, false), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::NotFound, false), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::Upstream, false), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(ErrorCode::Structural, false),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorCode::Upstream, true), StatusCode::OK);
    }

    #[test]
    fn error_body_uses_capitalized_key() {
        let json = serde_json::to_string(&ErrorBody { error: "nope" }).unwrap();
        assert_eq!(json, r#"{"Error":"nope"}"#);
    }

    #[test]
    fn invalid_bind_falls_back_to_loopback() {
        let client = Client::builder().build().unwrap();
        let server = ScrapeServer::new("not_an_ip", 4999, client);
        assert_eq!(server.addr().port(), 4999);
        assert!(server.addr().ip().is_loopback());
    }

    mod router {
        use super::*;
        use axum::body::Body;
        use axum::http::Request;
        use http_body_util::BodyExt;
        use httpmock::prelude::*;
        use tower::ServiceExt;

        fn server_for(mock: &MockServer, legacy: bool) -> ScrapeServer {
            let client = Client::builder()
                .api_base(mock.url("/api/"))
                .wiki_base(mock.url("/wiki/"))
                .build()
                .unwrap();
            ScrapeServer::new("127.0.0.1", 0, client).with_legacy_status(legacy)
        }

        async fn send_get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let resp = router.oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        #[tokio::test]
        async fn health_returns_ok() {
            let mock = MockServer::start();
            let (status, body) = send_get(server_for(&mock, false).router(), "/health").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, serde_json::json!({"status": "ok"}));
        }

        #[tokio::test]
        async fn missing_page_is_bad_request() {
            let mock = MockServer::start();
            for uri in ["/", "/?page="] {
                let (status, body) = send_get(server_for(&mock, false).router(), uri).await;
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body["Error"], crate::error::MISSING_INPUT_MESSAGE);
            }
        }

        #[tokio::test]
        async fn legacy_mode_answers_200_for_errors() {
            let mock = MockServer::start();
            let (status, body) = send_get(server_for(&mock, true).router(), "/").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.get("Error").is_some());
        }

        #[tokio::test]
        async fn unknown_page_is_not_found() {
            let mock = MockServer::start();
            mock.mock(|when, then| {
                when.method(GET).path("/api/Nope");
                then.status(404);
            });
            mock.mock(|when, then| {
                when.method(GET).path("/wiki/Nope");
                then.status(404);
            });
            let (status, body) = send_get(server_for(&mock, false).router(), "/?page=Nope").await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, serde_json::json!({"Error": crate::error::PAGE_ERROR_MESSAGE}));
        }

        #[tokio::test]
        async fn upstream_failure_is_bad_gateway() {
            let mock = MockServer::start();
            mock.mock(|when, then| {
                when.method(GET).path("/wiki/Cat");
                then.status(500);
            });
            let (status, _) = send_get(server_for(&mock, false).router(), "/?page=Cat&source=html").await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
        }

        #[tokio::test]
        async fn unknown_source_falls_back_to_default() {
            let mock = MockServer::start();
            let wiki = mock.mock(|when, then| {
                when.method(GET).path("/wiki/Cat");
                then.status(200).body("<html><body></body></html>");
            });
            let client = Client::builder()
                .api_base(mock.url("/api/"))
                .wiki_base(mock.url("/wiki/"))
                .source(SourceMode::Html)
                .build()
                .unwrap();
            let router = ScrapeServer::new("127.0.0.1", 0, client).router();
            let (status, _) = send_get(router, "/?page=Cat&source=wikitext").await;
            assert_eq!(status, StatusCode::OK);
            wiki.assert();
        }

        #[tokio::test]
        async fn scrape_returns_page_data() {
            let mock = MockServer::start();
            mock.mock(|when, then| {
                when.method(GET).path("/api/Cat");
                then.status(200).body(
                    r#"{"lead": {"displaytitle": "Cat", "sections": [{"id": 0, "text": "<p>Cats.</p>"}]},
                        "remaining": {"sections": [{"id": 1, "toclevel": 1, "line": "Biology", "text": "<p>Body.</p>"}]}}"#,
                );
            });
            mock.mock(|when, then| {
                when.method(GET).path("/wiki/Cat");
                then.status(200).body("<html><body></body></html>");
            });
            let (status, body) = send_get(server_for(&mock, false).router(), "/?page=Cat").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["title"], "Cat");
            assert_eq!(body["intro"], "Cats.");
            assert_eq!(body["sections"]["Biology"]["intro"], "Body.");
            assert_eq!(body["images"], serde_json::json!({}));
        }
    }
}
