// Server module - minimal HTTP/1 front for materialization and upload events

use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::bulk::{BulkGenerator, UploadEvent};
use crate::config::Config;
use crate::error::ResizerError;
use crate::materializer::{Materializer, RedirectResponse};
use crate::store::BlobStore;

/// Shared request handlers
pub struct AppState {
    pub materializer: Materializer,
    pub bulk: BulkGenerator,
}

impl AppState {
    pub fn new(store: Arc<dyn BlobStore>, config: Arc<Config>) -> Self {
        Self {
            materializer: Materializer::new(Arc::clone(&store), Arc::clone(&config)),
            bulk: BulkGenerator::new(store, config),
        }
    }
}

/// Parameters of a materialize request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterializeQuery {
    pub key: Option<String>,
    pub keep_alpha: bool,
}

impl MaterializeQuery {
    /// Parse `key` and `keepAlpha` from a raw query string
    pub fn parse(query: &str) -> Self {
        let mut parsed = MaterializeQuery::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(&value.replace('+', " "))
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            match name {
                "key" => parsed.key = Some(value),
                "keepAlpha" => parsed.keep_alpha = is_truthy(&value),
                _ => {}
            }
        }
        parsed
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value, "" | "0" | "false")
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn error_response(err: &ResizerError) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(err.to_http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = Response::new(Full::new(Bytes::from(err.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/plain"));
    response
}

/// 301 with `Location` and `Cache-Control`; 500 when the location is not a
/// valid header value
fn redirect_response(redirect: &RedirectResponse) -> Response<Full<Bytes>> {
    let location = match header::HeaderValue::from_str(&redirect.location) {
        Ok(location) => location,
        Err(e) => {
            tracing::error!(
                location = %redirect.location.escape_debug(),
                error = %e,
                "Invalid redirect location"
            );
            return empty_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut response = empty_response(
        StatusCode::from_u16(redirect.status).unwrap_or(StatusCode::MOVED_PERMANENTLY),
    );
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static(redirect.cache_control),
    );
    response
}

/// Route a request to the materializer or the bulk generator
pub async fn handle_request<B>(state: &AppState, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => {
            let query = MaterializeQuery::parse(req.uri().query().unwrap_or(""));
            let Some(key) = query.key else {
                return empty_response(StatusCode::BAD_REQUEST);
            };

            match state.materializer.materialize(&key, query.keep_alpha).await {
                Ok(redirect) => redirect_response(&redirect),
                Err(err) => {
                    tracing::warn!(key = %key, status = err.to_http_status(), error = %err, "Materialize failed");
                    error_response(&err)
                }
            }
        }
        (&Method::POST, "/events") => {
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read event body");
                    return empty_response(StatusCode::BAD_REQUEST);
                }
            };

            let result = match UploadEvent::from_slice(&body) {
                Ok(event) => state.bulk.on_upload(&event).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(_) => empty_response(StatusCode::NO_CONTENT),
                Err(err) => error_response(&err),
            }
        }
        (_, "/") | (_, "/events") => empty_response(StatusCode::METHOD_NOT_ALLOWED),
        _ => empty_response(StatusCode::NOT_FOUND),
    }
}

/// Accept connections until the listener fails
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { Ok::<_, Infallible>(handle_request(&state, req).await) }
            });
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::error!(peer = %peer, error = %e, "Connection error");
            }
        });
    }
}
