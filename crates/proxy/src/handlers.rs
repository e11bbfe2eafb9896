//! The artifact lookup handler.
//!
//! Every path is an artifact lookup. There are no reserved routes, so a
//! published file can never be shadowed by the proxy itself.

use crate::error::{ProxyError, ProxyResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use drydock_core::{ProjectId, content_type_for, request_key};

/// Serve one request: resolve subdomain → project, rewrite the root path
/// to the index document, read the object, stream it back.
pub async fn serve_artifact(State(state): State<AppState>, req: Request) -> Response {
    let method = req.method().clone();
    let host = request_host(&req).map(str::to_string);
    let path = req.uri().path().to_string();

    match lookup(&state, &method, host.as_deref(), &path).await {
        Ok(response) => response,
        Err(e) => {
            // Full diagnostic context stays server-side.
            tracing::warn!(
                host = host.as_deref().unwrap_or("<missing>"),
                path = %path,
                error = %e,
                "request failed"
            );
            e.into_response()
        }
    }
}

async fn lookup(
    state: &AppState,
    method: &Method,
    host: Option<&str>,
    path: &str,
) -> ProxyResult<Response> {
    if method != Method::GET && method != Method::HEAD {
        return Err(ProxyError::MethodNotAllowed(method.to_string()));
    }

    let host = host.ok_or_else(|| ProxyError::MalformedHost("<missing>".to_string()))?;
    let project = ProjectId::from_host(host)
        .map_err(|_| ProxyError::MalformedHost(host.to_string()))?;

    let key = request_key(&project, path);
    tracing::debug!(project = %project, key = %key, "resolving request");

    let upstream_timeout = state.config.server.upstream_timeout();

    // One store read per request, bounded so a hung store cannot hold
    // the client connection open indefinitely. GET takes metadata and
    // body from the same read, so the framed Content-Length always
    // matches the streamed object even across a concurrent republish.
    let (meta, body) = if method == Method::HEAD {
        let meta = tokio::time::timeout(upstream_timeout, state.storage.head(&key))
            .await
            .map_err(|_| ProxyError::Upstream(format!("timed out resolving {key}")))?
            .map_err(|e| map_storage_error(e, &key))?;
        (meta, Body::empty())
    } else {
        let (meta, stream) = tokio::time::timeout(upstream_timeout, state.storage.get_stream(&key))
            .await
            .map_err(|_| ProxyError::Upstream(format!("timed out fetching {key}")))?
            .map_err(|e| map_storage_error(e, &key))?;
        (meta, Body::from_stream(stream))
    };

    let content_type = meta
        .content_type
        .unwrap_or_else(|| content_type_for(&key).to_string());

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type),
            (CONTENT_LENGTH, meta.size.to_string()),
        ],
        body,
    )
        .into_response())
}

/// NotFound passes through as the store's own not-found; a key the store
/// refuses to address (traversal attempts) is indistinguishable from a
/// missing object to the client. Anything else means the store could not
/// be reached or answered abnormally.
fn map_storage_error(e: drydock_storage::StorageError, key: &str) -> ProxyError {
    use drydock_storage::StorageError;
    match e {
        StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
            ProxyError::NotFound(key.to_string())
        }
        other => ProxyError::Upstream(format!("{key}: {other}")),
    }
}

/// Extract the hostname a request was addressed to, without any port.
fn request_host(req: &Request) -> Option<&str> {
    let raw = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().host())?;
    let host = raw.split(':').next().unwrap_or(raw);
    if host.is_empty() { None } else { Some(host) }
}
