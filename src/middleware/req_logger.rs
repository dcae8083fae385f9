//! One structured log line per request.
//!
//! Always: method, client ip, request id, status code and elapsed time.
//! Only when DEBUG is enabled for this module:
//! - query parameters
//! - the request body (read, then put back for downstream extractors)
//! - the response body (buffered, then re-emitted unchanged)
//!
//! Bodies are logged only when they fit within `max_print_body_size`.
//! The size check happens after buffering, so one oversized body may be held
//! in memory for the duration of the request even though it is not logged.

use std::time::Instant;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use tracing::{Level, info, warn};

use super::client_ip::client_ip;
use super::http::REQUEST_ID_HEADER;
use crate::state::PluginConfig;

pub fn apply<S>(router: Router<S>, config: PluginConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(config, req_logger))
}

pub async fn req_logger(State(config): State<PluginConfig>, req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let client_ip = client_ip(&req).map(|ip| ip.to_string()).unwrap_or_default();
    let request_id = req
        .headers()
        .get(HeaderName::from_static(REQUEST_ID_HEADER))
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let max_body = config.max_print_body_size();
    let capture = tracing::enabled!(Level::DEBUG);

    let mut query_params = None;
    let mut body = None;
    let mut response_body = None;

    let response = if capture {
        query_params = req.uri().query().and_then(format_query);

        let (parts, req_body) = req.into_parts();
        let bytes = match axum::body::to_bytes(req_body, usize::MAX).await {
            Ok(bytes) => bytes,
            // the chain still runs, as it does when capture is off
            Err(err) => {
                warn!(error = %err, path = %path, "failed to read request body");
                Bytes::new()
            }
        };
        body = request_body_field(&bytes, max_body);
        let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

        let (parts, res_body) = response.into_parts();
        match axum::body::to_bytes(res_body, usize::MAX).await {
            Ok(bytes) => {
                response_body = response_body_field(&bytes, max_body);
                Response::from_parts(parts, Body::from(bytes))
            }
            Err(err) => {
                warn!(error = %err, path = %path, "failed to buffer response body");
                Response::from_parts(parts, Body::empty())
            }
        }
    } else {
        next.run(req).await
    };

    info!(
        method = %method,
        client_ip = %client_ip,
        request_id = request_id.as_deref(),
        query_params = query_params.as_deref(),
        body = body.as_deref(),
        code = response.status().as_u16(),
        response = response_body.as_deref(),
        cost = ?start.elapsed(),
        "{}",
        path
    );

    response
}

/// `{key: [v1 v2],other: [v],}`; `None` when there are no parameters.
pub(crate) fn format_query(query: &str) -> Option<String> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match grouped.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => grouped.push((key.into_owned(), vec![value.into_owned()])),
        }
    }
    if grouped.is_empty() {
        return None;
    }

    let mut out = String::from("{");
    for (key, values) in &grouped {
        out.push_str(&format!("{key}: [{}],", values.join(" ")));
    }
    out.push('}');
    Some(out)
}

/// Non-empty and no longer than `max`. `max == 0` never captures.
pub(crate) fn request_body_field(body: &Bytes, max: usize) -> Option<String> {
    (!body.is_empty() && body.len() <= max).then(|| String::from_utf8_lossy(body).into_owned())
}

/// No longer than `max`; `max == 0` means unbounded.
pub(crate) fn response_body_field(body: &Bytes, max: usize) -> Option<String> {
    (max == 0 || body.len() <= max).then(|| String::from_utf8_lossy(body).into_owned())
}
