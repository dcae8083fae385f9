/*
 * Responsibility
 * - 業務関数 (RequestContext, Req) -> Result<Res, HandlerError<Res>> を axum handler に変換する
 * - decode → context 組み立て → 認証チェック (任意) → 呼び出し → envelope 描画
 * - panic は request 単位で捕捉し 500 envelope に変換する (プロセスは落とさない)
 */
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::{
    extract::{FromRequestParts, RawPathParams, Request},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::{FutureExt, future::BoxFuture};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error};

use super::bind;
use super::context::{RawSlot, RequestContext};
use super::response::Envelope;
use crate::error::{ERR_AUTH, ERR_RAW_RESPONSE, ERR_REDIRECT, EzError, HandlerError};

/// Wraps a business function into an axum handler.
///
/// ```ignore
/// Router::new()
///     .route("/users/{id}", get(handle(get_user, true)))
///     .route("/login", post(handle(login, false)));
/// ```
///
/// With `with_auth`, requests carrying neither a verified token nor Basic
/// credentials are answered with the 401 envelope and `f` is not called.
pub fn handle<F, Fut, Req, Res>(
    f: F,
    with_auth: bool,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    F: Fn(RequestContext, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, HandlerError<Res>>> + Send + 'static,
    Req: DeserializeOwned + Serialize + Default + Send + 'static,
    Res: Serialize + Send + 'static,
{
    move |request: Request| {
        let f = f.clone();
        async move {
            match AssertUnwindSafe(dispatch(f, with_auth, request))
                .catch_unwind()
                .await
            {
                Ok(response) => response,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(error = %message, "panic");
                    Envelope::failure(500, message).into_response()
                }
            }
        }
        .boxed()
    }
}

async fn dispatch<F, Fut, Req, Res>(f: F, with_auth: bool, request: Request) -> Response
where
    F: Fn(RequestContext, Req) -> Fut,
    Fut: Future<Output = Result<Res, HandlerError<Res>>>,
    Req: DeserializeOwned + Serialize + Default,
    Res: Serialize + 'static,
{
    let (mut parts, body) = request.into_parts();

    // routes without captures have nothing to bind here
    let params: Vec<(String, String)> =
        match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(params) => params
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
            Err(_) => Vec::new(),
        };

    let req = match bind::bind::<Req>(&parts, &params, body).await {
        Ok(req) => req,
        Err(err) => {
            debug!(error = %err, path = %parts.uri.path(), "request decode failed");
            return Envelope::failure(500, err.to_string()).into_response();
        }
    };

    let ctx = RequestContext::new(parts, params);
    if with_auth && !ctx.is_authenticated() {
        return Envelope::failure(ERR_AUTH.code(), ERR_AUTH.to_string()).into_response();
    }

    let raw = ctx.raw_slot();
    match f(ctx, req).await {
        Ok(out) => Envelope::success(out).into_response(),
        Err(err) => render_error(err, &raw),
    }
}

fn render_error<Res: 'static>(err: HandlerError<Res>, raw: &RawSlot) -> Response {
    let (value, err) = err.into_parts();

    let Some(ez) = err.downcast_ref::<EzError>() else {
        return Envelope::failure(500, err.to_string()).into_response();
    };

    if ERR_REDIRECT.is(ez) {
        return match value.as_ref().and_then(|v| redirect_target(v)) {
            Some(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            // non-string value: nothing is rendered
            None => StatusCode::OK.into_response(),
        };
    }

    if ERR_RAW_RESPONSE.is(ez) {
        return raw.take().unwrap_or_else(|| StatusCode::OK.into_response());
    }

    Envelope::failure(ez.code(), ez.to_string()).into_response()
}

fn redirect_target(value: &dyn Any) -> Option<String> {
    value
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| value.downcast_ref::<&'static str>().map(|s| (*s).to_owned()))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
