//! `Authorization: Basic <base64(name:password)>` → `BasicAuth` in extensions.
//!
//! Missing or malformed credentials leave the slot empty; the request always
//! continues.

use axum::{
    Router,
    extract::Request,
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::plugin::BasicAuth;

pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn(basic_auth))
}

pub async fn basic_auth(mut req: Request, next: Next) -> Response {
    if let Some(credential) = parse_basic(req.headers()) {
        req.extensions_mut().insert(credential);
    }
    next.run(req).await
}

pub(crate) fn parse_basic(headers: &HeaderMap) -> Option<BasicAuth> {
    const PREFIX: &str = "basic ";

    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let scheme = value.get(..PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    let decoded = STANDARD.decode(&value[PREFIX.len()..]).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, password) = decoded.split_once(':')?;

    Some(BasicAuth {
        name: name.to_owned(),
        password: password.to_owned(),
    })
}
