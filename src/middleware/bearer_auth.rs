/*
 * Responsibility
 * - Bearer トークン (なければ cookie) の抽出 → salt で検証
 * - 成功時に UserAuth を request extensions に載せる
 * - 失敗しても拒否はしない。認証が必須かどうかは handler adapter が決める
 */
//! `Authorization: Bearer <jwt>`, or the configured cookie when the header is
//! missing entirely.
//!
//! A header that is present but not of the `Bearer <token>` form disables the
//! cookie fallback: the request simply continues without a user.

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::debug;

use crate::services::TokenService;
use crate::state::PluginConfig;

/// Apply the bearer/cookie verifier to every route of `router`.
pub fn apply<S>(router: Router<S>, config: PluginConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(config, bearer_auth))
}

pub async fn bearer_auth(
    State(config): State<PluginConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(req.headers(), &config.cookie_name()) {
        match TokenService::new(&config.token_salt()).verify(&token) {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(err) => {
                debug!(error = %err, "bearer token ignored");
            }
        }
    }

    next.run(req).await
}

pub(crate) fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    match headers.get(header::AUTHORIZATION) {
        Some(value) if !value.is_empty() => {
            let value = value.to_str().ok()?;
            let mut fields = value.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
                    Some(token.to_owned())
                }
                _ => None,
            }
        }
        _ => cookie_value(headers, cookie_name),
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}
