/*
 * Responsibility
 * - POST /auth/token: 認証済みの呼び出し元に bearer token を発行
 *   (Basic で来た場合は Basic の name、bearer なら token の id / name を引き継ぐ)
 * - GET /me: 呼び出し元の identity を返す
 *
 * Notes
 * - どちらも handle(.., true) で登録する。未認証はここに到達しない
 */
use tracing::info;

use crate::api::v1::dto::auth::{Credential, MeResponse, TokenRequest, TokenResponse};
use crate::api::v1::errors::{ERR_FORBIDDEN, ERR_INVALID_PARAM, ERR_ISSUE_TOKEN};
use crate::error::{ERR_AUTH, HandlerError};
use crate::plugin::{RequestContext, UserAuth};
use crate::services::TokenService;
use crate::state::PluginConfig;

pub async fn issue_token(
    ctx: RequestContext,
    req: TokenRequest,
) -> Result<TokenResponse, HandlerError<TokenResponse>> {
    req.validate().map_err(|e| ERR_INVALID_PARAM.with_detail(e))?;

    // Basic callers pick the id; bearer callers can only renew their own.
    let (id, name) = match (ctx.basic_auth(), ctx.user()) {
        (Some(basic), _) => (req.id, basic.name.clone()),
        (None, Some(user)) if req.id == 0 || req.id == user.id => (user.id, user.name.clone()),
        (None, Some(_)) => return Err(ERR_FORBIDDEN.with_detail("id").into()),
        (None, None) => return Err(ERR_AUTH.clone().into()),
    };

    let config = ctx
        .extension::<PluginConfig>()
        .ok_or_else(|| ERR_ISSUE_TOKEN.with_detail("plugin config not installed"))?;
    let claims = UserAuth::new(id, name).expires_in(req.ttl());

    let token = TokenService::new(&config.token_salt())
        .sign(&claims)
        .map_err(|e| ERR_ISSUE_TOKEN.with_err(e))?;

    info!(user_id = claims.id, user_name = %claims.name, "token issued");

    Ok(TokenResponse {
        token,
        expires_at: claims.claims.exp,
    })
}

pub async fn me(ctx: RequestContext, _req: ()) -> Result<MeResponse, HandlerError<MeResponse>> {
    if let Some(user) = ctx.user() {
        return Ok(MeResponse {
            id: user.id,
            name: user.name.clone(),
            credential: Credential::Bearer,
        });
    }
    if let Some(basic) = ctx.basic_auth() {
        return Ok(MeResponse {
            id: 0,
            name: basic.name.clone(),
            credential: Credential::Basic,
        });
    }
    Err(ERR_AUTH.clone().into())
}
