/*
 * Responsibility
 * - GET/POST /echo/{id}: bind 結果 (URI → query → body のマージ) をそのまま返す
 */
use axum::http::header;

use crate::api::v1::dto::echo::{EchoRequest, EchoResponse};
use crate::api::v1::errors::ERR_INVALID_PARAM;
use crate::error::HandlerError;
use crate::plugin::RequestContext;

pub async fn echo(
    ctx: RequestContext,
    req: EchoRequest,
) -> Result<EchoResponse, HandlerError<EchoResponse>> {
    req.validate().map_err(|e| ERR_INVALID_PARAM.with_detail(e))?;

    let caller = ctx
        .user()
        .map(|u| u.name.clone())
        .or_else(|| ctx.basic_auth().map(|b| b.name.clone()));
    let user_agent = ctx
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    Ok(EchoResponse {
        method: ctx.method().to_string(),
        id: req.id,
        page: req.page,
        tags: req.tags,
        verbose: req.verbose,
        name: req.name,
        note: req.note,
        caller,
        user_agent,
    })
}
