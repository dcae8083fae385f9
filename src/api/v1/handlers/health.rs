/*
 * Responsibility
 * - GET /health (疎通用)
 * - middleware を通す/通さない方針の確認用
 */
use crate::api::v1::dto::health::HealthResponse;
use crate::error::HandlerError;
use crate::plugin::RequestContext;

pub async fn health(
    _ctx: RequestContext,
    _req: (),
) -> Result<HealthResponse, HandlerError<HealthResponse>> {
    Ok(HealthResponse {
        status: "ok".to_owned(),
    })
}
