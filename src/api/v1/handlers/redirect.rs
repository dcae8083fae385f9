/*
 * Responsibility
 * - GET /go?to=/path: redirect sentinel で 302 を返す
 */
use crate::api::v1::dto::redirect::GoRequest;
use crate::api::v1::errors::ERR_INVALID_PARAM;
use crate::error::HandlerError;
use crate::plugin::RequestContext;

pub async fn go(_ctx: RequestContext, req: GoRequest) -> Result<String, HandlerError<String>> {
    req.validate().map_err(|e| ERR_INVALID_PARAM.with_detail(e))?;
    Err(HandlerError::redirect(req.to))
}
