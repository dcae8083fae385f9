/*
 * Responsibility
 * - POST /files: multipart/form-data を bind して受け取った内容を要約して返す
 * - GET /files/{name}: envelope を使わず raw response (添付ファイル) を返す
 */
use axum::http::header;

use crate::api::v1::dto::files::{DownloadRequest, UploadRequest, UploadResponse};
use crate::api::v1::errors::ERR_INVALID_PARAM;
use crate::error::HandlerError;
use crate::plugin::RequestContext;

pub async fn upload(
    _ctx: RequestContext,
    req: UploadRequest,
) -> Result<UploadResponse, HandlerError<UploadResponse>> {
    let file = req
        .file
        .ok_or_else(|| ERR_INVALID_PARAM.with_detail("file"))?;

    Ok(UploadResponse {
        title: req.title,
        file_name: file.file_name,
        content_type: file.content_type,
        size: file.data.len(),
    })
}

pub async fn download(ctx: RequestContext, req: DownloadRequest) -> Result<(), HandlerError<()>> {
    req.validate().map_err(|e| ERR_INVALID_PARAM.with_detail(e))?;

    let body = format!("contents of {}\n", req.name);
    ctx.write_raw((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", req.name),
            ),
        ],
        body,
    ));

    Err(HandlerError::raw_response())
}
