/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証が必要かどうかは route ごとに handle(.., with_auth) で決める
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{issue_token, me},
    echo::echo,
    files::{download, upload},
    health::health,
    redirect::go,
};
use crate::plugin::handle;

pub fn routes() -> Router {
    let echo = handle(echo, false);

    Router::new()
        .route("/health", get(handle(health, false)))
        .route("/auth/token", post(handle(issue_token, true)))
        .route("/me", get(handle(me, true)))
        .route("/echo/{id}", get(echo.clone()).post(echo))
        .route("/files", post(handle(upload, false)))
        .route("/files/{name}", get(handle(download, false)))
        .route("/go", get(handle(go, false)))
}
