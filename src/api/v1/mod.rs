/*
 * Responsibility
 * - v1 の公開ポイント (routes() の re-export など)
 * - v1 固有のエラーコード
 */
pub mod dto;
pub mod errors;
pub mod handlers;
mod routes;

pub use routes::routes;
