/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - credential 抽出 (bearer / basic), request logger, transport layer
 */
pub mod basic_auth;
pub mod bearer_auth;
pub mod client_ip;
pub mod http;
pub mod req_logger;

pub use basic_auth::basic_auth;
pub use bearer_auth::bearer_auth;
pub use req_logger::req_logger;
