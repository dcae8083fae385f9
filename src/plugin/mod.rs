/*
 * Responsibility
 * - handler adapter の公開インターフェース (re-export)
 */
mod bind;
mod context;
mod handler;
mod response;

pub use bind::{BindError, FormFile};
pub use context::{BasicAuth, RegisteredClaims, RequestContext, UserAuth};
pub use handler::handle;
pub use response::Envelope;
