//! Text and serde configuration for SQL and MongoDB backends.
//!
//! Only parsing and connection-string assembly live here; opening pools is
//! left to the service that owns the driver.

mod fields;

pub mod backend;
pub mod mongo;

pub use backend::{BackendConfig, BackendInfo, SourceInfo};
pub use fields::FieldsError;
pub use mongo::{MongoAddr, MongoConfig};
