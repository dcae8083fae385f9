pub mod token;

pub use token::{TokenError, TokenService};
