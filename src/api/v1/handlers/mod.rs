pub mod auth;
pub mod echo;
pub mod files;
pub mod health;
pub mod redirect;
