//! HTTP inbound adapter exposing REST endpoints.

pub mod app;
pub mod articles;
pub mod error;
pub mod health;
pub mod identity;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use app::{AppDependencies, build_app};
pub use error::ApiResult;
