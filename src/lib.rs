#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod http_client;
pub mod reporter;
pub mod telemetry;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;
