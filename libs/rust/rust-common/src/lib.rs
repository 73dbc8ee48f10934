//! Shared library for cross-cutting concerns in the bearer authorizer services.
//!
//! This crate provides centralized implementations for:
//! - Platform error type shared by the infrastructure helpers
//! - HTTP client configuration and building
//! - Tracing subscriber initialization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod tracing_config;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{TracingConfig, init_tracing};
