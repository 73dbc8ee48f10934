//! Observability Module
//!
//! Prometheus metrics for authorization decisions. Structured logging is
//! set up through `rust_common::init_tracing`.

pub mod metrics;

pub use metrics::AuthorizerMetrics;
