//! Property-Based Tests Module
//!
//! Uses proptest for invariant verification.
//!
//! Test categories:
//! - bearer: header parsing never lets a bad credential through
//! - decision: decisions are total, deterministic and resource-scoped

pub mod bearer;
pub mod decision;
pub mod generators;
