//! Property-based test entry point.

mod common;
mod property;
