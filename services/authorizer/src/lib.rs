//! Bearer Authorizer - turns bearer tokens into API invoke policies.
//!
//! This crate verifies Firebase ID tokens presented as `Bearer` credentials
//! and answers with an allow policy for the requested resource, or with an
//! opaque rejection. Every failure is logged in full and coarsened before it
//! reaches the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authorizer;
pub mod bearer;
pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod observability;
pub mod policy;

pub use authorizer::{Authorizer, AuthorizerSettings, Decision, Rejection};
pub use config::Config;
pub use error::{AuthorizerError, DenyReason, ErrorCode, ErrorVerbosity};
pub use event::AuthorizerRequest;
pub use identity::{FirebaseAuth, IdentityProvider, VerifiedIdentity};
pub use policy::{AuthorizerResponse, Effect, PolicyDocument, PolicyStatement};
