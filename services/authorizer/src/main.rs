//! Bearer Authorizer - Local Invoke Entry Point
//!
//! Reads one authorizer request as JSON from stdin and prints the response,
//! using the same configuration and provider wiring as a deployed authorizer.

use std::process::ExitCode;
use std::sync::Arc;

use authorizer::identity::shared_firebase_auth;
use authorizer::observability::AuthorizerMetrics;
use authorizer::{Authorizer, AuthorizerRequest, AuthorizerSettings, Config};
use rust_common::{TracingConfig, init_tracing};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("bearer-authorizer")
            .with_log_level(config.log_level.clone())
            .with_json_output(config.log_json),
    )?;

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let request: AuthorizerRequest = serde_json::from_str(&input)?;

    let provider = shared_firebase_auth(&config).await?;
    let metrics = Arc::new(AuthorizerMetrics::new(prometheus::default_registry())?);
    let authorizer = Authorizer::new(provider, AuthorizerSettings::from(&config))
        .with_metrics(Arc::clone(&metrics));

    let outcome = authorizer.handle(&request).await;
    debug!(metrics = %metrics.render()?, "Invocation metrics");

    match outcome {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            info!("Request allowed");
            Ok(ExitCode::SUCCESS)
        }
        Err(rejection) => {
            println!("{}", json!({ "errorMessage": rejection.message() }));
            info!(deny_reason = %rejection.reason(), "Request rejected");
            Ok(ExitCode::FAILURE)
        }
    }
}
