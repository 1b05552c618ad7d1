use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use shelfwise_core::config::{AppConfig, LoadOptions};
use shelfwise_core::{ApplicationError, Operation, RecommendationEngine};
use uuid::Uuid;

use crate::commands::CommandResult;

const COMMAND: &str = "recommend";

pub fn run(operation: &str, input: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    crate::init_logging(&config);

    let correlation_id = Uuid::new_v4().to_string();
    let operation = match operation.parse::<Operation>() {
        Ok(operation) => operation,
        Err(error) => {
            return failure(ApplicationError::from(error), correlation_id);
        }
    };

    let payload = match read_payload(input) {
        Ok(payload) => payload,
        Err(error) => {
            return failure(ApplicationError::Payload(format!("{error:#}")), correlation_id);
        }
    };

    run_with_config(&config, operation, &payload, correlation_id)
}

/// Score `payload` with an engine built from `config`.
pub fn run_with_config(
    config: &AppConfig,
    operation: Operation,
    payload: &str,
    correlation_id: String,
) -> CommandResult {
    let engine = RecommendationEngine::from_config(config);
    let span = tracing::info_span!(
        "recommend",
        operation = operation.as_str(),
        correlation_id = correlation_id.as_str()
    );
    let _entered = span.enter();

    match engine.handle_json(operation, payload) {
        Ok(response) => CommandResult::payload(COMMAND, &response),
        Err(error) => failure(error, correlation_id),
    }
}

fn failure(error: ApplicationError, correlation_id: String) -> CommandResult {
    let (error_class, exit_code) = match &error {
        ApplicationError::Configuration(_) => ("config_validation", 2),
        ApplicationError::Domain(_) => ("bad_request", 3),
        ApplicationError::Payload(_) => ("payload_decode", 4),
    };
    tracing::warn!(
        event_name = "recommend.request.rejected",
        error_class,
        correlation_id = correlation_id.as_str(),
        error = %error,
        "recommendation request rejected"
    );

    let interface = error.into_interface(correlation_id);
    CommandResult::failure_with_correlation(
        COMMAND,
        error_class,
        interface.to_string(),
        exit_code,
        Some(interface.correlation_id().to_string()),
    )
}

fn read_payload(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("could not read request body from `{}`", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("could not read request body from stdin")?;
            Ok(buffer)
        }
    }
}
