use std::path::Path;

use oilwise_core::config::{AppConfig, LoadOptions};
use oilwise_core::{ConsumptionRecord, EngineError, ErrorBody};

use super::{read_input, serialize_payload, CommandResult};

pub fn run(input: Option<&Path>) -> CommandResult {
    let raw = match read_input(input) {
        Ok(raw) => raw,
        Err(error) => return CommandResult::failure("forecast", "io", error.to_string(), 2),
    };

    let records: Vec<ConsumptionRecord> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(error) => {
            return CommandResult::failure(
                "forecast",
                "invalid_input",
                format!("history is not a valid JSON record array: {error}"),
                2,
            )
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("forecast", "config", error.to_string(), 1),
    };

    match config.engine.forecaster().forecast(&records) {
        Ok(report) => CommandResult::success(serialize_payload(&report)),
        Err(error @ EngineError::InsufficientData { .. }) => {
            CommandResult { exit_code: 1, output: serialize_payload(&ErrorBody::from(&error)) }
        }
        Err(error) => CommandResult::failure("forecast", "engine", error.to_string(), 1),
    }
}
