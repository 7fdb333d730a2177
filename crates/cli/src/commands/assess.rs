use std::path::Path;

use oilwise_core::config::{AppConfig, LoadOptions};
use oilwise_core::HealthMetricSet;

use super::{read_input, serialize_payload, CommandResult};

pub fn run(input: Option<&Path>) -> CommandResult {
    let raw = match read_input(input) {
        Ok(raw) => raw,
        Err(error) => return CommandResult::failure("assess", "io", error.to_string(), 2),
    };

    let metrics: HealthMetricSet = match serde_json::from_str(&raw) {
        Ok(metrics) => metrics,
        Err(error) => {
            return CommandResult::failure(
                "assess",
                "invalid_input",
                format!("metric set is not valid JSON: {error}"),
                2,
            )
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("assess", "config", error.to_string(), 1),
    };

    let assessment = config.engine.risk_scorer().assess(&metrics);
    CommandResult::success(serialize_payload(&assessment))
}
