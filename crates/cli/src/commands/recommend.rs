use std::path::Path;

use oilwise_core::config::{AppConfig, LoadOptions};
use oilwise_core::{PreferenceProfile, RecipeCatalog, SeedCatalog};

use super::{read_input, serialize_payload, CommandResult};

pub fn run(input: Option<&Path>) -> CommandResult {
    let raw = match read_input(input) {
        Ok(raw) => raw,
        Err(error) => return CommandResult::failure("recommend", "io", error.to_string(), 2),
    };

    let preferences: PreferenceProfile = match serde_json::from_str(&raw) {
        Ok(preferences) => preferences,
        Err(error) => {
            return CommandResult::failure(
                "recommend",
                "invalid_input",
                format!("preference profile is not valid JSON: {error}"),
                2,
            )
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("recommend", "config", error.to_string(), 1),
    };

    let catalog = SeedCatalog::new();
    let candidates = catalog.candidates(&preferences.cuisine_tags);
    let ranked = config.engine.ranker().rank(&preferences, &candidates);

    CommandResult::success(serialize_payload(&ranked))
}
