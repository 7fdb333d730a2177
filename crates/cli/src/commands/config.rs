use oilwise_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use super::{serialize_payload, CommandResult};

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    server: ServerView,
    logging: LoggingView,
    engine: EngineView,
}

#[derive(Debug, Serialize)]
struct ServerView {
    bind_address: String,
    port: u16,
    graceful_shutdown_secs: u64,
}

#[derive(Debug, Serialize)]
struct LoggingView {
    level: String,
    format: String,
}

#[derive(Debug, Serialize)]
struct EngineView {
    recommended_daily_intake: f64,
    forecast_horizon_days: usize,
    week_to_month_factor: f64,
    trend_slope_threshold: f64,
    max_recommendations: usize,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("config", "config", error.to_string(), 1),
    };

    let view = EffectiveConfig {
        server: ServerView {
            bind_address: config.server.bind_address.clone(),
            port: config.server.port,
            graceful_shutdown_secs: config.server.graceful_shutdown_secs,
        },
        logging: LoggingView {
            level: config.logging.level.clone(),
            format: format!("{:?}", config.logging.format).to_lowercase(),
        },
        engine: EngineView {
            recommended_daily_intake: config.engine.recommended_daily_intake,
            forecast_horizon_days: config.engine.forecast_horizon_days,
            week_to_month_factor: config.engine.week_to_month_factor,
            trend_slope_threshold: config.engine.trend_slope_threshold,
            max_recommendations: config.engine.max_recommendations,
        },
    };

    CommandResult::success(serialize_payload(&view))
}
