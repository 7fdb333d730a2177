use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forecast::Forecaster;
use crate::ranking::PreferenceRanker;
use crate::risk::RiskScorer;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Named engine tunables. The defaults are the reference behavior; every
/// value can be overridden by file or environment.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub recommended_daily_intake: f64,
    pub forecast_horizon_days: usize,
    pub week_to_month_factor: f64,
    pub trend_slope_threshold: f64,
    pub max_recommendations: usize,
}

impl EngineConfig {
    pub fn forecaster(&self) -> Forecaster {
        Forecaster {
            horizon_days: self.forecast_horizon_days,
            slope_threshold: self.trend_slope_threshold,
            reference_daily_intake: self.recommended_daily_intake,
            week_to_month_factor: self.week_to_month_factor,
        }
    }

    pub fn risk_scorer(&self) -> RiskScorer {
        RiskScorer { reference_daily_intake: self.recommended_daily_intake }
    }

    pub fn ranker(&self) -> PreferenceRanker {
        PreferenceRanker { max_results: self.max_recommendations, ..PreferenceRanker::default() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            engine: EngineConfig {
                recommended_daily_intake: crate::RECOMMENDED_DAILY_INTAKE,
                forecast_horizon_days: crate::forecast::DEFAULT_HORIZON_DAYS,
                week_to_month_factor: crate::forecast::WEEK_TO_MONTH_FACTOR,
                trend_slope_threshold: crate::forecast::TREND_SLOPE_THRESHOLD,
                max_recommendations: crate::ranking::MAX_RESULTS,
            },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("oilwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(recommended_daily_intake) = engine.recommended_daily_intake {
                self.engine.recommended_daily_intake = recommended_daily_intake;
            }
            if let Some(forecast_horizon_days) = engine.forecast_horizon_days {
                self.engine.forecast_horizon_days = forecast_horizon_days;
            }
            if let Some(week_to_month_factor) = engine.week_to_month_factor {
                self.engine.week_to_month_factor = week_to_month_factor;
            }
            if let Some(trend_slope_threshold) = engine.trend_slope_threshold {
                self.engine.trend_slope_threshold = trend_slope_threshold;
            }
            if let Some(max_recommendations) = engine.max_recommendations {
                self.engine.max_recommendations = max_recommendations;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("OILWISE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("OILWISE_SERVER_PORT") {
            self.server.port = parse_u16("OILWISE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("OILWISE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("OILWISE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("OILWISE_LOGGING_LEVEL").or_else(|| read_env("OILWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("OILWISE_LOGGING_FORMAT").or_else(|| read_env("OILWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("OILWISE_ENGINE_RECOMMENDED_DAILY_INTAKE") {
            self.engine.recommended_daily_intake =
                parse_f64("OILWISE_ENGINE_RECOMMENDED_DAILY_INTAKE", &value)?;
        }
        if let Some(value) = read_env("OILWISE_ENGINE_FORECAST_HORIZON_DAYS") {
            self.engine.forecast_horizon_days =
                parse_usize("OILWISE_ENGINE_FORECAST_HORIZON_DAYS", &value)?;
        }
        if let Some(value) = read_env("OILWISE_ENGINE_WEEK_TO_MONTH_FACTOR") {
            self.engine.week_to_month_factor =
                parse_f64("OILWISE_ENGINE_WEEK_TO_MONTH_FACTOR", &value)?;
        }
        if let Some(value) = read_env("OILWISE_ENGINE_TREND_SLOPE_THRESHOLD") {
            self.engine.trend_slope_threshold =
                parse_f64("OILWISE_ENGINE_TREND_SLOPE_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("OILWISE_ENGINE_MAX_RECOMMENDATIONS") {
            self.engine.max_recommendations =
                parse_usize("OILWISE_ENGINE_MAX_RECOMMENDATIONS", &value)?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        validate_engine(&self.engine)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("oilwise.toml"), PathBuf::from("config/oilwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.recommended_daily_intake <= 0.0 {
        return Err(ConfigError::Validation(
            "engine.recommended_daily_intake must be greater than zero".to_string(),
        ));
    }

    if engine.forecast_horizon_days == 0 || engine.forecast_horizon_days > 90 {
        return Err(ConfigError::Validation(
            "engine.forecast_horizon_days must be in range 1..=90".to_string(),
        ));
    }

    if engine.week_to_month_factor <= 0.0 {
        return Err(ConfigError::Validation(
            "engine.week_to_month_factor must be greater than zero".to_string(),
        ));
    }

    if engine.trend_slope_threshold < 0.0 {
        return Err(ConfigError::Validation(
            "engine.trend_slope_threshold must not be negative".to_string(),
        ));
    }

    if engine.max_recommendations == 0 || engine.max_recommendations > 100 {
        return Err(ConfigError::Validation(
            "engine.max_recommendations must be in range 1..=100".to_string(),
        ));
    }

    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
    engine: Option<EnginePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    recommended_daily_intake: Option<f64>,
    forecast_horizon_days: Option<usize>,
    week_to_month_factor: Option<f64>,
    trend_slope_threshold: Option<f64>,
    max_recommendations: Option<usize>,
}
