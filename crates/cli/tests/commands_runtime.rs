use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use oilwise_cli::commands::{assess, config, forecast, recommend};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn assess_scores_a_metric_set() {
    with_env(&[], || {
        let (_dir, path) = write_input(r#"{"bmi": 36.0, "daily_oil_intake": 60.0}"#);

        let result = assess::run(Some(&path));
        assert_eq!(result.exit_code, 0, "expected successful assessment");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["risk_score"], 55.0);
        assert_eq!(payload["risk_level"], "high");
    });
}

#[test]
fn assess_rejects_malformed_input() {
    with_env(&[], || {
        let (_dir, path) = write_input(r#"{"bmi": "heavy"}"#);

        let result = assess::run(Some(&path));
        assert_eq!(result.exit_code, 2, "expected invalid-input failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "assess");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn forecast_reports_a_full_prediction() {
    with_env(&[], || {
        let (_dir, path) =
            write_input(r#"[{"quantity": 20.0}, {"quantity": 20.0}, {"quantity": 20.0}]"#);

        let result = forecast::run(Some(&path));
        assert_eq!(result.exit_code, 0, "expected successful forecast");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["trend"], "stable");
        assert_eq!(payload["predictions"]["next_7_days"].as_array().map(Vec::len), Some(7));
    });
}

#[test]
fn forecast_signals_insufficient_history() {
    with_env(&[], || {
        let (_dir, path) = write_input(r#"[{"quantity": 20.0}]"#);

        let result = forecast::run(Some(&path));
        assert_eq!(result.exit_code, 1, "expected insufficient-data exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["min_required"], 3);
        assert_eq!(payload["provided"], 1);
    });
}

#[test]
fn forecast_honors_engine_env_overrides() {
    with_env(&[("OILWISE_ENGINE_FORECAST_HORIZON_DAYS", "3")], || {
        let (_dir, path) =
            write_input(r#"[{"quantity": 10.0}, {"quantity": 10.0}, {"quantity": 10.0}]"#);

        let result = forecast::run(Some(&path));
        assert_eq!(result.exit_code, 0, "expected successful forecast");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["predictions"]["next_7_days"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn recommend_ranks_seed_recipes() {
    with_env(&[], || {
        let (_dir, path) = write_input(
            r#"{"cuisinePreferences": ["south_indian"], "dietaryRestrictions": ["vegetarian"]}"#,
        );

        let result = recommend::run(Some(&path));
        assert_eq!(result.exit_code, 0, "expected successful recommendation");

        let payload = parse_payload(&result.output);
        let recipes = payload.as_array().expect("ranked recipe array");
        assert!(!recipes.is_empty());
        assert!(recipes.len() <= 10);
        let scores: Vec<f64> = recipes.iter().map(|r| r["score"].as_f64().expect("score")).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]), "scores should descend");
    });
}

#[test]
fn config_shows_effective_engine_values() {
    with_env(&[], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0, "expected successful config inspection");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["engine"]["recommended_daily_intake"], 33.3);
        assert_eq!(payload["engine"]["forecast_horizon_days"], 7);
        assert_eq!(payload["server"]["port"], 5000);
    });
}

#[test]
fn config_fails_fast_on_invalid_env() {
    with_env(&[("OILWISE_SERVER_PORT", "not-a-port")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 1, "expected config failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn write_input(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("input.json");
    fs::write(&path, contents).expect("input file should be written");
    (dir, path)
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OILWISE_SERVER_BIND_ADDRESS",
        "OILWISE_SERVER_PORT",
        "OILWISE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "OILWISE_LOGGING_LEVEL",
        "OILWISE_LOGGING_FORMAT",
        "OILWISE_LOG_LEVEL",
        "OILWISE_LOG_FORMAT",
        "OILWISE_ENGINE_RECOMMENDED_DAILY_INTAKE",
        "OILWISE_ENGINE_FORECAST_HORIZON_DAYS",
        "OILWISE_ENGINE_WEEK_TO_MONTH_FACTOR",
        "OILWISE_ENGINE_TREND_SLOPE_THRESHOLD",
        "OILWISE_ENGINE_MAX_RECOMMENDATIONS",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
