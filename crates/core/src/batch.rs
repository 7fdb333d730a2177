//! Batch dispatch over the scoring engines.
//!
//! Applies one engine element-wise over a list of items, returning results
//! in input order. A malformed item produces an `{error}` entry for that
//! item only; an unrecognized batch type fails the whole request.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{EngineError, ErrorBody};
use crate::forecast::{ConsumptionRecord, Forecaster};
use crate::risk::{HealthMetricSet, RiskScorer};

/// Supported batch discriminators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchKind {
    HealthMetrics,
    Consumption,
}

impl std::str::FromStr for BatchKind {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "health_metrics" => Ok(Self::HealthMetrics),
            "consumption" => Ok(Self::Consumption),
            other => Err(EngineError::UnknownBatchType(other.to_string())),
        }
    }
}

/// Wire shape of `/api/batch/process`.
#[derive(Clone, Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, Deserialize)]
struct ConsumptionBatchItem {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    data: Vec<ConsumptionRecord>,
}

/// Element-wise batch runner over the stateless engines.
#[derive(Clone, Copy, Debug, Default)]
pub struct BatchProcessor {
    pub risk: RiskScorer,
    pub forecaster: Forecaster,
}

impl BatchProcessor {
    pub fn process(&self, request: &BatchRequest) -> Result<Vec<Value>, EngineError> {
        let kind: BatchKind = request.kind.parse()?;
        Ok(request.data.iter().map(|item| self.process_item(kind, item)).collect())
    }

    fn process_item(&self, kind: BatchKind, item: &Value) -> Value {
        match kind {
            BatchKind::HealthMetrics => {
                match serde_json::from_value::<HealthMetricSet>(item.clone()) {
                    Ok(metrics) => serialize_result(&self.risk.assess(&metrics)),
                    Err(error) => error_value(&format!("invalid health metrics item: {error}")),
                }
            }
            BatchKind::Consumption => {
                match serde_json::from_value::<ConsumptionBatchItem>(item.clone()) {
                    Ok(item) if item.user_id.trim().is_empty() => {
                        error_value("validation failed: user_id is required")
                    }
                    Ok(item) => match self.forecaster.forecast(&item.data) {
                        Ok(report) => serialize_result(&report),
                        Err(error) => serialize_result(&ErrorBody::from(&error)),
                    },
                    Err(error) => error_value(&format!("invalid consumption item: {error}")),
                }
            }
        }
    }
}

fn serialize_result<T: serde::Serialize>(result: &T) -> Value {
    serde_json::to_value(result).unwrap_or_else(|error| error_value(&error.to_string()))
}

fn error_value(message: &str) -> Value {
    json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: &str, data: Vec<Value>) -> BatchRequest {
        BatchRequest { kind: kind.to_string(), data }
    }

    #[test]
    fn health_metric_items_are_scored_in_order() {
        let processor = BatchProcessor::default();
        let results = processor
            .process(&request(
                "health_metrics",
                vec![json!({"bmi": 36.0}), json!({})],
            ))
            .expect("batch should run");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["risk_score"], 30.0);
        assert_eq!(results[1]["risk_score"], 0.0);
        assert_eq!(results[1]["risk_level"], "low");
    }

    #[test]
    fn one_malformed_item_does_not_abort_its_siblings() {
        let processor = BatchProcessor::default();
        let results = processor
            .process(&request(
                "health_metrics",
                vec![json!({"bmi": "not-a-number"}), json!({"bmi": 31.0})],
            ))
            .expect("batch should run");

        assert!(results[0]["error"].as_str().expect("error entry").contains("invalid"));
        assert_eq!(results[1]["risk_score"], 15.0);
    }

    #[test]
    fn consumption_items_report_insufficient_data_inline() {
        let processor = BatchProcessor::default();
        let results = processor
            .process(&request(
                "consumption",
                vec![
                    json!({"user_id": "u1", "data": [{"quantity": 10.0}]}),
                    json!({"user_id": "u2", "data": [
                        {"quantity": 20.0}, {"quantity": 20.0}, {"quantity": 20.0}
                    ]}),
                ],
            ))
            .expect("batch should run");

        assert_eq!(results[0]["min_required"], 3);
        assert_eq!(results[0]["provided"], 1);
        assert_eq!(results[1]["trend"], "stable");
    }

    #[test]
    fn consumption_items_require_a_user_id() {
        let processor = BatchProcessor::default();
        let results = processor
            .process(&request("consumption", vec![json!({"data": []})]))
            .expect("batch should run");

        assert!(results[0]["error"].as_str().expect("error entry").contains("user_id"));
    }

    #[test]
    fn unknown_batch_type_short_circuits() {
        let processor = BatchProcessor::default();
        let result = processor.process(&request("rewards", vec![json!({})]));

        assert_eq!(result, Err(EngineError::UnknownBatchType("rewards".to_string())));
    }

    #[test]
    fn empty_batch_yields_empty_results() {
        let processor = BatchProcessor::default();
        let results = processor.process(&request("health_metrics", vec![])).expect("batch");
        assert!(results.is_empty());
    }
}
