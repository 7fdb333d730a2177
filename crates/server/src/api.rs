//! Analytics API routes.
//!
//! JSON endpoints, mirroring the engine call contracts:
//! - `POST  /api/consumption/predict`               — consumption forecast
//! - `POST  /api/health/assess-risk`                — health risk assessment
//! - `POST  /api/recipes/recommend`                 — ranked recipe matches
//! - `POST  /api/personalization/profile`           — create a profile
//! - `GET   /api/personalization/profile/{user_id}` — fetch a profile
//! - `PATCH /api/personalization/profile/{user_id}` — partial profile update
//! - `POST  /api/batch/process`                     — element-wise batch runs
//!
//! Every response is an `{success, data}` envelope; failures carry
//! `{success: false, error, ...}` and the status code maps the error class.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use uuid::Uuid;

use oilwise_core::config::AppConfig;
use oilwise_core::{
    BatchProcessor, BatchRequest, ConsumptionRecord, EngineError, ErrorBody, Forecaster,
    HealthMetricSet, InMemoryProfileStore, PreferenceProfile, PreferenceRanker, ProfileBuilder,
    ProfileInput, ProfilePatch, RecipeCatalog, RiskScorer, SeedCatalog,
};

#[derive(Clone)]
pub struct AppState {
    forecaster: Forecaster,
    risk: RiskScorer,
    ranker: PreferenceRanker,
    batch: BatchProcessor,
    profiles: ProfileBuilder<Arc<InMemoryProfileStore>>,
    catalog: Arc<dyn RecipeCatalog>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let forecaster = config.engine.forecaster();
        let risk = config.engine.risk_scorer();
        Self {
            forecaster,
            risk,
            ranker: config.engine.ranker(),
            batch: BatchProcessor { risk, forecaster },
            profiles: ProfileBuilder::new(Arc::new(InMemoryProfileStore::new())),
            catalog: Arc::new(SeedCatalog::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub historical_data: Vec<ConsumptionRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssessRequest {
    #[serde(default)]
    pub metrics: HealthMetricSet,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub preferences: PreferenceProfile,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_data: ProfileInput,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/consumption/predict", post(predict))
        .route("/api/health/assess-risk", post(assess_risk))
        .route("/api/recipes/recommend", post(recommend))
        .route("/api/personalization/profile", post(create_profile))
        .route(
            "/api/personalization/profile/{user_id}",
            get(get_profile).patch(update_profile),
        )
        .route("/api/batch/process", post(process_batch))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type ApiResponse = (StatusCode, Json<Value>);

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    let user_id = match require_user_id(request.user_id.as_deref()) {
        Ok(user_id) => user_id,
        Err(error) => return failure(&correlation_id, &error),
    };

    info!(
        event_name = "analytics.predict",
        correlation_id = %correlation_id,
        user_id = %user_id,
        records = request.historical_data.len(),
        "consumption forecast requested"
    );

    match state.forecaster.forecast(&request.historical_data) {
        Ok(report) => success(&correlation_id, &report),
        // The reference behavior reports short histories as a structured
        // payload inside the success envelope, not as an HTTP failure.
        Err(error @ EngineError::InsufficientData { .. }) => {
            success(&correlation_id, &ErrorBody::from(&error))
        }
        Err(error) => failure(&correlation_id, &error),
    }
}

pub async fn assess_risk(
    State(state): State<AppState>,
    Json(request): Json<AssessRequest>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    let assessment = state.risk.assess(&request.metrics);

    info!(
        event_name = "analytics.assess_risk",
        correlation_id = %correlation_id,
        risk_score = assessment.risk_score,
        metrics = assessment.metrics_analyzed.len(),
        "health risk assessed"
    );

    success(&correlation_id, &assessment)
}

pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    let user_id = match require_user_id(request.user_id.as_deref()) {
        Ok(user_id) => user_id,
        Err(error) => return failure(&correlation_id, &error),
    };

    let candidates = state.catalog.candidates(&request.preferences.cuisine_tags);
    let ranked = state.ranker.rank(&request.preferences, &candidates);

    info!(
        event_name = "analytics.recommend",
        correlation_id = %correlation_id,
        user_id = %user_id,
        candidates = candidates.len(),
        returned = ranked.len(),
        "recipe recommendations ranked"
    );

    success(&correlation_id, &ranked)
}

pub async fn create_profile(
    State(state): State<AppState>,
    Json(request): Json<ProfileRequest>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    let user_id = request.user_id.unwrap_or_default();

    match state.profiles.build_profile(&user_id, request.user_data) {
        Ok(profile) => {
            info!(
                event_name = "personalization.profile_created",
                correlation_id = %correlation_id,
                user_id = %profile.user_id,
                "personalization profile created"
            );
            success(&correlation_id, &profile)
        }
        Err(error) => failure(&correlation_id, &error),
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    match state.profiles.get_profile(&user_id) {
        Ok(profile) => success(&correlation_id, &profile),
        Err(error) => failure(&correlation_id, &error),
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    match state.profiles.update_profile(&user_id, patch) {
        Ok(profile) => {
            info!(
                event_name = "personalization.profile_updated",
                correlation_id = %correlation_id,
                user_id = %profile.user_id,
                "personalization profile updated"
            );
            success(&correlation_id, &profile)
        }
        Err(error) => failure(&correlation_id, &error),
    }
}

pub async fn process_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();

    match state.batch.process(&request) {
        Ok(results) => {
            info!(
                event_name = "analytics.batch",
                correlation_id = %correlation_id,
                batch_type = %request.kind,
                items = results.len(),
                "batch processed"
            );
            success(&correlation_id, &results)
        }
        Err(error) => failure(&correlation_id, &error),
    }
}

// ---------------------------------------------------------------------------
// Envelope helpers
// ---------------------------------------------------------------------------

fn require_user_id(user_id: Option<&str>) -> Result<&str, EngineError> {
    match user_id {
        Some(user_id) if !user_id.trim().is_empty() => Ok(user_id),
        _ => Err(EngineError::Validation("user_id is required".to_string())),
    }
}

fn success<T: Serialize>(correlation_id: &str, data: &T) -> ApiResponse {
    match serde_json::to_value(data) {
        Ok(value) => (StatusCode::OK, Json(json!({ "success": true, "data": value }))),
        Err(source) => {
            error!(
                event_name = "analytics.serialize_failed",
                correlation_id = %correlation_id,
                error = %source,
                "response serialization failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "internal serialization failure" })),
            )
        }
    }
}

fn failure(correlation_id: &str, engine_error: &EngineError) -> ApiResponse {
    let body = ErrorBody::from(engine_error);
    let mut payload = json!({ "success": false, "error": body.error });
    if let Some(min_required) = body.min_required {
        payload["min_required"] = json!(min_required);
    }
    if let Some(provided) = body.provided {
        payload["provided"] = json!(provided);
    }

    info!(
        event_name = "analytics.request_rejected",
        correlation_id = %correlation_id,
        error = %engine_error,
        "request rejected"
    );

    (status_for(engine_error), Json(payload))
}

fn status_for(error: &EngineError) -> StatusCode {
    match error {
        EngineError::Validation(_) | EngineError::UnknownBatchType(_) => StatusCode::BAD_REQUEST,
        EngineError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InsufficientData { .. } => StatusCode::OK,
        EngineError::Stats(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::from_config(&AppConfig::default())
    }

    fn records(values: &[f64]) -> Vec<ConsumptionRecord> {
        values.iter().map(|&quantity| ConsumptionRecord { quantity }).collect()
    }

    #[tokio::test]
    async fn predict_wraps_insufficient_data_in_the_envelope() {
        let request = PredictRequest {
            user_id: Some("user-1".to_string()),
            historical_data: records(&[10.0]),
        };

        let (status, Json(payload)) = predict(State(state()), Json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["success"], true);
        assert_eq!(payload["data"]["min_required"], 3);
        assert_eq!(payload["data"]["provided"], 1);
    }

    #[tokio::test]
    async fn predict_requires_a_user_id() {
        let request = PredictRequest { user_id: None, historical_data: records(&[1.0, 2.0, 3.0]) };

        let (status, Json(payload)) = predict(State(state()), Json(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["success"], false);
    }

    #[tokio::test]
    async fn predict_returns_a_full_report() {
        let request = PredictRequest {
            user_id: Some("user-1".to_string()),
            historical_data: records(&[20.0, 20.0, 20.0, 20.0]),
        };

        let (status, Json(payload)) = predict(State(state()), Json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"]["trend"], "stable");
        assert_eq!(payload["data"]["current_average"], 20.0);
        assert_eq!(payload["data"]["predictions"]["next_7_days"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn assess_risk_matches_the_worked_example() {
        let request: AssessRequest = serde_json::from_value(json!({
            "metrics": {
                "bmi": 32.0,
                "daily_oil_intake": 60.0,
                "blood_pressure_systolic": 150.0
            }
        }))
        .expect("deserialize");

        let (status, Json(payload)) = assess_risk(State(state()), Json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"]["risk_score"], 55.0);
        assert_eq!(payload["data"]["risk_level"], "high");
    }

    #[tokio::test]
    async fn recommend_returns_ranked_recipes() {
        let request = RecommendRequest {
            user_id: Some("user-1".to_string()),
            preferences: serde_json::from_value(json!({
                "cuisinePreferences": ["south_indian"],
                "dietaryRestrictions": ["vegetarian"],
                "healthGoals": ["weight_loss"]
            }))
            .expect("deserialize"),
        };

        let (status, Json(payload)) = recommend(State(state()), Json(request)).await;

        assert_eq!(status, StatusCode::OK);
        let recipes = payload["data"].as_array().expect("array");
        assert!(!recipes.is_empty());
        assert!(recipes.len() <= 10);
        let scores: Vec<f64> =
            recipes.iter().map(|r| r["score"].as_f64().expect("score")).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn profile_flow_covers_create_get_and_patch() {
        let app_state = state();

        let create = ProfileRequest {
            user_id: Some("user-9".to_string()),
            user_data: serde_json::from_value(json!({
                "age": 42,
                "preferences": { "cuisinePreferences": ["gujarati"] }
            }))
            .expect("deserialize"),
        };
        let (status, Json(created)) = create_profile(State(app_state.clone()), Json(create)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["data"]["user_id"], "user-9");

        let (status, Json(fetched)) =
            get_profile(State(app_state.clone()), Path("user-9".to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["preferences"]["cuisine_preferences"][0], "gujarati");

        let patch: ProfilePatch = serde_json::from_value(json!({
            "preferences": { "healthGoals": ["heart_health"] }
        }))
        .expect("deserialize");
        let (status, Json(patched)) =
            update_profile(State(app_state), Path("user-9".to_string()), Json(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["data"]["preferences"]["health_goals"][0], "heart_health");
        assert_eq!(patched["data"]["preferences"]["cuisine_preferences"][0], "gujarati");
    }

    #[tokio::test]
    async fn unknown_profile_is_a_404() {
        let (status, Json(payload)) =
            get_profile(State(state()), Path("ghost".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["success"], false);
    }

    #[tokio::test]
    async fn unknown_batch_type_is_a_400() {
        let request: BatchRequest =
            serde_json::from_value(json!({ "type": "rewards", "data": [] })).expect("deserialize");

        let (status, Json(payload)) = process_batch(State(state()), Json(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"].as_str().expect("error").contains("unknown batch type"));
    }

    #[tokio::test]
    async fn batch_results_preserve_input_order() {
        let request: BatchRequest = serde_json::from_value(json!({
            "type": "health_metrics",
            "data": [{ "bmi": 36.0 }, {}]
        }))
        .expect("deserialize");

        let (status, Json(payload)) = process_batch(State(state()), Json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"][0]["risk_score"], 30.0);
        assert_eq!(payload["data"][1]["risk_score"], 0.0);
    }
}
