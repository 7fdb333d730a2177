//! OilWise analytics & recommendation engine.
//!
//! Stateless scoring components (trend forecasting, health-risk scoring,
//! preference ranking) plus the personalization profile builder and the
//! batch dispatch the HTTP facade exposes. Everything here is a pure
//! function of its inputs except the profile store, which is an injected
//! key-value collaborator.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod profile;
pub mod ranking;
pub mod risk;
pub mod stats;

/// ICMR-recommended daily oil intake, in grams. Shared reference for both
/// the forecaster's insights and the risk scorer's excess tiers.
pub const RECOMMENDED_DAILY_INTAKE: f64 = 33.3;

pub use batch::{BatchKind, BatchProcessor, BatchRequest};
pub use catalog::{RecipeCatalog, SeedCatalog};
pub use errors::{EngineError, ErrorBody};
pub use forecast::{ConsumptionRecord, ForecastReport, Forecaster, Trend};
pub use profile::{
    InMemoryProfileStore, ProfileBuilder, ProfileInput, ProfilePatch, ProfileStore, UserProfile,
};
pub use ranking::{PreferenceProfile, PreferenceRanker, RecipeCandidate, ScoredRecipe};
pub use risk::{HealthMetricSet, RiskAssessment, RiskLevel, RiskScorer};
