//! Preference-similarity recipe ranking.
//!
//! User preferences are encoded into a fixed-dimension feature vector via
//! deterministic tag tables, candidates are scored by cosine similarity
//! blended with an oil-content penalty, and the top matches come back in
//! stable descending order.

use serde::{Deserialize, Serialize};

/// Dimension of the preference feature space. Candidate vectors must agree.
pub const FEATURE_DIM: usize = 50;

/// Ranked results are truncated to this many entries.
pub const MAX_RESULTS: usize = 10;

/// Oil content (grams per serving) at which the cost penalty saturates.
pub const OIL_PENALTY_SCALE: f64 = 10.0;

/// Tag tables occupy disjoint index ranges of the feature space.
const CUISINE_TAGS: &[(&str, usize)] =
    &[("north_indian", 0), ("south_indian", 5), ("bengali", 10), ("gujarati", 15)];

const RESTRICTION_TAGS: &[(&str, usize)] =
    &[("vegetarian", 20), ("vegan", 21), ("gluten_free", 22)];

const GOAL_TAGS: &[(&str, usize)] =
    &[("weight_loss", 30), ("diabetes_management", 31), ("heart_health", 32)];

/// Stated user preferences. Unrecognized tags are ignored, not an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PreferenceProfile {
    #[serde(default, rename = "cuisinePreferences", alias = "cuisine_preferences")]
    pub cuisine_tags: Vec<String>,
    #[serde(default, rename = "dietaryRestrictions", alias = "dietary_restrictions")]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, rename = "healthGoals", alias = "health_goals")]
    pub health_goals: Vec<String>,
}

/// A rankable recipe with its catalog feature vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub oil_content: f64,
    pub features: Vec<f64>,
}

/// A candidate with its final blended score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredRecipe {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub oil_content: f64,
    pub score: f64,
}

/// Weights of the convex score combination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankingWeights {
    pub similarity: f64,
    pub cost: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self { similarity: 0.7, cost: 0.3 }
    }
}

/// Ranking engine. Stateless — candidates come from the catalog collaborator.
#[derive(Clone, Copy, Debug)]
pub struct PreferenceRanker {
    pub weights: RankingWeights,
    pub penalty_scale: f64,
    pub max_results: usize,
}

impl Default for PreferenceRanker {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            penalty_scale: OIL_PENALTY_SCALE,
            max_results: MAX_RESULTS,
        }
    }
}

impl PreferenceRanker {
    /// Score every candidate against the user's preference vector, sort
    /// descending (stable on ties), and keep the top `max_results`.
    pub fn rank(
        &self,
        preferences: &PreferenceProfile,
        candidates: &[RecipeCandidate],
    ) -> Vec<ScoredRecipe> {
        let user_vector = encode_preferences(preferences);

        let mut scored: Vec<ScoredRecipe> = candidates
            .iter()
            .map(|candidate| {
                let similarity = cosine_similarity(&user_vector, &candidate.features);
                let penalty = (candidate.oil_content / self.penalty_scale).clamp(0.0, 1.0);
                let score =
                    self.weights.similarity * similarity + self.weights.cost * (1.0 - penalty);
                ScoredRecipe {
                    id: candidate.id.clone(),
                    name: candidate.name.clone(),
                    cuisine: candidate.cuisine.clone(),
                    oil_content: candidate.oil_content,
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.max_results);
        scored
    }
}

/// Deterministic tag-to-index encoding of stated preferences.
pub fn encode_preferences(preferences: &PreferenceProfile) -> Vec<f64> {
    let mut vector = vec![0.0; FEATURE_DIM];
    mark_tags(&mut vector, &preferences.cuisine_tags, CUISINE_TAGS);
    mark_tags(&mut vector, &preferences.dietary_restrictions, RESTRICTION_TAGS);
    mark_tags(&mut vector, &preferences.health_goals, GOAL_TAGS);
    vector
}

fn mark_tags(vector: &mut [f64], tags: &[String], table: &[(&str, usize)]) {
    for tag in tags {
        if let Some((_, index)) = table.iter().find(|(name, _)| *name == tag) {
            vector[*index] = 1.0;
        }
    }
}

/// Cosine similarity, defined as 0.0 when either vector has zero magnitude.
/// Vectors of unequal length are compared over their common prefix.
pub fn cosine_similarity(left: &[f64], right: &[f64]) -> f64 {
    let dot: f64 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|a| a * a).sum::<f64>().sqrt();
    let right_norm = right.iter().map(|b| b * b).sum::<f64>().sqrt();

    if left_norm <= f64::EPSILON || right_norm <= f64::EPSILON {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}
