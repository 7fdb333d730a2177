//! Recipe candidate sourcing.
//!
//! Candidate feature vectors are a catalog concern; the ranking engine only
//! scores what it is given. `SeedCatalog` is the deterministic built-in used
//! by the CLI and demo server wiring; a real deployment substitutes its own
//! `RecipeCatalog` implementation.

use crate::ranking::{encode_preferences, PreferenceProfile, RecipeCandidate};

/// Supplies rankable candidates for a set of requested cuisines.
pub trait RecipeCatalog: Send + Sync {
    /// Candidates for the given cuisine tags. An empty request means no
    /// cuisine filter.
    fn candidates(&self, cuisines: &[String]) -> Vec<RecipeCandidate>;
}

/// Lightweight catalog seed used by the built-in deterministic catalog.
#[derive(Debug, Clone, Copy)]
struct RecipeSeed {
    id: &'static str,
    name: &'static str,
    cuisine: &'static str,
    oil_content: f64,
    restrictions: &'static [&'static str],
    goals: &'static [&'static str],
}

const RECIPE_SEEDS: &[RecipeSeed] = &[
    RecipeSeed {
        id: "recipe_dosa",
        name: "Low-Oil Dosa",
        cuisine: "south_indian",
        oil_content: 3.0,
        restrictions: &["vegetarian"],
        goals: &["weight_loss"],
    },
    RecipeSeed {
        id: "recipe_idli",
        name: "Steamed Idli",
        cuisine: "south_indian",
        oil_content: 1.0,
        restrictions: &["vegetarian", "vegan"],
        goals: &["weight_loss", "heart_health"],
    },
    RecipeSeed {
        id: "recipe_tandoori",
        name: "Grilled Tandoori Chicken",
        cuisine: "north_indian",
        oil_content: 2.0,
        restrictions: &[],
        goals: &["weight_loss"],
    },
    RecipeSeed {
        id: "recipe_dhokla",
        name: "Steamed Dhokla",
        cuisine: "gujarati",
        oil_content: 2.0,
        restrictions: &["vegetarian"],
        goals: &["diabetes_management"],
    },
    RecipeSeed {
        id: "recipe_machher_jhol",
        name: "Light Fish Curry",
        cuisine: "bengali",
        oil_content: 4.0,
        restrictions: &[],
        goals: &["heart_health"],
    },
    RecipeSeed {
        id: "recipe_khichdi",
        name: "Vegetable Khichdi",
        cuisine: "north_indian",
        oil_content: 2.5,
        restrictions: &["vegetarian", "gluten_free"],
        goals: &["diabetes_management"],
    },
    RecipeSeed {
        id: "recipe_upma",
        name: "Oats Upma",
        cuisine: "south_indian",
        oil_content: 3.5,
        restrictions: &["vegetarian"],
        goals: &["heart_health"],
    },
];

/// Deterministic built-in catalog. Feature vectors are derived from each
/// recipe's own tags with the same encoder the ranker applies to users, so
/// scoring is reproducible across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedCatalog;

impl SeedCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl RecipeCatalog for SeedCatalog {
    fn candidates(&self, cuisines: &[String]) -> Vec<RecipeCandidate> {
        let matches_filter = |seed: &RecipeSeed| {
            cuisines.is_empty() || cuisines.iter().any(|c| c == seed.cuisine)
        };

        let filtered: Vec<&RecipeSeed> =
            RECIPE_SEEDS.iter().filter(|seed| matches_filter(seed)).collect();

        // A filter that matches nothing falls back to the whole catalog so
        // users with niche preferences still see recommendations.
        let seeds: Vec<&RecipeSeed> =
            if filtered.is_empty() { RECIPE_SEEDS.iter().collect() } else { filtered };

        seeds.into_iter().map(materialize).collect()
    }
}

fn materialize(seed: &RecipeSeed) -> RecipeCandidate {
    let tags = PreferenceProfile {
        cuisine_tags: vec![seed.cuisine.to_string()],
        dietary_restrictions: seed.restrictions.iter().map(|s| s.to_string()).collect(),
        health_goals: seed.goals.iter().map(|s| s.to_string()).collect(),
    };

    RecipeCandidate {
        id: seed.id.to_string(),
        name: seed.name.to_string(),
        cuisine: seed.cuisine.to_string(),
        oil_content: seed.oil_content,
        features: encode_preferences(&tags),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::FEATURE_DIM;

    #[test]
    fn seed_vectors_have_the_fixed_dimension() {
        let catalog = SeedCatalog::new();
        for candidate in catalog.candidates(&[]) {
            assert_eq!(candidate.features.len(), FEATURE_DIM);
        }
    }

    #[test]
    fn seed_vectors_are_deterministic() {
        let catalog = SeedCatalog::new();
        assert_eq!(catalog.candidates(&[]), catalog.candidates(&[]));
    }

    #[test]
    fn cuisine_filter_narrows_candidates() {
        let catalog = SeedCatalog::new();
        let south = catalog.candidates(&["south_indian".to_string()]);

        assert!(!south.is_empty());
        assert!(south.iter().all(|c| c.cuisine == "south_indian"));
    }

    #[test]
    fn unmatched_filter_falls_back_to_full_catalog() {
        let catalog = SeedCatalog::new();
        let all = catalog.candidates(&[]);
        let fallback = catalog.candidates(&["continental".to_string()]);

        assert_eq!(all.len(), fallback.len());
    }
}
