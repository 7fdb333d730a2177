//! Personalization profiles.
//!
//! Builds a normalized profile from raw demographic/preference/health input,
//! derives segment-keyed recommended actions, and keeps profiles in an
//! injected key-value store. Merges are last-writer-wins per key; callers
//! needing strict per-user consistency serialize their writes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// User segment driving the recommended-action list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSegment {
    #[default]
    Household,
    School,
    Restaurant,
    #[serde(other)]
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Unknown,
    Child,
    YoungAdult,
    MiddleAged,
    Senior,
}

impl AgeGroup {
    pub fn from_age(age: Option<u32>) -> Self {
        match age {
            None => Self::Unknown,
            Some(age) if age < 18 => Self::Child,
            Some(age) if age < 30 => Self::YoungAdult,
            Some(age) if age < 50 => Self::MiddleAged,
            Some(_) => Self::Senior,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Unknown,
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: Option<f64>) -> Self {
        match bmi {
            None => Self::Unknown,
            Some(bmi) if bmi < 18.5 => Self::Underweight,
            Some(bmi) if bmi < 25.0 => Self::Normal,
            Some(bmi) if bmi < 30.0 => Self::Overweight,
            Some(_) => Self::Obese,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub user_type: UserSegment,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfilePreferences {
    pub language: String,
    pub cuisine_preferences: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub health_goals: Vec<String>,
    pub notification_frequency: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    pub age_group: AgeGroup,
    pub bmi_category: BmiCategory,
    pub health_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationSettings {
    pub content_difficulty: String,
    pub recipe_complexity: String,
    pub notification_type: String,
    pub data_sharing: bool,
    pub community_participation: bool,
}

/// A normalized, stored profile. Lifetime = process lifetime unless an
/// external collaborator evicts it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub demographics: Demographics,
    pub preferences: ProfilePreferences,
    pub health_profile: HealthProfile,
    pub personalization_settings: PersonalizationSettings,
    pub recommended_actions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw input for profile creation. All fields optional on the wire.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileInput {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    #[serde(default)]
    pub user_type: UserSegment,
    #[serde(default)]
    pub preferences: PreferencePatch,
    #[serde(default)]
    pub health_data: HealthDataPatch,
    #[serde(default)]
    pub data_sharing: bool,
    #[serde(default)]
    pub community_participation: bool,
}

/// Partial preference update: absent keys are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PreferencePatch {
    pub language: Option<String>,
    #[serde(rename = "cuisinePreferences", alias = "cuisine_preferences")]
    pub cuisine_preferences: Option<Vec<String>>,
    #[serde(rename = "dietaryRestrictions", alias = "dietary_restrictions")]
    pub dietary_restrictions: Option<Vec<String>>,
    #[serde(rename = "healthGoals", alias = "health_goals")]
    pub health_goals: Option<Vec<String>>,
    #[serde(rename = "notificationFrequency", alias = "notification_frequency")]
    pub notification_frequency: Option<String>,
}

/// Partial health update: absent keys are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HealthDataPatch {
    pub bmi: Option<f64>,
    pub health_conditions: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
}

/// Partial profile update applied by `update_profile`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub preferences: Option<PreferencePatch>,
    pub health_data: Option<HealthDataPatch>,
}

/// Keyed profile storage capability. The engine owns the merge semantics;
/// implementations only need get/put.
pub trait ProfileStore: Send + Sync {
    fn get(&self, user_id: &str) -> Option<UserProfile>;
    fn put(&self, profile: UserProfile);
}

impl<T: ProfileStore + ?Sized> ProfileStore for Arc<T> {
    fn get(&self, user_id: &str) -> Option<UserProfile> {
        (**self).get(user_id)
    }

    fn put(&self, profile: UserProfile) {
        (**self).put(profile)
    }
}

/// Process-local store. Writers to different keys never conflict; writers to
/// the same key race as last-writer-wins.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.read().ok()?.get(user_id).cloned()
    }

    fn put(&self, profile: UserProfile) {
        if let Ok(mut profiles) = self.profiles.write() {
            profiles.insert(profile.user_id.clone(), profile);
        }
    }
}

/// Profile construction and maintenance over an injected store.
#[derive(Debug, Clone)]
pub struct ProfileBuilder<S: ProfileStore> {
    store: S,
}

impl<S: ProfileStore> ProfileBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn build_profile(
        &self,
        user_id: &str,
        input: ProfileInput,
    ) -> Result<UserProfile, EngineError> {
        if user_id.trim().is_empty() {
            return Err(EngineError::Validation("user_id is required".to_string()));
        }

        let now = Utc::now();
        let recommended_actions = recommended_actions(&input);
        let profile = UserProfile {
            user_id: user_id.to_string(),
            demographics: Demographics {
                age: input.age,
                gender: input.gender,
                state: input.state,
                district: input.district,
                user_type: input.user_type,
            },
            preferences: ProfilePreferences {
                language: input.preferences.language.unwrap_or_else(|| "en".to_string()),
                cuisine_preferences: input.preferences.cuisine_preferences.unwrap_or_default(),
                dietary_restrictions: input.preferences.dietary_restrictions.unwrap_or_default(),
                health_goals: input.preferences.health_goals.unwrap_or_default(),
                notification_frequency: input
                    .preferences
                    .notification_frequency
                    .unwrap_or_else(|| "daily".to_string()),
            },
            health_profile: HealthProfile {
                age_group: AgeGroup::from_age(input.age),
                bmi_category: BmiCategory::from_bmi(input.health_data.bmi),
                health_conditions: input.health_data.health_conditions.unwrap_or_default(),
                medications: input.health_data.medications.unwrap_or_default(),
                allergies: input.health_data.allergies.unwrap_or_default(),
            },
            personalization_settings: PersonalizationSettings {
                content_difficulty: "beginner".to_string(),
                recipe_complexity: "simple".to_string(),
                notification_type: "push".to_string(),
                data_sharing: input.data_sharing,
                community_participation: input.community_participation,
            },
            recommended_actions,
            created_at: now,
            updated_at: now,
        };

        self.store.put(profile.clone());
        Ok(profile)
    }

    pub fn get_profile(&self, user_id: &str) -> Result<UserProfile, EngineError> {
        self.store.get(user_id).ok_or_else(|| EngineError::ProfileNotFound(user_id.to_string()))
    }

    /// Apply a partial patch: only the keys present in the patch are
    /// overwritten. Read-modify-write, so concurrent writers to the same
    /// user resolve as last-writer-wins.
    pub fn update_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<UserProfile, EngineError> {
        let mut profile = self.get_profile(user_id)?;

        if let Some(preferences) = patch.preferences {
            let target = &mut profile.preferences;
            if let Some(language) = preferences.language {
                target.language = language;
            }
            if let Some(cuisines) = preferences.cuisine_preferences {
                target.cuisine_preferences = cuisines;
            }
            if let Some(restrictions) = preferences.dietary_restrictions {
                target.dietary_restrictions = restrictions;
            }
            if let Some(goals) = preferences.health_goals {
                target.health_goals = goals;
            }
            if let Some(frequency) = preferences.notification_frequency {
                target.notification_frequency = frequency;
            }
        }

        if let Some(health) = patch.health_data {
            let target = &mut profile.health_profile;
            if health.bmi.is_some() {
                target.bmi_category = BmiCategory::from_bmi(health.bmi);
            }
            if let Some(conditions) = health.health_conditions {
                target.health_conditions = conditions;
            }
            if let Some(medications) = health.medications {
                target.medications = medications;
            }
            if let Some(allergies) = health.allergies {
                target.allergies = allergies;
            }
        }

        profile.updated_at = Utc::now();
        self.store.put(profile.clone());
        Ok(profile)
    }
}

/// Next-step suggestions keyed by user segment, with goal-driven extras.
fn recommended_actions(input: &ProfileInput) -> Vec<String> {
    let mut actions: Vec<String> = match input.user_type {
        UserSegment::Household => vec![
            "Complete health assessment",
            "Set daily oil consumption goal",
            "Explore low-oil recipes",
        ],
        UserSegment::School => vec![
            "Register for MDM program",
            "Set up nutrition tracking",
            "Access educational modules",
        ],
        UserSegment::Restaurant => vec![
            "Register low-oil menu items",
            "Get blockchain certification",
            "Join partner network",
        ],
        UserSegment::Other => vec![],
    }
    .into_iter()
    .map(String::from)
    .collect();

    if let Some(goals) = &input.preferences.health_goals {
        if goals.iter().any(|goal| goal == "weight_loss") {
            actions.push("Join weight loss challenge".to_string());
        }
        if goals.iter().any(|goal| goal == "diabetes_management") {
            actions.push("Access diabetes-friendly recipes".to_string());
        }
    }

    actions
}
