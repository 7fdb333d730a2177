//! Multi-factor health risk scoring.
//!
//! Each present metric contributes an independent, additive sub-score drawn
//! from an ordered tier table, evaluated highest bound first. Fired factors
//! carry their category so recommendation assembly never re-derives the
//! category from factor text.

use serde::{Deserialize, Serialize};

use crate::RECOMMENDED_DAILY_INTAKE;

/// One row of a risk tier table: the lowest value (or excess percentage)
/// at which the tier fires, the sub-score it adds, and the factor text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskTier {
    pub lower_bound: f64,
    pub score: f64,
    pub label: &'static str,
}

/// BMI tiers, boundary-inclusive.
const BMI_TIERS: &[RiskTier] = &[
    RiskTier { lower_bound: 35.0, score: 30.0, label: "Obesity (BMI >= 35)" },
    RiskTier { lower_bound: 30.0, score: 15.0, label: "Overweight (BMI 30-34.9)" },
];

/// Oil-intake tiers over the excess percentage above the recommended daily
/// reference, strict lower bounds.
const OIL_EXCESS_TIERS: &[RiskTier] = &[
    RiskTier {
        lower_bound: 100.0,
        score: 35.0,
        label: "Excessive oil consumption (>100% above recommended)",
    },
    RiskTier {
        lower_bound: 50.0,
        score: 25.0,
        label: "High oil consumption (50-100% above recommended)",
    },
    RiskTier { lower_bound: 0.0, score: 15.0, label: "Above recommended oil intake" },
];

/// Cholesterol tiers in mg/dL, boundary-inclusive.
const CHOLESTEROL_TIERS: &[RiskTier] = &[
    RiskTier { lower_bound: 240.0, score: 20.0, label: "High cholesterol (>= 240 mg/dL)" },
    RiskTier {
        lower_bound: 200.0,
        score: 10.0,
        label: "Borderline high cholesterol (200-239 mg/dL)",
    },
];

/// Blood pressure tiers fire when either reading reaches its bound.
#[derive(Clone, Copy, Debug)]
struct BloodPressureTier {
    systolic: f64,
    diastolic: f64,
    score: f64,
    label: &'static str,
}

const BLOOD_PRESSURE_TIERS: &[BloodPressureTier] = &[
    BloodPressureTier {
        systolic: 160.0,
        diastolic: 100.0,
        score: 25.0,
        label: "High blood pressure (Stage 2)",
    },
    BloodPressureTier {
        systolic: 140.0,
        diastolic: 90.0,
        score: 15.0,
        label: "Elevated blood pressure (Stage 1)",
    },
];

/// Category a fired factor belongs to, assigned at detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    OilIntake,
    Weight,
    BloodPressure,
    Cholesterol,
}

/// Advisory text appended for each category that fired, in emission order.
const CATEGORY_ADVICE: &[(RiskCategory, &[&str])] = &[
    (
        RiskCategory::OilIntake,
        &[
            "Reduce daily oil intake gradually",
            "Use low-oil cooking methods: steaming, grilling, baking",
            "Try air-frying instead of deep-frying",
        ],
    ),
    (
        RiskCategory::Weight,
        &[
            "Increase physical activity to 150 minutes per week",
            "Consult a nutritionist for personalized diet plan",
        ],
    ),
    (
        RiskCategory::BloodPressure,
        &[
            "Reduce salt intake",
            "Increase potassium-rich foods",
            "Consult a healthcare provider",
        ],
    ),
    (
        RiskCategory::Cholesterol,
        &["Increase fiber intake", "Reduce saturated fat consumption"],
    ),
];

const CRITICAL_DIRECTIVE: &str = "Seek immediate medical consultation";

/// A sub-score that fired during assessment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub score: f64,
    pub label: &'static str,
}

/// Overall risk level, first match from the top of the score range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::Critical
        } else if score >= 50.0 {
            Self::High
        } else if score >= 25.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Health metrics supplied by the caller. Every field is optional; absent
/// fields contribute no risk and are left out of `metrics_analyzed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct HealthMetricSet {
    pub bmi: Option<f64>,
    pub daily_oil_intake: Option<f64>,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,
    pub cholesterol: Option<f64>,
}

impl HealthMetricSet {
    fn analyzed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.bmi.is_some() {
            fields.push("bmi");
        }
        if self.daily_oil_intake.is_some() {
            fields.push("daily_oil_intake");
        }
        if self.blood_pressure_systolic.is_some() {
            fields.push("blood_pressure_systolic");
        }
        if self.blood_pressure_diastolic.is_some() {
            fields.push("blood_pressure_diastolic");
        }
        if self.cholesterol.is_some() {
            fields.push("cholesterol");
        }
        fields
    }
}

/// Full assessment for one metric set. Computed fresh per call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub metrics_analyzed: Vec<&'static str>,
}

/// Risk scoring engine. Stateless.
#[derive(Clone, Copy, Debug)]
pub struct RiskScorer {
    pub reference_daily_intake: f64,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self { reference_daily_intake: RECOMMENDED_DAILY_INTAKE }
    }
}

impl RiskScorer {
    pub fn assess(&self, metrics: &HealthMetricSet) -> RiskAssessment {
        let mut factors = Vec::new();

        if let Some(bmi) = metrics.bmi {
            if let Some(tier) = first_tier_at_or_above(BMI_TIERS, bmi) {
                factors.push(RiskFactor {
                    category: RiskCategory::Weight,
                    score: tier.score,
                    label: tier.label,
                });
            }
        }

        if let Some(intake) = metrics.daily_oil_intake {
            let excess_pct =
                (intake - self.reference_daily_intake) / self.reference_daily_intake * 100.0;
            if let Some(tier) = first_tier_above(OIL_EXCESS_TIERS, excess_pct) {
                factors.push(RiskFactor {
                    category: RiskCategory::OilIntake,
                    score: tier.score,
                    label: tier.label,
                });
            }
        }

        // Blood pressure is assessed only when the systolic reading is
        // present; a missing diastolic reading defaults to zero.
        if let Some(systolic) = metrics.blood_pressure_systolic {
            let diastolic = metrics.blood_pressure_diastolic.unwrap_or(0.0);
            if let Some(tier) = BLOOD_PRESSURE_TIERS
                .iter()
                .find(|tier| systolic >= tier.systolic || diastolic >= tier.diastolic)
            {
                factors.push(RiskFactor {
                    category: RiskCategory::BloodPressure,
                    score: tier.score,
                    label: tier.label,
                });
            }
        }

        if let Some(cholesterol) = metrics.cholesterol {
            if let Some(tier) = first_tier_at_or_above(CHOLESTEROL_TIERS, cholesterol) {
                factors.push(RiskFactor {
                    category: RiskCategory::Cholesterol,
                    score: tier.score,
                    label: tier.label,
                });
            }
        }

        let risk_score = factors.iter().map(|f| f.score).sum::<f64>().clamp(0.0, 100.0);
        let risk_level = RiskLevel::from_score(risk_score);
        let recommendations = build_recommendations(&factors, risk_level);

        RiskAssessment {
            risk_score,
            risk_level,
            risk_factors: factors.iter().map(|f| f.label.to_string()).collect(),
            recommendations,
            metrics_analyzed: metrics.analyzed_fields(),
        }
    }
}

fn first_tier_at_or_above(tiers: &[RiskTier], value: f64) -> Option<&RiskTier> {
    tiers.iter().find(|tier| value >= tier.lower_bound)
}

fn first_tier_above(tiers: &[RiskTier], value: f64) -> Option<&RiskTier> {
    tiers.iter().find(|tier| value > tier.lower_bound)
}

fn build_recommendations(factors: &[RiskFactor], level: RiskLevel) -> Vec<String> {
    let mut recommendations = Vec::new();

    for (category, advice) in CATEGORY_ADVICE {
        if factors.iter().any(|factor| factor.category == *category) {
            recommendations.extend(advice.iter().map(|line| line.to_string()));
        }
    }

    if level == RiskLevel::Critical {
        recommendations.insert(0, CRITICAL_DIRECTIVE.to_string());
    }

    recommendations
}
