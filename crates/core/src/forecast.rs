//! Consumption trend analysis and short-horizon forecasting.
//!
//! Classifies the trend of a time-ordered consumption history with a linear
//! fit, projects the next week with a quadratic fit, and derives the summary
//! statistics, insights, and recommendation text the API exposes.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::stats;
use crate::RECOMMENDED_DAILY_INTAKE;

/// Records required before a forecast is attempted.
pub const MIN_HISTORY: usize = 3;

/// Default forecast horizon, in days.
pub const DEFAULT_HORIZON_DAYS: usize = 7;

/// Linear day-to-month approximation over the one-week prediction window.
/// Not a calendar computation.
pub const WEEK_TO_MONTH_FACTOR: f64 = 4.3;

/// Absolute slope below which a series counts as stable.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.5;

/// One entry of a consumption history, oldest first. Position in the
/// sequence is the time axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    #[serde(alias = "oil_quantity")]
    pub quantity: f64,
}

/// Qualitative direction of a consumption series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Predictions {
    pub next_7_days: Vec<f64>,
    pub next_30_days_average: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub total: f64,
}

/// Full forecast result for one user's history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastReport {
    pub current_average: f64,
    pub trend: Trend,
    pub predictions: Predictions,
    pub statistics: SeriesStatistics,
    pub insights: Vec<String>,
    pub recommendation: String,
}

/// Forecasting engine. Stateless — the history is provided at call time.
#[derive(Clone, Copy, Debug)]
pub struct Forecaster {
    pub horizon_days: usize,
    pub slope_threshold: f64,
    pub reference_daily_intake: f64,
    pub week_to_month_factor: f64,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            slope_threshold: TREND_SLOPE_THRESHOLD,
            reference_daily_intake: RECOMMENDED_DAILY_INTAKE,
            week_to_month_factor: WEEK_TO_MONTH_FACTOR,
        }
    }
}

impl Forecaster {
    pub fn forecast(&self, records: &[ConsumptionRecord]) -> Result<ForecastReport, EngineError> {
        if records.len() < MIN_HISTORY {
            return Err(EngineError::InsufficientData {
                min_required: MIN_HISTORY,
                provided: records.len(),
            });
        }

        let values: Vec<f64> = records.iter().map(|r| r.quantity).collect();

        let trend = self.classify_trend(&values)?;
        let predictions = self.predict(&values)?;
        let statistics = series_statistics(&values)?;
        let insights = self.build_insights(trend, &statistics);
        let recommendation = self.recommendation(trend, &statistics);

        let predicted_mean = stats::mean(&predictions)?;
        Ok(ForecastReport {
            current_average: statistics.mean,
            trend,
            predictions: Predictions {
                next_7_days: predictions,
                next_30_days_average: predicted_mean * self.week_to_month_factor,
            },
            statistics,
            insights,
            recommendation,
        })
    }

    fn classify_trend(&self, values: &[f64]) -> Result<Trend, EngineError> {
        let slope = stats::linear_slope(values)?;
        if slope > self.slope_threshold {
            Ok(Trend::Increasing)
        } else if slope < -self.slope_threshold {
            Ok(Trend::Decreasing)
        } else {
            Ok(Trend::Stable)
        }
    }

    /// Evaluate the quadratic fit at the next `horizon_days` index positions.
    /// Consumption cannot go negative, so predictions clamp at zero.
    fn predict(&self, values: &[f64]) -> Result<Vec<f64>, EngineError> {
        let coeffs = stats::quadratic_fit(values)?;
        let start = values.len();
        Ok((start..start + self.horizon_days)
            .map(|x| stats::evaluate_polynomial(&coeffs, x as f64).max(0.0))
            .collect())
    }

    fn build_insights(&self, trend: Trend, statistics: &SeriesStatistics) -> Vec<String> {
        let mut insights = Vec::new();

        insights.push(
            match trend {
                Trend::Increasing => {
                    "Your oil consumption is increasing. Consider reducing portion sizes."
                }
                Trend::Decreasing => {
                    "Great! Your oil consumption is decreasing. Keep up the good work!"
                }
                Trend::Stable => "Your oil consumption is stable. Aim to reduce it further.",
            }
            .to_string(),
        );

        if statistics.std_dev > statistics.mean * 0.5 {
            insights.push(
                "Your consumption varies significantly. Try to maintain consistency.".to_string(),
            );
        }

        if statistics.mean > self.reference_daily_intake {
            let excess = (statistics.mean - self.reference_daily_intake)
                / self.reference_daily_intake
                * 100.0;
            insights
                .push(format!("Your average consumption is {excess:.1}% above recommended levels."));
        } else {
            insights.push("Your average consumption is within recommended levels!".to_string());
        }

        insights
    }

    /// Four mutually exclusive tiers; the intake threshold outranks the trend.
    fn recommendation(&self, trend: Trend, statistics: &SeriesStatistics) -> String {
        let reference = self.reference_daily_intake;
        if statistics.mean > reference * 1.5 {
            "Urgent: Significantly reduce oil intake. Consult a nutritionist."
        } else if statistics.mean > reference {
            "Moderate: Gradually reduce oil intake to recommended levels."
        } else if trend == Trend::Increasing {
            "Caution: Your consumption is increasing. Maintain current levels."
        } else {
            "Good: Continue your healthy consumption habits."
        }
        .to_string()
    }
}

fn series_statistics(values: &[f64]) -> Result<SeriesStatistics, EngineError> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(SeriesStatistics {
        mean: stats::mean(values)?,
        median: stats::median(values)?,
        std_dev: stats::std_dev(values)?,
        min,
        max,
        total: values.iter().sum(),
    })
}
