//! Climbing Conditions Score (CCS) strategies.
//!
//! Two interchangeable scorers share the `ConditionsScorer` trait:
//!
//! - `ModelScorer`: a trained regression model over `[temperature, humidity]`,
//!   with a fixed penalty when the rock is at its dew point.
//! - `FormulaScorer`: the older hand-tuned penalty formula, normalized
//!   to a 1–10 scale. Needs no model artifact.
//!
//! The active scorer is chosen once from configuration (`SCORER`).

use std::sync::Arc;

use crate::config::ScorerKind;
use crate::services::model::{ModelError, PredictiveModel};

/// Subtracted from the model prediction when temperature equals dew point
/// (holds are condensing).
const CONDENSATION_PENALTY: f64 = 2.0;

// Formula weights and optimal ranges (°F / %).
const DEW_POINT_WEIGHT: f64 = 2.0;
const HUMIDITY_WEIGHT: f64 = 3.0;
const TEMP_WEIGHT: f64 = 3.0;
const OPTIMAL_DEW_POINT_MAX: f64 = 40.0;
const OPTIMAL_HUMIDITY_MIN: f64 = 25.0;
const OPTIMAL_HUMIDITY_MAX: f64 = 35.0;
const OPTIMAL_TEMP_MIN: f64 = 40.0;
const OPTIMAL_TEMP_MAX: f64 = 69.0;
/// Temperature penalty applied when temp <= dew point.
const FORMULA_CONDENSATION_PENALTY: f64 = 2.0;
/// Raw formula range mapped onto 1..=10.
const RAW_SCORE_MIN: f64 = -20.0;
const RAW_SCORE_MAX: f64 = 20.0;

/// Score climbing conditions from a single observation.
pub trait ConditionsScorer: Send + Sync + std::fmt::Debug {
    fn score(&self, dew_point: f64, humidity: f64, temperature: f64) -> Result<f64, ModelError>;

    /// Strategy name, reported by the health endpoint.
    fn name(&self) -> &'static str;
}

/// Model-backed CCS.
///
/// Dew point is not a model feature; it only decides whether the
/// condensation penalty applies.
pub fn calculate_climbing_conditions_score(
    model: &dyn PredictiveModel,
    dew_point: f64,
    humidity: f64,
    temperature: f64,
) -> Result<f64, ModelError> {
    let prediction = model
        .predict(&[[temperature, humidity]])?
        .first()
        .copied()
        .ok_or(ModelError::EmptyPrediction)?;

    if temperature == dew_point {
        Ok((prediction - CONDENSATION_PENALTY).max(0.0))
    } else {
        Ok(prediction)
    }
}

/// Hand-tuned CCS: weighted penalties for being outside the optimal
/// dew point / humidity / temperature ranges, normalized to 1..=10.
pub fn calculate_formula_score(dew_point: f64, humidity: f64, temperature: f64) -> f64 {
    // No lower bound on dew point; cold/dry is penalized via humidity and temperature.
    let dew_point_penalty = if dew_point > OPTIMAL_DEW_POINT_MAX {
        (dew_point - OPTIMAL_DEW_POINT_MAX) / 10.0
    } else {
        0.0
    };

    let humidity_penalty = if humidity < OPTIMAL_HUMIDITY_MIN {
        (OPTIMAL_HUMIDITY_MIN - humidity) / 10.0
    } else if humidity > OPTIMAL_HUMIDITY_MAX {
        (humidity - OPTIMAL_HUMIDITY_MAX) / 10.0
    } else {
        0.0
    };

    let temp_penalty = if temperature <= dew_point {
        FORMULA_CONDENSATION_PENALTY
    } else if temperature < OPTIMAL_TEMP_MIN {
        (OPTIMAL_TEMP_MIN - temperature) / 10.0
    } else if temperature > OPTIMAL_TEMP_MAX {
        (temperature - OPTIMAL_TEMP_MAX) / 10.0
    } else {
        0.0
    };

    let raw = DEW_POINT_WEIGHT * (1.0 - dew_point_penalty)
        + HUMIDITY_WEIGHT * (1.0 - humidity_penalty)
        - TEMP_WEIGHT * temp_penalty;

    1.0 + ((raw - RAW_SCORE_MIN) / (RAW_SCORE_MAX - RAW_SCORE_MIN)) * 9.0
}

#[derive(Debug, Clone)]
pub struct ModelScorer {
    model: Arc<dyn PredictiveModel>,
}

impl ModelScorer {
    pub fn new(model: Arc<dyn PredictiveModel>) -> Self {
        Self { model }
    }
}

impl ConditionsScorer for ModelScorer {
    fn score(&self, dew_point: f64, humidity: f64, temperature: f64) -> Result<f64, ModelError> {
        calculate_climbing_conditions_score(self.model.as_ref(), dew_point, humidity, temperature)
    }

    fn name(&self) -> &'static str {
        ScorerKind::Model.as_str()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaScorer;

impl ConditionsScorer for FormulaScorer {
    fn score(&self, dew_point: f64, humidity: f64, temperature: f64) -> Result<f64, ModelError> {
        Ok(calculate_formula_score(dew_point, humidity, temperature))
    }

    fn name(&self) -> &'static str {
        ScorerKind::Formula.as_str()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_condensation_penalty_applied() {
        let score = calculate_climbing_conditions_score(&ConstantModel(5.0), 60.0, 80.0, 60.0)
            .unwrap();
        assert_eq!(score, 3.0);
    }

    #[test]
    fn test_condensation_penalty_clamps_at_zero() {
        for raw in [0.0, 0.5, 1.0, 1.99, 2.0] {
            let score =
                calculate_climbing_conditions_score(&ConstantModel(raw), 50.0, 90.0, 50.0)
                    .unwrap();
            assert!(score >= 0.0);
            assert!(score <= raw);
        }
    }

    #[test]
    fn test_no_penalty_returns_raw_prediction() {
        // Not clamped: a negative raw prediction passes through unchanged.
        for raw in [-1.5, 0.0, 4.2, 9.9] {
            let score =
                calculate_climbing_conditions_score(&ConstantModel(raw), 49.0, 90.0, 50.0)
                    .unwrap();
            assert_eq!(score, raw);
        }
    }

    #[test]
    fn test_model_sees_temperature_then_humidity() {
        // (70 + 50) / 2 = 60; dew point differs so no penalty
        let score = calculate_climbing_conditions_score(&AverageModel, 60.0, 50.0, 70.0).unwrap();
        assert_eq!(score, 60.0);
    }

    #[test]
    fn test_same_temp_and_dew_point_non_negative() {
        let score = calculate_climbing_conditions_score(&AverageModel, 70.0, 50.0, 70.0).unwrap();
        assert_eq!(score, 58.0);
    }

    #[test]
    fn test_empty_prediction_is_error() {
        let result = calculate_climbing_conditions_score(&EmptyModel, 60.0, 50.0, 70.0);
        assert!(matches!(result, Err(ModelError::EmptyPrediction)));
    }

    #[test]
    fn test_formula_worked_example() {
        // dp 50 → penalty 1.0; humidity 60 → 2.5; temp 70 → 0.1
        // raw = 2*(1-1) + 3*(1-2.5) - 3*0.1 = -4.8
        let expected = 1.0 + ((-4.8 + 20.0) / 40.0) * 9.0;
        let score = calculate_formula_score(50.0, 60.0, 70.0);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_formula_optimal_conditions() {
        // All in range: raw = 2 + 3 = 5
        let score = calculate_formula_score(30.0, 30.0, 55.0);
        assert!((score - (1.0 + (25.0 / 40.0) * 9.0)).abs() < 1e-9);
    }

    #[test]
    fn test_formula_condensation_penalizes_temperature() {
        let dry = calculate_formula_score(30.0, 30.0, 55.0);
        let wet = calculate_formula_score(55.0, 30.0, 55.0);
        assert!(wet < dry);
    }

    #[test]
    fn test_scorers_share_interface() {
        let scorers: Vec<Box<dyn ConditionsScorer>> =
            vec![Box::new(constant_scorer(6.0)), Box::new(FormulaScorer)];
        let names: Vec<&str> = scorers.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["model", "formula"]);
        for scorer in &scorers {
            assert!(scorer.score(40.0, 30.0, 55.0).unwrap() > 0.0);
        }
    }
}
