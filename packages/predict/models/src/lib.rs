#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prediction modes and results.
//!
//! These are the display-ready values handed back to the form layer. They
//! are serialized to JSON by `waterborne predict --json`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which model a prediction request targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PredictionMode {
    /// Estimated number of waterborne disease cases (regression model).
    CaseCount,
    /// Categorical risk level (classification model).
    RiskLevel,
}

impl PredictionMode {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::CaseCount, Self::RiskLevel]
    }

    /// Human-readable label for menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CaseCount => "Estimated case count",
            Self::RiskLevel => "Risk level",
        }
    }
}

/// The classifier's most probable class, when it can report probabilities.
///
/// This class can differ from [`RiskAssessment::label`], which is the
/// classifier's own decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Confidence {
    Available {
        /// Risk level with the highest probability.
        label: String,
        /// Its probability, in `[0, 1]`.
        probability: f64,
    },
    /// The model cannot report probabilities.
    Unavailable,
}

impl Confidence {
    /// The probability, if the model reported one.
    #[must_use]
    pub const fn probability(&self) -> Option<f64> {
        match self {
            Self::Available { probability, .. } => Some(*probability),
            Self::Unavailable => None,
        }
    }

    /// The most probable risk level, if the model reported probabilities.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Available { label, .. } => Some(label),
            Self::Unavailable => None,
        }
    }
}

/// Probability of one risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    /// Risk level name, e.g. `"High"`.
    pub label: String,
    /// Probability in `[0, 1]`.
    pub probability: f64,
}

/// The classifier's verdict for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Risk level chosen by the classifier, resolved through the
    /// `Risk_Level` label encoder.
    pub label: String,
    pub confidence: Confidence,
    /// Probability of every risk level in encoder class order. Empty when
    /// confidence is unavailable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distribution: Vec<ClassProbability>,
}

/// Result of a single-mode prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionResult {
    /// Estimated total cases, rounded to the nearest integer.
    CaseCount(i64),
    RiskAssessment(RiskAssessment),
}

impl PredictionResult {
    /// The mode that produces this kind of result.
    #[must_use]
    pub const fn mode(&self) -> PredictionMode {
        match self {
            Self::CaseCount(_) => PredictionMode::CaseCount,
            Self::RiskAssessment(_) => PredictionMode::RiskLevel,
        }
    }
}

/// Both predictions for one sample, as shown after pressing "Predict".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Estimated total cases.
    pub case_count: i64,
    pub risk: RiskAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_kebab_case() {
        assert_eq!(
            "case-count".parse::<PredictionMode>().unwrap(),
            PredictionMode::CaseCount
        );
        assert_eq!(PredictionMode::RiskLevel.to_string(), "risk-level");
        assert_eq!(PredictionMode::all().len(), 2);
    }

    #[test]
    fn result_reports_its_mode() {
        assert_eq!(
            PredictionResult::CaseCount(3).mode(),
            PredictionMode::CaseCount
        );
        let risk = PredictionResult::RiskAssessment(RiskAssessment {
            label: "Low".to_string(),
            confidence: Confidence::Unavailable,
            distribution: Vec::new(),
        });
        assert_eq!(risk.mode(), PredictionMode::RiskLevel);
    }

    #[test]
    fn confidence_serializes_with_status_tag() {
        let available = serde_json::to_value(Confidence::Available {
            label: "High".to_string(),
            probability: 0.5,
        })
        .unwrap();
        assert_eq!(
            available,
            serde_json::json!({"status": "available", "label": "High", "probability": 0.5})
        );
        let unavailable = serde_json::to_value(Confidence::Unavailable).unwrap();
        assert_eq!(unavailable, serde_json::json!({"status": "unavailable"}));
        assert_eq!(Confidence::Unavailable.probability(), None);
        assert_eq!(Confidence::Unavailable.label(), None);
    }

    #[test]
    fn report_serializes_without_empty_distribution() {
        let report = PredictionReport {
            case_count: 96,
            risk: RiskAssessment {
                label: "Medium".to_string(),
                confidence: Confidence::Unavailable,
                distribution: Vec::new(),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "case_count": 96,
                "risk": {"label": "Medium", "confidence": {"status": "unavailable"}}
            })
        );
        let back: PredictionReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
