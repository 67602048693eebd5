//! Gradient-boosted regression trees.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::tree::{RawTree, SplitRule, Tree};
use crate::{ModelError, RegressionModel, check_feature_count, read_artifact};

/// Training objective, which decides how summed leaf values become a
/// prediction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Objective {
    /// Prediction is `base_score` plus the summed leaves.
    #[default]
    #[serde(rename = "reg:squarederror")]
    #[strum(to_string = "reg:squarederror")]
    SquaredError,
    /// Leaves sum in log space: prediction is
    /// `exp(ln(base_score) + Σ leaves)`.
    #[serde(rename = "count:poisson")]
    #[strum(to_string = "count:poisson")]
    Poisson,
}

/// Leaf payload of a boosted tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueLeaf {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct RegressionArtifact {
    feature_names: Vec<String>,
    base_score: f64,
    #[serde(default)]
    objective: Objective,
    trees: Vec<RawTree<ValueLeaf>>,
}

/// An additive ensemble of regression trees.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedRegressor {
    feature_names: Vec<String>,
    base_score: f64,
    objective: Objective,
    trees: Vec<Tree<ValueLeaf>>,
}

impl BoostedRegressor {
    /// Parses and validates a regression artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the JSON is malformed, the base score does
    /// not suit the objective, or any tree is structurally broken.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: RegressionArtifact = serde_json::from_str(json)?;

        if artifact.feature_names.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "regression model lists no feature names".to_string(),
            ));
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "regression model has no trees".to_string(),
            ));
        }
        let base_ok = match artifact.objective {
            Objective::SquaredError => artifact.base_score.is_finite(),
            Objective::Poisson => artifact.base_score.is_finite() && artifact.base_score > 0.0,
        };
        if !base_ok {
            return Err(ModelError::InvalidArtifact(format!(
                "base_score {} is not valid for objective {}",
                artifact.base_score, artifact.objective
            )));
        }

        let n_features = artifact.feature_names.len();
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                Tree::new(index, raw.nodes, n_features, |leaf: &ValueLeaf| {
                    if leaf.value.is_finite() {
                        Ok(())
                    } else {
                        Err(format!("leaf value {} is not finite", leaf.value))
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            feature_names: artifact.feature_names,
            base_score: artifact.base_score,
            objective: artifact.objective,
            trees,
        })
    }

    #[must_use]
    pub const fn objective(&self) -> Objective {
        self.objective
    }

    #[must_use]
    pub const fn base_score(&self) -> f64 {
        self.base_score
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Sum of the leaf values `features` falls into, one per tree.
    fn leaf_sum(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .map(|tree| tree.leaf(features, SplitRule::LessThan).value)
            .sum()
    }
}

impl RegressionModel for BoostedRegressor {
    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_feature_count(self.feature_names.len(), features)?;

        let leaves = self.leaf_sum(features);
        let prediction = match self.objective {
            Objective::SquaredError => self.base_score + leaves,
            Objective::Poisson => (self.base_score.ln() + leaves).exp(),
        };
        log::debug!(
            "Regression ({}) leaf sum {leaves}, prediction {prediction}",
            self.objective
        );

        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(ModelError::NonFiniteOutput(prediction))
        }
    }
}

/// Loads a regression artifact from `path`.
///
/// # Errors
///
/// Returns [`ModelError`] if the file cannot be read or is not a valid
/// regression artifact.
pub fn load_regression_model(path: &Path) -> Result<Box<dyn RegressionModel>, ModelError> {
    let model = BoostedRegressor::from_json(&read_artifact(path)?)?;
    log::info!(
        "Loaded regression model from {} ({} trees, objective {})",
        path.display(),
        model.n_trees(),
        model.objective()
    );
    Ok(Box::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{REGRESSION_MODEL_JSON, kibera_regression_features};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn bundled_model_predicts_kibera_scenario() {
        let model = BoostedRegressor::from_json(REGRESSION_MODEL_JSON).unwrap();
        assert_eq!(model.n_trees(), 3);
        assert_eq!(model.objective(), Objective::SquaredError);
        assert_eq!(model.feature_names().map(<[String]>::len), Some(35));

        let prediction = model.predict(&kibera_regression_features()).unwrap();
        assert_close(prediction, 95.7);
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = BoostedRegressor::from_json(REGRESSION_MODEL_JSON).unwrap();
        let features = kibera_regression_features();
        let first = model.predict(&features).unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict(&features).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn high_ecoli_takes_the_other_branch() {
        let model = BoostedRegressor::from_json(REGRESSION_MODEL_JSON).unwrap();
        let mut features = kibera_regression_features();
        features[1] = 250.0;
        assert_close(model.predict(&features).unwrap(), 0.5 + 260.0 + 30.0 + 25.2);
    }

    #[test]
    fn poisson_objective_sums_in_log_space() {
        let json = r#"{
            "feature_names": ["a"],
            "base_score": 2.0,
            "objective": "count:poisson",
            "trees": [
                {"nodes": [{"value": 0.5}]},
                {"nodes": [{"feature": 0, "threshold": 0.0, "left": 1, "right": 2}, {"value": -1.0}, {"value": 1.0}]}
            ]
        }"#;
        let model = BoostedRegressor::from_json(json).unwrap();
        assert_close(model.predict(&[1.0]).unwrap(), (2.0_f64.ln() + 1.5).exp());
        assert_close(model.predict(&[-1.0]).unwrap(), (2.0_f64.ln() - 0.5).exp());
    }

    #[test]
    fn poisson_requires_positive_base_score() {
        let json = r#"{"feature_names": ["a"], "base_score": 0.0, "objective": "count:poisson",
                       "trees": [{"nodes": [{"value": 0.5}]}]}"#;
        assert!(matches!(
            BoostedRegressor::from_json(json),
            Err(ModelError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn objective_defaults_to_squared_error() {
        let json = r#"{"feature_names": ["a"], "base_score": 1.0, "trees": [{"nodes": [{"value": 2.0}]}]}"#;
        let model = BoostedRegressor::from_json(json).unwrap();
        assert_eq!(model.objective(), Objective::SquaredError);
        assert_close(model.predict(&[0.0]).unwrap(), 3.0);
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let model = BoostedRegressor::from_json(REGRESSION_MODEL_JSON).unwrap();
        assert!(matches!(
            model.predict(&[1.0; 11]),
            Err(ModelError::FeatureCount {
                expected: 35,
                actual: 11
            })
        ));
    }

    #[test]
    fn malformed_tree_is_rejected_at_load() {
        let json = r#"{"feature_names": ["a"], "base_score": 0.5, "trees": [
            {"nodes": [{"value": 1.0}]},
            {"nodes": [{"feature": 4, "threshold": 1.0, "left": 1, "right": 2}, {"value": 0.0}, {"value": 1.0}]}
        ]}"#;
        let err = BoostedRegressor::from_json(json).unwrap_err();
        assert!(
            matches!(err, ModelError::MalformedTree { tree: 1, node: 0, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn unknown_objective_is_a_json_error() {
        let json = r#"{"feature_names": ["a"], "base_score": 0.5, "objective": "reg:tweedie",
                       "trees": [{"nodes": [{"value": 1.0}]}]}"#;
        assert!(matches!(
            BoostedRegressor::from_json(json),
            Err(ModelError::Json(_))
        ));
    }

    #[test]
    fn loader_reports_missing_file() {
        let err = load_regression_model(Path::new("does/not/exist.json")).err();
        assert!(matches!(err, Some(ModelError::Io { .. })));
    }
}
