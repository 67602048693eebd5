#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pre-trained model abstraction.
//!
//! The predictor only ever talks to the [`RegressionModel`] and
//! [`ClassificationModel`] traits. The concrete implementations here
//! evaluate tree ensembles exported to JSON; anything else (a remote
//! service, a test double) can stand in by implementing the traits.

pub mod classification;
pub mod regression;
pub mod tree;

pub use classification::{
    ForestClassifier, TreeClassifier, classifier_from_json, load_classification_model,
};
pub use regression::{BoostedRegressor, Objective, load_regression_model};

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or evaluating a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The artifact file could not be read.
    #[error("Failed to read model from {}: {source}", path.display())]
    Io {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or has the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The artifact parsed, but its top-level settings are unusable.
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// A tree in the artifact is structurally broken.
    #[error("Malformed tree {tree} at node {node}: {reason}")]
    MalformedTree {
        /// Index of the tree in the ensemble.
        tree: usize,
        /// Index of the offending node.
        node: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// The feature vector has the wrong length for this model.
    #[error("Model expects {expected} features, got {actual}")]
    FeatureCount {
        /// Number of features the model was trained on.
        expected: usize,
        /// Number of features supplied.
        actual: usize,
    },

    /// The model produced NaN or an infinity.
    #[error("Model produced a non-finite output: {0}")]
    NonFiniteOutput(f64),

    /// The model cannot produce class probabilities.
    #[error("Model does not support class probabilities")]
    ProbabilityUnsupported,
}

/// A model that maps a feature vector to a single number.
pub trait RegressionModel: Send + Sync {
    /// Column names the model was trained on, in order, if the artifact
    /// records them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Predicts a value for one sample.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the sample has the wrong shape or the model
    /// fails to produce a value.
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// A model that maps a feature vector to one of `n_classes` class indices.
pub trait ClassificationModel: Send + Sync {
    /// Column names the model was trained on, in order, if the artifact
    /// records them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Number of classes the model distinguishes.
    fn n_classes(&self) -> usize;

    /// Predicts the class index for one sample.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the sample has the wrong shape or the model
    /// fails to produce a class.
    fn predict(&self, features: &[f64]) -> Result<usize, ModelError>;

    /// Whether [`Self::predict_proba`] is implemented.
    fn supports_probability(&self) -> bool {
        false
    }

    /// Per-class probabilities for one sample, indexed by class.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ProbabilityUnsupported`] unless the model
    /// overrides this.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        let _ = features;
        Err(ModelError::ProbabilityUnsupported)
    }
}

/// Index of the largest value. Ties go to the lowest index.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &value)| match best {
            Some((_, top)) if value <= top => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

fn check_feature_count(expected: usize, features: &[f64]) -> Result<(), ModelError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(ModelError::FeatureCount {
            expected,
            actual: features.len(),
        })
    }
}

fn read_artifact(path: &std::path::Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    struct LabelOnly;

    impl ClassificationModel for LabelOnly {
        fn n_classes(&self) -> usize {
            3
        }

        fn predict(&self, _features: &[f64]) -> Result<usize, ModelError> {
            Ok(2)
        }
    }

    #[test]
    fn argmax_picks_first_of_ties() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5, 0.1]), Some(1));
        assert_eq!(argmax(&[0.9]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn default_trait_methods_report_no_probabilities() {
        let model = LabelOnly;
        assert!(!model.supports_probability());
        assert!(model.feature_names().is_none());
        assert!(matches!(
            model.predict_proba(&[]),
            Err(ModelError::ProbabilityUnsupported)
        ));
    }

    #[test]
    fn feature_count_is_checked() {
        assert!(check_feature_count(2, &[1.0, 2.0]).is_ok());
        assert!(matches!(
            check_feature_count(3, &[1.0]),
            Err(ModelError::FeatureCount {
                expected: 3,
                actual: 1
            })
        ));
    }
}
