//! The loaded, immutable state every prediction runs against.

use std::path::{Path, PathBuf};

use strum_macros::{AsRefStr, Display};
use thiserror::Error;
use waterborne_encoder::schema::{Schema, classification_schema, regression_schema};
use waterborne_encoder::{EncodedField, LabelEncoderTable, load_label_encoders};
use waterborne_model::{
    ClassificationModel, RegressionModel, load_classification_model, load_regression_model,
};

use crate::config::{ConfigError, PredictorConfig};

/// The artifacts a context is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum Artifact {
    #[strum(to_string = "Regression model")]
    RegressionModel,
    #[strum(to_string = "Classification model")]
    ClassificationModel,
    #[strum(to_string = "Label encoders")]
    LabelEncoders,
}

/// Errors that can occur while building a [`PredictionContext`].
///
/// All of these are fatal at start-up.
#[derive(Debug, Error)]
pub enum ContextError {
    /// An artifact is missing or cannot be loaded.
    #[error("{artifact} unavailable at {}: {reason}", path.display())]
    ModelUnavailable {
        /// Which artifact failed.
        artifact: Artifact,
        /// Where it was looked for.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// The configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The classifier and the `Risk_Level` encoder disagree on the number
    /// of risk levels.
    #[error("Classification model has {model} classes but the Risk_Level encoder has {encoder}")]
    ClassCountMismatch {
        /// Classes reported by the model.
        model: usize,
        /// Classes in the `Risk_Level` encoder.
        encoder: usize,
    },
}

/// Both models plus the label encoders.
///
/// Built once and only read afterwards; share it by reference.
pub struct PredictionContext {
    regression: Box<dyn RegressionModel>,
    classification: Box<dyn ClassificationModel>,
    label_encoders: LabelEncoderTable,
}

impl std::fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionContext")
            .field("risk_levels", &self.risk_levels())
            .field(
                "supports_probability",
                &self.classification.supports_probability(),
            )
            .finish_non_exhaustive()
    }
}

impl PredictionContext {
    /// Assembles a context from already-constructed parts.
    #[must_use]
    pub fn new(
        regression: Box<dyn RegressionModel>,
        classification: Box<dyn ClassificationModel>,
        label_encoders: LabelEncoderTable,
    ) -> Self {
        Self {
            regression,
            classification,
            label_encoders,
        }
    }

    /// Loads every artifact named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ModelUnavailable`] for the first artifact
    /// that cannot be loaded, or [`ContextError::ClassCountMismatch`] if
    /// the classifier does not match the `Risk_Level` encoder.
    pub fn load(config: &PredictorConfig) -> Result<Self, ContextError> {
        let paths = &config.artifacts;

        let label_encoders = load_label_encoders(&paths.label_encoders)
            .map_err(|e| unavailable(Artifact::LabelEncoders, &paths.label_encoders, &e))?;
        let regression = load_regression_model(&paths.regression_model)
            .map_err(|e| unavailable(Artifact::RegressionModel, &paths.regression_model, &e))?;
        let classification =
            load_classification_model(&paths.classification_model).map_err(|e| {
                unavailable(
                    Artifact::ClassificationModel,
                    &paths.classification_model,
                    &e,
                )
            })?;

        let risk_levels = label_encoders.encoder(EncodedField::RiskLevel).len();
        if classification.n_classes() != risk_levels {
            return Err(ContextError::ClassCountMismatch {
                model: classification.n_classes(),
                encoder: risk_levels,
            });
        }

        warn_on_layout_mismatch(
            Artifact::RegressionModel,
            regression.feature_names(),
            regression_schema(),
        );
        warn_on_layout_mismatch(
            Artifact::ClassificationModel,
            classification.feature_names(),
            classification_schema(),
        );

        log::info!(
            "Prediction context ready ({} risk levels, probabilities {})",
            risk_levels,
            if classification.supports_probability() {
                "available"
            } else {
                "unavailable"
            }
        );

        Ok(Self::new(regression, classification, label_encoders))
    }

    #[must_use]
    pub fn regression(&self) -> &dyn RegressionModel {
        self.regression.as_ref()
    }

    #[must_use]
    pub fn classification(&self) -> &dyn ClassificationModel {
        self.classification.as_ref()
    }

    #[must_use]
    pub const fn label_encoders(&self) -> &LabelEncoderTable {
        &self.label_encoders
    }

    /// Risk levels in class-index order.
    #[must_use]
    pub fn risk_levels(&self) -> &[String] {
        self.label_encoders
            .encoder(EncodedField::RiskLevel)
            .classes()
    }
}

fn unavailable(artifact: Artifact, path: &Path, error: &impl std::fmt::Display) -> ContextError {
    ContextError::ModelUnavailable {
        artifact,
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

/// Mismatched layouts still fail on every prediction; this only surfaces
/// them at start-up.
fn warn_on_layout_mismatch(artifact: Artifact, feature_names: Option<&[String]>, schema: &Schema) {
    match feature_names {
        Some(names) if names != schema.columns() => log::warn!(
            "{artifact} was trained on a different {} column layout; predictions will fail",
            schema.name()
        ),
        Some(_) => {}
        None => log::debug!("{artifact} does not record feature names; skipping layout check"),
    }
}
