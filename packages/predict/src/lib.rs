#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Waterborne disease prediction.
//!
//! A [`PredictionContext`] holds both models and the label encoders. It is
//! loaded once from a [`config::PredictorConfig`] and then passed by
//! reference to the dispatch functions, which encode a validated input for
//! the selected model, check the encoded column layout against the model,
//! and normalize the model's output.

pub mod config;
pub mod context;
pub mod dispatch;

pub use config::PredictorConfig;
pub use context::{Artifact, ContextError, PredictionContext};
pub use dispatch::{assess_risk, predict, predict_case_count, predict_report};

use thiserror::Error;
use waterborne_encoder::EncodeError;
use waterborne_model::ModelError;

/// Errors that can occur while making a prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The input could not be encoded for the model, or the encoded layout
    /// does not match the model's.
    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// The model failed or produced an unusable value.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The classifier's probability vector does not have one entry per
    /// risk level.
    #[error("Classifier returned {actual} probabilities for {expected} risk levels")]
    ProbabilityShape {
        /// Number of risk levels in the `Risk_Level` encoder.
        expected: usize,
        /// Number of probabilities returned.
        actual: usize,
    },
}
