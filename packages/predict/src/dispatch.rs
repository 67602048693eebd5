//! Mode dispatch: encode, check the column layout, invoke the model and
//! turn its raw output into a display-ready result.

use waterborne_encoder::{
    EncodedField, EncodedVector, encode_for_classification, encode_for_regression,
};
use waterborne_input_models::CanonicalInput;
use waterborne_model::{ModelError, argmax};
use waterborne_predict_models::{
    ClassProbability, Confidence, PredictionMode, PredictionReport, PredictionResult,
    RiskAssessment,
};

use crate::{PredictError, PredictionContext};

/// Runs the model selected by `mode` on `input`.
///
/// # Errors
///
/// Returns [`PredictError`] if encoding fails, the model's column layout
/// differs from the encoder's, or the model fails. No default prediction
/// is ever substituted.
pub fn predict(
    context: &PredictionContext,
    mode: PredictionMode,
    input: &CanonicalInput,
) -> Result<PredictionResult, PredictError> {
    log::debug!("Dispatching {mode} prediction");
    Ok(match mode {
        PredictionMode::CaseCount => {
            PredictionResult::CaseCount(predict_case_count(context, input)?)
        }
        PredictionMode::RiskLevel => {
            PredictionResult::RiskAssessment(assess_risk(context, input)?)
        }
    })
}

/// Runs both models on `input`.
///
/// # Errors
///
/// Returns the first [`PredictError`] from either model.
pub fn predict_report(
    context: &PredictionContext,
    input: &CanonicalInput,
) -> Result<PredictionReport, PredictError> {
    Ok(PredictionReport {
        case_count: predict_case_count(context, input)?,
        risk: assess_risk(context, input)?,
    })
}

/// Estimated total cases, rounded half-to-even.
///
/// # Errors
///
/// Returns [`PredictError`] on a layout mismatch or a failed or non-finite
/// model output.
#[allow(clippy::cast_possible_truncation)]
pub fn predict_case_count(
    context: &PredictionContext,
    input: &CanonicalInput,
) -> Result<i64, PredictError> {
    let model = context.regression();
    let vector = encode_for_regression(input);
    check_layout(&vector, model.feature_names())?;

    let raw = model.predict(vector.values())?;
    if !raw.is_finite() {
        return Err(ModelError::NonFiniteOutput(raw).into());
    }

    let count = raw.round_ties_even() as i64;
    log::debug!("Regression output {raw} rounded to {count}");
    Ok(count)
}

/// The classifier's risk level for `input`, with the most probable class
/// and its probability when the model can report them.
///
/// The risk level always comes from the classifier's own `predict`. The
/// confidence is taken from `predict_proba` and may name a different class.
///
/// # Errors
///
/// Returns [`PredictError`] if a category has no label code, the layout
/// differs, the model fails, or its output has no risk-level label.
pub fn assess_risk(
    context: &PredictionContext,
    input: &CanonicalInput,
) -> Result<RiskAssessment, PredictError> {
    let model = context.classification();
    let encoders = context.label_encoders();
    let vector = encode_for_classification(input, encoders)?;
    check_layout(&vector, model.feature_names())?;

    let class = model.predict(vector.values())?;
    let label = encoders.decode(EncodedField::RiskLevel, class)?;

    if !model.supports_probability() {
        log::debug!("Classifier chose class {class} ({label}) without probabilities");
        return Ok(RiskAssessment {
            label: label.to_string(),
            confidence: Confidence::Unavailable,
            distribution: Vec::new(),
        });
    }

    let proba = model.predict_proba(vector.values())?;
    let levels = context.risk_levels();
    if proba.len() != levels.len() {
        return Err(PredictError::ProbabilityShape {
            expected: levels.len(),
            actual: proba.len(),
        });
    }
    if let Some(bad) = proba.iter().copied().find(|p| !p.is_finite()) {
        return Err(ModelError::NonFiniteOutput(bad).into());
    }

    let top = argmax(&proba).ok_or(PredictError::ProbabilityShape {
        expected: levels.len(),
        actual: 0,
    })?;
    let top_label = encoders.decode(EncodedField::RiskLevel, top)?;
    log::debug!(
        "Classifier chose class {class} ({label}); most probable is {top} ({top_label}) at {}",
        proba[top]
    );

    Ok(RiskAssessment {
        label: label.to_string(),
        confidence: Confidence::Available {
            label: top_label.to_string(),
            probability: proba[top],
        },
        distribution: levels
            .iter()
            .zip(&proba)
            .map(|(label, probability)| ClassProbability {
                label: label.clone(),
                probability: *probability,
            })
            .collect(),
    })
}

fn check_layout(
    vector: &EncodedVector,
    feature_names: Option<&[String]>,
) -> Result<(), PredictError> {
    match feature_names {
        Some(names) => vector.check_columns(names).map_err(PredictError::from),
        None => Ok(()),
    }
}
