//! Plain-text rendering of prediction results.

use waterborne_encoder::schema::{classification_schema, regression_schema};
use waterborne_input_models::{Community, Region, Season, VOCABULARY_VERSION};
use waterborne_predict_models::{Confidence, PredictionReport, PredictionResult, RiskAssessment};

/// Formats an integer with comma thousands separators.
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a probability as a percentage with two decimals.
pub fn percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub fn case_count(count: i64) -> String {
    format!("Estimated Total Waterborne Cases: {}", thousands(count))
}

pub fn risk(assessment: &RiskAssessment) -> String {
    let mut out = format!("Predicted Risk Level: {}\n", assessment.label);
    match &assessment.confidence {
        Confidence::Available { label, probability } => {
            out.push_str(&format!(
                "Highest Probability Class: {label} ({})",
                percent(*probability)
            ));
            for class in &assessment.distribution {
                out.push_str(&format!(
                    "\n  {:<8} {}",
                    class.label,
                    percent(class.probability)
                ));
            }
        }
        Confidence::Unavailable => out.push_str("Highest Probability Class: N/A"),
    }
    out
}

pub fn result(result: &PredictionResult) -> String {
    match result {
        PredictionResult::CaseCount(count) => case_count(*count),
        PredictionResult::RiskAssessment(assessment) => risk(assessment),
    }
}

pub fn report(report: &PredictionReport) -> String {
    format!("{}\n{}", case_count(report.case_count), risk(&report.risk))
}

/// Both column layouts, one numbered column per line.
pub fn columns() -> String {
    let mut out = String::new();
    for schema in [regression_schema(), classification_schema()] {
        out.push_str(&format!("{} ({} columns):\n", schema.name(), schema.len()));
        for (idx, column) in schema.columns().iter().enumerate() {
            out.push_str(&format!("  {idx:>2}  {column}\n"));
        }
    }
    out
}

pub fn vocabulary() -> String {
    let join = |values: Vec<&str>| values.join(", ");
    format!(
        "Vocabulary version {VOCABULARY_VERSION}\n\
         Regions:     {}\n\
         Communities: {}\n\
         Seasons:     {}\n",
        join(Region::all().iter().map(|v| v.as_ref()).collect()),
        join(Community::all().iter().map(|v| v.as_ref()).collect()),
        join(Season::all().iter().map(|v| v.as_ref()).collect()),
    )
}
