//! One-hot encoding for the case-count regression model.

use waterborne_input_models::CanonicalInput;

use crate::EncodedVector;
use crate::schema::{regression_columns, regression_schema};

/// Encodes `input` into the 35-column regression layout.
///
/// Numeric fields come first, followed by one indicator column per
/// community, region, and season, all in vocabulary order. Exactly one
/// indicator in each one-hot group is `1.0`.
#[must_use]
pub fn encode_for_regression(input: &CanonicalInput) -> EncodedVector {
    let values = regression_columns()
        .iter()
        .map(|column| column.value(input))
        .collect();
    let vector = EncodedVector::new(regression_schema(), values);
    log::debug!("Regression features: {:?}", vector.values());
    vector
}
