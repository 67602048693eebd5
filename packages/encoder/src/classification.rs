//! Label encoding for the risk-level classification model.

use waterborne_input_models::CanonicalInput;

use crate::label::{EncodedField, LabelEncoderTable};
use crate::schema::{CLASSIFICATION_COLUMNS, ClassificationColumn, classification_schema};
use crate::{EncodeError, EncodedVector};

/// Encodes `input` into the 11-column classification layout, replacing
/// region, community, and season with their label-encoder codes.
///
/// # Errors
///
/// Returns [`EncodeError::UnknownCategory`] if a category is missing from
/// the label encoders. No default code is ever substituted.
pub fn encode_for_classification(
    input: &CanonicalInput,
    label_encoders: &LabelEncoderTable,
) -> Result<EncodedVector, EncodeError> {
    let label_code = |field: EncodedField, value: &str| -> Result<f64, EncodeError> {
        let code = label_encoders.encode(field, value)?;
        u32::try_from(code)
            .map(f64::from)
            .map_err(|_| EncodeError::UnknownCode { field, code })
    };

    let values = CLASSIFICATION_COLUMNS
        .iter()
        .map(|column| match column {
            ClassificationColumn::Region => {
                label_code(EncodedField::Region, input.region().as_ref())
            }
            ClassificationColumn::Community => {
                label_code(EncodedField::Community, input.community().as_ref())
            }
            ClassificationColumn::Season => {
                label_code(EncodedField::Season, input.season().as_ref())
            }
            ClassificationColumn::Numeric(feature) => Ok(feature.value(input)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let vector = EncodedVector::new(classification_schema(), values);
    log::debug!("Classification features: {:?}", vector.values());
    Ok(vector)
}
