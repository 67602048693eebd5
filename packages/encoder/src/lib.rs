#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature encoding for the waterborne disease models.
//!
//! The regression model expects a wide one-hot vector (35 columns) and the
//! classification model a narrow label-encoded vector (11 columns). Column
//! order is part of each model's contract and is fixed in [`schema`]; both
//! encoders walk those column lists instead of assembling vectors by hand,
//! so the order can't drift between call sites.

pub mod classification;
pub mod label;
pub mod regression;
pub mod schema;

pub use classification::encode_for_classification;
pub use label::{
    EncodedField, LabelEncoder, LabelEncoderError, LabelEncoderTable, load_label_encoders,
};
pub use regression::encode_for_regression;
pub use schema::Schema;

use thiserror::Error;

/// Errors that can occur while encoding or decoding features.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A category value is not among the label encoder's trained classes.
    #[error("Unknown {field} category '{value}': not in the label encoder's trained classes")]
    UnknownCategory {
        /// The encoded field.
        field: EncodedField,
        /// The value that could not be encoded.
        value: String,
    },

    /// An integer code has no class in the label encoder.
    #[error("Unknown {field} code {code}: label encoder has no such class")]
    UnknownCode {
        /// The encoded field.
        field: EncodedField,
        /// The code that could not be decoded.
        code: usize,
    },

    /// The encoded vector has a different number of columns than the
    /// consumer expects.
    #[error("{schema} vector has {actual} columns, expected {expected}")]
    ColumnCountMismatch {
        /// Name of the vector's schema.
        schema: &'static str,
        /// Column count the consumer expects.
        expected: usize,
        /// Column count of the vector.
        actual: usize,
    },

    /// A column is in the wrong position.
    #[error("{schema} column {position} is '{actual}', expected '{expected}'")]
    ColumnOrderMismatch {
        /// Name of the vector's schema.
        schema: &'static str,
        /// Zero-based position of the first differing column.
        position: usize,
        /// Column name the consumer expects at `position`.
        expected: String,
        /// Column name the vector has at `position`.
        actual: String,
    },
}

/// An ordered, named feature vector ready to hand to a model.
///
/// Only the encoders in this crate construct these, so the values always
/// line up one-to-one with [`Self::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    schema: &'static Schema,
    values: Vec<f64>,
}

impl EncodedVector {
    fn new(schema: &'static Schema, values: Vec<f64>) -> Self {
        debug_assert_eq!(
            schema.len(),
            values.len(),
            "{} encoder produced the wrong number of values",
            schema.name()
        );
        Self { schema, values }
    }

    /// The schema this vector was encoded with.
    #[must_use]
    pub const fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Column names, in model order.
    #[must_use]
    pub fn columns(&self) -> &'static [String] {
        self.schema.columns()
    }

    /// Column values, in model order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema
            .position(column)
            .and_then(|idx| self.values.get(idx).copied())
    }

    /// Iterates `(column, value)` pairs in model order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Checks that this vector's columns are exactly `expected`, in order.
    ///
    /// Called before a model is invoked, so that an artifact exported with
    /// a different column layout fails loudly instead of silently producing
    /// wrong predictions.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::ColumnCountMismatch`] or
    /// [`EncodeError::ColumnOrderMismatch`] describing the first difference.
    pub fn check_columns<S: AsRef<str>>(&self, expected: &[S]) -> Result<(), EncodeError> {
        let actual = self.columns();
        if actual.len() != expected.len() {
            return Err(EncodeError::ColumnCountMismatch {
                schema: self.schema.name(),
                expected: expected.len(),
                actual: actual.len(),
            });
        }

        for (position, (want, have)) in expected.iter().zip(actual).enumerate() {
            let want: &str = want.as_ref();
            if want != have.as_str() {
                return Err(EncodeError::ColumnOrderMismatch {
                    schema: self.schema.name(),
                    position,
                    expected: want.to_string(),
                    actual: have.clone(),
                });
            }
        }

        Ok(())
    }
}
