//! Label encoders: trained category ↔ integer code mappings.
//!
//! Each field's encoder is the ordered list of classes it was fitted on;
//! a class's code is its index in that list. The artifact is loaded once at
//! start-up and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use waterborne_input_models::{Community, Region, Season, VOCABULARY_VERSION};

use crate::EncodeError;

/// Fields that carry a label encoder in the artifact.
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
pub enum EncodedField {
    Region,
    Community,
    Season,
    /// The classification target.
    #[serde(rename = "Risk_Level")]
    #[strum(to_string = "Risk_Level")]
    RiskLevel,
}

impl EncodedField {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Region, Self::Community, Self::Season, Self::RiskLevel]
    }

    /// The input vocabulary for this field, or `None` for the target.
    fn vocabulary(self) -> Option<Vec<&'static str>> {
        match self {
            Self::Region => Some(Region::all().iter().map(|v| v.as_ref()).collect()),
            Self::Community => Some(Community::all().iter().map(|v| v.as_ref()).collect()),
            Self::Season => Some(Season::all().iter().map(|v| v.as_ref()).collect()),
            Self::RiskLevel => None,
        }
    }
}

/// Errors that can occur while loading a label-encoder artifact.
#[derive(Debug, Error)]
pub enum LabelEncoderError {
    /// The artifact file could not be read.
    #[error("Failed to read label encoders from {}: {source}", path.display())]
    Io {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or has the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field has no encoder.
    #[error("Label encoders have no entry for {field}")]
    MissingField {
        /// The missing field.
        field: EncodedField,
    },

    /// A field's encoder has no classes.
    #[error("Label encoder for {field} has no classes")]
    EmptyClasses {
        /// The field with the empty encoder.
        field: EncodedField,
    },

    /// A class appears more than once in a field's encoder.
    #[error("Label encoder for {field} lists class '{class}' more than once")]
    DuplicateClass {
        /// The field with the duplicate.
        field: EncodedField,
        /// The duplicated class.
        class: String,
    },

    /// The artifact was exported against a different category vocabulary.
    #[error("Label encoders target vocabulary version {found}, expected {expected}")]
    VocabularyVersion {
        /// [`VOCABULARY_VERSION`] of this build.
        expected: u32,
        /// Version recorded in the artifact.
        found: u32,
    },
}

/// A single field's trained category ↔ code mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: BTreeMap<String, usize>,
}

impl LabelEncoder {
    /// Builds an encoder from its classes in code order.
    ///
    /// # Errors
    ///
    /// Returns [`LabelEncoderError::EmptyClasses`] or
    /// [`LabelEncoderError::DuplicateClass`] if the class list is unusable.
    pub fn new(field: EncodedField, classes: Vec<String>) -> Result<Self, LabelEncoderError> {
        if classes.is_empty() {
            return Err(LabelEncoderError::EmptyClasses { field });
        }

        let mut codes = BTreeMap::new();
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                return Err(LabelEncoderError::DuplicateClass {
                    field,
                    class: class.clone(),
                });
            }
        }

        Ok(Self { classes, codes })
    }

    /// Code of `class`, if it was seen during training.
    #[must_use]
    pub fn encode(&self, class: &str) -> Option<usize> {
        self.codes.get(class).copied()
    }

    /// Class with the given code.
    #[must_use]
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Classes in code order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// On-disk shape of `label_encoders.json`.
#[derive(Debug, Deserialize)]
struct LabelEncoderArtifact {
    #[serde(default)]
    vocabulary_version: Option<u32>,
    label_encoders: BTreeMap<String, Vec<String>>,
}

/// Label encoders for every categorical field plus the risk-level target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoderTable {
    region: LabelEncoder,
    community: LabelEncoder,
    season: LabelEncoder,
    risk_level: LabelEncoder,
}

impl LabelEncoderTable {
    /// Builds a table from per-field class lists.
    ///
    /// # Errors
    ///
    /// Returns [`LabelEncoderError`] if a field is missing or its classes
    /// are empty or duplicated.
    pub fn from_classes(
        mut classes: BTreeMap<EncodedField, Vec<String>>,
    ) -> Result<Self, LabelEncoderError> {
        let mut take = |field: EncodedField| {
            let list = classes
                .remove(&field)
                .ok_or(LabelEncoderError::MissingField { field })?;
            LabelEncoder::new(field, list)
        };

        Ok(Self {
            region: take(EncodedField::Region)?,
            community: take(EncodedField::Community)?,
            season: take(EncodedField::Season)?,
            risk_level: take(EncodedField::RiskLevel)?,
        })
    }

    /// Parses a table from the JSON artifact format.
    ///
    /// # Errors
    ///
    /// Returns [`LabelEncoderError`] if the JSON is malformed, a field is
    /// missing or invalid, or the vocabulary version does not match.
    pub fn from_json(json: &str) -> Result<Self, LabelEncoderError> {
        let artifact: LabelEncoderArtifact = serde_json::from_str(json)?;

        if let Some(found) = artifact.vocabulary_version
            && found != VOCABULARY_VERSION
        {
            return Err(LabelEncoderError::VocabularyVersion {
                expected: VOCABULARY_VERSION,
                found,
            });
        }

        let mut classes = BTreeMap::new();
        for (name, list) in artifact.label_encoders {
            match name.parse::<EncodedField>() {
                Ok(field) => {
                    classes.insert(field, list);
                }
                Err(_) => log::debug!("Ignoring label encoder for unused field '{name}'"),
            }
        }

        let table = Self::from_classes(classes)?;

        for (field, value) in table.vocabulary_drift() {
            log::warn!(
                "Label encoder for {field} has no class '{value}'; inputs with this value \
                 cannot be classified"
            );
        }

        Ok(table)
    }

    /// The encoder for `field`.
    #[must_use]
    pub const fn encoder(&self, field: EncodedField) -> &LabelEncoder {
        match field {
            EncodedField::Region => &self.region,
            EncodedField::Community => &self.community,
            EncodedField::Season => &self.season,
            EncodedField::RiskLevel => &self.risk_level,
        }
    }

    /// Encodes `value` for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnknownCategory`] if the encoder was never
    /// trained on `value`. There is no fallback code.
    pub fn encode(&self, field: EncodedField, value: &str) -> Result<usize, EncodeError> {
        self.encoder(field)
            .encode(value)
            .ok_or_else(|| EncodeError::UnknownCategory {
                field,
                value: value.to_string(),
            })
    }

    /// Decodes `code` for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnknownCode`] if `code` is out of range.
    pub fn decode(&self, field: EncodedField, code: usize) -> Result<&str, EncodeError> {
        self.encoder(field)
            .decode(code)
            .ok_or(EncodeError::UnknownCode { field, code })
    }

    /// Vocabulary values that the encoders were not trained on.
    ///
    /// A non-empty result means the one-hot vocabulary and the label
    /// encoder artifact have drifted apart. Inputs using these values will
    /// fail classification with [`EncodeError::UnknownCategory`].
    #[must_use]
    pub fn vocabulary_drift(&self) -> Vec<(EncodedField, &'static str)> {
        EncodedField::all()
            .iter()
            .filter_map(|field| field.vocabulary().map(|vocab| (*field, vocab)))
            .flat_map(|(field, vocab)| {
                let trained: BTreeSet<&str> = self
                    .encoder(field)
                    .classes()
                    .iter()
                    .map(String::as_str)
                    .collect();
                vocab
                    .into_iter()
                    .filter(move |value| !trained.contains(value))
                    .map(move |value| (field, value))
            })
            .collect()
    }
}

/// Loads the label-encoder artifact at `path`.
///
/// # Errors
///
/// Returns [`LabelEncoderError`] if the file cannot be read or parsed.
pub fn load_label_encoders(path: &Path) -> Result<LabelEncoderTable, LabelEncoderError> {
    let json = std::fs::read_to_string(path).map_err(|source| LabelEncoderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = LabelEncoderTable::from_json(&json)?;
    log::info!(
        "Loaded label encoders from {} ({} risk levels)",
        path.display(),
        table.encoder(EncodedField::RiskLevel).len()
    );
    Ok(table)
}
