#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Category vocabulary and form input types for the waterborne predictor.
//!
//! This crate defines the canonical category vocabulary (communities,
//! regions, seasons) that both trained models were fitted against. The
//! one-hot encoder and the label encoder consume the same lists from here,
//! so the vocabulary order is defined exactly once.
//!
//! Raw form payloads arrive as [`InputRecord`] and are validated into a
//! [`CanonicalInput`], which is the only type the encoders accept.

pub mod calendar;
mod record;

pub use record::{CanonicalInput, InputRecord, MAX_PH, MAX_YEAR, MIN_YEAR};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Version of the category vocabulary below. Bumped whenever a category is
/// added, removed, renamed, or reordered, which also requires retraining
/// both models and re-exporting the label encoders.
pub const VOCABULARY_VERSION: u32 = 1;

/// Geographic setting of the sampled water source.
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
pub enum Region {
    /// Coastal settlements
    Coastal,
    /// Arid and semi-arid areas
    Dryland,
    /// Fringe settlements around cities
    #[serde(rename = "Peri-Urban")]
    #[strum(to_string = "Peri-Urban")]
    PeriUrban,
    /// Rural villages
    Rural,
    /// Dense informal urban settlements
    #[serde(rename = "Urban Slum")]
    #[strum(to_string = "Urban Slum")]
    UrbanSlum,
}

impl Region {
    /// Returns all regions in training vocabulary order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Coastal,
            Self::Dryland,
            Self::PeriUrban,
            Self::Rural,
            Self::UrbanSlum,
        ]
    }
}

/// Community the water sample was collected in.
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
pub enum Community {
    Ajegunle,
    Bagamoyo,
    Bonny,
    Chibombo,
    Dori,
    Entebbe,
    Garissa,
    Gboko,
    Ikorodu,
    Kasoa,
    Kibera,
    Lamu,
    Lokoja,
    Makoko,
    Maradi,
    Mathare,
    Nsawam,
    Nzega,
    Takoradi,
    Zinder,
}

impl Community {
    /// Returns all communities in training vocabulary order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Ajegunle,
            Self::Bagamoyo,
            Self::Bonny,
            Self::Chibombo,
            Self::Dori,
            Self::Entebbe,
            Self::Garissa,
            Self::Gboko,
            Self::Ikorodu,
            Self::Kasoa,
            Self::Kibera,
            Self::Lamu,
            Self::Lokoja,
            Self::Makoko,
            Self::Maradi,
            Self::Mathare,
            Self::Nsawam,
            Self::Nzega,
            Self::Takoradi,
            Self::Zinder,
        ]
    }
}

/// Season the sample was taken in.
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
pub enum Season {
    /// Dry season
    Dry,
    /// Rainy season
    Rainy,
}

impl Season {
    /// Returns all seasons in training vocabulary order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Dry, Self::Rainy]
    }
}

/// Errors raised at the input-collection boundary while validating an
/// [`InputRecord`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// A categorical field holds a value outside the vocabulary.
    #[error("Unknown {field} '{value}'")]
    UnknownCategory {
        /// Name of the categorical field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A numeric field is outside its accepted range.
    #[error("{field} = {value} is out of range: expected {expected}")]
    OutOfRange {
        /// Name of the numeric field.
        field: &'static str,
        /// The rejected value, formatted for display.
        value: String,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn vocabulary_sizes() {
        assert_eq!(Community::all().len(), 20);
        assert_eq!(Region::all().len(), 5);
        assert_eq!(Season::all().len(), 2);
    }

    #[test]
    fn vocabulary_is_sorted_like_training_data() {
        // The training pipeline sorted category names lexically before
        // one-hot encoding, so `all()` must stay in that order.
        for window in Community::all().windows(2) {
            assert!(
                window[0].as_ref() < window[1].as_ref(),
                "{} should sort before {}",
                window[0],
                window[1]
            );
        }
        for window in Region::all().windows(2) {
            assert!(window[0].as_ref() < window[1].as_ref());
        }
    }

    #[test]
    fn display_parse_roundtrip() {
        for region in Region::all() {
            assert_eq!(Region::from_str(&region.to_string()).unwrap(), *region);
        }
        for community in Community::all() {
            assert_eq!(Community::from_str(community.as_ref()).unwrap(), *community);
        }
        for season in Season::all() {
            assert_eq!(Season::from_str(&season.to_string()).unwrap(), *season);
        }
    }

    #[test]
    fn multi_word_regions_use_training_spelling() {
        assert_eq!(Region::UrbanSlum.to_string(), "Urban Slum");
        assert_eq!(Region::PeriUrban.as_ref(), "Peri-Urban");
        assert_eq!(Region::from_str("Urban Slum").unwrap(), Region::UrbanSlum);
        assert!(Region::from_str("UrbanSlum").is_err());
    }

    #[test]
    fn serde_uses_training_spelling() {
        let json = serde_json::to_string(&Region::UrbanSlum).unwrap();
        assert_eq!(json, "\"Urban Slum\"");
        let region: Region = serde_json::from_str("\"Peri-Urban\"").unwrap();
        assert_eq!(region, Region::PeriUrban);
    }

    #[test]
    fn community_names_are_unique() {
        let mut seen = BTreeSet::new();
        for community in Community::all() {
            assert!(
                seen.insert(community.as_ref()),
                "Duplicate community: {community}"
            );
        }
    }
}
