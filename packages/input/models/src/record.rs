//! Raw form payloads and their validated canonical form.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::{self, DerivedFeatures};
use crate::{Community, InputError, Region, Season};

/// Earliest accepted sample year.
pub const MIN_YEAR: i32 = 2000;
/// Latest accepted sample year.
pub const MAX_YEAR: i32 = 2100;
/// Upper bound of the pH scale.
pub const MAX_PH: f64 = 14.0;

/// Unvalidated input exactly as the form (or a JSON file) supplies it.
///
/// Field aliases accept the column names the models were trained with, so
/// a row exported from the training dataset can be fed in directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Region name, e.g. `"Urban Slum"`.
    #[serde(alias = "Region")]
    pub region: String,
    /// Community name, e.g. `"Kibera"`.
    #[serde(alias = "Community")]
    pub community: String,
    /// `"Dry"` or `"Rainy"`.
    #[serde(alias = "Season")]
    pub season: String,
    /// Turbidity in NTU.
    #[serde(alias = "Turbidity(NTU)")]
    pub turbidity: f64,
    /// E. coli count in CFU/100ml.
    #[serde(alias = "Ecoli_Count(CFU/100ml)")]
    pub ecoli_count: i64,
    /// Nitrate in mg/L.
    #[serde(alias = "Nitrate(mg/L)")]
    pub nitrate: f64,
    #[serde(alias = "pH")]
    pub ph: f64,
    #[serde(alias = "Year")]
    pub year: i32,
    #[serde(alias = "Month")]
    pub month: i32,
}

/// A validated sample, the single source of truth for both encoders.
///
/// Only constructible through [`TryFrom<InputRecord>`], so every instance
/// satisfies the input ranges. `Quarter` and `Time_Since_Start` are not
/// stored; they are computed from `year`/`month` on every access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalInput {
    region: Region,
    community: Community,
    season: Season,
    turbidity: f64,
    ecoli_count: u32,
    nitrate: f64,
    ph: f64,
    year: i32,
    month: u8,
}

impl CanonicalInput {
    #[must_use]
    pub const fn region(&self) -> Region {
        self.region
    }

    #[must_use]
    pub const fn community(&self) -> Community {
        self.community
    }

    #[must_use]
    pub const fn season(&self) -> Season {
        self.season
    }

    /// Turbidity in NTU.
    #[must_use]
    pub const fn turbidity(&self) -> f64 {
        self.turbidity
    }

    /// E. coli count in CFU/100ml.
    #[must_use]
    pub const fn ecoli_count(&self) -> u32 {
        self.ecoli_count
    }

    /// Nitrate in mg/L.
    #[must_use]
    pub const fn nitrate(&self) -> f64 {
        self.nitrate
    }

    #[must_use]
    pub const fn ph(&self) -> f64 {
        self.ph
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Calendar quarter derived from [`Self::month`].
    #[must_use]
    pub const fn quarter(&self) -> u8 {
        calendar::quarter(self.month)
    }

    /// Months since January 2015 derived from [`Self::year`] and
    /// [`Self::month`].
    #[must_use]
    pub fn time_since_start(&self) -> i32 {
        calendar::time_since_start(self.year, self.month)
    }

    /// Both calendar-derived features at once.
    #[must_use]
    pub fn derived(&self) -> DerivedFeatures {
        calendar::compute(self.year, self.month)
    }
}

impl TryFrom<InputRecord> for CanonicalInput {
    type Error = InputError;

    fn try_from(record: InputRecord) -> Result<Self, Self::Error> {
        let region = parse_category::<Region>("Region", &record.region)?;
        let community = parse_category::<Community>("Community", &record.community)?;
        let season = parse_category::<Season>("Season", &record.season)?;

        let turbidity = non_negative("Turbidity(NTU)", record.turbidity)?;
        let nitrate = non_negative("Nitrate(mg/L)", record.nitrate)?;

        if !(record.ph.is_finite() && (0.0..=MAX_PH).contains(&record.ph)) {
            return Err(out_of_range("pH", record.ph, "0 to 14"));
        }

        let ecoli_count = u32::try_from(record.ecoli_count).map_err(|_| {
            out_of_range(
                "Ecoli_Count(CFU/100ml)",
                record.ecoli_count,
                "a non-negative whole number",
            )
        })?;

        if !(MIN_YEAR..=MAX_YEAR).contains(&record.year) {
            return Err(out_of_range("Year", record.year, "2000 to 2100"));
        }

        let month = u8::try_from(record.month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| out_of_range("Month", record.month, "1 to 12"))?;

        Ok(Self {
            region,
            community,
            season,
            turbidity,
            ecoli_count,
            nitrate,
            ph: record.ph,
            year: record.year,
            month,
        })
    }
}

fn parse_category<T: FromStr>(field: &'static str, value: &str) -> Result<T, InputError> {
    T::from_str(value.trim()).map_err(|_| InputError::UnknownCategory {
        field,
        value: value.to_string(),
    })
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(out_of_range(field, value, "a finite number >= 0"))
    }
}

fn out_of_range(
    field: &'static str,
    value: impl std::fmt::Display,
    expected: &'static str,
) -> InputError {
    InputError::OutOfRange {
        field,
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kibera_record() -> InputRecord {
        InputRecord {
            region: "Urban Slum".to_string(),
            community: "Kibera".to_string(),
            season: "Rainy".to_string(),
            turbidity: 1.0,
            ecoli_count: 0,
            nitrate: 1.0,
            ph: 7.0,
            year: 2023,
            month: 6,
        }
    }

    #[test]
    fn valid_record_becomes_canonical() {
        let input = CanonicalInput::try_from(kibera_record()).unwrap();
        assert_eq!(input.region(), Region::UrbanSlum);
        assert_eq!(input.community(), Community::Kibera);
        assert_eq!(input.season(), Season::Rainy);
        assert_eq!(input.ecoli_count(), 0);
        assert_eq!(input.quarter(), 2);
        assert_eq!(input.time_since_start(), 101);
    }

    #[test]
    fn derived_features_follow_month() {
        for month in 1..=12 {
            let record = InputRecord {
                month,
                ..kibera_record()
            };
            let input = CanonicalInput::try_from(record).unwrap();
            assert_eq!(input.derived(), calendar::compute(2023, input.month()));
        }
    }

    #[test]
    fn rejects_unknown_community() {
        let record = InputRecord {
            community: "Atlantis".to_string(),
            ..kibera_record()
        };
        assert_eq!(
            CanonicalInput::try_from(record),
            Err(InputError::UnknownCategory {
                field: "Community",
                value: "Atlantis".to_string(),
            })
        );
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let cases = [
            InputRecord {
                ph: 14.5,
                ..kibera_record()
            },
            InputRecord {
                turbidity: -0.1,
                ..kibera_record()
            },
            InputRecord {
                nitrate: f64::NAN,
                ..kibera_record()
            },
            InputRecord {
                ecoli_count: -3,
                ..kibera_record()
            },
            InputRecord {
                year: 1999,
                ..kibera_record()
            },
            InputRecord {
                month: 13,
                ..kibera_record()
            },
            InputRecord {
                month: 0,
                ..kibera_record()
            },
        ];
        for record in cases {
            let result = CanonicalInput::try_from(record.clone());
            assert!(
                matches!(result, Err(InputError::OutOfRange { .. })),
                "expected OutOfRange for {record:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn accepts_range_edges() {
        let low = InputRecord {
            ph: 0.0,
            turbidity: 0.0,
            nitrate: 0.0,
            year: MIN_YEAR,
            month: 1,
            ..kibera_record()
        };
        let high = InputRecord {
            ph: MAX_PH,
            year: MAX_YEAR,
            month: 12,
            ..kibera_record()
        };
        assert!(CanonicalInput::try_from(low).is_ok());
        assert!(CanonicalInput::try_from(high).is_ok());
    }

    #[test]
    fn deserializes_training_column_names() {
        let json = r#"{
            "Region": "Coastal",
            "Community": "Lamu",
            "Season": "Dry",
            "Turbidity(NTU)": 3.5,
            "Ecoli_Count(CFU/100ml)": 120,
            "Nitrate(mg/L)": 8.25,
            "pH": 6.8,
            "Year": 2019,
            "Month": 11
        }"#;
        let record: InputRecord = serde_json::from_str(json).unwrap();
        let input = CanonicalInput::try_from(record).unwrap();
        assert_eq!(input.community(), Community::Lamu);
        assert_eq!(input.ecoli_count(), 120);
        assert_eq!(input.quarter(), 4);
        assert_eq!(input.time_since_start(), 58);
    }
}
