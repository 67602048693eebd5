//! Column layouts for both models.
//!
//! These lists are the encoding contract. The regression model was trained
//! on numeric columns followed by one-hot community, region and season
//! columns; the classification model on a narrow layout with label-encoded
//! categories. A reordering here changes predictions without any runtime
//! error, which is why column names are also checked against each model
//! artifact's `feature_names` before inference.

use std::sync::LazyLock;

use waterborne_input_models::{CanonicalInput, Community, Region, Season};

/// Numeric model inputs, shared by both layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericFeature {
    Turbidity,
    EcoliCount,
    Nitrate,
    Ph,
    Year,
    Month,
    Quarter,
    TimeSinceStart,
}

impl NumericFeature {
    /// Column name used at training time.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Turbidity => "Turbidity(NTU)",
            Self::EcoliCount => "Ecoli_Count(CFU/100ml)",
            Self::Nitrate => "Nitrate(mg/L)",
            Self::Ph => "pH",
            Self::Year => "Year",
            Self::Month => "Month",
            Self::Quarter => "Quarter",
            Self::TimeSinceStart => "Time_Since_Start",
        }
    }

    /// Reads this feature from a validated input.
    #[must_use]
    pub fn value(self, input: &CanonicalInput) -> f64 {
        match self {
            Self::Turbidity => input.turbidity(),
            Self::EcoliCount => f64::from(input.ecoli_count()),
            Self::Nitrate => input.nitrate(),
            Self::Ph => input.ph(),
            Self::Year => f64::from(input.year()),
            Self::Month => f64::from(input.month()),
            Self::Quarter => f64::from(input.quarter()),
            Self::TimeSinceStart => f64::from(input.time_since_start()),
        }
    }
}

/// The numeric block, in training order.
pub const NUMERIC_FEATURES: [NumericFeature; 8] = [
    NumericFeature::Turbidity,
    NumericFeature::EcoliCount,
    NumericFeature::Nitrate,
    NumericFeature::Ph,
    NumericFeature::Year,
    NumericFeature::Month,
    NumericFeature::Quarter,
    NumericFeature::TimeSinceStart,
];

/// A contiguous block of regression columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGroup {
    /// [`NUMERIC_FEATURES`], as-is.
    Numeric,
    /// One indicator per [`Community::all`].
    Community,
    /// One indicator per [`Region::all`].
    Region,
    /// One indicator per [`Season::all`].
    Season,
}

/// Order of the column blocks in the regression vector.
pub const REGRESSION_LAYOUT: [ColumnGroup; 4] = [
    ColumnGroup::Numeric,
    ColumnGroup::Community,
    ColumnGroup::Region,
    ColumnGroup::Season,
];

/// One column of the regression vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegressionColumn {
    Numeric(NumericFeature),
    Community(Community),
    Region(Region),
    Season(Season),
}

impl RegressionColumn {
    /// Column name used at training time, e.g. `Community_Kibera`.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Numeric(feature) => feature.column_name().to_string(),
            Self::Community(community) => format!("Community_{community}"),
            Self::Region(region) => format!("Region_{region}"),
            Self::Season(season) => format!("Season_{season}"),
        }
    }

    /// Value of this column for `input`: the numeric value, or a 0/1
    /// indicator for one-hot columns.
    #[must_use]
    pub fn value(self, input: &CanonicalInput) -> f64 {
        let indicator = |hit: bool| if hit { 1.0 } else { 0.0 };
        match self {
            Self::Numeric(feature) => feature.value(input),
            Self::Community(community) => indicator(input.community() == community),
            Self::Region(region) => indicator(input.region() == region),
            Self::Season(season) => indicator(input.season() == season),
        }
    }
}

/// One column of the classification vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationColumn {
    /// Label code of the region.
    Region,
    /// Label code of the community.
    Community,
    Numeric(NumericFeature),
    /// Label code of the season.
    Season,
}

impl ClassificationColumn {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Region => "Region",
            Self::Community => "Community",
            Self::Numeric(feature) => feature.column_name(),
            Self::Season => "Season",
        }
    }
}

/// Column order of the classification vector.
pub const CLASSIFICATION_COLUMNS: [ClassificationColumn; 11] = [
    ClassificationColumn::Region,
    ClassificationColumn::Community,
    ClassificationColumn::Numeric(NumericFeature::Turbidity),
    ClassificationColumn::Numeric(NumericFeature::EcoliCount),
    ClassificationColumn::Numeric(NumericFeature::Nitrate),
    ClassificationColumn::Numeric(NumericFeature::Ph),
    ClassificationColumn::Numeric(NumericFeature::Year),
    ClassificationColumn::Numeric(NumericFeature::Month),
    ClassificationColumn::Numeric(NumericFeature::Quarter),
    ClassificationColumn::Numeric(NumericFeature::TimeSinceStart),
    ClassificationColumn::Season,
];

/// Expands [`REGRESSION_LAYOUT`] into individual columns.
fn build_regression_columns() -> Vec<RegressionColumn> {
    REGRESSION_LAYOUT
        .iter()
        .flat_map(|group| -> Vec<RegressionColumn> {
            match group {
                ColumnGroup::Numeric => NUMERIC_FEATURES
                    .iter()
                    .copied()
                    .map(RegressionColumn::Numeric)
                    .collect(),
                ColumnGroup::Community => Community::all()
                    .iter()
                    .copied()
                    .map(RegressionColumn::Community)
                    .collect(),
                ColumnGroup::Region => Region::all()
                    .iter()
                    .copied()
                    .map(RegressionColumn::Region)
                    .collect(),
                ColumnGroup::Season => Season::all()
                    .iter()
                    .copied()
                    .map(RegressionColumn::Season)
                    .collect(),
            }
        })
        .collect()
}

static REGRESSION_COLUMNS: LazyLock<Vec<RegressionColumn>> =
    LazyLock::new(build_regression_columns);

static REGRESSION_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "regression",
        REGRESSION_COLUMNS.iter().map(|c| c.name()).collect(),
    )
});

static CLASSIFICATION_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "classification",
        CLASSIFICATION_COLUMNS
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    )
});

/// The regression columns in model order.
#[must_use]
pub fn regression_columns() -> &'static [RegressionColumn] {
    &REGRESSION_COLUMNS
}

/// Named column list of the regression vector.
#[must_use]
pub fn regression_schema() -> &'static Schema {
    &REGRESSION_SCHEMA
}

/// Named column list of the classification vector.
#[must_use]
pub fn classification_schema() -> &'static Schema {
    &CLASSIFICATION_SCHEMA
}

/// An ordered list of column names.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    name: &'static str,
    columns: Vec<String>,
}

impl Schema {
    fn new(name: &'static str, columns: Vec<String>) -> Self {
        Self { name, columns }
    }

    /// Short name of the layout (`"regression"` or `"classification"`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    const EXPECTED_REGRESSION_COLUMNS: [&str; 35] = [
        "Turbidity(NTU)",
        "Ecoli_Count(CFU/100ml)",
        "Nitrate(mg/L)",
        "pH",
        "Year",
        "Month",
        "Quarter",
        "Time_Since_Start",
        "Community_Ajegunle",
        "Community_Bagamoyo",
        "Community_Bonny",
        "Community_Chibombo",
        "Community_Dori",
        "Community_Entebbe",
        "Community_Garissa",
        "Community_Gboko",
        "Community_Ikorodu",
        "Community_Kasoa",
        "Community_Kibera",
        "Community_Lamu",
        "Community_Lokoja",
        "Community_Makoko",
        "Community_Maradi",
        "Community_Mathare",
        "Community_Nsawam",
        "Community_Nzega",
        "Community_Takoradi",
        "Community_Zinder",
        "Region_Coastal",
        "Region_Dryland",
        "Region_Peri-Urban",
        "Region_Rural",
        "Region_Urban Slum",
        "Season_Dry",
        "Season_Rainy",
    ];

    #[test]
    fn regression_schema_matches_training_columns() {
        assert_eq!(regression_schema().columns(), EXPECTED_REGRESSION_COLUMNS);
    }

    #[test]
    fn classification_schema_matches_training_columns() {
        assert_eq!(
            classification_schema().columns(),
            [
                "Region",
                "Community",
                "Turbidity(NTU)",
                "Ecoli_Count(CFU/100ml)",
                "Nitrate(mg/L)",
                "pH",
                "Year",
                "Month",
                "Quarter",
                "Time_Since_Start",
                "Season",
            ]
        );
    }

    #[test]
    fn column_names_are_unique() {
        for schema in [regression_schema(), classification_schema()] {
            let mut seen = BTreeSet::new();
            for column in schema.columns() {
                assert!(
                    seen.insert(column),
                    "Duplicate {} column: {column}",
                    schema.name()
                );
            }
        }
    }

    #[test]
    fn schema_positions() {
        let schema = regression_schema();
        assert_eq!(schema.position("Turbidity(NTU)"), Some(0));
        assert_eq!(schema.position("Community_Kibera"), Some(18));
        assert_eq!(schema.position("Season_Rainy"), Some(34));
        assert_eq!(schema.position("Risk_Level"), None);
    }
}
