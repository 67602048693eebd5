//! Calendar-derived model features.
//!
//! Both models were trained on a continuous monthly timeline anchored at
//! January 2015, plus the calendar quarter. Neither value is ever collected
//! from the user: they are always recomputed from year and month.

/// First year of the training timeline. `Time_Since_Start` is zero for
/// January of this year.
pub const TIMELINE_START_YEAR: i32 = 2015;

/// Features derived from a sample's year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedFeatures {
    /// Calendar quarter, 1-4.
    pub quarter: u8,
    /// Months elapsed since January [`TIMELINE_START_YEAR`]. Negative for
    /// earlier dates.
    pub time_since_start: i32,
}

/// Returns the calendar quarter (1-4) for a month in 1-12.
#[must_use]
pub const fn quarter(month: u8) -> u8 {
    month.saturating_sub(1) / 3 + 1
}

/// Returns the number of months between January [`TIMELINE_START_YEAR`]
/// and the given year/month. Not clamped: dates before 2015 are negative.
#[must_use]
pub fn time_since_start(year: i32, month: u8) -> i32 {
    (year - TIMELINE_START_YEAR) * 12 + (i32::from(month) - 1)
}

/// Computes all calendar-derived features for a year/month pair.
///
/// Inputs are expected to be validated already (`month` in 1-12).
#[must_use]
pub fn compute(year: i32, month: u8) -> DerivedFeatures {
    DerivedFeatures {
        quarter: quarter(month),
        time_since_start: time_since_start(year, month),
    }
}
