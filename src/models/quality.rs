//! Data-quality models.
//!
//! [`QualitySummary`] describes the consolidated records, [`InputProfile`]
//! describes the raw swipes they were built from.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Counts of estimated, consolidated and clean records for one run.
///
/// # Example
///
/// ```
/// use attendance_engine::models::QualitySummary;
/// use rust_decimal::Decimal;
///
/// let summary = QualitySummary {
///     total_records: 4,
///     estimated_check_ins: 1,
///     estimated_check_outs: 0,
///     consolidated_records: 1,
///     clean_records: 3,
///     flagged_records: 0,
///     validation_errors: 0,
///     accuracy_percent: Decimal::new(7500, 2),
/// };
/// assert_eq!(summary.estimated_records(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySummary {
    /// Number of shift records.
    pub total_records: usize,
    /// Records whose check-in was synthesized.
    pub estimated_check_ins: usize,
    /// Records whose check-out was synthesized.
    pub estimated_check_outs: usize,
    /// Records where duplicate swipes were merged.
    pub consolidated_records: usize,
    /// Records with no estimated side.
    pub clean_records: usize,
    /// Records carrying at least one review flag.
    pub flagged_records: usize,
    /// Swipes excluded because their label could not be classified.
    pub validation_errors: usize,
    /// Clean records as a percentage of all records, two decimal places.
    pub accuracy_percent: Decimal,
}

impl QualitySummary {
    /// Total number of records with an estimated side.
    pub fn estimated_records(&self) -> usize {
        self.estimated_check_ins + self.estimated_check_outs
    }
}

/// Profile of the raw swipes handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputProfile {
    /// Number of raw events received.
    pub total_events: usize,
    /// Events that classified as a check-in or check-out.
    pub classified_events: usize,
    /// Events whose label could not be classified.
    pub validation_errors: usize,
    /// Distinct employee names.
    pub unique_employees: usize,
    /// Distinct calendar dates.
    pub unique_dates: usize,
    /// Earliest swipe date.
    pub first_date: Option<NaiveDate>,
    /// Latest swipe date.
    pub last_date: Option<NaiveDate>,
    /// Events whose label carries an overtime tag.
    pub overtime_tagged_events: usize,
    /// Event count per original status label.
    pub status_breakdown: BTreeMap<String, usize>,
}
