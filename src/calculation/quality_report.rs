//! Data quality reporting functionality.
//!
//! Pure aggregation passes: [`summarize_quality`] over the finished shift
//! records and [`profile_input`] over the raw swipes.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::models::{Direction, InputProfile, QualitySummary, RawEvent, ShiftRecord};

use super::event_classifier::{classify_direction, is_overtime_tagged};

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Summarizes the data quality of a completed run.
///
/// # Arguments
///
/// * `records` - Every shift record produced by the run
/// * `validation_errors` - Number of swipes excluded by the classifier
///
/// Accuracy is the share of records with no estimated side, as a percentage
/// rounded to two decimal places. An empty run reports 100.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::summarize_quality;
/// use rust_decimal::Decimal;
///
/// let summary = summarize_quality(&[], 2);
/// assert_eq!(summary.total_records, 0);
/// assert_eq!(summary.validation_errors, 2);
/// assert_eq!(summary.accuracy_percent, Decimal::from(100));
/// ```
pub fn summarize_quality(records: &[ShiftRecord], validation_errors: usize) -> QualitySummary {
    let total_records = records.len();
    let estimated_check_ins = records
        .iter()
        .filter(|r| r.check_in_status.is_estimated())
        .count();
    let estimated_check_outs = records
        .iter()
        .filter(|r| r.check_out_status.is_estimated())
        .count();
    let consolidated_records = records.iter().filter(|r| r.is_consolidated()).count();
    let flagged_records = records.iter().filter(|r| !r.flags.is_empty()).count();
    let clean_records = total_records.saturating_sub(estimated_check_ins + estimated_check_outs);

    let accuracy_percent = if total_records == 0 {
        ONE_HUNDRED
    } else {
        (Decimal::from(clean_records) * ONE_HUNDRED / Decimal::from(total_records)).round_dp(2)
    };

    QualitySummary {
        total_records,
        estimated_check_ins,
        estimated_check_outs,
        consolidated_records,
        clean_records,
        flagged_records,
        validation_errors,
        accuracy_percent,
    }
}

/// Profiles the raw swipes handed to a run.
///
/// Counts every event, including those the classifier will reject.
pub fn profile_input(events: &[RawEvent]) -> InputProfile {
    let mut employees = BTreeSet::new();
    let mut dates = BTreeSet::new();
    let mut status_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut validation_errors = 0;
    let mut overtime_tagged_events = 0;

    for event in events {
        employees.insert(event.employee_name.as_str());
        dates.insert(event.date());
        *status_breakdown
            .entry(event.status_label.clone())
            .or_default() += 1;

        if classify_direction(&event.status_label) == Direction::Unclassified {
            validation_errors += 1;
        }
        if is_overtime_tagged(&event.status_label) {
            overtime_tagged_events += 1;
        }
    }

    InputProfile {
        total_events: events.len(),
        classified_events: events.len() - validation_errors,
        validation_errors,
        unique_employees: employees.len(),
        unique_dates: dates.len(),
        first_date: dates.first().copied(),
        last_date: dates.last().copied(),
        overtime_tagged_events,
        status_breakdown,
    }
}
