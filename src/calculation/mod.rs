//! Calculation logic for the Attendance Engine.
//!
//! This module contains every stage of a consolidation run: event
//! classification, daily grouping with night-shift anchoring, shift pairing
//! with duplicate consolidation, missing-entry estimation, day/night overtime
//! calculation, and the data-quality and monthly-overtime summary passes.

mod daily_grouper;
mod engine;
mod event_classifier;
mod missing_entry;
mod monthly_overtime;
mod overtime;
mod quality_report;
mod shift_pairer;

pub use daily_grouper::{ConsumedDates, DailyBucket, group_daily, sort_chronologically};
pub use engine::consolidate;
pub use event_classifier::{
    ClassifiedEvent, classify_direction, classify_event, is_overtime_tagged,
};
pub use missing_entry::{EstimationCounters, EstimationResult, estimate_missing_entry};
pub use monthly_overtime::{consolidate_overtime, format_hours_hms};
pub use overtime::{
    OvertimeCalculation, OvertimeOutcome, apply_overtime, calculate_overtime,
    overtime_threshold, shift_type_for,
};
pub use quality_report::{profile_input, summarize_quality};
pub use shift_pairer::{
    PairedShift, Pairing, PairingOutcome, ResolvedEntry, consolidation_step, pair_bucket,
    pair_employee_buckets,
};
