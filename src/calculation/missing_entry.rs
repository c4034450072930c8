//! Missing-entry estimation functionality.
//!
//! This module completes half-recorded shifts: a missing check-out is placed
//! a fixed offset after the check-in and a missing check-in the same offset
//! before the check-out. Estimation never fails.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::EngineRules;
use crate::models::{Anomaly, AuditWarning, EntryStatus, ShiftRecord};

use super::overtime::shift_type_for;
use super::shift_pairer::{PairedShift, Pairing};

/// Running totals of synthesized sides across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimationCounters {
    /// Check-ins synthesized.
    pub estimated_check_ins: usize,
    /// Check-outs synthesized.
    pub estimated_check_outs: usize,
}

/// A provisional shift record and the warning raised while completing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimationResult {
    /// The provisional record; hour fields are filled by the overtime calculator.
    pub record: ShiftRecord,
    /// `MISSING_CHECK_IN` or `MISSING_CHECK_OUT` when a side was synthesized.
    pub warning: Option<AuditWarning>,
}

/// Turns a paired shift into a provisional [`ShiftRecord`].
///
/// # Arguments
///
/// * `shift` - The pairer's output
/// * `rules` - Engine rules supplying the estimation offset
/// * `counters` - Run-wide counters, incremented for each synthesized side
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{
///     estimate_missing_entry, EstimationCounters, PairedShift, Pairing, ResolvedEntry,
/// };
/// use attendance_engine::config::EngineRules;
/// use attendance_engine::models::EntryStatus;
/// use chrono::NaiveDateTime;
///
/// let out = NaiveDateTime::parse_from_str("2025-08-01 18:24:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let shift = PairedShift {
///     employee_name: "bob".to_string(),
///     anchor_date: out.date(),
///     pairing: Pairing::CheckOutOnly {
///         check_out: ResolvedEntry {
///             time: out,
///             status: EntryStatus::Recorded("C/Out".to_string()),
///             candidates: vec![out],
///         },
///     },
///     source_event_indices: vec![0],
///     flags: vec![],
/// };
///
/// let mut counters = EstimationCounters::default();
/// let result = estimate_missing_entry(shift, &EngineRules::default(), &mut counters);
///
/// assert_eq!(result.record.start_time.time().to_string(), "10:24:00");
/// assert_eq!(result.record.check_in_label(), "Estimated (Missing Check-In)");
/// assert!(result.record.is_estimated);
/// assert_eq!(counters.estimated_check_ins, 1);
/// ```
pub fn estimate_missing_entry(
    shift: PairedShift,
    rules: &EngineRules,
    counters: &mut EstimationCounters,
) -> EstimationResult {
    let offset = rules.estimation_offset();
    let PairedShift {
        employee_name,
        anchor_date,
        pairing,
        source_event_indices,
        flags,
    } = shift;

    let (start_time, check_in_status, end_time, check_out_status, warning) = match pairing {
        Pairing::Complete {
            check_in,
            check_out,
        } => (
            check_in.time,
            check_in.status,
            check_out.time,
            check_out.status,
            None,
        ),
        Pairing::CheckInOnly { check_in } => {
            let end = shift_time(check_in.time, offset, true);
            counters.estimated_check_outs += 1;
            debug!(
                employee = %employee_name,
                date = %anchor_date,
                estimated_end = %end,
                "Estimated missing check-out"
            );
            let warning = AuditWarning::anomaly(
                Anomaly::MissingCheckOut,
                &employee_name,
                anchor_date,
                format!(
                    "No check-out recorded; estimated at {} ({}h after check-in)",
                    end, rules.estimated_shift_hours
                ),
            );
            (
                check_in.time,
                check_in.status,
                end,
                EntryStatus::Estimated,
                Some(warning),
            )
        }
        Pairing::CheckOutOnly { check_out } => {
            let start = shift_time(check_out.time, offset, false);
            counters.estimated_check_ins += 1;
            debug!(
                employee = %employee_name,
                date = %anchor_date,
                estimated_start = %start,
                "Estimated missing check-in"
            );
            let warning = AuditWarning::anomaly(
                Anomaly::MissingCheckIn,
                &employee_name,
                anchor_date,
                format!(
                    "No check-in recorded; estimated at {} ({}h before check-out)",
                    start, rules.estimated_shift_hours
                ),
            );
            (
                start,
                EntryStatus::Estimated,
                check_out.time,
                check_out.status,
                Some(warning),
            )
        }
    };

    let is_estimated = check_in_status.is_estimated() || check_out_status.is_estimated();
    let shift_type = shift_type_for(start_time, rules);

    let record = ShiftRecord {
        employee_name,
        date: anchor_date,
        check_in_status,
        start_time,
        check_out_status,
        end_time,
        shift_type,
        total_hours: Decimal::ZERO,
        regular_hours: Decimal::ZERO,
        overtime_hours: Decimal::ZERO,
        is_estimated,
        source_event_count: source_event_indices.len(),
        source_event_indices,
        flags,
    };

    EstimationResult { record, warning }
}

fn shift_time(time: NaiveDateTime, offset: Duration, forward: bool) -> NaiveDateTime {
    let shifted = if forward {
        time.checked_add_signed(offset)
    } else {
        time.checked_sub_signed(offset)
    };
    shifted.unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::ResolvedEntry;
    use crate::models::{EntrySide, ShiftFlag, ShiftType};
    use chrono::NaiveDate;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn entry(ts: &str, label: &str) -> ResolvedEntry {
        let time = make_datetime(ts);
        ResolvedEntry {
            time,
            status: EntryStatus::Recorded(label.to_string()),
            candidates: vec![time],
        }
    }

    fn paired(pairing: Pairing) -> PairedShift {
        PairedShift {
            employee_name: "alice".to_string(),
            anchor_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            pairing,
            source_event_indices: vec![5],
            flags: vec![],
        }
    }

    // ==========================================================================
    // ME-001: missing check-out is placed 8h after the check-in
    // ==========================================================================
    #[test]
    fn test_me_001_missing_check_out() {
        let shift = paired(Pairing::CheckInOnly {
            check_in: entry("2025-08-01 18:00:00", "C/In"),
        });
        let mut counters = EstimationCounters::default();
        let result = estimate_missing_entry(shift, &EngineRules::default(), &mut counters);

        assert_eq!(result.record.end_time, make_datetime("2025-08-02 02:00:00"));
        assert_eq!(
            result.record.check_out_status.describe(EntrySide::CheckOut),
            "Estimated (Missing Check-Out)"
        );
        assert_eq!(result.record.check_in_label(), "C/In");
        assert_eq!(result.record.shift_type, ShiftType::Night);
        assert_eq!(result.warning.unwrap().code, "MISSING_CHECK_OUT");
        assert_eq!(counters.estimated_check_outs, 1);
        assert_eq!(counters.estimated_check_ins, 0);
    }

    // ==========================================================================
    // ME-002: missing check-in is placed 8h before the check-out
    // ==========================================================================
    #[test]
    fn test_me_002_missing_check_in() {
        let shift = paired(Pairing::CheckOutOnly {
            check_out: entry("2025-08-01 18:24:00", "OverTime Out"),
        });
        let mut counters = EstimationCounters::default();
        let result = estimate_missing_entry(shift, &EngineRules::default(), &mut counters);

        assert_eq!(result.record.start_time, make_datetime("2025-08-01 10:24:00"));
        assert!(result.record.check_in_status.is_estimated());
        assert_eq!(result.record.shift_type, ShiftType::Day);
        assert_eq!(result.warning.unwrap().code, "MISSING_CHECK_IN");
        assert_eq!(counters.estimated_check_ins, 1);
    }

    // ==========================================================================
    // ME-003: complete shifts pass through untouched
    // ==========================================================================
    #[test]
    fn test_me_003_complete_shift_is_not_estimated() {
        let shift = paired(Pairing::Complete {
            check_in: entry("2025-08-01 08:00:00", "C/In"),
            check_out: entry("2025-08-01 17:00:00", "C/Out"),
        });
        let mut counters = EstimationCounters::default();
        let result = estimate_missing_entry(shift, &EngineRules::default(), &mut counters);

        assert!(!result.record.is_estimated);
        assert!(result.warning.is_none());
        assert_eq!(counters, EstimationCounters::default());
        assert_eq!(result.record.source_event_count, 1);
        assert_eq!(result.record.source_event_indices, vec![5]);
    }

    #[test]
    fn test_offset_follows_rules() {
        let rules = EngineRules {
            estimated_shift_hours: 10,
            ..EngineRules::default()
        };
        let shift = paired(Pairing::CheckInOnly {
            check_in: entry("2025-08-01 07:00:00", "C/In"),
        });
        let mut counters = EstimationCounters::default();
        let result = estimate_missing_entry(shift, &rules, &mut counters);
        assert_eq!(result.record.end_time, make_datetime("2025-08-01 17:00:00"));
    }

    #[test]
    fn test_flags_carry_through() {
        let mut shift = paired(Pairing::CheckInOnly {
            check_in: entry("2025-08-01 08:00:00", "C/In"),
        });
        shift.flags.push(ShiftFlag::OrphanedCheckOut);
        let mut counters = EstimationCounters::default();
        let result = estimate_missing_entry(shift, &EngineRules::default(), &mut counters);
        assert!(result.record.has_flag(ShiftFlag::OrphanedCheckOut));
    }
}
