//! The consolidation run.
//!
//! [`consolidate`] drives the whole pipeline: classify every swipe, split the
//! stream per employee, then group, pair, estimate and calculate overtime for
//! each employee in chronological order before the summary passes.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Anomaly, AuditStep, AuditTrace, AuditWarning, ConsolidationResult, RawEvent, ShiftRecord,
};

use super::daily_grouper::{ConsumedDates, group_daily, sort_chronologically};
use super::event_classifier::{ClassifiedEvent, classify_event};
use super::missing_entry::{EstimationCounters, estimate_missing_entry};
use super::monthly_overtime::consolidate_overtime;
use super::overtime::apply_overtime;
use super::quality_report::{profile_input, summarize_quality};
use super::shift_pairer::{consolidation_step, pair_employee_buckets};

/// Records, steps and warnings produced for one employee.
#[derive(Debug, Default)]
struct EmployeeShifts {
    records: Vec<ShiftRecord>,
    steps: Vec<AuditStep>,
    warnings: Vec<AuditWarning>,
}

/// Runs the group, pair, estimate and overtime stages for one employee.
///
/// `events` must belong to a single employee. Step numbers continue from
/// `step_number`, which is advanced past the last step issued.
fn process_employee(
    mut events: Vec<ClassifiedEvent>,
    rules: &EngineRules,
    counters: &mut EstimationCounters,
    step_number: &mut u32,
) -> EmployeeShifts {
    sort_chronologically(&mut events);

    let mut consumed = ConsumedDates::new();
    let buckets = group_daily(events, rules, &mut consumed);
    let pairing = pair_employee_buckets(buckets, rules, &mut consumed);

    let mut output = EmployeeShifts {
        warnings: pairing.warnings,
        ..EmployeeShifts::default()
    };

    for shift in pairing.shifts {
        if let Some(step) = consolidation_step(&shift, *step_number + 1) {
            *step_number += 1;
            output.steps.push(step);
        }

        let estimation = estimate_missing_entry(shift, rules, counters);
        let mut record = estimation.record;
        output.warnings.extend(estimation.warning);

        *step_number += 1;
        let overtime = apply_overtime(&mut record, rules, *step_number);
        output.steps.push(overtime.audit_step);
        output.warnings.extend(overtime.warning);

        output.records.push(record);
    }

    output
}

/// Consolidates raw swipes into one shift record per employee per anchor date.
///
/// # Arguments
///
/// * `events` - The run's raw swipes, in any order
/// * `rules` - Thresholds, caps and offsets to apply
///
/// # Returns
///
/// A [`ConsolidationResult`] whose records are ordered by employee name, then
/// anchor date. Unclassifiable swipes, missing sides, orphaned check-outs and
/// excessive shifts are recovered locally and reported as warnings.
///
/// # Errors
///
/// Returns [`EngineError::EmptyInput`] when `events` is empty.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::consolidate;
/// use attendance_engine::config::EngineRules;
/// use attendance_engine::models::RawEvent;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let day = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let events = vec![
///     RawEvent::new("alice", day, at(8, 0), "C/In"),
///     RawEvent::new("alice", day, at(17, 30), "C/Out"),
/// ];
///
/// let result = consolidate(&events, &EngineRules::default()).unwrap();
///
/// assert_eq!(result.records.len(), 1);
/// assert_eq!(result.records[0].total_hours, Decimal::from_str("9.5").unwrap());
/// assert_eq!(result.records[0].overtime_hours, Decimal::from_str("0.5").unwrap());
/// assert_eq!(result.summary.accuracy_percent, Decimal::from(100));
/// ```
pub fn consolidate(events: &[RawEvent], rules: &EngineRules) -> EngineResult<ConsolidationResult> {
    if events.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let start_time = Instant::now();
    info!(events = events.len(), "Starting attendance consolidation");

    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut validation_errors = 0;
    let mut by_employee: BTreeMap<String, Vec<ClassifiedEvent>> = BTreeMap::new();

    for (index, event) in events.iter().enumerate() {
        match classify_event(index, event) {
            Ok(classified) => by_employee
                .entry(classified.employee_name.clone())
                .or_default()
                .push(classified),
            Err(err) => {
                validation_errors += 1;
                debug!(
                    employee = %event.employee_name,
                    index,
                    error = %err,
                    "Excluding unclassifiable event"
                );
                warnings.push(AuditWarning::anomaly(
                    Anomaly::ClassificationError,
                    &event.employee_name,
                    event.date(),
                    format!("Event #{} excluded: {}", index, err),
                ));
            }
        }
    }

    let mut counters = EstimationCounters::default();
    let mut step_number: u32 = 0;
    let mut records: Vec<ShiftRecord> = Vec::new();
    let mut steps: Vec<AuditStep> = Vec::new();

    for (employee, employee_events) in by_employee {
        let event_count = employee_events.len();
        let output = process_employee(employee_events, rules, &mut counters, &mut step_number);
        debug!(
            employee = %employee,
            events = event_count,
            records = output.records.len(),
            "Consolidated employee"
        );
        records.extend(output.records);
        steps.extend(output.steps);
        warnings.extend(output.warnings);
    }

    let summary = summarize_quality(&records, validation_errors);
    let overtime = consolidate_overtime(&records);
    let input_profile = profile_input(events);

    let duration_us = u64::try_from(start_time.elapsed().as_micros()).unwrap_or(u64::MAX);
    info!(
        records = records.len(),
        estimated_check_ins = counters.estimated_check_ins,
        estimated_check_outs = counters.estimated_check_outs,
        validation_errors,
        warnings = warnings.len(),
        accuracy_percent = %summary.accuracy_percent,
        duration_us,
        "Attendance consolidation completed"
    );

    Ok(ConsolidationResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        records,
        summary,
        overtime,
        input_profile,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryStatus, ShiftFlag, ShiftType};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw(name: &str, ts: &str, label: &str) -> RawEvent {
        RawEvent {
            employee_name: name.to_string(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            status_label: label.to_string(),
        }
    }

    fn run(events: &[RawEvent]) -> ConsolidationResult {
        consolidate(events, &EngineRules::default()).unwrap()
    }

    // ==========================================================================
    // EN-001: empty input is the only hard failure
    // ==========================================================================
    #[test]
    fn test_en_001_empty_input() {
        let result = consolidate(&[], &EngineRules::default());
        assert!(matches!(result, Err(EngineError::EmptyInput)));
    }

    // ==========================================================================
    // EN-002: unclassifiable swipes become warnings
    // ==========================================================================
    #[test]
    fn test_en_002_classification_errors_are_counted() {
        let events = vec![
            raw("alice", "2025-08-04 08:00:00", "C/In"),
            raw("alice", "2025-08-04 12:00:00", "Break"),
            raw("alice", "2025-08-04 17:00:00", "C/Out"),
        ];
        let result = run(&events);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].source_event_indices, vec![0, 2]);
        assert_eq!(result.summary.validation_errors, 1);
        assert_eq!(result.audit_trace.warnings.len(), 1);
        assert_eq!(result.audit_trace.warnings[0].code, "CLASSIFICATION_ERROR");
    }

    // ==========================================================================
    // EN-003: an unclassifiable-only run still succeeds
    // ==========================================================================
    #[test]
    fn test_en_003_only_bad_labels() {
        let result = run(&[raw("alice", "2025-08-04 08:00:00", "???")]);
        assert!(result.records.is_empty());
        assert_eq!(result.summary.accuracy_percent, dec("100"));
        assert_eq!(result.summary.validation_errors, 1);
    }

    // ==========================================================================
    // EN-004: records are ordered by employee then date
    // ==========================================================================
    #[test]
    fn test_en_004_ordering() {
        let events = vec![
            raw("zoe", "2025-08-04 08:00:00", "C/In"),
            raw("alice", "2025-08-05 08:00:00", "C/In"),
            raw("alice", "2025-08-04 08:00:00", "C/In"),
        ];
        let result = run(&events);
        let keys: Vec<(String, NaiveDate)> = result
            .records
            .iter()
            .map(|r| (r.employee_name.clone(), r.date))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("alice".to_string(), NaiveDate::from_ymd_opt(2025, 8, 4).unwrap()),
                ("alice".to_string(), NaiveDate::from_ymd_opt(2025, 8, 5).unwrap()),
                ("zoe".to_string(), NaiveDate::from_ymd_opt(2025, 8, 4).unwrap()),
            ]
        );
    }

    // ==========================================================================
    // EN-005: duplicate consolidation and its audit step
    // ==========================================================================
    #[test]
    fn test_en_005_duplicate_consolidation() {
        let events = vec![
            raw("alice", "2025-08-01 17:26:00", "C/Out"),
            raw("alice", "2025-08-01 06:47:00", "C/In"),
            raw("alice", "2025-08-01 17:04:00", "C/Out"),
            raw("alice", "2025-08-01 07:35:00", "C/In"),
        ];
        let result = run(&events);
        let record = &result.records[0];

        assert_eq!(result.records.len(), 1);
        assert_eq!(record.check_in_label(), "Complete (Consolidated 2 check-ins)");
        assert_eq!(record.check_out_label(), "Complete (Consolidated 2 check-outs)");
        assert_eq!(record.source_event_count, 4);
        assert_eq!(record.total_hours, dec("10.65"));
        assert_eq!(record.overtime_hours, dec("0"));

        let rule_ids: Vec<&str> = result
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(rule_ids, vec!["duplicate_consolidation", "overtime_calculation"]);
        assert_eq!(result.audit_trace.steps[0].step_number, 1);
        assert_eq!(result.audit_trace.steps[1].step_number, 2);
        assert_eq!(result.summary.consolidated_records, 1);
    }

    // ==========================================================================
    // EN-006: cross-midnight night shift
    // ==========================================================================
    #[test]
    fn test_en_006_cross_midnight() {
        let events = vec![
            raw("alice", "2025-08-01 17:55:00", "C/In"),
            raw("alice", "2025-08-02 07:44:00", "C/Out"),
        ];
        let result = run(&events);

        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert_eq!(record.shift_type, ShiftType::Night);
        assert_eq!(record.total_hours, dec("13.82"));
        assert!(!record.is_estimated);
    }

    // ==========================================================================
    // EN-007: orphaned check-out is estimated and flagged
    // ==========================================================================
    #[test]
    fn test_en_007_orphaned_check_out() {
        let events = vec![
            raw("alice", "2025-08-04 07:00:00", "C/Out"),
            raw("alice", "2025-08-04 08:00:00", "C/In"),
        ];
        let result = run(&events);
        let record = &result.records[0];

        assert!(record.has_flag(ShiftFlag::OrphanedCheckOut));
        assert_eq!(record.check_out_status, EntryStatus::Estimated);
        assert_eq!(record.total_hours, dec("8"));
        assert_eq!(record.source_event_count, 2);

        let codes: Vec<&str> = result
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["ORPHANED_EVENT", "MISSING_CHECK_OUT"]);
        assert_eq!(result.summary.flagged_records, 1);
    }

    // ==========================================================================
    // EN-008: identical input gives identical records
    // ==========================================================================
    #[test]
    fn test_en_008_idempotence() {
        let events = vec![
            raw("bob", "2025-08-02 18:24:00", "OverTime Out"),
            raw("alice", "2025-08-01 17:55:00", "C/In"),
            raw("alice", "2025-08-02 07:44:00", "C/Out"),
            raw("alice", "2025-08-04 08:00:00", "C/In"),
        ];
        let first = run(&events);
        let second = run(&events);

        assert_eq!(
            serde_json::to_string(&first.records).unwrap(),
            serde_json::to_string(&second.records).unwrap()
        );
        assert_eq!(first.summary, second.summary);
    }

    #[test]
    fn test_result_carries_profile_and_overtime() {
        let events = vec![
            raw("alice", "2025-08-04 08:00:00", "C/In"),
            raw("alice", "2025-08-04 19:00:00", "OverTime Out"),
        ];
        let result = run(&events);

        assert_eq!(result.input_profile.total_events, 2);
        assert_eq!(result.input_profile.overtime_tagged_events, 1);
        assert_eq!(result.overtime.months.len(), 1);
        assert_eq!(
            result.overtime.months[0].summary,
            "Month Total: 01:30:00 | OT Days: 1"
        );
        assert_eq!(result.engine_version, env!("CARGO_PKG_VERSION"));
    }
}
