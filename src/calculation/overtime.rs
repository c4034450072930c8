//! Overtime calculation functionality.
//!
//! This module classifies a resolved shift as a day or night shift, measures
//! its total hours and applies the threshold overtime rules:
//!
//! - Day shifts earn overtime after the day-shift end (17:00) on the start date.
//! - Night shifts earn overtime after the night-shift end (03:00) on the
//!   following date.
//! - Overtime below the minimum (0.5h) is discarded; the boundary is inclusive.
//! - Overtime is clamped to the shift type's cap (1.5h day, 3.0h night).

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::config::EngineRules;
use crate::models::{Anomaly, AuditStep, AuditWarning, ShiftFlag, ShiftRecord, ShiftType};

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// The hour figures derived from one start/end pair.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::OvertimeCalculation;
/// use attendance_engine::models::ShiftType;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let calculation = OvertimeCalculation {
///     shift_type: ShiftType::Day,
///     total_hours: Decimal::from_str("10.5").unwrap(),
///     overtime_hours: Decimal::from_str("1.5").unwrap(),
///     regular_hours: Decimal::from_str("9.0").unwrap(),
///     overtime_delta_hours: Decimal::from_str("2.5").unwrap(),
///     excessive: false,
/// };
/// assert!(calculation.overtime_hours <= calculation.total_hours);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeCalculation {
    /// Day or night classification from the start time.
    pub shift_type: ShiftType,
    /// Total hours, clamped to the maximum shift length, two decimal places.
    pub total_hours: Decimal,
    /// Overtime hours after the minimum and cap, two decimal places.
    pub overtime_hours: Decimal,
    /// Total less overtime, never negative.
    pub regular_hours: Decimal,
    /// Time past the overtime threshold before minimum and cap, two decimal places.
    pub overtime_delta_hours: Decimal,
    /// True if the unclamped total exceeded the excessive-duration threshold.
    pub excessive: bool,
}

/// What applying overtime to a record produced besides the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertimeOutcome {
    /// The audit step explaining the calculation.
    pub audit_step: AuditStep,
    /// `EXCESSIVE_SHIFT_DURATION` when the shift was flagged.
    pub warning: Option<AuditWarning>,
}

fn duration_hours(duration: Duration) -> Decimal {
    Decimal::from(duration.num_seconds()) / SECONDS_PER_HOUR
}

/// Classifies a shift by its start time.
pub fn shift_type_for(start: NaiveDateTime, rules: &EngineRules) -> ShiftType {
    if rules.is_night_start(start.time()) {
        ShiftType::Night
    } else {
        ShiftType::Day
    }
}

/// The instant after which a shift starting at `start` earns overtime.
pub fn overtime_threshold(
    start: NaiveDateTime,
    shift_type: ShiftType,
    rules: &EngineRules,
) -> NaiveDateTime {
    match shift_type {
        ShiftType::Day => start.date().and_time(rules.day_shift_end),
        ShiftType::Night => {
            let same_day = start.date().and_time(rules.night_shift_end);
            same_day
                .checked_add_signed(Duration::days(1))
                .unwrap_or(same_day)
        }
    }
}

/// Calculates total and overtime hours for a start/end pair.
///
/// A negative span (end numerically before start) gains 24 hours. Totals above
/// `maximum_shift_hours` are clamped and totals above `excessive_shift_hours`
/// are reported as excessive. Threshold comparisons use exact values; only the
/// returned figures are rounded.
///
/// # Examples
///
/// ## Day shift capped at 1.5 hours
///
/// ```
/// use attendance_engine::calculation::calculate_overtime;
/// use attendance_engine::config::EngineRules;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let at = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let result = calculate_overtime(
///     at("2025-08-04 08:00:00"),
///     at("2025-08-04 19:00:00"),
///     &EngineRules::default(),
/// );
///
/// assert_eq!(result.total_hours, Decimal::from_str("11").unwrap());
/// assert_eq!(result.overtime_hours, Decimal::from_str("1.5").unwrap());
/// ```
///
/// ## Night shift across midnight
///
/// ```
/// use attendance_engine::calculation::calculate_overtime;
/// use attendance_engine::config::EngineRules;
/// use attendance_engine::models::ShiftType;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let at = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let result = calculate_overtime(
///     at("2025-08-04 18:00:00"),
///     at("2025-08-05 03:30:00"),
///     &EngineRules::default(),
/// );
///
/// assert_eq!(result.shift_type, ShiftType::Night);
/// assert_eq!(result.total_hours, Decimal::from_str("9.5").unwrap());
/// assert_eq!(result.overtime_hours, Decimal::from_str("0.5").unwrap());
/// ```
pub fn calculate_overtime(
    start: NaiveDateTime,
    end: NaiveDateTime,
    rules: &EngineRules,
) -> OvertimeCalculation {
    let mut span = end - start;
    if span < Duration::zero() {
        span = span + Duration::hours(24);
    }
    let span = span.max(Duration::zero());
    let effective_end = start.checked_add_signed(span).unwrap_or(end);

    let excessive = span > EngineRules::hours_to_duration(rules.excessive_shift_hours);
    let total_span = span.min(EngineRules::hours_to_duration(rules.maximum_shift_hours));
    let total_hours = duration_hours(total_span).round_dp(2);

    let shift_type = shift_type_for(start, rules);
    let delta = effective_end - overtime_threshold(start, shift_type, rules);
    let delta_hours = duration_hours(delta.max(Duration::zero()));

    let cap = match shift_type {
        ShiftType::Day => rules.day_shift_overtime_cap_hours,
        ShiftType::Night => rules.night_shift_overtime_cap_hours,
    };

    let overtime_hours = if delta > Duration::zero() && delta_hours >= rules.minimum_overtime_hours
    {
        delta_hours.min(cap).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let regular_hours = (total_hours - overtime_hours).max(Decimal::ZERO);

    OvertimeCalculation {
        shift_type,
        total_hours,
        overtime_hours,
        regular_hours,
        overtime_delta_hours: delta_hours.round_dp(2),
        excessive,
    }
}

/// Fills a provisional record's shift type and hour fields.
///
/// # Arguments
///
/// * `record` - The record to complete; its start and end are already resolved
/// * `rules` - Engine rules supplying thresholds and caps
/// * `step_number` - The step number for audit trail sequencing
///
/// Flags the record [`ShiftFlag::ExcessiveDuration`] when it runs past the
/// excessive-duration threshold. The record is kept either way.
pub fn apply_overtime(
    record: &mut ShiftRecord,
    rules: &EngineRules,
    step_number: u32,
) -> OvertimeOutcome {
    let calculation = calculate_overtime(record.start_time, record.end_time, rules);

    record.shift_type = calculation.shift_type;
    record.total_hours = calculation.total_hours;
    record.overtime_hours = calculation.overtime_hours;
    record.regular_hours = calculation.regular_hours;

    let mut warning = None;
    if calculation.excessive {
        if !record.has_flag(ShiftFlag::ExcessiveDuration) {
            record.flags.push(ShiftFlag::ExcessiveDuration);
        }
        warn!(
            employee = %record.employee_name,
            date = %record.date,
            total_hours = %calculation.total_hours,
            "Excessive shift duration"
        );
        warning = Some(AuditWarning::anomaly(
            Anomaly::ExcessiveShiftDuration,
            &record.employee_name,
            record.date,
            format!(
                "Shift from {} to {} exceeds {} hours; kept and flagged for review",
                record.start_time, record.end_time, rules.excessive_shift_hours
            ),
        ));
    }

    let threshold = overtime_threshold(record.start_time, calculation.shift_type, rules);
    let cap = match calculation.shift_type {
        ShiftType::Day => rules.day_shift_overtime_cap_hours,
        ShiftType::Night => rules.night_shift_overtime_cap_hours,
    };

    let reasoning = if calculation.overtime_hours > Decimal::ZERO {
        if calculation.overtime_delta_hours > cap {
            format!(
                "{} ended {}h after {}; overtime capped at {}h",
                calculation.shift_type, calculation.overtime_delta_hours, threshold, cap
            )
        } else {
            format!(
                "{} ended {}h after {}; {}h overtime",
                calculation.shift_type,
                calculation.overtime_delta_hours,
                threshold,
                calculation.overtime_hours
            )
        }
    } else if calculation.overtime_delta_hours > Decimal::ZERO {
        format!(
            "{} ended {}h after {}, below the {}h minimum; no overtime",
            calculation.shift_type,
            calculation.overtime_delta_hours,
            threshold,
            rules.minimum_overtime_hours
        )
    } else {
        format!(
            "{} ended at or before {}; no overtime",
            calculation.shift_type, threshold
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_calculation".to_string(),
        rule_name: "Overtime Calculation".to_string(),
        employee_name: record.employee_name.clone(),
        date: record.date,
        input: json!({
            "start_time": record.start_time.to_string(),
            "end_time": record.end_time.to_string(),
            "shift_type": calculation.shift_type.to_string(),
            "overtime_threshold": threshold.to_string(),
            "minimum_overtime_hours": rules.minimum_overtime_hours.to_string(),
            "overtime_cap_hours": cap.to_string(),
        }),
        output: json!({
            "total_hours": calculation.total_hours.to_string(),
            "regular_hours": calculation.regular_hours.to_string(),
            "overtime_hours": calculation.overtime_hours.to_string(),
            "excessive": calculation.excessive,
        }),
        reasoning,
    };

    OvertimeOutcome {
        audit_step,
        warning,
    }
}
