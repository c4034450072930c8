//! Consolidation result models for the Attendance Engine.
//!
//! This module contains the [`ConsolidationResult`] type and its associated
//! structures that capture all outputs of a run: shift records, quality and
//! overtime summaries, and the audit trace explaining every decision.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{InputProfile, QualitySummary, ShiftRecord};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The employee the step concerns.
    pub employee_name: String,
    /// The anchor date the step concerns.
    pub date: NaiveDate,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Recoverable data-quality conditions the engine reports instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Anomaly {
    /// A swipe label named neither a check-in nor a check-out.
    ClassificationError,
    /// A day had check-outs but no check-in.
    MissingCheckIn,
    /// A day had check-ins but no usable check-out.
    MissingCheckOut,
    /// A check-out had no plausible check-in to pair with.
    OrphanedEvent,
    /// A shift ran longer than the excessive-duration threshold.
    ExcessiveShiftDuration,
}

impl Anomaly {
    /// The warning code reported to collaborators.
    pub fn code(self) -> &'static str {
        match self {
            Anomaly::ClassificationError => "CLASSIFICATION_ERROR",
            Anomaly::MissingCheckIn => "MISSING_CHECK_IN",
            Anomaly::MissingCheckOut => "MISSING_CHECK_OUT",
            Anomaly::OrphanedEvent => "ORPHANED_EVENT",
            Anomaly::ExcessiveShiftDuration => "EXCESSIVE_SHIFT_DURATION",
        }
    }

    /// The severity reported to collaborators.
    pub fn severity(self) -> &'static str {
        match self {
            Anomaly::ClassificationError => "medium",
            Anomaly::MissingCheckIn | Anomaly::MissingCheckOut => "low",
            Anomaly::OrphanedEvent | Anomaly::ExcessiveShiftDuration => "high",
        }
    }
}

/// A warning generated during consolidation.
///
/// Warnings indicate data-quality problems that were recovered locally
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
    /// The employee concerned, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    /// The date concerned, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl AuditWarning {
    /// Builds a warning for an anomaly on a given employee and date.
    pub fn anomaly(
        anomaly: Anomaly,
        employee_name: &str,
        date: NaiveDate,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: anomaly.code().to_string(),
            message: message.into(),
            severity: anomaly.severity().to_string(),
            employee_name: Some(employee_name.to_string()),
            date: Some(date),
        }
    }
}

/// The complete audit trace for a run.
///
/// # Example
///
/// ```
/// use attendance_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during consolidation.
    pub warnings: Vec<AuditWarning>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

/// Overtime consolidated for one employee in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyOvertime {
    /// Exact-string employee identity.
    pub employee_name: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Sum of overtime hours in the month.
    pub overtime_hours: Decimal,
    /// Number of shifts in the month that earned overtime.
    pub overtime_days: usize,
    /// Display text, e.g. "Month Total: 04:30:00 | OT Days: 3".
    pub summary: String,
}

/// Overtime consolidated for one employee across the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOvertime {
    /// Exact-string employee identity.
    pub employee_name: String,
    /// Sum of overtime hours.
    pub overtime_hours: Decimal,
    /// Number of shifts that earned overtime.
    pub overtime_days: usize,
}

/// Per-month and per-employee overtime totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeConsolidation {
    /// One row per employee and month, ordered by employee then month.
    pub months: Vec<MonthlyOvertime>,
    /// One row per employee, ordered by name.
    pub employees: Vec<EmployeeOvertime>,
}

/// The complete result of a consolidation run.
///
/// Records are ordered by employee name, then anchor date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationResult {
    /// Unique identifier for this run.
    pub calculation_id: Uuid,
    /// When the run completed.
    pub timestamp: DateTime<Utc>,
    /// The engine version that produced the result.
    pub engine_version: String,
    /// One record per employee per anchor date.
    pub records: Vec<ShiftRecord>,
    /// Data-quality summary over the records.
    pub summary: QualitySummary,
    /// Overtime totals by month and employee.
    pub overtime: OvertimeConsolidation,
    /// Profile of the raw input.
    pub input_profile: InputProfile,
    /// Steps and warnings explaining the run.
    pub audit_trace: AuditTrace,
}
