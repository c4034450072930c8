//! Core data models for the Attendance Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod consolidation_result;
mod quality;
mod raw_event;
mod shift_record;

pub use consolidation_result::{
    Anomaly, AuditStep, AuditTrace, AuditWarning, ConsolidationResult, EmployeeOvertime,
    MonthlyOvertime, OvertimeConsolidation,
};
pub use quality::{InputProfile, QualitySummary};
pub use raw_event::{Direction, RawEvent};
pub use shift_record::{EntrySide, EntryStatus, ShiftFlag, ShiftRecord, ShiftType};
