//! Monthly overtime consolidation.
//!
//! Rolls the per-shift overtime up to one row per employee and calendar
//! month (keyed on the anchor date), plus one grand-total row per employee.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{EmployeeOvertime, MonthlyOvertime, OvertimeConsolidation, ShiftRecord};

/// Renders decimal hours as `HH:MM:SS`, rounded to the second.
///
/// Hours are not wrapped at 24.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::format_hours_hms;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(format_hours_hms(Decimal::from_str("4.5").unwrap()), "04:30:00");
/// assert_eq!(format_hours_hms(Decimal::from_str("31.25").unwrap()), "31:15:00");
/// ```
pub fn format_hours_hms(hours: Decimal) -> String {
    let total_seconds = (hours * Decimal::from(3600))
        .round()
        .to_i64()
        .unwrap_or(0)
        .max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

#[derive(Default)]
struct Tally {
    hours: Decimal,
    days: usize,
}

impl Tally {
    fn add(&mut self, overtime_hours: Decimal) {
        if overtime_hours > Decimal::ZERO {
            self.hours += overtime_hours;
            self.days += 1;
        }
    }
}

/// Consolidates overtime by employee and month.
///
/// Every employee with a record gets rows, even when their overtime is zero.
/// Rows are ordered by employee name, then year and month.
pub fn consolidate_overtime(records: &[ShiftRecord]) -> OvertimeConsolidation {
    let mut months: BTreeMap<(&str, i32, u32), Tally> = BTreeMap::new();
    let mut employees: BTreeMap<&str, Tally> = BTreeMap::new();

    for record in records {
        let name = record.employee_name.as_str();
        months
            .entry((name, record.date.year(), record.date.month()))
            .or_default()
            .add(record.overtime_hours);
        employees.entry(name).or_default().add(record.overtime_hours);
    }

    OvertimeConsolidation {
        months: months
            .into_iter()
            .map(|((name, year, month), tally)| MonthlyOvertime {
                employee_name: name.to_string(),
                year,
                month,
                overtime_hours: tally.hours,
                overtime_days: tally.days,
                summary: format!(
                    "Month Total: {} | OT Days: {}",
                    format_hours_hms(tally.hours),
                    tally.days
                ),
            })
            .collect(),
        employees: employees
            .into_iter()
            .map(|(name, tally)| EmployeeOvertime {
                employee_name: name.to_string(),
                overtime_hours: tally.hours,
                overtime_days: tally.days,
            })
            .collect(),
    }
}
