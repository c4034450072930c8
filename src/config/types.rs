//! Configuration types for attendance consolidation.
//!
//! This module contains the strongly-typed rule set that is deserialized
//! from YAML configuration files and injected into every engine stage.

use chrono::{Duration, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Minimum overtime that counts at all, in hours (30 minutes).
pub const DEFAULT_MINIMUM_OVERTIME_HOURS: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Maximum overtime credited to a day shift, in hours.
pub const DEFAULT_DAY_SHIFT_OVERTIME_CAP_HOURS: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Maximum overtime credited to a night shift, in hours.
pub const DEFAULT_NIGHT_SHIFT_OVERTIME_CAP_HOURS: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Offset used to synthesize a missing check-in or check-out.
pub const DEFAULT_ESTIMATED_SHIFT_HOURS: u32 = 8;

/// Shifts longer than this are flagged for review.
pub const DEFAULT_EXCESSIVE_SHIFT_HOURS: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Sanity ceiling for a single shift's total hours.
pub const DEFAULT_MAXIMUM_SHIFT_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// The business rules applied by the consolidation engine.
///
/// Every threshold the engine compares against lives here so the same engine
/// can be driven with alternative values (e.g. the 16:20 night-shift cut-off
/// some sites use).
///
/// # Example
///
/// ```
/// use attendance_engine::config::EngineRules;
/// use chrono::NaiveTime;
///
/// let rules = EngineRules::default();
/// assert_eq!(rules.night_shift_threshold, NaiveTime::from_hms_opt(16, 10, 0).unwrap());
/// assert_eq!(rules.estimated_shift_hours, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineRules {
    /// Check-ins at or after this time of day start a night shift.
    pub night_shift_threshold: NaiveTime,
    /// Official end of a day shift; overtime accrues after it.
    pub day_shift_end: NaiveTime,
    /// Official end of a night shift on the following day.
    pub night_shift_end: NaiveTime,
    /// Overtime below this many hours is discarded (inclusive boundary).
    pub minimum_overtime_hours: Decimal,
    /// Day-shift overtime is clamped to this many hours.
    pub day_shift_overtime_cap_hours: Decimal,
    /// Night-shift overtime is clamped to this many hours.
    pub night_shift_overtime_cap_hours: Decimal,
    /// Hours added to or subtracted from the known side of a half-recorded shift.
    pub estimated_shift_hours: u32,
    /// Shifts longer than this are flagged as excessive.
    pub excessive_shift_hours: Decimal,
    /// Total hours never exceed this ceiling.
    pub maximum_shift_hours: Decimal,
}

impl Default for EngineRules {
    fn default() -> Self {
        Self {
            night_shift_threshold: clock(16, 10),
            day_shift_end: clock(17, 0),
            night_shift_end: clock(3, 0),
            minimum_overtime_hours: DEFAULT_MINIMUM_OVERTIME_HOURS,
            day_shift_overtime_cap_hours: DEFAULT_DAY_SHIFT_OVERTIME_CAP_HOURS,
            night_shift_overtime_cap_hours: DEFAULT_NIGHT_SHIFT_OVERTIME_CAP_HOURS,
            estimated_shift_hours: DEFAULT_ESTIMATED_SHIFT_HOURS,
            excessive_shift_hours: DEFAULT_EXCESSIVE_SHIFT_HOURS,
            maximum_shift_hours: DEFAULT_MAXIMUM_SHIFT_HOURS,
        }
    }
}

impl EngineRules {
    /// Returns true if a shift starting at `start` is a night shift.
    pub fn is_night_start(&self, start: NaiveTime) -> bool {
        start >= self.night_shift_threshold
    }

    /// The fixed offset used by the missing-entry estimator.
    pub fn estimation_offset(&self) -> Duration {
        Duration::hours(i64::from(self.estimated_shift_hours))
    }

    /// Converts a decimal hour value into a duration, rounded to the second.
    pub fn hours_to_duration(hours: Decimal) -> Duration {
        let seconds = (hours * Decimal::from(3600)).round().to_i64().unwrap_or(0);
        Duration::seconds(seconds)
    }

    /// Checks that the rule values are internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRules`] naming the first offending field.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |field: &str, message: &str| EngineError::InvalidRules {
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.minimum_overtime_hours < Decimal::ZERO {
            return Err(invalid("minimum_overtime_hours", "must not be negative"));
        }
        if self.day_shift_overtime_cap_hours < self.minimum_overtime_hours {
            return Err(invalid(
                "day_shift_overtime_cap_hours",
                "must be at least minimum_overtime_hours",
            ));
        }
        if self.night_shift_overtime_cap_hours < self.minimum_overtime_hours {
            return Err(invalid(
                "night_shift_overtime_cap_hours",
                "must be at least minimum_overtime_hours",
            ));
        }
        if self.estimated_shift_hours == 0 || self.estimated_shift_hours > 24 {
            return Err(invalid("estimated_shift_hours", "must be between 1 and 24"));
        }
        if self.maximum_shift_hours <= Decimal::ZERO || self.maximum_shift_hours > Decimal::from(48)
        {
            return Err(invalid("maximum_shift_hours", "must be between 0 and 48"));
        }
        if self.excessive_shift_hours > self.maximum_shift_hours {
            return Err(invalid(
                "excessive_shift_hours",
                "must not exceed maximum_shift_hours",
            ));
        }
        Ok(())
    }
}
