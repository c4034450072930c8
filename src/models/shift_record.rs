//! Shift record model and related types.
//!
//! A [`ShiftRecord`] is the engine's output unit: one consolidated shift per
//! employee per anchor date, explainable back to the swipes it came from.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Day or night classification of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftType {
    /// Started before the night-shift threshold.
    #[serde(rename = "Day Shift")]
    Day,
    /// Started at or after the night-shift threshold.
    #[serde(rename = "Night Shift")]
    Night,
}

impl std::fmt::Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftType::Day => write!(f, "Day Shift"),
            ShiftType::Night => write!(f, "Night Shift"),
        }
    }
}

/// Which end of a shift a status describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySide {
    /// The start of the shift.
    CheckIn,
    /// The end of the shift.
    CheckOut,
}

impl EntrySide {
    fn title(self) -> &'static str {
        match self {
            EntrySide::CheckIn => "Check-In",
            EntrySide::CheckOut => "Check-Out",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            EntrySide::CheckIn => "check-ins",
            EntrySide::CheckOut => "check-outs",
        }
    }
}

/// How one side of a shift was resolved.
///
/// Renders to the status text reporting collaborators expect, for example
/// `"Complete (Consolidated 2 check-ins)"` or `"Estimated (Missing Check-Out)"`.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{EntrySide, EntryStatus};
///
/// let status = EntryStatus::Consolidated(2);
/// assert_eq!(status.describe(EntrySide::CheckIn), "Complete (Consolidated 2 check-ins)");
/// assert_eq!(EntryStatus::Estimated.describe(EntrySide::CheckOut), "Estimated (Missing Check-Out)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// A single swipe; carries its original label.
    Recorded(String),
    /// Several redundant swipes merged into one time.
    Consolidated(usize),
    /// No swipe existed; the time was synthesized.
    Estimated,
}

impl EntryStatus {
    /// Renders the status text for the given side.
    pub fn describe(&self, side: EntrySide) -> String {
        match self {
            EntryStatus::Recorded(label) => label.clone(),
            EntryStatus::Consolidated(count) => {
                format!("Complete (Consolidated {} {})", count, side.plural())
            }
            EntryStatus::Estimated => format!("Estimated (Missing {})", side.title()),
        }
    }

    /// Parses status text produced by [`EntryStatus::describe`].
    ///
    /// Anything that is not an estimated or consolidated marker is treated as
    /// an original label.
    pub fn parse(text: &str, side: EntrySide) -> Self {
        if text == EntryStatus::Estimated.describe(side) {
            return EntryStatus::Estimated;
        }
        let consolidated = text
            .strip_prefix("Complete (Consolidated ")
            .and_then(|rest| rest.strip_suffix(&format!(" {})", side.plural())))
            .and_then(|count| count.parse::<usize>().ok());
        match consolidated {
            Some(count) => EntryStatus::Consolidated(count),
            None => EntryStatus::Recorded(text.to_string()),
        }
    }

    /// Returns true if the time was synthesized.
    pub fn is_estimated(&self) -> bool {
        matches!(self, EntryStatus::Estimated)
    }

    /// Returns true if several swipes were merged.
    pub fn is_consolidated(&self) -> bool {
        matches!(self, EntryStatus::Consolidated(_))
    }
}

macro_rules! status_serde {
    ($name:ident, $side:expr) => {
        mod $name {
            use super::{EntrySide, EntryStatus};
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(
                status: &EntryStatus,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                let side: EntrySide = $side;
                serializer.serialize_str(&status.describe(side))
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<EntryStatus, D::Error> {
                let text = String::deserialize(deserializer)?;
                Ok(EntryStatus::parse(&text, $side))
            }
        }
    };
}

status_serde!(check_in_status, EntrySide::CheckIn);
status_serde!(check_out_status, EntrySide::CheckOut);

/// A condition worth human review, kept on the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftFlag {
    /// Total hours exceeded the excessive-duration threshold.
    ExcessiveDuration,
    /// Check-out swipes preceded every check-in of the day and were set aside.
    OrphanedCheckOut,
}

/// One consolidated shift for one employee on one anchor date.
///
/// The anchor date is always the check-in's date, even when the check-out
/// falls on the following day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// Exact-string employee identity.
    pub employee_name: String,
    /// The anchor date of the shift.
    pub date: NaiveDate,
    /// How the start of the shift was resolved.
    #[serde(with = "check_in_status")]
    pub check_in_status: EntryStatus,
    /// Resolved start of the shift.
    pub start_time: NaiveDateTime,
    /// How the end of the shift was resolved.
    #[serde(with = "check_out_status")]
    pub check_out_status: EntryStatus,
    /// Resolved end of the shift.
    pub end_time: NaiveDateTime,
    /// Day or night classification.
    pub shift_type: ShiftType,
    /// Hours between start and end, rounded to two places.
    pub total_hours: Decimal,
    /// Total hours less overtime, never negative.
    pub regular_hours: Decimal,
    /// Overtime hours under the day/night threshold rules.
    pub overtime_hours: Decimal,
    /// True if either side was synthesized.
    pub is_estimated: bool,
    /// Number of raw swipes attributed to this record.
    pub source_event_count: usize,
    /// Input positions of the attributed swipes, ascending.
    pub source_event_indices: Vec<usize>,
    /// Review flags raised while building the record.
    #[serde(default)]
    pub flags: Vec<ShiftFlag>,
}

impl ShiftRecord {
    /// Returns true if the record carries the given flag.
    pub fn has_flag(&self, flag: ShiftFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Returns true if duplicate swipes were merged on either side.
    pub fn is_consolidated(&self) -> bool {
        self.check_in_status.is_consolidated() || self.check_out_status.is_consolidated()
    }

    /// Rendered check-in status text.
    pub fn check_in_label(&self) -> String {
        self.check_in_status.describe(EntrySide::CheckIn)
    }

    /// Rendered check-out status text.
    pub fn check_out_label(&self) -> String {
        self.check_out_status.describe(EntrySide::CheckOut)
    }
}
