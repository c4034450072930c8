//! Raw swipe model and its derived direction.
//!
//! This module defines the [`RawEvent`] handed over by the ingestion layer and
//! the [`Direction`] variant produced once by the event classifier.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Whether a swipe opens or closes a shift.
///
/// Produced once by the classifier; nothing downstream re-reads label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// A check-in ("C/In", "OverTime In", ...).
    In,
    /// A check-out ("C/Out", "OverTime Out", ...).
    Out,
    /// Text that names neither side.
    Unclassified,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "In"),
            Direction::Out => write!(f, "Out"),
            Direction::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// One time-clock swipe as delivered by the ingestion layer.
///
/// Timestamps are already parsed; the engine never mutates an event.
///
/// # Example
///
/// ```
/// use attendance_engine::models::RawEvent;
/// use chrono::NaiveDateTime;
///
/// let event = RawEvent {
///     employee_name: "Ishimwe.Jonathan".to_string(),
///     timestamp: NaiveDateTime::parse_from_str("2025-08-05 18:12:28", "%Y-%m-%d %H:%M:%S").unwrap(),
///     status_label: "OverTime In".to_string(),
/// };
/// assert_eq!(event.date().to_string(), "2025-08-05");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Exact-string employee identity.
    pub employee_name: String,
    /// When the swipe happened.
    pub timestamp: NaiveDateTime,
    /// The original status text, e.g. "C/In" or "OverTime Out".
    pub status_label: String,
}

impl RawEvent {
    /// Builds an event from separate date and time-of-day values.
    pub fn new(
        employee_name: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        status_label: impl Into<String>,
    ) -> Self {
        Self {
            employee_name: employee_name.into(),
            timestamp: date.and_time(time),
            status_label: status_label.into(),
        }
    }

    /// The calendar date of the swipe.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// The time of day of the swipe.
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }
}
