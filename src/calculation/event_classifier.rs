//! Event classification functionality.
//!
//! This module turns each raw swipe's free-text status label into a closed
//! [`Direction`] once, so that grouping and pairing never look at label text.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Direction, RawEvent};

/// A raw swipe after its direction has been resolved.
///
/// Carries the swipe's position in the run input so every shift record can
/// point back at the exact events it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    /// Position of the event in the run input.
    pub index: usize,
    /// Exact-string employee identity.
    pub employee_name: String,
    /// When the swipe happened.
    pub timestamp: NaiveDateTime,
    /// The original status text.
    pub status_label: String,
    /// Check-in or check-out.
    pub direction: Direction,
    /// True if the label carries an overtime tag (informational only).
    pub overtime_tagged: bool,
}

impl ClassifiedEvent {
    /// The calendar date of the swipe.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Derives the direction named by a status label.
///
/// Matching is case-insensitive: text containing "out" is a check-out, text
/// containing "in" (and not "out") is a check-in, anything else is
/// [`Direction::Unclassified`]. Overtime tags do not affect the result.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::classify_direction;
/// use attendance_engine::models::Direction;
///
/// assert_eq!(classify_direction("C/In"), Direction::In);
/// assert_eq!(classify_direction("OverTime Out"), Direction::Out);
/// assert_eq!(classify_direction("Break"), Direction::Unclassified);
/// ```
pub fn classify_direction(status_label: &str) -> Direction {
    let label = status_label.to_lowercase();
    if label.contains("out") {
        Direction::Out
    } else if label.contains("in") {
        Direction::In
    } else {
        Direction::Unclassified
    }
}

/// Returns true if a status label carries an overtime tag.
pub fn is_overtime_tagged(status_label: &str) -> bool {
    status_label.to_lowercase().contains("overtime")
}

/// Classifies one raw event.
///
/// # Arguments
///
/// * `index` - The event's position in the run input
/// * `event` - The raw swipe
///
/// # Errors
///
/// Returns [`EngineError::ClassificationError`] when the label names neither
/// side. The caller excludes the event from pairing and counts it.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::classify_event;
/// use attendance_engine::models::{Direction, RawEvent};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let event = RawEvent::new(
///     "alice",
///     NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
///     NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     "OverTime In",
/// );
/// let classified = classify_event(7, &event).unwrap();
/// assert_eq!(classified.direction, Direction::In);
/// assert!(classified.overtime_tagged);
/// assert_eq!(classified.index, 7);
/// ```
pub fn classify_event(index: usize, event: &RawEvent) -> EngineResult<ClassifiedEvent> {
    match classify_direction(&event.status_label) {
        Direction::Unclassified => Err(EngineError::ClassificationError {
            label: event.status_label.clone(),
        }),
        direction => Ok(ClassifiedEvent {
            index,
            employee_name: event.employee_name.clone(),
            timestamp: event.timestamp,
            status_label: event.status_label.clone(),
            direction,
            overtime_tagged: is_overtime_tagged(&event.status_label),
        }),
    }
}
