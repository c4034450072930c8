//! Daily grouping functionality.
//!
//! This module partitions one employee's chronologically sorted swipes into
//! [`DailyBucket`]s keyed by anchor date. A night shift's check-outs that fall
//! on the following calendar day join the bucket of the check-in, and the
//! following day is recorded in the caller's [`ConsumedDates`].

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::EngineRules;
use crate::models::Direction;

use super::event_classifier::ClassifiedEvent;

/// Dates an employee's night shifts have already claimed as "anchor date + 1".
///
/// Owned by the caller and threaded through grouping and pairing, one set per
/// employee.
pub type ConsumedDates = BTreeSet<NaiveDate>;

/// The swipes attributed to one employee on one anchor date.
///
/// Check-outs may physically fall on the day after `anchor_date` when the
/// bucket holds a night shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBucket {
    /// Exact-string employee identity.
    pub employee_name: String,
    /// The check-in date, or the check-out date for an Out-only bucket.
    pub anchor_date: NaiveDate,
    /// Check-in swipes in chronological order.
    pub check_ins: Vec<ClassifiedEvent>,
    /// Check-out swipes in chronological order.
    pub check_outs: Vec<ClassifiedEvent>,
}

impl DailyBucket {
    /// Opens a bucket anchored on the event's own date.
    pub fn open(event: ClassifiedEvent) -> Self {
        let mut bucket = Self {
            employee_name: event.employee_name.clone(),
            anchor_date: event.date(),
            check_ins: Vec::new(),
            check_outs: Vec::new(),
        };
        bucket.push(event);
        bucket
    }

    /// Adds an event on the side its direction names.
    pub fn push(&mut self, event: ClassifiedEvent) {
        match event.direction {
            Direction::In => self.check_ins.push(event),
            Direction::Out => self.check_outs.push(event),
            Direction::Unclassified => {
                warn!(
                    employee = %event.employee_name,
                    index = event.index,
                    "Unclassified event reached the grouper; ignoring"
                );
            }
        }
    }

    /// The earliest check-in, if any.
    pub fn earliest_check_in(&self) -> Option<&ClassifiedEvent> {
        self.check_ins.iter().min_by_key(|e| (e.timestamp, e.index))
    }

    /// The latest check-out, if any.
    pub fn latest_check_out(&self) -> Option<&ClassifiedEvent> {
        self.check_outs.iter().max_by_key(|e| (e.timestamp, e.index))
    }

    /// Returns true if the bucket's earliest check-in starts a night shift.
    pub fn is_night_shift(&self, rules: &EngineRules) -> bool {
        self.earliest_check_in()
            .is_some_and(|e| rules.is_night_start(e.timestamp.time()))
    }

    /// Number of swipes in the bucket.
    pub fn event_count(&self) -> usize {
        self.check_ins.len() + self.check_outs.len()
    }

    /// Returns true if the bucket holds no swipes.
    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }

    /// Input positions of every swipe in the bucket, ascending.
    pub fn source_event_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .check_ins
            .iter()
            .chain(self.check_outs.iter())
            .map(|e| e.index)
            .collect();
        indices.sort_unstable();
        indices
    }
}

/// Sorts one employee's events into processing order.
///
/// Events are ordered by timestamp; a check-in sorts before a check-out at
/// the same instant. Label and input position settle exact duplicates.
pub fn sort_chronologically(events: &mut [ClassifiedEvent]) {
    events.sort_by(|a, b| {
        (a.timestamp, a.direction, &a.status_label, a.index).cmp(&(
            b.timestamp,
            b.direction,
            &b.status_label,
            b.index,
        ))
    });
}

/// Where a check-out lands relative to the most recent bucket.
enum OutPlacement {
    SameDay,
    NextDay,
    Orphaned,
}

fn place_check_out(bucket: &DailyBucket, date: NaiveDate, rules: &EngineRules) -> OutPlacement {
    if bucket.anchor_date == date {
        OutPlacement::SameDay
    } else if bucket.anchor_date.succ_opt() == Some(date) && bucket.is_night_shift(rules) {
        OutPlacement::NextDay
    } else {
        OutPlacement::Orphaned
    }
}

/// Groups one employee's sorted events into daily buckets.
///
/// # Arguments
///
/// * `events` - Classified events for a single employee, already in the order
///   produced by [`sort_chronologically`]
/// * `rules` - Engine rules supplying the night-shift threshold
/// * `consumed` - Per-employee set of dates claimed by night shifts
///
/// # Rules
///
/// - A check-in joins the most recent bucket if it shares its date, otherwise
///   it opens a new bucket anchored on its own date.
/// - A check-out joins the most recent bucket if it shares its anchor date,
///   or if it falls on the next date and the bucket's earliest check-in is at
///   or after the night-shift threshold. The next date is then consumed.
/// - Any other check-out opens an Out-only bucket under its own date.
///
/// Buckets come back in anchor-date order, at most one per date.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{classify_event, group_daily, ConsumedDates};
/// use attendance_engine::config::EngineRules;
/// use attendance_engine::models::RawEvent;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let day1 = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
/// let day2 = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
/// let raw = vec![
///     RawEvent::new("alice", day1, NaiveTime::from_hms_opt(17, 55, 0).unwrap(), "C/In"),
///     RawEvent::new("alice", day2, NaiveTime::from_hms_opt(7, 44, 0).unwrap(), "C/Out"),
/// ];
/// let events = raw
///     .iter()
///     .enumerate()
///     .map(|(i, e)| classify_event(i, e).unwrap())
///     .collect();
///
/// let mut consumed = ConsumedDates::new();
/// let buckets = group_daily(events, &EngineRules::default(), &mut consumed);
///
/// assert_eq!(buckets.len(), 1);
/// assert_eq!(buckets[0].anchor_date, day1);
/// assert!(consumed.contains(&day2));
/// ```
pub fn group_daily(
    events: Vec<ClassifiedEvent>,
    rules: &EngineRules,
    consumed: &mut ConsumedDates,
) -> Vec<DailyBucket> {
    let mut buckets: Vec<DailyBucket> = Vec::new();

    for event in events {
        let date = event.date();
        match event.direction {
            Direction::In => match buckets.last_mut() {
                Some(bucket) if bucket.anchor_date == date => bucket.push(event),
                _ => buckets.push(DailyBucket::open(event)),
            },
            Direction::Out => {
                let placement = buckets
                    .last()
                    .map(|bucket| place_check_out(bucket, date, rules))
                    .unwrap_or(OutPlacement::Orphaned);

                match (placement, buckets.last_mut()) {
                    (OutPlacement::SameDay, Some(bucket)) => bucket.push(event),
                    (OutPlacement::NextDay, Some(bucket)) => {
                        if consumed.insert(date) {
                            debug!(
                                employee = %bucket.employee_name,
                                anchor_date = %bucket.anchor_date,
                                consumed_date = %date,
                                "Night shift check-out claimed next day"
                            );
                        }
                        bucket.push(event);
                    }
                    _ => buckets.push(DailyBucket::open(event)),
                }
            }
            Direction::Unclassified => {
                warn!(
                    employee = %event.employee_name,
                    index = event.index,
                    "Unclassified event reached the grouper; ignoring"
                );
            }
        }
    }

    buckets
}
