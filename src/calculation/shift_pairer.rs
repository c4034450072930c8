//! Shift pairing functionality.
//!
//! This module resolves each [`DailyBucket`] into one provisional shift by
//! selecting the representative check-in and check-out. Duplicate swipes are
//! consolidated with the earliest-in / latest-out rule, and a night shift
//! with no check-out may borrow the following day's leading check-outs.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::EngineRules;
use crate::models::{Anomaly, AuditStep, AuditWarning, EntryStatus, ShiftFlag};

use super::daily_grouper::{ConsumedDates, DailyBucket};
use super::event_classifier::ClassifiedEvent;

/// One side of a shift as chosen from the bucket's swipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// The representative time.
    pub time: NaiveDateTime,
    /// Original label for a single swipe, or the consolidated count.
    pub status: EntryStatus,
    /// Every contributing swipe time, chronological.
    pub candidates: Vec<NaiveDateTime>,
}

/// Which sides of a shift were backed by real swipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    /// Both a check-in and a check-out were found.
    Complete {
        /// The resolved check-in.
        check_in: ResolvedEntry,
        /// The resolved check-out.
        check_out: ResolvedEntry,
    },
    /// Only a check-in was usable; the check-out must be estimated.
    CheckInOnly {
        /// The resolved check-in.
        check_in: ResolvedEntry,
    },
    /// Only a check-out was found; the check-in must be estimated.
    CheckOutOnly {
        /// The resolved check-out.
        check_out: ResolvedEntry,
    },
}

/// A provisional shift produced by the pairer, before estimation and overtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedShift {
    /// Exact-string employee identity.
    pub employee_name: String,
    /// The anchor date of the shift.
    pub anchor_date: NaiveDate,
    /// The resolved sides.
    pub pairing: Pairing,
    /// Input positions of every swipe attributed to the shift, ascending.
    pub source_event_indices: Vec<usize>,
    /// Review flags raised while pairing.
    pub flags: Vec<ShiftFlag>,
}

impl PairedShift {
    /// The resolved check-in, if one was recorded.
    pub fn check_in(&self) -> Option<&ResolvedEntry> {
        match &self.pairing {
            Pairing::Complete { check_in, .. } | Pairing::CheckInOnly { check_in } => {
                Some(check_in)
            }
            Pairing::CheckOutOnly { .. } => None,
        }
    }

    /// The resolved check-out, if one was recorded.
    pub fn check_out(&self) -> Option<&ResolvedEntry> {
        match &self.pairing {
            Pairing::Complete { check_out, .. } | Pairing::CheckOutOnly { check_out } => {
                Some(check_out)
            }
            Pairing::CheckInOnly { .. } => None,
        }
    }

    /// Returns true if duplicate swipes were merged on either side.
    pub fn is_consolidated(&self) -> bool {
        self.check_in().is_some_and(|e| e.status.is_consolidated())
            || self.check_out().is_some_and(|e| e.status.is_consolidated())
    }
}

/// All shifts paired for one employee, with the anomalies found on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingOutcome {
    /// One provisional shift per non-empty bucket, in anchor-date order.
    pub shifts: Vec<PairedShift>,
    /// Orphaned check-out warnings.
    pub warnings: Vec<AuditWarning>,
}

fn resolve_entry(events: &[ClassifiedEvent], earliest: bool) -> Option<ResolvedEntry> {
    let chosen = if earliest {
        events.iter().min_by_key(|e| (e.timestamp, e.index))?
    } else {
        events.iter().max_by_key(|e| (e.timestamp, e.index))?
    };

    let mut candidates: Vec<NaiveDateTime> = events.iter().map(|e| e.timestamp).collect();
    candidates.sort_unstable();

    let status = if events.len() == 1 {
        EntryStatus::Recorded(chosen.status_label.clone())
    } else {
        EntryStatus::Consolidated(events.len())
    };

    Some(ResolvedEntry {
        time: chosen.timestamp,
        status,
        candidates,
    })
}

/// Pairs one bucket into a provisional shift.
///
/// The earliest check-in and the latest check-out win. When every check-out
/// precedes the earliest check-in, the check-outs stay attributed to the
/// shift but the check-out side is left for estimation, the shift is flagged
/// [`ShiftFlag::OrphanedCheckOut`] and an `ORPHANED_EVENT` warning is returned.
///
/// Returns `None` only for an empty bucket.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{classify_event, pair_bucket, DailyBucket, Pairing};
/// use attendance_engine::models::{EntryStatus, RawEvent};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let raw = [
///     RawEvent::new("alice", day, at(6, 47), "C/In"),
///     RawEvent::new("alice", day, at(7, 35), "C/In"),
///     RawEvent::new("alice", day, at(17, 26), "C/Out"),
/// ];
/// let mut events = raw.iter().enumerate().map(|(i, e)| classify_event(i, e).unwrap());
///
/// let mut bucket = DailyBucket::open(events.next().unwrap());
/// events.for_each(|e| bucket.push(e));
///
/// let (shift, warning) = pair_bucket(&bucket).unwrap();
/// assert!(warning.is_none());
/// let check_in = shift.check_in().unwrap();
/// assert_eq!(check_in.time, day.and_time(at(6, 47)));
/// assert_eq!(check_in.status, EntryStatus::Consolidated(2));
/// assert!(matches!(shift.pairing, Pairing::Complete { .. }));
/// ```
pub fn pair_bucket(bucket: &DailyBucket) -> Option<(PairedShift, Option<AuditWarning>)> {
    let check_in = resolve_entry(&bucket.check_ins, true);
    let check_out = resolve_entry(&bucket.check_outs, false);

    let mut flags = Vec::new();
    let mut warning = None;

    let pairing = match (check_in, check_out) {
        (Some(check_in), Some(check_out)) if check_out.time < check_in.time => {
            warn!(
                employee = %bucket.employee_name,
                anchor_date = %bucket.anchor_date,
                check_outs = bucket.check_outs.len(),
                "Check-outs precede every check-in; estimating check-out"
            );
            flags.push(ShiftFlag::OrphanedCheckOut);
            warning = Some(AuditWarning::anomaly(
                Anomaly::OrphanedEvent,
                &bucket.employee_name,
                bucket.anchor_date,
                format!(
                    "{} check-out(s) ending {} precede the first check-in at {}; check-out will be estimated",
                    bucket.check_outs.len(),
                    check_out.time.time(),
                    check_in.time.time()
                ),
            ));
            Pairing::CheckInOnly { check_in }
        }
        (Some(check_in), Some(check_out)) => Pairing::Complete {
            check_in,
            check_out,
        },
        (Some(check_in), None) => Pairing::CheckInOnly { check_in },
        (None, Some(check_out)) => Pairing::CheckOutOnly { check_out },
        (None, None) => return None,
    };

    let shift = PairedShift {
        employee_name: bucket.employee_name.clone(),
        anchor_date: bucket.anchor_date,
        pairing,
        source_event_indices: bucket.source_event_indices(),
        flags,
    };
    Some((shift, warning))
}

/// Lets a night shift with no check-out take the next day's leading check-outs.
///
/// Only check-outs that precede the next bucket's first check-in are taken,
/// and only when the next date has not already been consumed. The next date
/// is consumed once anything is taken.
fn borrow_next_day_check_outs(
    buckets: &mut [DailyBucket],
    rules: &EngineRules,
    consumed: &mut ConsumedDates,
) {
    for i in 0..buckets.len().saturating_sub(1) {
        let (head, tail) = buckets.split_at_mut(i + 1);
        let current = &mut head[i];
        let next = &mut tail[0];

        if !current.check_outs.is_empty() || !current.is_night_shift(rules) {
            continue;
        }
        let Some(next_date) = current.anchor_date.succ_opt() else {
            continue;
        };
        if next.anchor_date != next_date || consumed.contains(&next_date) {
            continue;
        }

        let cutoff = next.earliest_check_in().map(|e| e.timestamp);
        let (borrowed, kept): (Vec<_>, Vec<_>) = next
            .check_outs
            .drain(..)
            .partition(|e| cutoff.is_none_or(|c| e.timestamp < c));
        next.check_outs = kept;

        if borrowed.is_empty() {
            continue;
        }

        debug!(
            employee = %current.employee_name,
            anchor_date = %current.anchor_date,
            borrowed = borrowed.len(),
            "Night shift took check-outs from the following day"
        );
        consumed.insert(next_date);
        current.check_outs.extend(borrowed);
    }
}

/// Pairs all of one employee's buckets.
///
/// # Arguments
///
/// * `buckets` - The employee's buckets in anchor-date order
/// * `rules` - Engine rules supplying the night-shift threshold
/// * `consumed` - The same per-employee set the grouper filled
///
/// Night shifts without a check-out first look ahead to the next day; a bucket
/// emptied by that lookahead produces no shift.
pub fn pair_employee_buckets(
    mut buckets: Vec<DailyBucket>,
    rules: &EngineRules,
    consumed: &mut ConsumedDates,
) -> PairingOutcome {
    borrow_next_day_check_outs(&mut buckets, rules, consumed);

    let mut outcome = PairingOutcome::default();
    for bucket in &buckets {
        if let Some((shift, warning)) = pair_bucket(bucket) {
            outcome.shifts.push(shift);
            outcome.warnings.extend(warning);
        }
    }
    outcome
}

fn times_json(times: &[NaiveDateTime]) -> serde_json::Value {
    json!(times.iter().map(|t| t.to_string()).collect::<Vec<_>>())
}

/// Builds the audit step explaining a duplicate consolidation.
///
/// Returns `None` when neither side merged more than one swipe.
pub fn consolidation_step(shift: &PairedShift, step_number: u32) -> Option<AuditStep> {
    if !shift.is_consolidated() {
        return None;
    }

    let empty: &[NaiveDateTime] = &[];
    let in_times = shift.check_in().map_or(empty, |e| e.candidates.as_slice());
    let out_times = shift.check_out().map_or(empty, |e| e.candidates.as_slice());

    let mut reasons = Vec::new();
    if let Some(entry) = shift.check_in().filter(|e| e.candidates.len() > 1) {
        reasons.push(format!(
            "kept earliest of {} check-ins ({})",
            entry.candidates.len(),
            entry.time.time()
        ));
    }
    if let Some(entry) = shift.check_out().filter(|e| e.candidates.len() > 1) {
        reasons.push(format!(
            "kept latest of {} check-outs ({})",
            entry.candidates.len(),
            entry.time.time()
        ));
    }

    Some(AuditStep {
        step_number,
        rule_id: "duplicate_consolidation".to_string(),
        rule_name: "Duplicate Swipe Consolidation".to_string(),
        employee_name: shift.employee_name.clone(),
        date: shift.anchor_date,
        input: json!({
            "check_ins": times_json(in_times),
            "check_outs": times_json(out_times),
        }),
        output: json!({
            "start_time": shift.check_in().map(|e| e.time.to_string()),
            "end_time": shift.check_out().map(|e| e.time.to_string()),
            "ignored_check_ins": in_times.len().saturating_sub(1),
            "ignored_check_outs": out_times.len().saturating_sub(1),
        }),
        reasoning: format!("Duplicate swipes merged: {}", reasons.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::classify_event;
    use crate::models::RawEvent;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event(index: usize, ts: &str, label: &str) -> ClassifiedEvent {
        let raw = RawEvent {
            employee_name: "alice".to_string(),
            timestamp: make_datetime(ts),
            status_label: label.to_string(),
        };
        classify_event(index, &raw).unwrap()
    }

    fn bucket(anchor: &str, events: Vec<ClassifiedEvent>) -> DailyBucket {
        let mut bucket = DailyBucket {
            employee_name: "alice".to_string(),
            anchor_date: make_date(anchor),
            check_ins: Vec::new(),
            check_outs: Vec::new(),
        };
        events.into_iter().for_each(|e| bucket.push(e));
        bucket
    }

    // ==========================================================================
    // SP-001: earliest check-in and latest check-out win
    // ==========================================================================
    #[test]
    fn test_sp_001_duplicate_consolidation() {
        let b = bucket(
            "2025-08-01",
            vec![
                event(0, "2025-08-01 06:47:00", "C/In"),
                event(1, "2025-08-01 07:35:00", "C/In"),
                event(2, "2025-08-01 17:04:00", "C/Out"),
                event(3, "2025-08-01 17:26:00", "C/Out"),
            ],
        );
        let (shift, warning) = pair_bucket(&b).unwrap();

        assert!(warning.is_none());
        let check_in = shift.check_in().unwrap();
        let check_out = shift.check_out().unwrap();
        assert_eq!(check_in.time, make_datetime("2025-08-01 06:47:00"));
        assert_eq!(check_out.time, make_datetime("2025-08-01 17:26:00"));
        assert_eq!(check_in.status, EntryStatus::Consolidated(2));
        assert_eq!(check_out.status, EntryStatus::Consolidated(2));
        assert_eq!(shift.source_event_indices, vec![0, 1, 2, 3]);
    }

    // ==========================================================================
    // SP-002: single swipes keep their original labels
    // ==========================================================================
    #[test]
    fn test_sp_002_single_swipes_keep_labels() {
        let b = bucket(
            "2025-08-01",
            vec![
                event(0, "2025-08-01 08:00:00", "OverTime In"),
                event(1, "2025-08-01 17:00:00", "C/Out"),
            ],
        );
        let (shift, _) = pair_bucket(&b).unwrap();

        assert_eq!(
            shift.check_in().unwrap().status,
            EntryStatus::Recorded("OverTime In".to_string())
        );
        assert!(!shift.is_consolidated());
        assert!(consolidation_step(&shift, 1).is_none());
    }

    // ==========================================================================
    // SP-003: half-recorded buckets are left for estimation
    // ==========================================================================
    #[test]
    fn test_sp_003_missing_sides() {
        let in_only = bucket("2025-08-01", vec![event(0, "2025-08-01 08:00:00", "C/In")]);
        let out_only = bucket("2025-08-01", vec![event(0, "2025-08-01 18:24:00", "C/Out")]);

        let (shift, _) = pair_bucket(&in_only).unwrap();
        assert!(matches!(shift.pairing, Pairing::CheckInOnly { .. }));

        let (shift, _) = pair_bucket(&out_only).unwrap();
        assert!(matches!(shift.pairing, Pairing::CheckOutOnly { .. }));

        assert!(pair_bucket(&bucket("2025-08-01", vec![])).is_none());
    }

    // ==========================================================================
    // SP-004: check-outs before every check-in are orphaned
    // ==========================================================================
    #[test]
    fn test_sp_004_orphaned_check_out() {
        let b = bucket(
            "2025-08-02",
            vec![
                event(0, "2025-08-02 07:00:00", "C/Out"),
                event(1, "2025-08-02 08:00:00", "C/In"),
            ],
        );
        let (shift, warning) = pair_bucket(&b).unwrap();

        assert!(matches!(shift.pairing, Pairing::CheckInOnly { .. }));
        assert_eq!(shift.flags, vec![ShiftFlag::OrphanedCheckOut]);
        assert_eq!(shift.source_event_indices, vec![0, 1]);
        assert_eq!(warning.unwrap().code, "ORPHANED_EVENT");
    }

    // ==========================================================================
    // SP-005: night shift borrows the next day's leading check-outs
    // ==========================================================================
    #[test]
    fn test_sp_005_night_lookahead() {
        let buckets = vec![
            bucket("2025-08-01", vec![event(0, "2025-08-01 18:00:00", "C/In")]),
            bucket(
                "2025-08-02",
                vec![
                    event(1, "2025-08-02 03:30:00", "C/Out"),
                    event(2, "2025-08-02 08:00:00", "C/In"),
                    event(3, "2025-08-02 17:00:00", "C/Out"),
                ],
            ),
        ];
        let mut consumed = ConsumedDates::new();
        let outcome = pair_employee_buckets(buckets, &EngineRules::default(), &mut consumed);

        assert_eq!(outcome.shifts.len(), 2);
        let night = &outcome.shifts[0];
        assert_eq!(
            night.check_out().unwrap().time,
            make_datetime("2025-08-02 03:30:00")
        );
        assert_eq!(night.source_event_indices, vec![0, 1]);
        assert_eq!(outcome.shifts[1].source_event_indices, vec![2, 3]);
        assert!(consumed.contains(&make_date("2025-08-02")));
    }

    // ==========================================================================
    // SP-006: lookahead never reads a consumed date
    // ==========================================================================
    #[test]
    fn test_sp_006_lookahead_respects_consumed_dates() {
        let buckets = vec![
            bucket("2025-08-01", vec![event(0, "2025-08-01 18:00:00", "C/In")]),
            bucket("2025-08-02", vec![event(1, "2025-08-02 03:30:00", "C/Out")]),
        ];
        let mut consumed = ConsumedDates::from([make_date("2025-08-02")]);
        let outcome = pair_employee_buckets(buckets, &EngineRules::default(), &mut consumed);

        assert_eq!(outcome.shifts.len(), 2);
        assert!(matches!(
            outcome.shifts[0].pairing,
            Pairing::CheckInOnly { .. }
        ));
    }

    // ==========================================================================
    // SP-007: a bucket emptied by the lookahead produces no shift
    // ==========================================================================
    #[test]
    fn test_sp_007_emptied_bucket_is_dropped() {
        let buckets = vec![
            bucket("2025-08-01", vec![event(0, "2025-08-01 20:00:00", "C/In")]),
            bucket("2025-08-02", vec![event(1, "2025-08-02 04:00:00", "C/Out")]),
        ];
        let mut consumed = ConsumedDates::new();
        let outcome = pair_employee_buckets(buckets, &EngineRules::default(), &mut consumed);

        assert_eq!(outcome.shifts.len(), 1);
        assert_eq!(outcome.shifts[0].source_event_indices, vec![0, 1]);
    }

    #[test]
    fn test_day_shift_does_not_look_ahead() {
        let buckets = vec![
            bucket("2025-08-01", vec![event(0, "2025-08-01 08:00:00", "C/In")]),
            bucket("2025-08-02", vec![event(1, "2025-08-02 04:00:00", "C/Out")]),
        ];
        let mut consumed = ConsumedDates::new();
        let outcome = pair_employee_buckets(buckets, &EngineRules::default(), &mut consumed);

        assert_eq!(outcome.shifts.len(), 2);
        assert!(consumed.is_empty());
    }

    #[test]
    fn test_consolidation_step_lists_kept_and_ignored() {
        let b = bucket(
            "2025-08-01",
            vec![
                event(0, "2025-08-01 06:47:00", "C/In"),
                event(1, "2025-08-01 07:35:00", "C/In"),
                event(2, "2025-08-01 17:26:00", "C/Out"),
            ],
        );
        let (shift, _) = pair_bucket(&b).unwrap();
        let step = consolidation_step(&shift, 4).unwrap();

        assert_eq!(step.step_number, 4);
        assert_eq!(step.rule_id, "duplicate_consolidation");
        assert_eq!(step.output["ignored_check_ins"], 1);
        assert_eq!(step.output["ignored_check_outs"], 0);
        assert!(step.reasoning.contains("kept earliest of 2 check-ins (06:47:00)"));
    }
}
