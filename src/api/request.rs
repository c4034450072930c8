//! Request types for the Attendance Engine API.
//!
//! This module defines the JSON request structures for the `/consolidate` endpoint.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::RawEvent;

/// Request body for the `/consolidate` endpoint.
///
/// Carries the normalized swipe table produced by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationRequest {
    /// The raw swipes, in any order.
    pub events: Vec<EventRequest>,
}

/// One swipe in a consolidation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    /// Exact-string employee identity.
    pub employee_name: String,
    /// Calendar date of the swipe (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Time of day of the swipe (HH:MM:SS).
    pub time: NaiveTime,
    /// The original status text, e.g. "C/In" or "OverTime Out".
    pub status: String,
}

impl From<EventRequest> for RawEvent {
    fn from(req: EventRequest) -> Self {
        RawEvent::new(req.employee_name, req.date, req.time, req.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_consolidation_request() {
        let json = r#"{
            "events": [
                {
                    "employee_name": "Ishimwe.Jonathan",
                    "date": "2025-08-01",
                    "time": "17:55:00",
                    "status": "C/In"
                },
                {
                    "employee_name": "Ishimwe.Jonathan",
                    "date": "2025-08-02",
                    "time": "07:44:00",
                    "status": "OverTime Out"
                }
            ]
        }"#;

        let request: ConsolidationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.events.len(), 2);
        assert_eq!(request.events[1].status, "OverTime Out");
        assert_eq!(
            request.events[0].time,
            NaiveTime::from_hms_opt(17, 55, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_status_is_rejected() {
        let json = r#"{
            "events": [
                { "employee_name": "bob", "date": "2025-08-01", "time": "08:00:00" }
            ]
        }"#;
        let result: Result<ConsolidationRequest, _> = serde_json::from_str(json);
        assert!(result.unwrap_err().to_string().contains("missing field"));
    }

    #[test]
    fn test_event_conversion() {
        let req = EventRequest {
            employee_name: "bob".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            time: NaiveTime::from_hms_opt(18, 24, 0).unwrap(),
            status: "C/Out".to_string(),
        };

        let event: RawEvent = req.into();
        assert_eq!(event.employee_name, "bob");
        assert_eq!(event.status_label, "C/Out");
        assert_eq!(event.time(), NaiveTime::from_hms_opt(18, 24, 0).unwrap());
    }
}
