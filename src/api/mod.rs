//! HTTP API module for the Attendance Engine.
//!
//! This module provides the REST API endpoints for consolidating raw
//! attendance swipes into shift records.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ConsolidationRequest, EventRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
