//! Attendance Consolidation & Overtime Calculation Engine
//!
//! This crate turns raw time-clock swipes into one consolidated shift record
//! per employee per anchor date. Duplicates are merged, missing sides are
//! estimated, night shifts are anchored across midnight, and overtime is
//! computed under day/night threshold rules.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
