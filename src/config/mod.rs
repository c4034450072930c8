//! Configuration loading and management for the Attendance Engine.
//!
//! This module provides the rule set that drives shift classification,
//! overtime arithmetic and missing-entry estimation, and loads it from YAML.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::RulesLoader;
//!
//! let loader = RulesLoader::load("./config/default").unwrap();
//! println!("Day shifts end at {}", loader.rules().day_shift_end);
//! ```

mod loader;
mod types;

pub use loader::RulesLoader;
pub use types::{
    DEFAULT_DAY_SHIFT_OVERTIME_CAP_HOURS, DEFAULT_ESTIMATED_SHIFT_HOURS,
    DEFAULT_EXCESSIVE_SHIFT_HOURS, DEFAULT_MAXIMUM_SHIFT_HOURS, DEFAULT_MINIMUM_OVERTIME_HOURS,
    DEFAULT_NIGHT_SHIFT_OVERTIME_CAP_HOURS, EngineRules,
};
