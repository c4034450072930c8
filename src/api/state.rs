//! Application state for the Attendance Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{EngineRules, RulesLoader};

/// Shared application state.
///
/// Contains resources that are shared across all request handlers,
/// such as the loaded engine rules.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine rules.
    rules: Arc<RulesLoader>,
}

impl AppState {
    /// Creates a new application state with the given rules loader.
    pub fn new(rules: RulesLoader) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Returns the active engine rules.
    pub fn rules(&self) -> &EngineRules {
        self.rules.rules()
    }
}
