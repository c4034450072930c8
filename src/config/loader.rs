//! Configuration loading functionality.
//!
//! This module provides the [`RulesLoader`] type for loading engine rules
//! from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::EngineRules;

/// Loads and provides access to the engine rules.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// └── rules.yaml   # Shift thresholds, overtime caps, estimation offset
/// ```
///
/// Any field missing from `rules.yaml` takes its default value.
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::RulesLoader;
///
/// let loader = RulesLoader::load("./config/default").unwrap();
/// println!("Night shifts start at {}", loader.rules().night_shift_threshold);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RulesLoader {
    rules: EngineRules,
}

impl RulesLoader {
    /// Loads rules from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `RulesLoader` on success, or an error if:
    /// - `rules.yaml` is missing
    /// - `rules.yaml` contains invalid YAML
    /// - the rule values are inconsistent
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let rules_path = path.as_ref().join("rules.yaml");
        let rules = Self::load_yaml::<EngineRules>(&rules_path)?;
        rules.validate()?;

        debug!(
            path = %rules_path.display(),
            night_shift_threshold = %rules.night_shift_threshold,
            "Loaded engine rules"
        );

        Ok(Self { rules })
    }

    /// Wraps an already-built rule set after validating it.
    pub fn from_rules(rules: EngineRules) -> EngineResult<Self> {
        rules.validate()?;
        Ok(Self { rules })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded rules.
    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "attendance_engine_{}_{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_shipped_default_rules() {
        let loader = RulesLoader::load("./config/default").unwrap();
        assert_eq!(loader.rules(), &EngineRules::default());
    }

    #[test]
    fn test_load_missing_directory() {
        let result = RulesLoader::load("./config/does_not_exist");
        match result {
            Err(EngineError::ConfigNotFound { path }) => assert!(path.ends_with("rules.yaml")),
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = scratch_dir("invalid_yaml");
        fs::write(dir.join("rules.yaml"), "night_shift_threshold: [not, a, time").unwrap();

        let result = RulesLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_load_overridden_threshold() {
        let dir = scratch_dir("override");
        fs::write(
            dir.join("rules.yaml"),
            "night_shift_threshold: \"16:20:00\"\nday_shift_overtime_cap_hours: 2.0\n",
        )
        .unwrap();

        let loader = RulesLoader::load(&dir).unwrap();
        assert_eq!(
            loader.rules().night_shift_threshold,
            NaiveTime::from_hms_opt(16, 20, 0).unwrap()
        );
        assert_eq!(
            loader.rules().day_shift_overtime_cap_hours,
            Decimal::from_str("2.0").unwrap()
        );
    }

    #[test]
    fn test_load_rejects_inconsistent_rules() {
        let dir = scratch_dir("inconsistent");
        fs::write(dir.join("rules.yaml"), "estimated_shift_hours: 0\n").unwrap();

        let result = RulesLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::InvalidRules { .. })));
    }

    #[test]
    fn test_from_rules_validates() {
        let rules = EngineRules {
            estimated_shift_hours: 30,
            ..EngineRules::default()
        };
        assert!(RulesLoader::from_rules(rules).is_err());
        assert!(RulesLoader::from_rules(EngineRules::default()).is_ok());
    }
}
