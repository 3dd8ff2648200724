//! Session configuration.
//!
//! Loadable from YAML or JSON; every field has a default so partial files
//! are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Apply queued edits immediately after every queuing call.
    pub auto_apply: bool,
    /// Upper bound on select/replace/apply rounds in
    /// [`Session::replace_recursive`](crate::Session::replace_recursive).
    pub max_fixed_point_passes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_apply: false,
            max_fixed_point_passes: 100,
        }
    }
}

impl SessionConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a configuration file; `.json` files are parsed as JSON and
    /// anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn with_auto_apply(mut self, auto_apply: bool) -> Self {
        self.auto_apply = auto_apply;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert!(!config.auto_apply);
        assert_eq!(config.max_fixed_point_passes, 100);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SessionConfig::from_yaml_str("auto_apply: true\n").unwrap();
        assert!(config.auto_apply);
        assert_eq!(config.max_fixed_point_passes, 100);
    }

    #[test]
    fn test_json() {
        let config = SessionConfig::from_json_str(r#"{"max_fixed_point_passes": 3}"#).unwrap();
        assert!(!config.auto_apply);
        assert_eq!(config.max_fixed_point_passes, 3);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = SessionConfig::from_yaml_str("auto_apply: [1, 2").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigYaml(_)));
    }
}
