//! Checker configuration.

use docsig_types::MAX_ERRORS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`CheckerConfig`] or the unit it is
/// applied to.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid checker config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid checker config: {0}")]
    Invalid(String),

    #[error("invalid check unit: {0}")]
    Unit(serde_json::Error),
}

/// Knobs for one checking pass. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Errors stored before further ones are only counted.
    pub max_errors: usize,
    /// Warn (E302) about calls to functions the unit does not declare.
    pub report_unknown_callees: bool,
    /// Report (E200) annotation types naming unregistered classes.
    pub report_unresolved_annotation_types: bool,
    /// Check signatures and calls on the rayon pool.
    pub parallel: bool,
    /// Only trust annotations of functions whose doc block carries this tag
    /// (e.g. `kphp-infer`). Other functions are left unchecked.
    pub required_doc_tag: Option<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_errors: MAX_ERRORS,
            report_unknown_callees: false,
            report_unresolved_annotation_types: true,
            parallel: false,
            required_doc_tag: None,
        }
    }
}

impl CheckerConfig {
    /// Parse and validate a JSON config object.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no pass can honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_errors == 0 {
            return Err(ConfigError::Invalid(
                "max_errors must be at least 1".to_string(),
            ));
        }
        if let Some(tag) = &self.required_doc_tag {
            let tag = tag.trim().trim_start_matches('@');
            if tag.is_empty() || tag.contains(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "required_doc_tag must be a single tag name, got {tag:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_unknown_callees(mut self, report: bool) -> Self {
        self.report_unknown_callees = report;
        self
    }

    pub fn with_required_doc_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_doc_tag = Some(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::default();
        assert_eq!(config.max_errors, 20);
        assert!(!config.report_unknown_callees);
        assert!(config.report_unresolved_annotation_types);
        assert!(!config.parallel);
        assert_eq!(config.required_doc_tag, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CheckerConfig::from_json_str(r#"{ "parallel": true }"#).unwrap();
        assert!(config.parallel);
        assert_eq!(config.max_errors, 20);
        assert_eq!(CheckerConfig::from_json_str("{}").unwrap(), CheckerConfig::default());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            CheckerConfig::from_json_str(r#"{ "max_errors": "lots" }"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            CheckerConfig::from_json_str(r#"{ "max_errors": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CheckerConfig::from_json_str(r#"{ "required_doc_tag": "@" }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_programmatic_config() {
        let zero = CheckerConfig {
            max_errors: 0,
            ..CheckerConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));
        assert!(CheckerConfig::default()
            .with_required_doc_tag("@kphp-infer")
            .validate()
            .is_ok());
    }
}
