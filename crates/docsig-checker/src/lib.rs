//! docsig checker: doc-annotation-driven signature checking.
//!
//! ```text
//! Classes → Hierarchy → Annotation Parser → Reconciler → Call-Site Checker → Diagnostics
//! ```
//!
//! Entry points: [`check`] for a default pass, [`SignatureChecker`] when a
//! [`CheckerConfig`] is needed. The components are public for hosts that
//! drive them individually.

pub mod annotation;
pub mod call;
pub mod checker;
pub mod config;
pub mod docblock;
pub mod error;
pub mod hierarchy;
pub mod reconcile;
pub mod ty;

pub use annotation::{AnnotationParser, DeclaredParam, DeclaredSignature, ReturnAnnotation};
pub use call::CallSiteChecker;
pub use checker::{CheckReport, SignatureChecker};
pub use config::{CheckerConfig, ConfigError};
pub use docblock::{parse_doc_comment, DocBlock};
pub use error::{CheckError, CheckResult};
pub use hierarchy::{ClassHierarchy, HierarchyBuilder};
pub use reconcile::{reconcile, Reconciliation, ResolvedParam, ResolvedSignature, VariadicTail};
pub use ty::{assignable, check_assignable};

use docsig_types::CheckUnit;

/// Check a unit with the default configuration.
pub fn check(unit: &CheckUnit) -> CheckReport {
    SignatureChecker::default().check(unit)
}

/// Validate `config`, deserialize a JSON unit and check it.
pub fn check_json(unit_json: &str, config: CheckerConfig) -> Result<CheckReport, ConfigError> {
    config.validate()?;
    let unit: CheckUnit = serde_json::from_str(unit_json).map_err(ConfigError::Unit)?;
    Ok(SignatureChecker::new(config).check(&unit))
}
