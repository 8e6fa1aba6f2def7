use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of errors stored before further ones are only counted.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Annotation,
    Hierarchy,
    Call,
}

/// Numeric diagnostic code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Annotation errors (E100–E199) ──
    pub const MALFORMED_SIGNATURE: Self = Self(100);
    pub const UNPARSEABLE_TYPE: Self = Self(101);

    // ── Hierarchy errors (E200–E299) ──
    pub const UNKNOWN_TYPE: Self = Self(200);
    pub const DUPLICATE_DECLARATION: Self = Self(201);
    pub const HIERARCHY_CYCLE: Self = Self(202);

    // ── Call errors (E300–E399) ──
    pub const ARITY_MISMATCH: Self = Self(300);
    pub const TYPE_MISMATCH: Self = Self(301);
    pub const UNKNOWN_FUNCTION: Self = Self(302);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Annotation,
            200..=299 => ErrorCategory::Hierarchy,
            _ => ErrorCategory::Call,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annotation => write!(f, "annotation"),
            Self::Hierarchy => write!(f, "hierarchy"),
            Self::Call => write!(f, "call"),
        }
    }
}

/// Which declaration or call a diagnostic is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteRef {
    /// A class or interface declaration.
    Class { name: String },
    /// A function declaration (its annotations or parameter list).
    Declaration { function: String },
    /// The `index`-th call expression of the unit.
    Call { callee: String, index: usize },
}

impl fmt::Display for SiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { name } => write!(f, "class {name}"),
            Self::Declaration { function } => write!(f, "function {function}"),
            Self::Call { callee, index } => write!(f, "call #{index} to {callee}"),
        }
    }
}

/// A structured checker diagnostic.
///
/// Consumers render these; they must not parse free-form strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The declaration or call the issue belongs to.
    pub site: SiteRef,
    /// Diagnostic code (e.g., E301).
    pub code: ErrorCode,
    pub severity: Severity,
    /// Derived from `code`.
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// Zero-based argument position for call diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn new(site: SiteRef, code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            site,
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            position: None,
            suggestion: None,
        }
    }

    /// Downgrade to a warning.
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    /// Attach the offending argument position.
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}: {}",
            self.span, self.code, self.category, self.site, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

fn default_max_errors() -> usize {
    MAX_ERRORS
}

/// The diagnostics of one checking pass, in the order they were reported.
///
/// Errors and warnings share one list. Only errors count against the
/// storage cap; past it they are counted but not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
    pub total_errors: usize,
    pub total_warnings: usize,
    #[serde(skip, default = "default_max_errors")]
    max_errors: usize,
}

impl Diagnostics {
    /// Create an empty collection with the default error cap.
    pub fn empty() -> Self {
        Self::with_limit(MAX_ERRORS)
    }

    /// Create an empty collection storing at most `max_errors` errors.
    pub fn with_limit(max_errors: usize) -> Self {
        Self {
            diagnostics: Vec::new(),
            total_errors: 0,
            total_warnings: 0,
            max_errors,
        }
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// True if nothing at all was reported.
    pub fn is_clean(&self) -> bool {
        self.total_errors == 0 && self.total_warnings == 0
    }

    /// Number of errors actually stored. Warnings are never dropped.
    fn stored_errors(&self) -> usize {
        self.diagnostics.len() - self.total_warnings
    }

    /// Append a diagnostic, respecting the error cap.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                if self.stored_errors() < self.max_errors {
                    self.diagnostics.push(diagnostic);
                }
                self.total_errors += 1;
            }
            Severity::Warning => {
                self.diagnostics.push(diagnostic);
                self.total_warnings += 1;
            }
        }
    }

    /// All stored diagnostics, in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Stored errors, in report order.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.by_severity(Severity::Error)
    }

    /// Warnings, in report order.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.by_severity(Severity::Warning)
    }

    /// Codes of all stored diagnostics, in report order.
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.iter().map(|d| d.code).collect()
    }

    fn by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.severity == severity).collect()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::empty()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_site() -> SiteRef {
        SiteRef::Call {
            callee: "get_int_args".into(),
            index: 0,
        }
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::MALFORMED_SIGNATURE.category(),
            ErrorCategory::Annotation
        );
        assert_eq!(ErrorCode::UNPARSEABLE_TYPE.category(), ErrorCategory::Annotation);
        assert_eq!(ErrorCode::UNKNOWN_TYPE.category(), ErrorCategory::Hierarchy);
        assert_eq!(ErrorCode::HIERARCHY_CYCLE.category(), ErrorCategory::Hierarchy);
        assert_eq!(ErrorCode::TYPE_MISMATCH.category(), ErrorCategory::Call);
        assert_eq!(ErrorCode::UNKNOWN_FUNCTION.category(), ErrorCategory::Call);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::TYPE_MISMATCH), "E301");
        assert_eq!(format!("{}", ErrorCode::MALFORMED_SIGNATURE), "E100");
    }

    #[test]
    fn test_diagnostic_creation() {
        let d = Diagnostic::new(
            call_site(),
            ErrorCode::TYPE_MISMATCH,
            "argument 3 of 'get_int_args' expected int, got string",
            Span::new(12, 5, 12, 22),
        )
        .at_position(2);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.category, ErrorCategory::Call);
        assert_eq!(d.position, Some(2));
        assert_eq!(
            d.to_string(),
            "12:5: E301 [call] call #0 to get_int_args: argument 3 of 'get_int_args' expected int, got string"
        );
    }

    #[test]
    fn test_diagnostic_json_serialization() {
        let d = Diagnostic::new(
            call_site(),
            ErrorCode::TYPE_MISMATCH,
            "type mismatch",
            Span::new(12, 5, 12, 22),
        )
        .with_suggestion("pass an int");

        let json = serde_json::to_string_pretty(&d).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"line\""));
        assert!(json.contains("\"end_column\""));
        assert!(json.contains("\"suggestion\""));
        assert!(!json.contains("\"position\""));

        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_diagnostics_limit() {
        let mut diags = Diagnostics::with_limit(3);
        for i in 0..5 {
            diags.push(Diagnostic::new(
                call_site(),
                ErrorCode::ARITY_MISMATCH,
                format!("error {i}"),
                Span::point(i + 1, 1),
            ));
        }
        assert_eq!(diags.errors().len(), 3);
        assert_eq!(diags.total_errors, 5);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_diagnostics_keep_report_order() {
        let mut diags = Diagnostics::with_limit(1);
        let warning = |i: u32| {
            Diagnostic::new(
                call_site(),
                ErrorCode::UNKNOWN_FUNCTION,
                format!("warning {i}"),
                Span::point(i, 1),
            )
            .warning()
        };
        let error = |i: u32| {
            Diagnostic::new(
                call_site(),
                ErrorCode::TYPE_MISMATCH,
                format!("error {i}"),
                Span::point(i, 1),
            )
        };
        diags.push(warning(1));
        diags.push(error(2));
        diags.push(error(3));
        diags.push(warning(4));

        let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["warning 1", "error 2", "warning 4"]);
        assert_eq!(diags.total_errors, 2);
        assert_eq!(diags.total_warnings, 2);
        assert_eq!(diags.errors().len(), 1);
        assert_eq!(diags.warnings().len(), 2);
    }

    #[test]
    fn test_diagnostics_routes_warnings() {
        let mut diags = Diagnostics::empty();
        diags.push(
            Diagnostic::new(
                call_site(),
                ErrorCode::UNKNOWN_FUNCTION,
                "no declaration",
                Span::unknown(),
            )
            .warning(),
        );
        assert!(!diags.has_errors());
        assert!(!diags.is_clean());
        assert_eq!(diags.total_warnings, 1);
        assert_eq!(diags.codes(), vec![ErrorCode::UNKNOWN_FUNCTION]);
    }
}
