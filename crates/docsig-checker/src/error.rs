//! Checker error types.

use docsig_types::{Diagnostic, ErrorCode, SiteRef, Span};
use thiserror::Error;

/// Failures produced by the individual checker components.
///
/// None of these abort a pass: the driver turns each one into a
/// [`Diagnostic`] attached to the offending declaration or call and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The annotation block is structurally invalid.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// Type text matches no scalar keyword, array suffix or identifier.
    #[error("unparseable type '{0}'")]
    UnparseableType(String),

    /// A class/interface name that was never registered.
    #[error("unknown type '{name}'")]
    UnknownType {
        name: String,
        /// Argument position when raised while checking a call.
        position: Option<usize>,
    },

    /// A name registered twice with conflicting meaning.
    #[error("duplicate declaration of '{name}': {detail}")]
    DuplicateDeclaration { name: String, detail: String },

    /// Supertype edges that lead back to their origin.
    #[error("inheritance cycle: {}", .0.join(" -> "))]
    HierarchyCycle(Vec<String>),

    /// Too few or too many arguments.
    #[error("{0}")]
    ArityMismatch(String),

    /// An argument not assignable to its parameter type.
    #[error("argument {} expected {expected}, got {found}", .position + 1)]
    TypeMismatch {
        position: usize,
        expected: String,
        found: String,
    },
}

impl CheckError {
    pub(crate) fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType {
            name: name.into(),
            position: None,
        }
    }

    /// The diagnostic code this error is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedSignature(_) => ErrorCode::MALFORMED_SIGNATURE,
            Self::UnparseableType(_) => ErrorCode::UNPARSEABLE_TYPE,
            Self::UnknownType { .. } => ErrorCode::UNKNOWN_TYPE,
            Self::DuplicateDeclaration { .. } => ErrorCode::DUPLICATE_DECLARATION,
            Self::HierarchyCycle(_) => ErrorCode::HIERARCHY_CYCLE,
            Self::ArityMismatch(_) => ErrorCode::ARITY_MISMATCH,
            Self::TypeMismatch { .. } => ErrorCode::TYPE_MISMATCH,
        }
    }

    /// Argument position, for errors raised at a call site.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::TypeMismatch { position, .. } => Some(*position),
            Self::UnknownType { position, .. } => *position,
            _ => None,
        }
    }

    /// Convert into a diagnostic attached to `site`.
    pub fn into_diagnostic(self, site: SiteRef, span: Span) -> Diagnostic {
        let position = self.position();
        let mut diagnostic = Diagnostic::new(site, self.code(), self.to_string(), span);
        diagnostic.position = position;
        diagnostic
    }
}

/// Checker result type alias.
pub type CheckResult<T> = Result<T, CheckError>;
