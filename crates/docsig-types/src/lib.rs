//! Shared types for docsig.
//!
//! This crate defines the type descriptors, the declarations handed over by
//! the parsing layer, source spans, and the diagnostic model used by the
//! checker and its hosts.

mod decl;
mod descriptor;
mod error;
mod span;

pub use decl::{
    ActualParam, CallExpression, CheckUnit, ClassDeclaration, FunctionDeclaration,
    RawParamAnnotation, RawReturnAnnotation,
};
pub use descriptor::{ScalarKind, TypeCategory, TypeDescriptor};
pub use error::{
    Diagnostic, Diagnostics, ErrorCategory, ErrorCode, Severity, SiteRef, MAX_ERRORS,
};
pub use span::Span;
