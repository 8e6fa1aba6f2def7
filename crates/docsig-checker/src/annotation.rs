//! Annotation parsing: raw `@param`/`@return` entries to a [`DeclaredSignature`].

use docsig_types::{
    RawParamAnnotation, RawReturnAnnotation, ScalarKind, TypeCategory, TypeDescriptor,
};
use serde::Serialize;

use crate::error::{CheckError, CheckResult};
use crate::hierarchy::ClassHierarchy;

const ELLIPSIS: &str = "...";
const ARRAY_KEYWORD: &str = "array";

// ══════════════════════════════════════════════════════════════════════════════
// Declared signature
// ══════════════════════════════════════════════════════════════════════════════

/// One documented parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredParam {
    pub position: usize,
    /// Name without the leading `$`.
    pub name: String,
    pub ty: TypeDescriptor,
    pub is_variadic: bool,
}

/// The documented return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnAnnotation {
    pub ty: TypeDescriptor,
    /// `@return T ...$` marker. Descriptive only, never checked.
    pub is_variadic_marker: bool,
}

/// Type information taken purely from a documentation block.
///
/// At most one parameter is variadic, and if present it is the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclaredSignature {
    pub params: Vec<DeclaredParam>,
    pub ret: Option<ReturnAnnotation>,
}

impl DeclaredSignature {
    /// The variadic parameter, if any.
    pub fn variadic(&self) -> Option<&DeclaredParam> {
        self.params.last().filter(|p| p.is_variadic)
    }

    /// True if at least one parameter was documented.
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// Class/interface names referenced by this signature that the
    /// hierarchy does not know, in order of first appearance.
    pub fn unresolved_names(&self, hierarchy: &ClassHierarchy) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let types = self
            .params
            .iter()
            .map(|p| &p.ty)
            .chain(self.ret.iter().map(|r| &r.ty));
        for ty in types {
            if let Some(name) = ty.named_base() {
                if !hierarchy.contains(name) && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Parser
// ══════════════════════════════════════════════════════════════════════════════

/// Parses annotation type text against a frozen hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationParser<'h> {
    hierarchy: &'h ClassHierarchy,
}

impl<'h> AnnotationParser<'h> {
    pub fn new(hierarchy: &'h ClassHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Parse a type expression.
    ///
    /// ```ebnf
    /// Type     = Base { "[]" } ;
    /// Base     = ScalarKeyword | "array" | Name ;
    /// Name     = [ "\" ] Segment { "\" Segment } ;
    /// Segment  = ( letter | "_" ) { letter | digit | "_" } ;
    /// ```
    ///
    /// `array` (any case) is the element-less [`TypeDescriptor::AnyArray`],
    /// never a class name. Names resolve to `Interface` when the hierarchy
    /// says so and to `Class` otherwise.
    pub fn parse_type(&self, text: &str) -> CheckResult<TypeDescriptor> {
        let trimmed = text.trim();
        let mut base = trimmed;
        let mut depth = 0usize;
        while let Some(rest) = base.strip_suffix("[]") {
            base = rest.trim_end();
            depth += 1;
        }

        let mut ty = if let Some(kind) = ScalarKind::from_keyword(base) {
            TypeDescriptor::Scalar(kind)
        } else if base.eq_ignore_ascii_case(ARRAY_KEYWORD) {
            TypeDescriptor::AnyArray
        } else if is_qualified_name(base) {
            let name = base.trim_start_matches('\\');
            let category = self
                .hierarchy
                .kind_of(name)
                .unwrap_or(TypeCategory::Class);
            TypeDescriptor::Named {
                name: name.to_string(),
                category,
            }
        } else {
            return Err(CheckError::UnparseableType(trimmed.to_string()));
        };

        for _ in 0..depth {
            ty = TypeDescriptor::array_of(ty);
        }
        Ok(ty)
    }

    /// Build a declared signature from raw entries.
    pub fn parse_signature(
        &self,
        params: &[RawParamAnnotation],
        ret: Option<&RawReturnAnnotation>,
    ) -> CheckResult<DeclaredSignature> {
        let mut declared = Vec::with_capacity(params.len());
        for (position, raw) in params.iter().enumerate() {
            let (name, name_has_ellipsis) = split_param_name(&raw.param_name);
            if name.is_empty() {
                return Err(CheckError::MalformedSignature(format!(
                    "@param {} at position {} has no parameter name",
                    raw.type_text.trim(),
                    position
                )));
            }
            declared.push(DeclaredParam {
                position,
                name: name.to_string(),
                ty: self.parse_type(&raw.type_text)?,
                is_variadic: raw.has_ellipsis || name_has_ellipsis,
            });
        }

        let variadic_count = declared.iter().filter(|p| p.is_variadic).count();
        let last_is_variadic = declared.last().is_some_and(|p| p.is_variadic);
        if variadic_count > 1 || (variadic_count == 1 && !last_is_variadic) {
            return Err(CheckError::MalformedSignature(
                "variadic parameter must be last and unique".to_string(),
            ));
        }

        let ret = match ret {
            Some(raw) => Some(ReturnAnnotation {
                ty: self.parse_type(&raw.type_text)?,
                is_variadic_marker: raw.has_ellipsis,
            }),
            None => None,
        };

        Ok(DeclaredSignature {
            params: declared,
            ret,
        })
    }
}

/// `$args` → `args`; `...$args` → (`args`, true).
fn split_param_name(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim();
    let (rest, ellipsis) = match trimmed.strip_prefix(ELLIPSIS) {
        Some(rest) => (rest.trim_start(), true),
        None => (trimmed, false),
    };
    (rest.trim_start_matches('$'), ellipsis)
}

fn is_qualified_name(text: &str) -> bool {
    let body = text.strip_prefix('\\').unwrap_or(text);
    !body.is_empty() && body.split('\\').all(is_segment)
}

fn is_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
