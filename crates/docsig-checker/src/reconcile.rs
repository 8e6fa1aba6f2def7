//! Reconciles a [`DeclaredSignature`] with the real parameter list.
//!
//! The annotation must document the actual parameters one-to-one, in order
//! and by name. The interesting case is the trailing parameter:
//!
//! | annotation  | declaration            | result                      |
//! |-------------|------------------------|-----------------------------|
//! | `T ...$a`   | `...$a`                | `Consistent`, variadic tail |
//! | `T ...$a`   | `$a` or `array $a`     | `ActualIsPlainArray`        |
//! | `T ...$a`   | `int $a` (other hint)  | malformed                   |
//! | `T $a`      | `...$a`                | malformed                   |

use docsig_types::{ActualParam, TypeDescriptor};
use serde::Serialize;
use tracing::debug;

use crate::annotation::{DeclaredSignature, ReturnAnnotation};
use crate::error::{CheckError, CheckResult};

/// How the declared variadic tail relates to the real declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// Annotation and declaration agree.
    Consistent,
    /// Annotated as variadic, but the declaration takes one plain parameter
    /// that receives an array. Elements are not checked.
    ActualIsPlainArray,
}

/// A fixed (non-variadic) parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedParam {
    pub name: String,
    /// `None` when the function carries no annotations.
    pub ty: Option<TypeDescriptor>,
    pub has_default: bool,
}

/// The trailing parameter that collects the variadic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariadicTail {
    pub name: String,
    /// Declared element type, `None` when unannotated.
    pub element: Option<TypeDescriptor>,
    /// Only meaningful for `ActualIsPlainArray`.
    pub has_default: bool,
}

/// A declared signature reconciled against the real parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSignature {
    pub function: String,
    pub fixed: Vec<ResolvedParam>,
    pub tail: Option<VariadicTail>,
    pub reconciliation: Reconciliation,
    pub ret: Option<ReturnAnnotation>,
}

impl ResolvedSignature {
    /// Number of fixed parameters.
    pub fn fixed_arity(&self) -> usize {
        self.fixed.len()
    }

    /// Fewest arguments a call may pass.
    pub fn min_arity(&self) -> usize {
        if self.reconciliation == Reconciliation::ActualIsPlainArray
            && self.tail.as_ref().is_some_and(|t| !t.has_default)
        {
            return self.fixed.len() + 1;
        }
        self.fixed
            .iter()
            .rposition(|p| !p.has_default)
            .map_or(0, |i| i + 1)
    }

    /// Most arguments a call may pass, `None` for a true variadic.
    pub fn max_arity(&self) -> Option<usize> {
        match (&self.tail, self.reconciliation) {
            (None, _) => Some(self.fixed.len()),
            (Some(_), Reconciliation::ActualIsPlainArray) => Some(self.fixed.len() + 1),
            (Some(_), Reconciliation::Consistent) => None,
        }
    }
}

/// Reconcile `declared` with the real parameter list of `function`.
///
/// A function without any `@param` entries yields an unchecked signature
/// shaped after `actual`.
pub fn reconcile(
    function: &str,
    declared: &DeclaredSignature,
    actual: &[ActualParam],
) -> CheckResult<ResolvedSignature> {
    if let Some(pos) = actual.iter().position(|p| p.is_variadic) {
        if pos + 1 != actual.len() {
            return Err(CheckError::MalformedSignature(format!(
                "variadic parameter ${} of '{}' is not the last parameter",
                actual[pos].name, function
            )));
        }
    }

    if !declared.has_params() {
        return Ok(unchecked(function, declared, actual));
    }

    if declared.params.len() != actual.len() {
        return Err(CheckError::MalformedSignature(format!(
            "annotation documents {} parameter{} but '{}' declares {}",
            declared.params.len(),
            if declared.params.len() == 1 { "" } else { "s" },
            function,
            actual.len()
        )));
    }

    let mut fixed = Vec::with_capacity(actual.len());
    let mut tail = None;
    let mut reconciliation = Reconciliation::Consistent;

    for (doc, real) in declared.params.iter().zip(actual) {
        let real_name = real.name.trim_start_matches('$');
        if doc.name != real_name {
            return Err(CheckError::MalformedSignature(format!(
                "annotation documents ${} at position {}, but the parameter is ${}",
                doc.name, doc.position, real_name
            )));
        }

        match (doc.is_variadic, real.is_variadic) {
            (true, true) => {
                tail = Some(VariadicTail {
                    name: doc.name.clone(),
                    element: Some(doc.ty.clone()),
                    has_default: false,
                });
            }
            (true, false) => {
                if let Some(hint) = real.type_hint.as_deref() {
                    if !hint.trim().eq_ignore_ascii_case("array") {
                        return Err(CheckError::MalformedSignature(format!(
                            "${} is annotated as variadic {} but declared as a fixed '{}' parameter",
                            doc.name,
                            doc.ty,
                            hint.trim()
                        )));
                    }
                }
                reconciliation = Reconciliation::ActualIsPlainArray;
                tail = Some(VariadicTail {
                    name: doc.name.clone(),
                    element: Some(doc.ty.clone()),
                    has_default: real.has_default,
                });
            }
            (false, true) => {
                return Err(CheckError::MalformedSignature(format!(
                    "${} is variadic but its annotation lacks '...'",
                    doc.name
                )));
            }
            (false, false) => fixed.push(ResolvedParam {
                name: doc.name.clone(),
                ty: Some(doc.ty.clone()),
                has_default: real.has_default,
            }),
        }
    }

    debug!(function, ?reconciliation, fixed = fixed.len(), "signature reconciled");
    Ok(ResolvedSignature {
        function: function.to_string(),
        fixed,
        tail,
        reconciliation,
        ret: declared.ret.clone(),
    })
}

fn unchecked(function: &str, declared: &DeclaredSignature, actual: &[ActualParam]) -> ResolvedSignature {
    let mut fixed = Vec::with_capacity(actual.len());
    let mut tail = None;
    for real in actual {
        let name = real.name.trim_start_matches('$').to_string();
        if real.is_variadic {
            tail = Some(VariadicTail {
                name,
                element: None,
                has_default: false,
            });
        } else {
            fixed.push(ResolvedParam {
                name,
                ty: None,
                has_default: real.has_default,
            });
        }
    }
    debug!(function, "no @param annotations, signature left unchecked");
    ResolvedSignature {
        function: function.to_string(),
        fixed,
        tail,
        reconciliation: Reconciliation::Consistent,
        ret: declared.ret.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::DeclaredParam;
    use docsig_types::{ErrorCode, ScalarKind};

    fn int() -> TypeDescriptor {
        TypeDescriptor::scalar(ScalarKind::Int)
    }

    fn declared(params: &[(&str, bool)]) -> DeclaredSignature {
        DeclaredSignature {
            params: params
                .iter()
                .enumerate()
                .map(|(position, (name, is_variadic))| DeclaredParam {
                    position,
                    name: name.to_string(),
                    ty: int(),
                    is_variadic: *is_variadic,
                })
                .collect(),
            ret: None,
        }
    }

    #[test]
    fn test_fixed_only() {
        let sig = reconcile(
            "f",
            &declared(&[("a", false), ("b", false)]),
            &[ActualParam::new("a"), ActualParam::new("b").with_default()],
        )
        .unwrap();
        assert_eq!(sig.reconciliation, Reconciliation::Consistent);
        assert_eq!(sig.fixed_arity(), 2);
        assert_eq!(sig.min_arity(), 1);
        assert_eq!(sig.max_arity(), Some(2));
        assert!(sig.tail.is_none());
    }

    #[test]
    fn test_variadic_both_sides() {
        let sig = reconcile(
            "get_int_args",
            &declared(&[("args", true)]),
            &[ActualParam::variadic("args")],
        )
        .unwrap();
        assert_eq!(sig.reconciliation, Reconciliation::Consistent);
        assert_eq!(sig.fixed_arity(), 0);
        assert_eq!(sig.min_arity(), 0);
        assert_eq!(sig.max_arity(), None);
        assert_eq!(sig.tail.unwrap().element, Some(int()));
    }

    #[test]
    fn test_variadic_doc_plain_array_param() {
        for param in [ActualParam::new("args"), ActualParam::new("args").with_hint("array")] {
            let sig = reconcile("get_varg_in_phpdoc_but_array", &declared(&[("args", true)]), &[param])
                .unwrap();
            assert_eq!(sig.reconciliation, Reconciliation::ActualIsPlainArray);
            assert_eq!(sig.min_arity(), 1);
            assert_eq!(sig.max_arity(), Some(1));
        }
    }

    #[test]
    fn test_plain_array_with_default_is_optional() {
        let sig = reconcile(
            "f",
            &declared(&[("args", true)]),
            &[ActualParam::new("args").with_default()],
        )
        .unwrap();
        assert_eq!(sig.min_arity(), 0);
    }

    #[test]
    fn test_variadic_doc_scalar_hint_is_malformed() {
        let err = reconcile(
            "f",
            &declared(&[("args", true)]),
            &[ActualParam::new("args").with_hint("int")],
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MALFORMED_SIGNATURE);
        assert!(err.to_string().contains("fixed 'int' parameter"));
    }

    #[test]
    fn test_variadic_decl_without_marker_is_malformed() {
        let err = reconcile("f", &declared(&[("args", false)]), &[ActualParam::variadic("args")])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MALFORMED_SIGNATURE);
    }

    #[test]
    fn test_count_and_name_disagreement() {
        let count = reconcile("f", &declared(&[("a", false)]), &[]).unwrap_err();
        assert!(count.to_string().contains("documents 1 parameter but 'f' declares 0"));
        let name = reconcile("f", &declared(&[("a", false)]), &[ActualParam::new("$b")])
            .unwrap_err();
        assert!(name.to_string().contains("parameter is $b"));
    }

    #[test]
    fn test_unannotated_function_is_unchecked() {
        let sig = reconcile(
            "f",
            &DeclaredSignature::default(),
            &[ActualParam::new("x"), ActualParam::variadic("rest")],
        )
        .unwrap();
        assert_eq!(sig.fixed[0].ty, None);
        assert_eq!(sig.tail.unwrap().element, None);
        assert_eq!(sig.reconciliation, Reconciliation::Consistent);
    }

    #[test]
    fn test_misplaced_actual_variadic() {
        let err = reconcile(
            "f",
            &DeclaredSignature::default(),
            &[ActualParam::variadic("rest"), ActualParam::new("x")],
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MALFORMED_SIGNATURE);
    }
}
