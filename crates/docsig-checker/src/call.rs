//! Call-site checking against a [`ResolvedSignature`].
//!
//! Fixed parameters are matched positionally. Trailing arguments of a
//! consistent variadic are each checked against the element type; every
//! argument is judged on its own, so distinct implementations of one
//! interface may share a variadic tail. A plain-array tail only needs an
//! argument of array shape.

use docsig_types::TypeDescriptor;
use tracing::trace;

use crate::error::CheckError;
use crate::hierarchy::ClassHierarchy;
use crate::reconcile::{Reconciliation, ResolvedSignature};
use crate::ty::check_assignable;

/// Checks argument lists against resolved signatures.
#[derive(Debug, Clone, Copy)]
pub struct CallSiteChecker<'h> {
    hierarchy: &'h ClassHierarchy,
}

impl<'h> CallSiteChecker<'h> {
    pub fn new(hierarchy: &'h ClassHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Check one call. Returns every problem found, in argument order
    /// after any arity problem; an empty list means the call is well-typed.
    pub fn check_call(&self, sig: &ResolvedSignature, args: &[TypeDescriptor]) -> Vec<CheckError> {
        let mut errors = Vec::new();
        let k = sig.fixed_arity();
        let n = args.len();

        let min = sig.min_arity();
        if n < min {
            errors.push(CheckError::ArityMismatch(format!(
                "'{}' expects at least {} argument{}, got {}",
                sig.function,
                min,
                if min == 1 { "" } else { "s" },
                n
            )));
        }
        if let Some(max) = sig.max_arity() {
            if n > max {
                errors.push(CheckError::ArityMismatch(format!(
                    "'{}' expects at most {} argument{}, got {}",
                    sig.function,
                    max,
                    if max == 1 { "" } else { "s" },
                    n
                )));
            }
        }

        for (i, (arg, param)) in args.iter().zip(&sig.fixed).enumerate() {
            if let Some(expected) = &param.ty {
                self.check_argument(i, arg, expected, &mut errors);
            }
        }

        let Some(tail) = &sig.tail else {
            return errors;
        };
        match sig.reconciliation {
            Reconciliation::Consistent => {
                if let Some(element) = &tail.element {
                    for (i, arg) in args.iter().enumerate().skip(k) {
                        self.check_argument(i, arg, element, &mut errors);
                    }
                }
            }
            Reconciliation::ActualIsPlainArray => {
                if let Some(arg) = args.get(k) {
                    if !arg.is_array() {
                        errors.push(CheckError::TypeMismatch {
                            position: k,
                            expected: "array".to_string(),
                            found: arg.to_string(),
                        });
                    }
                }
            }
        }
        errors
    }

    fn check_argument(
        &self,
        position: usize,
        arg: &TypeDescriptor,
        expected: &TypeDescriptor,
        errors: &mut Vec<CheckError>,
    ) {
        match check_assignable(arg, expected, self.hierarchy) {
            Ok(true) => trace!(position, %arg, %expected, "argument accepted"),
            Ok(false) => errors.push(CheckError::TypeMismatch {
                position,
                expected: expected.to_string(),
                found: arg.to_string(),
            }),
            Err(CheckError::UnknownType { name, .. }) => errors.push(CheckError::UnknownType {
                name,
                position: Some(position),
            }),
            Err(other) => errors.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{ResolvedParam, VariadicTail};
    use docsig_types::{ErrorCode, ScalarKind};

    fn int() -> TypeDescriptor {
        TypeDescriptor::scalar(ScalarKind::Int)
    }

    fn string() -> TypeDescriptor {
        TypeDescriptor::scalar(ScalarKind::String)
    }

    fn variadic_ints(reconciliation: Reconciliation) -> ResolvedSignature {
        ResolvedSignature {
            function: "f".into(),
            fixed: vec![],
            tail: Some(VariadicTail {
                name: "args".into(),
                element: Some(int()),
                has_default: false,
            }),
            reconciliation,
            ret: None,
        }
    }

    #[test]
    fn test_variadic_accepts_any_count() {
        let h = ClassHierarchy::empty();
        let c = CallSiteChecker::new(&h);
        let sig = variadic_ints(Reconciliation::Consistent);
        assert!(c.check_call(&sig, &[]).is_empty());
        assert!(c.check_call(&sig, &[int()]).is_empty());
        assert!(c.check_call(&sig, &[int(), int(), int()]).is_empty());
    }

    #[test]
    fn test_variadic_reports_exact_position() {
        let h = ClassHierarchy::empty();
        let c = CallSiteChecker::new(&h);
        let sig = variadic_ints(Reconciliation::Consistent);
        let errors = c.check_call(&sig, &[int(), string(), int(), string()]);
        let positions: Vec<_> = errors.iter().map(|e| e.position()).collect();
        assert_eq!(positions, vec![Some(1), Some(3)]);
        assert!(errors.iter().all(|e| e.code() == ErrorCode::TYPE_MISMATCH));
    }

    #[test]
    fn test_fixed_prefix_then_tail() {
        let h = ClassHierarchy::empty();
        let c = CallSiteChecker::new(&h);
        let mut sig = variadic_ints(Reconciliation::Consistent);
        sig.fixed.push(ResolvedParam {
            name: "prefix".into(),
            ty: Some(string()),
            has_default: false,
        });
        assert!(c.check_call(&sig, &[string(), int()]).is_empty());

        let errors = c.check_call(&sig, &[int()]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].position(), Some(0));

        let errors = c.check_call(&sig, &[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), ErrorCode::ARITY_MISMATCH);
    }

    #[test]
    fn test_fixed_arity_limits() {
        let h = ClassHierarchy::empty();
        let c = CallSiteChecker::new(&h);
        let sig = ResolvedSignature {
            function: "pair".into(),
            fixed: vec![
                ResolvedParam {
                    name: "a".into(),
                    ty: Some(int()),
                    has_default: false,
                },
                ResolvedParam {
                    name: "b".into(),
                    ty: Some(int()),
                    has_default: true,
                },
            ],
            tail: None,
            reconciliation: Reconciliation::Consistent,
            ret: None,
        };
        assert!(c.check_call(&sig, &[int()]).is_empty());
        let too_many = c.check_call(&sig, &[int(), int(), int()]);
        assert_eq!(too_many.len(), 1);
        assert_eq!(
            too_many[0].to_string(),
            "'pair' expects at most 2 arguments, got 3"
        );
        let too_few = c.check_call(&sig, &[]);
        assert_eq!(too_few[0].to_string(), "'pair' expects at least 1 argument, got 0");
    }

    #[test]
    fn test_plain_array_only_checks_shape() {
        let h = ClassHierarchy::empty();
        let c = CallSiteChecker::new(&h);
        let sig = variadic_ints(Reconciliation::ActualIsPlainArray);
        // Element types are not verified.
        assert!(c
            .check_call(&sig, &[TypeDescriptor::array_of(string())])
            .is_empty());
        let not_array = c.check_call(&sig, &[int()]);
        assert_eq!(not_array.len(), 1);
        assert_eq!(not_array[0].code(), ErrorCode::TYPE_MISMATCH);
        assert_eq!(not_array[0].position(), Some(0));
        let missing = c.check_call(&sig, &[]);
        assert_eq!(missing[0].code(), ErrorCode::ARITY_MISMATCH);
        let extra = c.check_call(
            &sig,
            &[TypeDescriptor::array_of(int()), TypeDescriptor::array_of(int())],
        );
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].code(), ErrorCode::ARITY_MISMATCH);
    }

    #[test]
    fn test_unknown_argument_type() {
        let h = ClassHierarchy::empty();
        let c = CallSiteChecker::new(&h);
        let mut sig = variadic_ints(Reconciliation::Consistent);
        if let Some(tail) = sig.tail.as_mut() {
            tail.element = Some(TypeDescriptor::interface("Shape"));
        }
        let errors = c.check_call(&sig, &[TypeDescriptor::class("Circle")]);
        assert_eq!(
            errors,
            vec![CheckError::UnknownType {
                name: "Shape".into(),
                position: Some(0),
            }]
        );
    }

    #[test]
    fn test_unchecked_signature_accepts_anything() {
        let h = ClassHierarchy::empty();
        let c = CallSiteChecker::new(&h);
        let mut sig = variadic_ints(Reconciliation::Consistent);
        if let Some(tail) = sig.tail.as_mut() {
            tail.element = None;
        }
        assert!(c
            .check_call(&sig, &[int(), string(), TypeDescriptor::class("X")])
            .is_empty());
    }
}
