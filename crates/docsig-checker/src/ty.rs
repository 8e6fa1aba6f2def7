//! Assignability between [`TypeDescriptor`]s.
//!
//! Rules:
//! - scalars match exactly, no numeric widening
//! - arrays are covariant in their element type, depth must agree
//! - any array fits the bare `array` target; `array` itself fits no typed
//!   array because its elements are unknown
//! - a named type is assignable to itself, to any interface in its supertype
//!   closure, and (if a class) to any ancestor class
//! - every other pairing is rejected

use docsig_types::{TypeCategory, TypeDescriptor};

use crate::error::{CheckError, CheckResult};
use crate::hierarchy::{normalize_name, ClassHierarchy};

/// Whether a value of type `from` may be used where `to` is expected.
///
/// Unregistered names make the answer `false`; use [`check_assignable`] to
/// tell "not assignable" apart from "cannot verify".
pub fn assignable(from: &TypeDescriptor, to: &TypeDescriptor, hierarchy: &ClassHierarchy) -> bool {
    check_assignable(from, to, hierarchy).unwrap_or(false)
}

/// Like [`assignable`], but reports unregistered names as
/// [`CheckError::UnknownType`].
pub fn check_assignable(
    from: &TypeDescriptor,
    to: &TypeDescriptor,
    hierarchy: &ClassHierarchy,
) -> CheckResult<bool> {
    match (from, to) {
        (TypeDescriptor::Scalar(a), TypeDescriptor::Scalar(b)) => Ok(a == b),
        (TypeDescriptor::ArrayOf(a), TypeDescriptor::ArrayOf(b)) => {
            check_assignable(a, b, hierarchy)
        }
        (TypeDescriptor::ArrayOf(_) | TypeDescriptor::AnyArray, TypeDescriptor::AnyArray) => {
            Ok(true)
        }
        (
            TypeDescriptor::Named {
                name: a,
                category: from_category,
            },
            TypeDescriptor::Named { name: b, .. },
        ) => {
            let (a, b) = (normalize_name(a), normalize_name(b));
            if a == b {
                return Ok(true);
            }
            // The registry decides categories. An unregistered source keeps
            // the category the host gave it.
            let source = hierarchy.kind_of(a).unwrap_or(*from_category);
            let target = match hierarchy.kind_of(b) {
                Some(kind) => kind,
                None => return Err(CheckError::unknown_type(b)),
            };
            match (source, target) {
                (_, TypeCategory::Interface) | (TypeCategory::Class, TypeCategory::Class) => {
                    Ok(hierarchy.transitive_supertypes(a)?.contains(b))
                }
                (TypeCategory::Interface, TypeCategory::Class) => Ok(false),
            }
        }
        _ => Ok(false),
    }
}
