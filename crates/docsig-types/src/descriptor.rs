//! Type descriptors shared between the checker and its hosts.
//!
//! [`TypeDescriptor`] is the closed set of types an annotation can name and
//! a call site can supply. Assignability lives in the checker crate because
//! it needs the class hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Scalars
// ══════════════════════════════════════════════════════════════════════════════

/// A leaf scalar kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Bool,
    Null,
    Void,
}

impl ScalarKind {
    /// All scalar kinds, in declaration order.
    pub const ALL: [ScalarKind; 6] = [
        ScalarKind::Int,
        ScalarKind::Float,
        ScalarKind::String,
        ScalarKind::Bool,
        ScalarKind::Null,
        ScalarKind::Void,
    ];

    /// Map an annotation keyword to a scalar kind.
    ///
    /// Keywords are case-insensitive and accept the long aliases
    /// (`integer`, `double`, `boolean`).
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(Self::Int),
            "float" | "double" => Some(Self::Float),
            "string" => Some(Self::String),
            "bool" | "boolean" => Some(Self::Bool),
            "null" => Some(Self::Null),
            "void" => Some(Self::Void),
            _ => None,
        }
    }

    /// Canonical keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Null => "null",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Named categories
// ══════════════════════════════════════════════════════════════════════════════

/// Whether a named type is a class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Class,
    Interface,
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Interface => write!(f, "interface"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// TypeDescriptor
// ══════════════════════════════════════════════════════════════════════════════

/// An immutable, structurally compared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// `int`, `string`, ...
    Scalar(ScalarKind),
    /// `T[]`, nests arbitrarily (`int[][]`).
    ArrayOf(Box<TypeDescriptor>),
    /// The bare `array` keyword: some array, element type unstated.
    AnyArray,
    /// A class or interface, by name.
    Named {
        name: String,
        category: TypeCategory,
    },
}

impl TypeDescriptor {
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::ArrayOf(Box::new(element))
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            category: TypeCategory::Class,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            category: TypeCategory::Interface,
        }
    }

    /// True for `ArrayOf(_)` and `AnyArray`.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::ArrayOf(_) | Self::AnyArray)
    }

    /// Number of array layers around the innermost element. `AnyArray`
    /// counts as one.
    pub fn array_depth(&self) -> usize {
        match self {
            Self::ArrayOf(inner) => 1 + inner.array_depth(),
            Self::AnyArray => 1,
            _ => 0,
        }
    }

    /// The innermost non-array type.
    pub fn base(&self) -> &TypeDescriptor {
        match self {
            Self::ArrayOf(inner) => inner.base(),
            other => other,
        }
    }

    /// The class/interface name at the base of this type, if any.
    pub fn named_base(&self) -> Option<&str> {
        match self.base() {
            Self::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::ArrayOf(inner) => write!(f, "{inner}[]"),
            Self::AnyArray => f.write_str("array"),
            Self::Named { name, .. } => write!(f, "{name}"),
        }
    }
}
