//! Declarations handed to the checker by the parsing layer.
//!
//! Every node optionally carries a [`Span`] for diagnostics.
//! Order is significant everywhere: parameters, annotations, arguments and
//! the declarations inside a [`CheckUnit`] are kept in source order.

use serde::{Deserialize, Serialize};

use crate::{Span, TypeCategory, TypeDescriptor};

// ══════════════════════════════════════════════════════════════════════════════
// Classes
// ══════════════════════════════════════════════════════════════════════════════

/// `class Name extends Parent implements I1, I2` / `interface Name extends I1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    pub kind: TypeCategory,
    #[serde(default)]
    pub declared_supertypes: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

impl ClassDeclaration {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeCategory::Class,
            declared_supertypes: Vec::new(),
            span: Span::unknown(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeCategory::Interface,
            declared_supertypes: Vec::new(),
            span: Span::unknown(),
        }
    }

    /// Add a direct supertype (parent class or implemented/extended interface).
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.declared_supertypes.push(supertype.into());
        self
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// A parameter as written in the real (non-annotation) parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualParam {
    pub name: String,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub has_default: bool,
    /// Runtime type hint, e.g. `array` in `function f(array $args)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

impl ActualParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_variadic: false,
            has_default: false,
            type_hint: None,
        }
    }

    pub fn variadic(name: impl Into<String>) -> Self {
        Self {
            is_variadic: true,
            ..Self::new(name)
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }
}

/// One `@param <type> [...]$name` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParamAnnotation {
    pub type_text: String,
    pub param_name: String,
    #[serde(default)]
    pub has_ellipsis: bool,
}

/// The `@return <type> [...$]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReturnAnnotation {
    pub type_text: String,
    #[serde(default)]
    pub has_ellipsis: bool,
}

/// A function declaration with its documentation annotations.
///
/// Annotations come either pre-split (`raw_doc_annotations`,
/// `raw_return_annotation`) or as the raw `doc_comment` text; pre-split
/// entries take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default)]
    pub actual_parameters: Vec<ActualParam>,
    #[serde(default)]
    pub raw_doc_annotations: Vec<RawParamAnnotation>,
    #[serde(default)]
    pub raw_return_annotation: Option<RawReturnAnnotation>,
    /// Other doc tags that accompany pre-split annotations, without the `@`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub span: Span,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actual_parameters: Vec::new(),
            raw_doc_annotations: Vec::new(),
            raw_return_annotation: None,
            doc_tags: Vec::new(),
            doc_comment: None,
            span: Span::unknown(),
        }
    }

    pub fn param(mut self, param: ActualParam) -> Self {
        self.actual_parameters.push(param);
        self
    }

    /// Add an `@param` annotation.
    pub fn doc_param(
        mut self,
        type_text: impl Into<String>,
        param_name: impl Into<String>,
        has_ellipsis: bool,
    ) -> Self {
        self.raw_doc_annotations.push(RawParamAnnotation {
            type_text: type_text.into(),
            param_name: param_name.into(),
            has_ellipsis,
        });
        self
    }

    /// Set the `@return` annotation.
    pub fn doc_return(mut self, type_text: impl Into<String>, has_ellipsis: bool) -> Self {
        self.raw_return_annotation = Some(RawReturnAnnotation {
            type_text: type_text.into(),
            has_ellipsis,
        });
        self
    }

    /// Record a tag such as `kphp-infer` (leading `@` optional).
    pub fn doc_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.doc_tags
            .push(tag.strip_prefix('@').unwrap_or(&tag).to_string());
        self
    }

    pub fn doc_comment(mut self, text: impl Into<String>) -> Self {
        self.doc_comment = Some(text.into());
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Calls
// ══════════════════════════════════════════════════════════════════════════════

/// `callee(arg0, arg1, ...)` with the inferred type of each argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub callee_name: String,
    #[serde(default)]
    pub argument_types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub span: Span,
}

impl CallExpression {
    pub fn new(callee_name: impl Into<String>, argument_types: Vec<TypeDescriptor>) -> Self {
        Self {
            callee_name: callee_name.into(),
            argument_types,
            span: Span::unknown(),
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Unit
// ══════════════════════════════════════════════════════════════════════════════

/// Everything one checking pass looks at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckUnit {
    #[serde(default)]
    pub classes: Vec<ClassDeclaration>,
    #[serde(default)]
    pub functions: Vec<FunctionDeclaration>,
    #[serde(default)]
    pub calls: Vec<CallExpression>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarKind;

    #[test]
    fn test_function_builder_keeps_order() {
        let f = FunctionDeclaration::new("get_int_args")
            .param(ActualParam::new("a"))
            .param(ActualParam::variadic("args"))
            .doc_param("string", "$a", false)
            .doc_param("int", "$args", true);
        assert_eq!(f.actual_parameters[0].name, "a");
        assert!(f.actual_parameters[1].is_variadic);
        assert_eq!(f.raw_doc_annotations[1].type_text, "int");
        assert!(f.raw_doc_annotations[1].has_ellipsis);

        let tagged = FunctionDeclaration::new("f").doc_tag("@kphp-infer").doc_tag("pure");
        assert_eq!(tagged.doc_tags, vec!["kphp-infer", "pure"]);
    }

    #[test]
    fn test_unit_from_json_defaults() {
        let unit: CheckUnit = serde_json::from_str(
            r#"{
                "classes": [{ "name": "Stub", "kind": "class" }],
                "functions": [{
                    "name": "f",
                    "actual_parameters": [{ "name": "args", "is_variadic": true }],
                    "raw_doc_annotations": [
                        { "type_text": "int", "param_name": "$args", "has_ellipsis": true }
                    ]
                }],
                "calls": [{ "callee_name": "f", "argument_types": [{ "scalar": "int" }] }]
            }"#,
        )
        .unwrap();
        assert!(unit.classes[0].declared_supertypes.is_empty());
        assert!(unit.functions[0].actual_parameters[0].is_variadic);
        assert!(!unit.functions[0].actual_parameters[0].has_default);
        assert_eq!(
            unit.calls[0].argument_types,
            vec![TypeDescriptor::scalar(ScalarKind::Int)]
        );
        assert!(unit.calls[0].span.is_unknown());
    }
}
