//! Tag extraction from raw documentation comments.
//!
//! Only the tags the checker consumes are split into fields:
//!
//! ```text
//! @param  <type> [...]$name [description]
//! @return <type> [...$]     [description]
//! ```
//!
//! Every other `@tag` is recorded by name so hosts can gate on markers such
//! as `@kphp-infer`.

use docsig_types::{RawParamAnnotation, RawReturnAnnotation};

/// The annotation entries found in one doc comment, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub params: Vec<RawParamAnnotation>,
    pub ret: Option<RawReturnAnnotation>,
    /// Names of all other tags, without the `@`.
    pub tags: Vec<String>,
}

impl DocBlock {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Split a `/** ... */` comment into its annotation entries.
///
/// A second `@return` replaces the first.
pub fn parse_doc_comment(text: &str) -> DocBlock {
    let mut block = DocBlock::default();

    for line in text.lines() {
        let line = strip_decoration(line);
        let Some(tagged) = line.strip_prefix('@') else {
            continue;
        };
        let mut words = tagged.split_whitespace();
        let Some(tag) = words.next() else {
            continue;
        };
        match tag {
            "param" => {
                let type_text = words.next().unwrap_or_default();
                let name = words.next().unwrap_or_default();
                let (param_name, has_ellipsis) = match name.strip_prefix("...") {
                    Some(rest) => (rest, true),
                    None => (name, false),
                };
                block.params.push(RawParamAnnotation {
                    type_text: type_text.to_string(),
                    param_name: param_name.to_string(),
                    has_ellipsis,
                });
            }
            "return" => {
                let type_text = words.next().unwrap_or_default();
                let has_ellipsis = words.next().is_some_and(|w| w.starts_with("..."));
                block.ret = Some(RawReturnAnnotation {
                    type_text: type_text.to_string(),
                    has_ellipsis,
                });
            }
            other => block.tags.push(other.to_string()),
        }
    }

    block
}

/// Remove comment delimiters and the leading `*` gutter.
fn strip_decoration(line: &str) -> &str {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix("/**") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest;
    }
    line.trim().trim_start_matches('*').trim()
}
