//! docsig driver: runs one [`CheckUnit`] through every component.
//!
//! Entry point: [`SignatureChecker::check`].
//!
//! Order of work:
//! 1. register every class/interface, then freeze the hierarchy
//! 2. parse and reconcile each function's annotations
//! 3. check each call against its callee's resolved signature
//!
//! Steps 2 and 3 are independent per item and run on the rayon pool when
//! [`CheckerConfig::parallel`] is set. Results are merged in input order,
//! so the report is identical either way.

use std::collections::{BTreeMap, HashSet};

use docsig_types::{
    CallExpression, CheckUnit, Diagnostic, Diagnostics, ErrorCode, FunctionDeclaration, SiteRef,
};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::annotation::AnnotationParser;
use crate::call::CallSiteChecker;
use crate::config::CheckerConfig;
use crate::docblock::{self, DocBlock};
use crate::error::CheckError;
use crate::hierarchy::ClassHierarchy;
use crate::reconcile::{reconcile, ResolvedSignature};

// ══════════════════════════════════════════════════════════════════════════════
// Report
// ══════════════════════════════════════════════════════════════════════════════

/// Everything one pass produced.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub diagnostics: Diagnostics,
    /// Resolved signature of every function that reconciled, by name.
    pub signatures: BTreeMap<String, ResolvedSignature>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn signature(&self, function: &str) -> Option<&ResolvedSignature> {
        self.signatures.get(function)
    }

    /// SHA-256 over the rendered diagnostics, as lowercase hex.
    ///
    /// Equal inputs give equal fingerprints.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for diagnostic in self.diagnostics.iter() {
            hasher.update(format!("{diagnostic}|{:?}\n", diagnostic.position).as_bytes());
        }
        hasher.update(
            format!(
                "{}/{}",
                self.diagnostics.total_errors, self.diagnostics.total_warnings
            )
            .as_bytes(),
        );
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// SignatureChecker
// ══════════════════════════════════════════════════════════════════════════════

struct FunctionOutcome {
    signature: Option<ResolvedSignature>,
    diagnostics: Vec<Diagnostic>,
}

/// Checks annotated function signatures and their call sites.
#[derive(Debug, Clone, Default)]
pub struct SignatureChecker {
    config: CheckerConfig,
}

impl SignatureChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check a complete unit.
    pub fn check(&self, unit: &CheckUnit) -> CheckReport {
        let mut diagnostics = Diagnostics::with_limit(self.config.max_errors);

        // 1. Hierarchy
        let mut hierarchy_diagnostics = Vec::new();
        let hierarchy = ClassHierarchy::build(&unit.classes, &mut hierarchy_diagnostics);
        diagnostics.extend(hierarchy_diagnostics);

        // 2. Signatures (first declaration of a name wins)
        let mut seen = HashSet::new();
        let mut functions: Vec<&FunctionDeclaration> = Vec::with_capacity(unit.functions.len());
        for decl in &unit.functions {
            if seen.insert(decl.name.as_str()) {
                functions.push(decl);
            } else {
                diagnostics.push(
                    CheckError::DuplicateDeclaration {
                        name: decl.name.clone(),
                        detail: "function already declared in this unit".to_string(),
                    }
                    .into_diagnostic(
                        SiteRef::Declaration {
                            function: decl.name.clone(),
                        },
                        decl.span,
                    ),
                );
            }
        }

        let outcomes = self.map_ordered(&functions, |_, decl| {
            self.resolve_function(decl, &hierarchy)
        });
        let mut signatures = BTreeMap::new();
        let mut failed: HashSet<&str> = HashSet::new();
        for (decl, outcome) in functions.iter().zip(outcomes) {
            diagnostics.extend(outcome.diagnostics);
            match outcome.signature {
                Some(sig) => {
                    signatures.insert(decl.name.clone(), sig);
                }
                None => {
                    failed.insert(decl.name.as_str());
                }
            }
        }

        // 3. Calls
        let call_checker = CallSiteChecker::new(&hierarchy);
        let per_call = self.map_ordered(&unit.calls, |index, call| {
            self.check_call(index, call, &signatures, &failed, call_checker)
        });
        for call_diagnostics in per_call {
            diagnostics.extend(call_diagnostics);
        }

        debug!(
            classes = hierarchy.len(),
            functions = signatures.len(),
            calls = unit.calls.len(),
            errors = diagnostics.total_errors,
            warnings = diagnostics.total_warnings,
            "unit checked"
        );

        CheckReport {
            diagnostics,
            signatures,
        }
    }

    fn resolve_function(
        &self,
        decl: &FunctionDeclaration,
        hierarchy: &ClassHierarchy,
    ) -> FunctionOutcome {
        let site = SiteRef::Declaration {
            function: decl.name.clone(),
        };
        let mut diagnostics = Vec::new();
        let mut doc = annotations_of(decl);

        if let Some(tag) = &self.config.required_doc_tag {
            let tag = tag.trim().trim_start_matches('@');
            if !doc.has_tag(tag) {
                debug!(function = %decl.name, tag, "required doc tag missing, annotations ignored");
                doc = DocBlock::default();
            }
        }

        let parser = AnnotationParser::new(hierarchy);
        let declared = match parser.parse_signature(&doc.params, doc.ret.as_ref()) {
            Ok(declared) => declared,
            Err(err) => {
                debug!(function = %decl.name, %err, "annotation rejected");
                diagnostics.push(err.into_diagnostic(site, decl.span));
                return FunctionOutcome {
                    signature: None,
                    diagnostics,
                };
            }
        };

        if self.config.report_unresolved_annotation_types {
            for name in declared.unresolved_names(hierarchy) {
                diagnostics.push(
                    CheckError::unknown_type(&name)
                        .into_diagnostic(site.clone(), decl.span)
                        .with_suggestion(format!("declare class or interface '{name}'")),
                );
            }
        }

        match reconcile(&decl.name, &declared, &decl.actual_parameters) {
            Ok(signature) => FunctionOutcome {
                signature: Some(signature),
                diagnostics,
            },
            Err(err) => {
                debug!(function = %decl.name, %err, "reconciliation failed");
                diagnostics.push(err.into_diagnostic(site, decl.span));
                FunctionOutcome {
                    signature: None,
                    diagnostics,
                }
            }
        }
    }

    fn check_call(
        &self,
        index: usize,
        call: &CallExpression,
        signatures: &BTreeMap<String, ResolvedSignature>,
        failed: &HashSet<&str>,
        checker: CallSiteChecker<'_>,
    ) -> Vec<Diagnostic> {
        let site = SiteRef::Call {
            callee: call.callee_name.clone(),
            index,
        };

        let Some(sig) = signatures.get(&call.callee_name) else {
            if failed.contains(call.callee_name.as_str()) {
                trace!(callee = %call.callee_name, index, "callee signature invalid, call skipped");
                return Vec::new();
            }
            if self.config.report_unknown_callees {
                return vec![Diagnostic::new(
                    site,
                    ErrorCode::UNKNOWN_FUNCTION,
                    format!("no declaration for '{}'", call.callee_name),
                    call.span,
                )
                .warning()];
            }
            trace!(callee = %call.callee_name, index, "undeclared callee, call skipped");
            return Vec::new();
        };

        checker
            .check_call(sig, &call.argument_types)
            .into_iter()
            .map(|err| err.into_diagnostic(site.clone(), call.span))
            .collect()
    }

    fn map_ordered<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        if self.config.parallel {
            items
                .par_iter()
                .enumerate()
                .map(|(index, item)| f(index, item))
                .collect()
        } else {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| f(index, item))
                .collect()
        }
    }
}

/// Pre-split annotations win; otherwise fall back to the raw doc comment.
/// Tags from both sources are kept.
fn annotations_of(decl: &FunctionDeclaration) -> DocBlock {
    let parsed = decl.doc_comment.as_deref().map(docblock::parse_doc_comment);
    let mut block = match parsed {
        Some(parsed)
            if decl.raw_doc_annotations.is_empty() && decl.raw_return_annotation.is_none() =>
        {
            parsed
        }
        parsed => DocBlock {
            params: decl.raw_doc_annotations.clone(),
            ret: decl.raw_return_annotation.clone(),
            tags: parsed.map(|p| p.tags).unwrap_or_default(),
        },
    };
    for tag in &decl.doc_tags {
        if !block.has_tag(tag) {
            block.tags.push(tag.clone());
        }
    }
    block
}
