//! Class/interface hierarchy registry.
//!
//! Built in two passes: every declaration is registered by name first
//! ([`HierarchyBuilder::register`]), then [`HierarchyBuilder::freeze`] links
//! supertype edges, drops edges to unregistered names and edges that close a
//! cycle, and computes the transitive supertype closure of every entry. The
//! resulting [`ClassHierarchy`] is immutable and shared freely between
//! checking workers.

use std::collections::{BTreeSet, HashMap, VecDeque};

use docsig_types::{ClassDeclaration, Diagnostic, SiteRef, Span, TypeCategory};
use tracing::debug;

use crate::error::{CheckError, CheckResult};

/// Strip the namespace root marker so `\Foo` and `Foo` name the same entry.
pub(crate) fn normalize_name(name: &str) -> &str {
    name.trim().trim_start_matches('\\')
}

// ══════════════════════════════════════════════════════════════════════════════
// Builder
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Entry {
    kind: TypeCategory,
    supertypes: Vec<String>,
    span: Span,
}

/// Mutable registration phase of the hierarchy.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    entries: HashMap<String, Entry>,
    /// Registration order, for deterministic diagnostics.
    order: Vec<String>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one class or interface with its direct supertypes.
    ///
    /// Registering a name again with the same kind merges the supertypes;
    /// a different kind is a [`CheckError::DuplicateDeclaration`].
    pub fn register<I, S>(
        &mut self,
        name: &str,
        kind: TypeCategory,
        direct_supertypes: I,
    ) -> CheckResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.register_at(name, kind, direct_supertypes, Span::unknown())
    }

    /// Register a parsed class declaration.
    pub fn register_declaration(&mut self, decl: &ClassDeclaration) -> CheckResult<()> {
        self.register_at(&decl.name, decl.kind, &decl.declared_supertypes, decl.span)
    }

    fn register_at<I, S>(
        &mut self,
        name: &str,
        kind: TypeCategory,
        direct_supertypes: I,
        span: Span,
    ) -> CheckResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = normalize_name(name);
        let supertypes: Vec<String> = direct_supertypes
            .into_iter()
            .map(|s| normalize_name(s.as_ref()).to_string())
            .collect();

        if let Some(existing) = self.entries.get_mut(name) {
            if existing.kind != kind {
                return Err(CheckError::DuplicateDeclaration {
                    name: name.to_string(),
                    detail: format!("already declared as {}, redeclared as {}", existing.kind, kind),
                });
            }
            for sup in supertypes {
                if !existing.supertypes.contains(&sup) {
                    existing.supertypes.push(sup);
                }
            }
            return Ok(());
        }

        let mut deduped: Vec<String> = Vec::with_capacity(supertypes.len());
        for sup in supertypes {
            if !deduped.contains(&sup) {
                deduped.push(sup);
            }
        }
        self.entries.insert(
            name.to_string(),
            Entry {
                kind,
                supertypes: deduped,
                span,
            },
        );
        self.order.push(name.to_string());
        Ok(())
    }

    /// Link supertype edges and publish the frozen hierarchy.
    ///
    /// Problems found while linking are appended to `diagnostics`; the
    /// offending edges are dropped so the result is always a DAG.
    pub fn freeze(mut self, diagnostics: &mut Vec<Diagnostic>) -> ClassHierarchy {
        // Pass 2a: drop edges to names nobody registered.
        for name in &self.order {
            let Some(entry) = self.entries.get(name) else {
                continue;
            };
            let (known, unknown): (Vec<String>, Vec<String>) = entry
                .supertypes
                .iter()
                .cloned()
                .partition(|sup| self.entries.contains_key(sup));
            let span = entry.span;
            for sup in unknown {
                diagnostics.push(
                    CheckError::unknown_type(&sup)
                        .into_diagnostic(SiteRef::Class { name: name.clone() }, span)
                        .with_suggestion(format!("declare '{sup}' before it is extended")),
                );
            }
            if let Some(entry) = self.entries.get_mut(name) {
                entry.supertypes = known;
            }
        }

        // Pass 2b: break cycles.
        let mut state: HashMap<String, Visit> = HashMap::new();
        let order = self.order.clone();
        for name in &order {
            self.break_cycles(name, &mut state, diagnostics);
        }

        // Pass 2c: closures.
        let mut closures = HashMap::with_capacity(self.entries.len());
        for name in &self.order {
            closures.insert(name.clone(), self.closure_of(name));
        }

        let kinds = self
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.kind))
            .collect();

        debug!(entries = self.order.len(), "class hierarchy frozen");
        ClassHierarchy { kinds, closures }
    }

    /// Depth-first walk from `root` with an explicit stack, dropping every
    /// edge that points back into the active path.
    fn break_cycles(
        &mut self,
        root: &str,
        state: &mut HashMap<String, Visit>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if state.contains_key(root) {
            return;
        }
        let mut stack = vec![self.enter(root, state)];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let next = frame.supertypes.get(frame.next).cloned();
            frame.next += 1;

            let Some(sup) = next else {
                if let Some(done) = stack.pop() {
                    if let Some(entry) = self.entries.get_mut(&done.name) {
                        entry.supertypes = done.kept;
                    }
                    state.insert(done.name, Visit::Done);
                }
                continue;
            };

            match state.get(&sup).copied() {
                Some(Visit::Active) => {
                    let start = stack.iter().position(|f| f.name == sup).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|f| f.name.clone()).collect();
                    cycle.push(sup);
                    let name = stack.last().map(|f| f.name.clone()).unwrap_or_default();
                    let span = self.entries.get(&name).map(|e| e.span).unwrap_or_default();
                    diagnostics.push(
                        CheckError::HierarchyCycle(cycle)
                            .into_diagnostic(SiteRef::Class { name }, span),
                    );
                }
                Some(Visit::Done) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.kept.push(sup);
                    }
                }
                None => {
                    if let Some(frame) = stack.last_mut() {
                        frame.kept.push(sup.clone());
                    }
                    let child = self.enter(&sup, state);
                    stack.push(child);
                }
            }
        }
    }

    fn enter(&self, name: &str, state: &mut HashMap<String, Visit>) -> Frame {
        state.insert(name.to_string(), Visit::Active);
        Frame {
            name: name.to_string(),
            supertypes: self
                .entries
                .get(name)
                .map(|e| e.supertypes.clone())
                .unwrap_or_default(),
            next: 0,
            kept: Vec::new(),
        }
    }

    /// Breadth-first closure over direct supertypes.
    fn closure_of(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(name);
        while let Some(current) = queue.pop_front() {
            let Some(entry) = self.entries.get(current) else {
                continue;
            };
            for sup in &entry.supertypes {
                if seen.insert(sup.clone()) {
                    queue.push_back(sup);
                }
            }
        }
        seen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

/// One entry on the cycle-breaking stack.
#[derive(Debug)]
struct Frame {
    name: String,
    supertypes: Vec<String>,
    next: usize,
    kept: Vec<String>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Frozen hierarchy
// ══════════════════════════════════════════════════════════════════════════════

/// Read-only class/interface hierarchy with precomputed closures.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    kinds: HashMap<String, TypeCategory>,
    closures: HashMap<String, BTreeSet<String>>,
}

impl ClassHierarchy {
    /// A hierarchy with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register every declaration, then freeze.
    ///
    /// Conflicting redeclarations are reported and skipped.
    pub fn build(decls: &[ClassDeclaration], diagnostics: &mut Vec<Diagnostic>) -> Self {
        let mut builder = HierarchyBuilder::new();
        for decl in decls {
            if let Err(err) = builder.register_declaration(decl) {
                diagnostics.push(err.into_diagnostic(
                    SiteRef::Class {
                        name: decl.name.clone(),
                    },
                    decl.span,
                ));
            }
        }
        builder.freeze(diagnostics)
    }

    /// Number of registered classes and interfaces.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(normalize_name(name))
    }

    /// Whether `name` is a class or an interface, if registered.
    pub fn kind_of(&self, name: &str) -> Option<TypeCategory> {
        self.kinds.get(normalize_name(name)).copied()
    }

    /// All ancestors of `name` (not including `name` itself).
    pub fn transitive_supertypes(&self, name: &str) -> CheckResult<&BTreeSet<String>> {
        let name = normalize_name(name);
        self.closures
            .get(name)
            .ok_or_else(|| CheckError::unknown_type(name))
    }

    /// True if `sub` is `sup` or inherits from it.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> CheckResult<bool> {
        let (sub, sup) = (normalize_name(sub), normalize_name(sup));
        if sub == sup {
            return Ok(true);
        }
        Ok(self.transitive_supertypes(sub)?.contains(sup))
    }
}
