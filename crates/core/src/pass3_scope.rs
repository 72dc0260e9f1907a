//! Pass 3: scope resolution over the parsed tree.
//!
//! Two sub-walks in one pass: the first builds the scope hierarchy and
//! collects every declaration (so forward references to templates and
//! top-level variables work), the second resolves `$name` references and
//! `call` targets against the finished tables. Undefined references are
//! advisory: they are reported (unless suppressed) and flagged in the
//! outcome, but never block generation.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{ErrorKind, ErrorList};
use crate::node::{Arena, NodeId};
use crate::symbol::SymbolKind;
use crate::symtab::{ScopeSet, SymbolClass};

pub struct ResolveOutcome {
    pub scopes: ScopeSet,
    /// At least one variable or template reference failed to resolve.
    pub undefined_seen: bool,
}

pub fn resolve_scopes(
    arena: &Arena,
    root: NodeId,
    config: &Config,
    errors: &mut ErrorList,
) -> ResolveOutcome {
    let mut resolver = Resolver {
        arena,
        config,
        errors,
        scopes: ScopeSet::new(),
        scope_of: HashMap::new(),
        root_scope: 0,
        undefined_seen: false,
    };
    let line = arena.node(root).line;
    resolver.root_scope = resolver.scopes.push(root, None, "stylesheet", line);
    resolver.scope_of.insert(root.index(), resolver.root_scope);
    resolver.collect(root, resolver.root_scope);
    resolver.resolve_uses(root);
    ResolveOutcome {
        scopes: resolver.scopes,
        undefined_seen: resolver.undefined_seen,
    }
}

/// Kinds whose block introduces a fresh variable scope.
fn introduces_scope(kind: SymbolKind) -> bool {
    use SymbolKind::*;
    matches!(
        kind,
        Match | Proc | ForEach | If | When | Otherwise | Element | Copy | Message | Fallback
    )
}

struct Resolver<'a> {
    arena: &'a Arena,
    config: &'a Config,
    errors: &'a mut ErrorList,
    scopes: ScopeSet,
    /// Enclosing scope for each node's own expressions.
    scope_of: HashMap<usize, usize>,
    root_scope: usize,
    undefined_seen: bool,
}

impl<'a> Resolver<'a> {
    // ── Sub-walk 1: scopes, declarations, ordering ───────────────────

    fn collect(&mut self, id: NodeId, enclosing: usize) {
        let node = self.arena.node(id);
        self.declare(id, enclosing);
        self.check_ordering(id);

        let child_scope = if introduces_scope(node.kind) {
            let title = self.scope_title(id);
            self.scopes.push(id, Some(enclosing), title, node.line)
        } else {
            enclosing
        };
        for &child in &node.children {
            self.scope_of.insert(child.index(), child_scope);
            self.collect(child, child_scope);
        }
    }

    fn scope_title(&self, id: NodeId) -> String {
        let node = self.arena.node(id);
        match node.kind {
            SymbolKind::Match => match &node.expr {
                Some(pattern) => format!("match '{}'", pattern),
                None => String::from("match"),
            },
            SymbolKind::Proc => match &node.name {
                Some(name) => format!("proc {}", name),
                None => String::from("proc"),
            },
            kind => kind.display().trim_matches('\'').to_owned(),
        }
    }

    fn declare(&mut self, id: NodeId, enclosing: usize) {
        let node = self.arena.node(id);
        match node.kind {
            SymbolKind::Variable => {
                self.declare_in(enclosing, SymbolClass::Variable, id, ErrorKind::DuplicateVariable)
            }
            SymbolKind::Param => self.declare_in(
                enclosing,
                SymbolClass::Parameter,
                id,
                ErrorKind::DuplicateParameter,
            ),
            SymbolKind::Proc => self.declare_in(
                self.root_scope,
                SymbolClass::Template,
                id,
                ErrorKind::DuplicateTemplate,
            ),
            SymbolKind::NamespaceDecl => self.declare_in(
                self.root_scope,
                SymbolClass::Namespace,
                id,
                ErrorKind::DuplicateNamespace,
            ),
            SymbolKind::Key => self.declare_in(
                self.root_scope,
                SymbolClass::Key,
                id,
                ErrorKind::DuplicateDeclaration,
            ),
            SymbolKind::AttributeSet => self.declare_in(
                self.root_scope,
                SymbolClass::AttributeSet,
                id,
                ErrorKind::DuplicateDeclaration,
            ),
            SymbolKind::DecimalFormat => self.declare_in(
                self.root_scope,
                SymbolClass::DecimalFormat,
                id,
                ErrorKind::DuplicateDeclaration,
            ),
            _ => {}
        }
    }

    fn declare_in(&mut self, scope: usize, class: SymbolClass, id: NodeId, kind: ErrorKind) {
        let node = self.arena.node(id);
        // Unnamed decimal-format is the default format; others without a
        // name were already reported during parse.
        let name = match (&node.name, node.kind) {
            (Some(name), _) => name.as_str(),
            (None, SymbolKind::DecimalFormat) => "#default",
            (None, _) => return,
        };
        if let Err(existing) = self.scopes.table_mut(scope).declare(class, name, node.line) {
            self.errors.report(
                kind,
                node.line,
                node.column,
                format!(
                    "duplicate {} '{}' (already declared at line {})",
                    class.display(),
                    name,
                    existing + 1
                ),
            );
        }
    }

    /// Params come first in template-like blocks; sorts come first in
    /// sorting blocks. A match template allows params, then sorts, then
    /// content.
    fn check_ordering(&mut self, id: NodeId) {
        let node = self.arena.node(id);
        let (params_first, sorts_first) = match node.kind {
            SymbolKind::Match => (true, true),
            SymbolKind::Proc | SymbolKind::Fallback => (true, false),
            SymbolKind::ForEach | SymbolKind::Apply => (false, true),
            _ => return,
        };
        let owner = node.kind.display();
        let mut content_seen = false;
        let mut sort_seen = false;
        for &child in &node.children {
            let child_node = self.arena.node(child);
            match child_node.kind {
                SymbolKind::Param if params_first => {
                    if content_seen || sort_seen {
                        self.errors.report(
                            ErrorKind::ParamNotFirst,
                            child_node.line,
                            child_node.column,
                            format!("'param' entries must come first in {}", owner),
                        );
                    }
                }
                SymbolKind::Sort if sorts_first => {
                    sort_seen = true;
                    if content_seen {
                        self.errors.report(
                            ErrorKind::SortNotFirst,
                            child_node.line,
                            child_node.column,
                            format!("'sort' entries must precede the content of {}", owner),
                        );
                    }
                }
                _ => content_seen = true,
            }
        }
    }

    // ── Sub-walk 2: reference resolution ─────────────────────────────

    fn resolve_uses(&mut self, id: NodeId) {
        let node = self.arena.node(id);
        let scope = self.scope_of.get(&id.index()).copied().unwrap_or(self.root_scope);

        if let Some(expr) = &node.expr {
            self.resolve_refs(expr, node.line, scope);
        }
        // Value expressions that can hold variable references
        if matches!(
            node.kind,
            SymbolKind::Variable | SymbolKind::Param | SymbolKind::With | SymbolKind::Key
        ) {
            if let Some(value) = &node.value {
                self.resolve_refs(value, node.line, scope);
            }
        }
        if node.kind == SymbolKind::Call {
            self.resolve_call(id);
        }

        for &child in &node.children {
            self.resolve_uses(child);
        }
    }

    /// Scan an expression for `$name` references and resolve each one up
    /// the scope chain, trying the variable then the parameter namespace.
    fn resolve_refs(&mut self, expr: &str, line: u32, scope: usize) {
        for name in variable_refs(expr) {
            let found = self
                .scopes
                .resolve(scope, SymbolClass::Variable, &name)
                .map(|s| (s, SymbolClass::Variable))
                .or_else(|| {
                    self.scopes
                        .resolve(scope, SymbolClass::Parameter, &name)
                        .map(|s| (s, SymbolClass::Parameter))
                });
            match found {
                Some((index, class)) => {
                    self.scopes.table_mut(index).record_use(class, &name, line);
                }
                None => {
                    self.undefined_seen = true;
                    if self.config.warn_undefined {
                        self.errors.report(
                            ErrorKind::UndefinedVariable,
                            line,
                            0,
                            format!("could not find variable '${}'", name),
                        );
                    }
                }
            }
        }
    }

    fn resolve_call(&mut self, id: NodeId) {
        let node = self.arena.node(id);
        let name = match &node.name {
            Some(name) => name.clone(),
            None => return, // missing name already reported during parse
        };
        let root = self.root_scope;
        if self
            .scopes
            .table_mut(root)
            .record_use(SymbolClass::Template, &name, node.line)
        {
            return;
        }
        self.undefined_seen = true;
        if self.config.warn_undefined {
            self.errors.report(
                ErrorKind::UndefinedTemplate,
                node.line,
                node.column,
                format!("could not find template '{}'", name),
            );
        }
    }
}

/// All `$name` references in an expression, in order of appearance.
fn variable_refs(expr: &str) -> Vec<String> {
    let mut refs = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_alphanumeric() || next == '_' || next == '-' || next == '.' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if !name.is_empty() {
            refs.push(name);
        }
    }
    refs
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::parser;

    fn resolve_src(src: &str) -> (ResolveOutcome, ErrorList) {
        let config = Config::default();
        let tokens = lexer::tokenize(src);
        let mut out = parser::parse(&tokens, &config);
        let root = out.root.unwrap();
        let outcome = resolve_scopes(&out.arena, root, &config, &mut out.errors);
        (outcome, out.errors)
    }

    #[test]
    fn variable_refs_are_extracted_in_order() {
        assert_eq!(variable_refs("$a + $b-c * 2"), vec!["a", "b-c"]);
        assert_eq!(variable_refs("no refs here"), Vec::<String>::new());
        assert_eq!(variable_refs("$"), Vec::<String>::new());
    }

    #[test]
    fn duplicate_variable_in_one_scope_is_reported_once_with_both_lines() {
        let (_, errors) = resolve_src(
            "stylesheet { version \"1.0\"\nmatch using \"/\" {\nvariable x \"1\"\nvariable x \"2\"\n} }",
        );
        let dups: Vec<_> = errors
            .records()
            .iter()
            .filter(|r| r.kind == ErrorKind::DuplicateVariable)
            .collect();
        assert_eq!(dups.len(), 1, "{}", errors.listing());
        assert!(dups[0].message.contains("line 4"), "{}", dups[0].message);
        assert!(dups[0].message.contains("already declared at line 3"), "{}", dups[0].message);
    }

    #[test]
    fn same_name_in_sibling_scopes_is_fine() {
        let (_, errors) = resolve_src(
            "stylesheet { version \"1.0\" match using \"a\" { variable x \"1\" } match using \"b\" { variable x \"2\" } }",
        );
        assert!(!errors.contains(ErrorKind::DuplicateVariable), "{}", errors.listing());
    }

    #[test]
    fn nested_scope_resolves_variable_from_enclosing_template() {
        let (outcome, errors) = resolve_src(
            "stylesheet { version \"1.0\" match using \"/\" { variable v \"1\" foreach \"item\" { value-of \"$v\" } } }",
        );
        assert!(!outcome.undefined_seen, "{}", errors.listing());
        assert!(!errors.contains(ErrorKind::UndefinedVariable));
    }

    #[test]
    fn reference_into_a_sibling_scope_is_undefined() {
        let (outcome, errors) = resolve_src(
            "stylesheet { version \"1.0\" match using \"a\" { variable v \"1\" } match using \"b\" { value-of \"$v\" } }",
        );
        assert!(outcome.undefined_seen);
        assert!(errors.contains(ErrorKind::UndefinedVariable), "{}", errors.listing());
        // Advisory only
        assert_eq!(errors.blocking_count(), 0, "{}", errors.listing());
    }

    #[test]
    fn undefined_warnings_can_be_suppressed() {
        let mut config = Config::default();
        config.warn_undefined = false;
        let tokens =
            lexer::tokenize("stylesheet { version \"1.0\" match using \"/\" { value-of \"$v\" } }");
        let mut out = parser::parse(&tokens, &config);
        let root = out.root.unwrap();
        let outcome = resolve_scopes(&out.arena, root, &config, &mut out.errors);
        assert!(outcome.undefined_seen);
        assert!(!out.errors.contains(ErrorKind::UndefinedVariable));
    }

    #[test]
    fn call_resolves_forward_declared_proc() {
        let (outcome, errors) = resolve_src(
            "stylesheet { version \"1.0\" match using \"/\" { call emit } proc emit { text \"x\" } }",
        );
        assert!(!outcome.undefined_seen, "{}", errors.listing());
        assert!(!errors.contains(ErrorKind::UndefinedTemplate));
    }

    #[test]
    fn call_to_unknown_template_is_advisory() {
        let (outcome, errors) = resolve_src(
            "stylesheet { version \"1.0\" match using \"/\" { call missing } }",
        );
        assert!(outcome.undefined_seen);
        assert!(errors.contains(ErrorKind::UndefinedTemplate), "{}", errors.listing());
        assert_eq!(errors.blocking_count(), 0);
    }

    #[test]
    fn duplicate_proc_names_are_rejected() {
        let (_, errors) = resolve_src(
            "stylesheet { version \"1.0\" proc emit { text \"a\" } proc emit { text \"b\" } }",
        );
        assert!(errors.contains(ErrorKind::DuplicateTemplate), "{}", errors.listing());
    }

    #[test]
    fn param_after_content_is_flagged() {
        let (_, errors) = resolve_src(
            "stylesheet { version \"1.0\" proc emit { text \"a\" param p } }",
        );
        assert!(errors.contains(ErrorKind::ParamNotFirst), "{}", errors.listing());
    }

    #[test]
    fn sort_after_content_is_flagged() {
        let (_, errors) = resolve_src(
            "stylesheet { version \"1.0\" match using \"/\" { foreach \"item\" { text \"a\" sort \"x\" } } }",
        );
        assert!(errors.contains(ErrorKind::SortNotFirst), "{}", errors.listing());
    }

    #[test]
    fn params_then_sorts_then_content_is_accepted_in_match() {
        let (_, errors) = resolve_src(
            "stylesheet { version \"1.0\" match using \"item\" { param p sort \"x\" text \"a\" } }",
        );
        assert!(!errors.contains(ErrorKind::ParamNotFirst), "{}", errors.listing());
        assert!(!errors.contains(ErrorKind::SortNotFirst), "{}", errors.listing());
    }

    #[test]
    fn scope_listing_shows_nested_tables() {
        let (outcome, _) = resolve_src(
            "stylesheet { version \"1.0\" match using \"/\" { variable v \"1\" value-of \"$v\" } }",
        );
        let listing = outcome.scopes.listing();
        assert!(listing.contains("-- stylesheet"), "{listing}");
        assert!(listing.contains("-- match '/'"), "{listing}");
        assert!(listing.contains("variable 'v'"), "{listing}");
    }
}
