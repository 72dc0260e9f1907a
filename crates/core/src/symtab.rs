//! Hierarchical symbol tables for scope resolution.
//!
//! Each scope-introducing node owns one [`SymbolTable`]; tables are held
//! flat in a [`ScopeSet`] with parent indices, so lookup is a walk up the
//! chain and the `--symbols` listing is a replay of the depth-first
//! insertion order.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::node::NodeId;

/// What a declared name is. Distinct classes never collide: a template
/// and a variable may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SymbolClass {
    Variable,
    Parameter,
    Template,
    Key,
    AttributeSet,
    DecimalFormat,
    Namespace,
}

impl SymbolClass {
    pub fn display(&self) -> &'static str {
        match self {
            SymbolClass::Variable => "variable",
            SymbolClass::Parameter => "parameter",
            SymbolClass::Template => "template",
            SymbolClass::Key => "key",
            SymbolClass::AttributeSet => "attribute-set",
            SymbolClass::DecimalFormat => "decimal-format",
            SymbolClass::Namespace => "namespace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub class: SymbolClass,
    pub declared_line: u32,
    pub used_lines: Vec<u32>,
}

/// One scope's declarations, keyed by (class, name) so classes live in
/// separate namespaces. BTreeMap keeps the listing deterministic.
#[derive(Debug)]
pub struct SymbolTable {
    pub title: String,
    pub line: u32,
    entries: BTreeMap<(SymbolClass, String), SymbolEntry>,
}

impl SymbolTable {
    pub fn new(title: impl Into<String>, line: u32) -> SymbolTable {
        SymbolTable {
            title: title.into(),
            line,
            entries: BTreeMap::new(),
        }
    }

    /// Declare a name. On a duplicate the existing entry wins and its
    /// declaration line comes back as the error payload.
    pub fn declare(&mut self, class: SymbolClass, name: &str, line: u32) -> Result<(), u32> {
        match self.entries.get(&(class, name.to_owned())) {
            Some(existing) => Err(existing.declared_line),
            None => {
                self.entries.insert(
                    (class, name.to_owned()),
                    SymbolEntry {
                        class,
                        declared_line: line,
                        used_lines: Vec::new(),
                    },
                );
                Ok(())
            }
        }
    }

    pub fn get(&self, class: SymbolClass, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(&(class, name.to_owned()))
    }

    pub fn record_use(&mut self, class: SymbolClass, name: &str, line: u32) -> bool {
        match self.entries.get_mut(&(class, name.to_owned())) {
            Some(entry) => {
                entry.used_lines.push(line);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = (&(SymbolClass, String), &SymbolEntry)> {
        self.entries.iter()
    }
}

/// One scope: its table plus the owning node and parent scope index.
#[derive(Debug)]
pub struct Scope {
    pub node: NodeId,
    pub parent: Option<usize>,
    pub depth: u32,
    pub table: SymbolTable,
}

/// All scopes of one compilation, in depth-first discovery order.
#[derive(Debug, Default)]
pub struct ScopeSet {
    scopes: Vec<Scope>,
}

impl ScopeSet {
    pub fn new() -> ScopeSet {
        ScopeSet::default()
    }

    pub fn push(
        &mut self,
        node: NodeId,
        parent: Option<usize>,
        title: impl Into<String>,
        line: u32,
    ) -> usize {
        let depth = match parent {
            Some(p) => self.scopes[p].depth + 1,
            None => 0,
        };
        self.scopes.push(Scope {
            node,
            parent,
            depth,
            table: SymbolTable::new(title, line),
        });
        self.scopes.len() - 1
    }

    pub fn table(&self, index: usize) -> &SymbolTable {
        &self.scopes[index].table
    }

    pub fn table_mut(&mut self, index: usize) -> &mut SymbolTable {
        &mut self.scopes[index].table
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Walk from `start` toward the root, returning the first scope index
    /// whose table declares `name` under `class`.
    pub fn resolve(&self, start: usize, class: SymbolClass, name: &str) -> Option<usize> {
        let mut current = Some(start);
        while let Some(index) = current {
            if self.scopes[index].table.get(class, name).is_some() {
                return Some(index);
            }
            current = self.scopes[index].parent;
        }
        None
    }

    /// Human-readable dump of every scope in depth-first order, indented
    /// by nesting depth. Empty tables are still listed so the scope
    /// structure stays visible.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for scope in &self.scopes {
            let pad = "  ".repeat(scope.depth as usize);
            let _ = writeln!(
                out,
                "{}-- {} (line {})",
                pad,
                scope.table.title,
                scope.table.line + 1
            );
            for ((_, name), entry) in scope.table.entries() {
                let uses = if entry.used_lines.is_empty() {
                    String::from("never used")
                } else {
                    let lines: Vec<String> =
                        entry.used_lines.iter().map(|l| (l + 1).to_string()).collect();
                    format!("used at line {}", lines.join(", "))
                };
                let _ = writeln!(
                    out,
                    "{}   {} '{}' declared at line {}, {}",
                    pad,
                    entry.class.display(),
                    name,
                    entry.declared_line + 1,
                    uses
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Arena;
    use crate::symbol::SymbolKind;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut arena = Arena::new();
        (0..n)
            .map(|i| arena.alloc(SymbolKind::Stylesheet, i as u32, 0))
            .collect()
    }

    #[test]
    fn duplicate_declaration_reports_existing_line() {
        let mut table = SymbolTable::new("stylesheet", 0);
        assert!(table.declare(SymbolClass::Variable, "x", 3).is_ok());
        assert_eq!(table.declare(SymbolClass::Variable, "x", 7), Err(3));
        // The original survives
        assert_eq!(table.get(SymbolClass::Variable, "x").map(|e| e.declared_line), Some(3));
    }

    #[test]
    fn classes_are_separate_namespaces() {
        let mut table = SymbolTable::new("stylesheet", 0);
        assert!(table.declare(SymbolClass::Variable, "x", 1).is_ok());
        assert!(table.declare(SymbolClass::Template, "x", 2).is_ok());
    }

    #[test]
    fn resolve_walks_the_parent_chain() {
        let nodes = ids(2);
        let mut scopes = ScopeSet::new();
        let root = scopes.push(nodes[0], None, "stylesheet", 0);
        let inner = scopes.push(nodes[1], Some(root), "match '/'", 2);
        scopes
            .table_mut(root)
            .declare(SymbolClass::Variable, "v", 1)
            .unwrap();

        assert_eq!(scopes.resolve(inner, SymbolClass::Variable, "v"), Some(root));
        assert_eq!(scopes.resolve(inner, SymbolClass::Variable, "w"), None);
    }

    #[test]
    fn sibling_scopes_do_not_leak() {
        let nodes = ids(3);
        let mut scopes = ScopeSet::new();
        let root = scopes.push(nodes[0], None, "stylesheet", 0);
        let a = scopes.push(nodes[1], Some(root), "match 'a'", 1);
        let b = scopes.push(nodes[2], Some(root), "match 'b'", 5);
        scopes
            .table_mut(a)
            .declare(SymbolClass::Variable, "v", 2)
            .unwrap();

        assert_eq!(scopes.resolve(b, SymbolClass::Variable, "v"), None);
    }

    #[test]
    fn listing_is_indented_by_depth() {
        let nodes = ids(2);
        let mut scopes = ScopeSet::new();
        let root = scopes.push(nodes[0], None, "stylesheet", 0);
        let inner = scopes.push(nodes[1], Some(root), "match '/'", 1);
        scopes
            .table_mut(inner)
            .declare(SymbolClass::Variable, "v", 2)
            .unwrap();
        scopes.table_mut(inner).record_use(SymbolClass::Variable, "v", 3);

        let listing = scopes.listing();
        assert!(listing.contains("-- stylesheet (line 1)"));
        assert!(listing.contains("  -- match '/' (line 2)"));
        assert!(listing.contains("variable 'v' declared at line 3, used at line 4"));
    }
}
