//! Grammar-node framework: the arena-allocated node tree and the
//! per-node occurrence records instantiated from the grammar table.
//!
//! Parents exclusively own their children through the arena; the parent
//! back-reference is a non-owning index used only for upward scope-chain
//! walks. The whole tree is discarded after generation.

use crate::grammar;
use crate::symbol::SymbolKind;

/// Non-owning node handle into the [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Occurrence record for one legal child kind, derived from the BNF.
/// `count` increments only during parse; `first_line` is set exactly once.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub kind: SymbolKind,
    pub min: u32,
    pub max: Option<u32>,
    pub count: u32,
    pub first_line: Option<u32>,
}

impl Occurrence {
    pub fn new(kind: SymbolKind, min: u32, max: Option<u32>) -> Occurrence {
        Occurrence {
            kind,
            min,
            max,
            count: 0,
            first_line: None,
        }
    }
}

/// One parsed construct instance, tagged by the production it represents.
///
/// Node-specific scalars share one flat field set; each production's
/// parse body fills only the fields its rule defines, and the generator
/// reads only those same fields back.
#[derive(Debug)]
pub struct Node {
    pub kind: SymbolKind,
    pub line: u32,
    pub column: u32,

    /// Declared or target name (variable name, template name, prefix...)
    pub name: Option<String>,
    /// Pattern / select / test / count expression
    pub expr: Option<String>,
    /// Inline literal value, or the second name of a two-name production
    pub value: Option<String>,
    pub namespace: Option<String>,
    pub mode: Option<String>,
    pub priority: Option<String>,
    pub level: Option<String>,
    pub format: Option<String>,
    pub language: Option<String>,
    pub uri: Option<String>,
    pub data_type: Option<String>,
    pub descending: bool,
    /// A sort direction clause was written out explicitly
    pub explicit_order: bool,
    pub terminate: bool,
    pub has_block: bool,

    /// Insertion order is meaningful ("parameter must come first").
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Allowed-children table, pre-registered at construction.
    pub occurrences: Vec<Occurrence>,
}

impl Node {
    fn new(kind: SymbolKind, line: u32, column: u32) -> Node {
        Node {
            kind,
            line,
            column,
            name: None,
            expr: None,
            value: None,
            namespace: None,
            mode: None,
            priority: None,
            level: None,
            format: None,
            language: None,
            uri: None,
            data_type: None,
            descending: false,
            explicit_order: false,
            terminate: false,
            has_block: false,
            children: Vec::new(),
            parent: None,
            occurrences: grammar::child_rules(kind),
        }
    }

    /// Occurrence entry for a child kind, if that kind is legal here.
    pub fn occurrence(&self, kind: SymbolKind) -> Option<&Occurrence> {
        self.occurrences.iter().find(|o| o.kind == kind)
    }

    pub fn occurrence_mut(&mut self, kind: SymbolKind) -> Option<&mut Occurrence> {
        self.occurrences.iter_mut().find(|o| o.kind == kind)
    }

    pub fn allows_child(&self, kind: SymbolKind) -> bool {
        self.occurrence(kind).is_some()
    }
}

/// Flat node store. Allocation never moves existing nodes' ids.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Arena {
        Arena::default()
    }

    pub fn alloc(&mut self, kind: SymbolKind, line: u32, column: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, line, column));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Attach `child` under `parent`: ownership link, back-reference, and
    /// the parent's occurrence bookkeeping in one step.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        let line = self.node(child).line;
        let kind = self.node(child).kind;
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        if let Some(occ) = self.node_mut(parent).occurrence_mut(kind) {
            occ.count += 1;
            if occ.first_line.is_none() {
                occ.first_line = Some(line);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_updates_occurrence_bookkeeping() {
        let mut arena = Arena::new();
        let choose = arena.alloc(SymbolKind::Choose, 0, 0);
        let when1 = arena.alloc(SymbolKind::When, 1, 2);
        let when2 = arena.alloc(SymbolKind::When, 3, 2);
        arena.attach(choose, when1);
        arena.attach(choose, when2);

        let occ = arena.node(choose).occurrence(SymbolKind::When).unwrap();
        assert_eq!(occ.count, 2);
        assert_eq!(occ.first_line, Some(1), "first_line set exactly once");
        assert_eq!(arena.node(when1).parent, Some(choose));
        assert_eq!(arena.node(choose).children, vec![when1, when2]);
    }

    #[test]
    fn occurrence_map_reflects_grammar() {
        let mut arena = Arena::new();
        let choose = arena.alloc(SymbolKind::Choose, 0, 0);
        assert!(arena.node(choose).allows_child(SymbolKind::When));
        assert!(arena.node(choose).allows_child(SymbolKind::Otherwise));
        assert!(!arena.node(choose).allows_child(SymbolKind::Element));
    }
}
