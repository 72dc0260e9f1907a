//! Template productions: match/proc templates, bindings (param,
//! variable, with) and the two invocation forms.

use super::Parser;
use crate::error::{EarlyEof, ErrorKind};
use crate::node::NodeId;
use crate::symbol::SymbolKind;

impl<'a> Parser<'a> {
    /// `match using "pattern" [mode m] [priority "n"] { ... }`
    ///
    /// Clauses may appear in any order; each is matched against the
    /// (current, next) token pair before descending into the block.
    pub(super) fn parse_match(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        loop {
            if self.eat(SymbolKind::Using) {
                match self.take_expr() {
                    Some(pattern) => self.arena.node_mut(id).expr = Some(pattern),
                    None => self.report_for(
                        id,
                        ErrorKind::InvalidPattern,
                        "missing quoted pattern after 'using'",
                    ),
                }
            } else if self.cur.at(SymbolKind::Mode)
                && self.cur.next().kind == SymbolKind::QName
            {
                self.cur.advance();
                let mode = self.take_qname();
                self.arena.node_mut(id).mode = mode;
            } else if self.eat(SymbolKind::Priority) {
                match self.take_expr() {
                    Some(priority) => self.arena.node_mut(id).priority = Some(priority),
                    None => self.report_for(
                        id,
                        ErrorKind::MissingValue,
                        "missing quoted value after 'priority'",
                    ),
                }
            } else {
                break;
            }
        }
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `proc name { ... }` -- a named template.
    pub(super) fn parse_proc(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if let Some(name) = self.take_decl_name(id, "'proc'") {
            self.arena.node_mut(id).name = Some(name);
        }
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// Shared body for `param`, `variable` and `with`:
    /// name, then optional inline value, then optional block.
    ///
    /// When the name is missing but a block follows, the block is
    /// swallowed without becoming a value so the shape check later
    /// reports the construct as having neither -- matching the
    /// report-and-continue contract rather than cascading errors.
    pub(super) fn parse_binding(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        let owner = self.arena.node(id).kind.display();
        let name = self.take_decl_name(id, owner);
        let named = name.is_some();
        if let Some(name) = name {
            self.arena.node_mut(id).name = Some(name);
        }
        if let Some(value) = self.take_expr() {
            self.arena.node_mut(id).value = Some(value);
        }
        if self.cur.at(SymbolKind::OpenBlock) {
            if named {
                self.cur.advance();
                self.arena.node_mut(id).has_block = true;
                self.parse_children(id)?;
            } else {
                self.recover(super::Recovery::OutOfBlock);
            }
        }
        Ok(())
    }

    /// `call name [{ with ... }]`
    pub(super) fn parse_call(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_qname() {
            Some(name) => self.arena.node_mut(id).name = Some(name),
            None => self.report_for(id, ErrorKind::MissingName, "missing template name after 'call'"),
        }
        if self.open_optional_block(id) {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `apply [using "expr"] [mode m] [{ with|sort ... }]`
    pub(super) fn parse_apply(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        loop {
            if self.eat(SymbolKind::Using) {
                match self.take_expr() {
                    Some(select) => self.arena.node_mut(id).expr = Some(select),
                    None => self.report_for(
                        id,
                        ErrorKind::MissingExpression,
                        "missing quoted expression after 'using'",
                    ),
                }
            } else if self.cur.at(SymbolKind::Mode)
                && self.cur.next().kind == SymbolKind::QName
            {
                self.cur.advance();
                let mode = self.take_qname();
                self.arena.node_mut(id).mode = mode;
            } else {
                break;
            }
        }
        if self.open_optional_block(id) {
            self.parse_children(id)?;
        }
        Ok(())
    }
}
