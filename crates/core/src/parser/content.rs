//! Result-content productions: literal output constructs, copies,
//! numbering and messages.

use super::Parser;
use crate::error::{EarlyEof, ErrorKind};
use crate::node::NodeId;
use crate::symbol::SymbolKind;

impl<'a> Parser<'a> {
    /// `element "name" [namespace "uri"] { ... }`
    pub(super) fn parse_element(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr().or_else(|| self.take_qname()) {
            Some(name) => self.arena.node_mut(id).name = Some(name),
            None => self.report_for(id, ErrorKind::MissingName, "missing name after 'element'"),
        }
        self.parse_namespace_clause(id);
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `attribute "name" [namespace "uri"] ("value" | { ... })`
    ///
    /// Exactly one of the inline value and the block is required; the
    /// shape check enforces that after parse.
    pub(super) fn parse_attribute(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr().or_else(|| self.take_qname()) {
            Some(name) => self.arena.node_mut(id).name = Some(name),
            None => self.report_for(id, ErrorKind::MissingName, "missing name after 'attribute'"),
        }
        self.parse_namespace_clause(id);
        if let Some(value) = self.take_expr() {
            self.arena.node_mut(id).value = Some(value);
        }
        if self.open_optional_block(id) {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `namespace "uri"` clause shared by element and attribute; only
    /// taken when the next token really is an expression, so a following
    /// misplaced namespace declaration still errors on its own terms.
    fn parse_namespace_clause(&mut self, id: NodeId) {
        if self.cur.at(SymbolKind::NamespaceDecl)
            && self.cur.next().kind == SymbolKind::Expression
        {
            self.cur.advance();
            let uri = self.take_expr();
            self.arena.node_mut(id).namespace = uri;
        }
    }

    /// `text "literal"`
    pub(super) fn parse_text(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(value) => self.arena.node_mut(id).value = Some(value),
            None => self.report_for(id, ErrorKind::MissingValue, "missing quoted value after 'text'"),
        }
        Ok(())
    }

    /// `comment ("literal" | { ... })`
    pub(super) fn parse_comment(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if let Some(value) = self.take_expr() {
            self.arena.node_mut(id).value = Some(value);
        }
        if self.open_optional_block(id) {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `pi name ("literal" | { ... })`
    pub(super) fn parse_pi(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_qname() {
            Some(name) => self.arena.node_mut(id).name = Some(name),
            None => self.report_for(id, ErrorKind::MissingName, "missing target name after 'pi'"),
        }
        if let Some(value) = self.take_expr() {
            self.arena.node_mut(id).value = Some(value);
        }
        if self.open_optional_block(id) {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `value-of "expr"`
    pub(super) fn parse_value_of(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(select) => self.arena.node_mut(id).expr = Some(select),
            None => self.report_for(
                id,
                ErrorKind::MissingExpression,
                "missing quoted expression after 'value-of'",
            ),
        }
        Ok(())
    }

    /// `copy [{ ... }]`
    pub(super) fn parse_copy(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if self.open_optional_block(id) {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `copy-of "expr"`
    pub(super) fn parse_copy_of(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(select) => self.arena.node_mut(id).expr = Some(select),
            None => self.report_for(
                id,
                ErrorKind::MissingExpression,
                "missing quoted expression after 'copy-of'",
            ),
        }
        Ok(())
    }

    /// `number [using "count"] [level name] [format "..."]`
    pub(super) fn parse_number(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        loop {
            if self.eat(SymbolKind::Using) {
                match self.take_expr() {
                    Some(count) => self.arena.node_mut(id).expr = Some(count),
                    None => self.report_for(
                        id,
                        ErrorKind::MissingExpression,
                        "missing quoted pattern after 'using'",
                    ),
                }
            } else if self.cur.at(SymbolKind::Level)
                && self.cur.next().kind == SymbolKind::QName
            {
                self.cur.advance();
                let level = self.take_qname();
                self.arena.node_mut(id).level = level;
            } else if self.eat(SymbolKind::Format) {
                match self.take_expr() {
                    Some(format) => self.arena.node_mut(id).format = Some(format),
                    None => self.report_for(
                        id,
                        ErrorKind::MissingValue,
                        "missing quoted value after 'format'",
                    ),
                }
            } else {
                return Ok(());
            }
        }
    }

    /// `message [terminate] ("literal" | { ... })`
    pub(super) fn parse_message(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if self.eat(SymbolKind::Terminate) {
            self.arena.node_mut(id).terminate = true;
        }
        if let Some(value) = self.take_expr() {
            self.arena.node_mut(id).value = Some(value);
        }
        if self.open_optional_block(id) {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `fallback { ... }`
    pub(super) fn parse_fallback(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }
}
