//! Flow-control productions: iteration, sorting and conditionals.

use super::Parser;
use crate::error::{EarlyEof, ErrorKind};
use crate::node::NodeId;
use crate::symbol::SymbolKind;
use crate::token::Token;

/// A token usable as a clause value: a bare name, or a keyword that is
/// not a structural bracket.
fn is_clause_value(token: &Token) -> bool {
    !matches!(
        token.kind,
        SymbolKind::OpenBlock
            | SymbolKind::CloseBlock
            | SymbolKind::EndOfFile
            | SymbolKind::Expression
            | SymbolKind::Unknown
    )
}

impl<'a> Parser<'a> {
    /// `foreach "expr" { [sort ...] ... }`
    pub(super) fn parse_foreach(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(select) => self.arena.node_mut(id).expr = Some(select),
            None => self.report_for(
                id,
                ErrorKind::MissingExpression,
                "missing quoted expression after 'foreach'",
            ),
        }
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `sort ["expr"] [ascending|descending] [data-type name]`
    pub(super) fn parse_sort(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if let Some(select) = self.take_expr() {
            self.arena.node_mut(id).expr = Some(select);
        }
        loop {
            if self.eat(SymbolKind::Ascending) {
                let node = self.arena.node_mut(id);
                node.descending = false;
                node.explicit_order = true;
            } else if self.eat(SymbolKind::Descending) {
                let node = self.arena.node_mut(id);
                node.descending = true;
                node.explicit_order = true;
            } else if self.cur.at(SymbolKind::DataType) && is_clause_value(self.cur.next()) {
                // 'text' and 'number' are keywords, so the value position
                // accepts a keyword token as well as a bare name
                self.cur.advance();
                let data_type = self.cur.current().text.clone();
                self.cur.advance();
                self.arena.node_mut(id).data_type = Some(data_type);
            } else {
                return Ok(());
            }
        }
    }

    /// `if "expr" { ... }`
    pub(super) fn parse_if(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(test) => self.arena.node_mut(id).expr = Some(test),
            None => self.report_for(
                id,
                ErrorKind::MissingExpression,
                "missing quoted expression after 'if'",
            ),
        }
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `choose { when ... [otherwise ...] }`
    pub(super) fn parse_choose(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `when "expr" { ... }`
    pub(super) fn parse_when(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(test) => self.arena.node_mut(id).expr = Some(test),
            None => self.report_for(
                id,
                ErrorKind::MissingExpression,
                "missing quoted expression after 'when'",
            ),
        }
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `otherwise { ... }`
    pub(super) fn parse_otherwise(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }
}
