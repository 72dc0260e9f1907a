//! Top-level productions: stylesheet, header declarations, output and
//! decimal-format settings, keys, attribute sets, aliases and scripts.

use super::{Parser, Recovery};
use crate::error::{EarlyEof, ErrorKind};
use crate::node::NodeId;
use crate::symbol::SymbolKind;

impl<'a> Parser<'a> {
    pub(super) fn parse_stylesheet(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// Shared body for every `keyword "value"` setting: the version entry
    /// and all output/decimal-format sub-attributes.
    pub(super) fn parse_setting(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(v) => self.arena.node_mut(id).value = Some(v),
            None => {
                let owner = self.arena.node(id).kind.display();
                self.report_for(
                    id,
                    ErrorKind::MissingValue,
                    format!("{} requires a quoted value", owner),
                );
            }
        }
        Ok(())
    }

    /// `namespace prefix "uri"`
    pub(super) fn parse_namespace(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_decl_name(id, "'namespace'") {
            Some(prefix) => self.arena.node_mut(id).name = Some(prefix),
            None => {}
        }
        match self.take_expr() {
            Some(uri) => self.arena.node_mut(id).uri = Some(uri),
            None => self.report_for(
                id,
                ErrorKind::MissingUri,
                "missing quoted URI after 'namespace'",
            ),
        }
        Ok(())
    }

    /// `import "href"` / `include "href"`
    pub(super) fn parse_href(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(uri) => self.arena.node_mut(id).uri = Some(uri),
            None => {
                let owner = self.arena.node(id).kind.display();
                self.report_for(
                    id,
                    ErrorKind::MissingUri,
                    format!("{} requires a quoted URI", owner),
                );
            }
        }
        Ok(())
    }

    /// `strip "elements"` / `preserve "elements"`
    pub(super) fn parse_space(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_expr() {
            Some(elements) => self.arena.node_mut(id).expr = Some(elements),
            None => {
                let owner = self.arena.node(id).kind.display();
                self.report_for(
                    id,
                    ErrorKind::MissingValue,
                    format!("{} requires a quoted element list", owner),
                );
            }
        }
        Ok(())
    }

    /// `output { method "xml" indent "yes" ... }`
    pub(super) fn parse_output(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `key name using "pattern" value "expr"`
    pub(super) fn parse_key(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if let Some(name) = self.take_decl_name(id, "'key'") {
            self.arena.node_mut(id).name = Some(name);
        }
        if self.eat(SymbolKind::Using) {
            match self.take_expr() {
                Some(pattern) => self.arena.node_mut(id).expr = Some(pattern),
                None => self.report_for(
                    id,
                    ErrorKind::InvalidPattern,
                    "missing quoted pattern after 'using'",
                ),
            }
        } else {
            self.report_for(
                id,
                ErrorKind::InvalidPattern,
                "'key' requires a 'using' pattern",
            );
        }
        if self.eat(SymbolKind::Value) {
            match self.take_expr() {
                Some(use_expr) => self.arena.node_mut(id).value = Some(use_expr),
                None => self.report_for(
                    id,
                    ErrorKind::MissingExpression,
                    "missing quoted expression after 'value'",
                ),
            }
        } else {
            self.report_for(
                id,
                ErrorKind::MissingExpression,
                "'key' requires a 'value' expression",
            );
        }
        Ok(())
    }

    /// `decimal-format [name] { decimal-separator "," ... }`
    pub(super) fn parse_decimal_format(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if let Some(name) = self.take_qname() {
            self.arena.node_mut(id).name = Some(name);
        }
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `attribute-set name { attribute ... }`
    pub(super) fn parse_attribute_set(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        if let Some(name) = self.take_decl_name(id, "'attribute-set'") {
            self.arena.node_mut(id).name = Some(name);
        }
        if self.open_block(id)? {
            self.parse_children(id)?;
        }
        Ok(())
    }

    /// `namespace-alias from to result` -- two prefixes joined by 'to'.
    pub(super) fn parse_namespace_alias(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        match self.take_qname() {
            Some(from) => self.arena.node_mut(id).name = Some(from),
            None => self.report_for(
                id,
                ErrorKind::MissingNamespace,
                "missing stylesheet prefix after 'namespace-alias'",
            ),
        }
        if !self.eat(SymbolKind::To) {
            self.report_here(
                ErrorKind::ExpectedInstead,
                "expected 'to' between the two prefixes of 'namespace-alias'",
            );
            self.recover(Recovery::NextKeyword);
            return Ok(());
        }
        match self.take_qname() {
            Some(result) => self.arena.node_mut(id).value = Some(result),
            None => self.report_for(
                id,
                ErrorKind::MissingNamespace,
                "missing result prefix after 'to'",
            ),
        }
        Ok(())
    }

    /// `script [language "..."] [uri "..."]` -- version 1.1 construct.
    pub(super) fn parse_script(&mut self, id: NodeId) -> Result<(), EarlyEof> {
        loop {
            if self.eat(SymbolKind::Language) {
                match self.take_expr() {
                    Some(language) => self.arena.node_mut(id).language = Some(language),
                    None => self.report_for(
                        id,
                        ErrorKind::MissingValue,
                        "missing quoted value after 'language'",
                    ),
                }
            } else if self.eat(SymbolKind::Uri) {
                match self.take_expr() {
                    Some(uri) => self.arena.node_mut(id).uri = Some(uri),
                    None => self.report_for(
                        id,
                        ErrorKind::MissingUri,
                        "missing quoted URI after 'uri'",
                    ),
                }
            } else {
                return Ok(());
            }
        }
    }
}
