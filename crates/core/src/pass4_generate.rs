//! Pass 4: structural XSLT generation.
//!
//! A pure tree walk: every node renders from its own fields plus its
//! attribute-role children (settings that fold into the parent's start
//! tag). No I/O, no global state, so identical trees always produce
//! byte-identical markup. Fields a construct requires but lacks render
//! as empty attribute values; the defect was already reported upstream
//! and generation stays total.

use quick_xml::escape::escape;
use std::fmt::Write as _;

use crate::config::Config;
use crate::node::{Arena, Node, NodeId};
use crate::symbol::SymbolKind;
use crate::XSLT_NS;

pub fn generate(arena: &Arena, root: NodeId, config: &Config) -> String {
    let mut gen = Generator {
        arena,
        config,
        out: String::new(),
    };
    gen.emit(root, 0);
    gen.out
}

/// XML attribute name for kinds that fold into the parent's start tag.
/// The namespace declaration is handled separately (prefixed name).
fn attribute_role(kind: SymbolKind) -> Option<&'static str> {
    use SymbolKind::*;
    Some(match kind {
        Version => "version",
        Method => "method",
        Encoding => "encoding",
        Indent => "indent",
        Standalone => "standalone",
        OmitDeclaration => "omit-xml-declaration",
        MediaType => "media-type",
        DoctypePublic => "doctype-public",
        DoctypeSystem => "doctype-system",
        CdataSections => "cdata-section-elements",
        DecimalSeparator => "decimal-separator",
        GroupingSeparator => "grouping-separator",
        Infinity => "infinity",
        MinusSign => "minus-sign",
        NotANumber => "NaN",
        Percent => "percent",
        PerMille => "per-mille",
        ZeroDigit => "zero-digit",
        Digit => "digit",
        PatternSeparator => "pattern-separator",
        _ => return None,
    })
}

fn folds_into_parent(kind: SymbolKind) -> bool {
    kind == SymbolKind::NamespaceDecl || attribute_role(kind).is_some()
}

struct Generator<'a> {
    arena: &'a Arena,
    config: &'a Config,
    out: String,
}

impl<'a> Generator<'a> {
    fn emit(&mut self, id: NodeId, depth: usize) {
        let node = self.arena.node(id);
        if folds_into_parent(node.kind) {
            return;
        }

        let pad = "  ".repeat(depth);
        if self.config.line_comments {
            let _ = writeln!(self.out, "{}<!-- Line: {} -->", pad, node.line + 1);
        }

        let tag = format!("{}:{}", self.config.prefix, local_name(node.kind));
        let attrs = self.start_attrs(id);
        let text = inline_text(node);
        let children: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|c| !folds_into_parent(self.arena.node(*c).kind))
            .collect();

        let mut open = format!("{}<{}", pad, tag);
        for (name, value) in &attrs {
            let _ = write!(open, " {}=\"{}\"", name, escape(value.as_str()));
        }

        if children.is_empty() && text.is_none() {
            let _ = writeln!(self.out, "{}/>", open);
            return;
        }
        if children.is_empty() {
            // Inline text content stays on one line
            let text = text.unwrap_or_default();
            let _ = writeln!(self.out, "{}>{}</{}>", open, escape(text.as_str()), tag);
            return;
        }

        let _ = writeln!(self.out, "{}>", open);
        if let Some(text) = text {
            let _ = writeln!(self.out, "{}  {}", pad, escape(text.as_str()));
        }
        for child in children {
            self.emit(child, depth + 1);
        }
        let _ = writeln!(self.out, "{}</{}>", pad, tag);
    }

    /// Start-tag attributes in fixed per-kind order: required attributes
    /// always (empty when the field is missing), optional ones only when
    /// present, then any attribute-role children in document order.
    fn start_attrs(&self, id: NodeId) -> Vec<(String, String)> {
        use SymbolKind::*;
        let node = self.arena.node(id);
        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut req = |name: &str, value: &Option<String>| {
            attrs.push((name.to_owned(), value.clone().unwrap_or_default()));
        };

        match node.kind {
            Stylesheet => {
                req("version", &self.child_value(id, Version));
                attrs.push((
                    format!("xmlns:{}", self.config.prefix),
                    XSLT_NS.to_owned(),
                ));
                for &child in &node.children {
                    let child_node = self.arena.node(child);
                    if child_node.kind == NamespaceDecl {
                        let prefix = child_node.name.clone().unwrap_or_default();
                        attrs.push((
                            format!("xmlns:{}", prefix),
                            child_node.uri.clone().unwrap_or_default(),
                        ));
                    }
                }
            }
            Import | Include => req("href", &node.uri),
            StripSpace | PreserveSpace => req("elements", &node.expr),
            Output | DecimalFormat => {
                if node.kind == DecimalFormat {
                    if let Some(name) = &node.name {
                        attrs.push((String::from("name"), name.clone()));
                    }
                }
            }
            Key => {
                req("name", &node.name);
                req("match", &node.expr);
                req("use", &node.value);
            }
            AttributeSet => req("name", &node.name),
            NamespaceAlias => {
                req("stylesheet-prefix", &node.name);
                req("result-prefix", &node.value);
            }
            Script => {
                if let Some(language) = &node.language {
                    attrs.push((String::from("language"), language.clone()));
                }
                if let Some(uri) = &node.uri {
                    attrs.push((String::from("src"), uri.clone()));
                }
            }
            Match => {
                req("match", &node.expr);
                if let Some(mode) = &node.mode {
                    attrs.push((String::from("mode"), mode.clone()));
                }
                if let Some(priority) = &node.priority {
                    attrs.push((String::from("priority"), priority.clone()));
                }
            }
            Proc => req("name", &node.name),
            Param | Variable | With => {
                req("name", &node.name);
                if let Some(select) = &node.value {
                    attrs.push((String::from("select"), select.clone()));
                }
            }
            Element | Attribute => {
                req("name", &node.name);
                if let Some(namespace) = &node.namespace {
                    attrs.push((String::from("namespace"), namespace.clone()));
                }
            }
            Pi => req("name", &node.name),
            ValueOf | CopyOf | ForEach => req("select", &node.expr),
            Number => {
                if let Some(count) = &node.expr {
                    attrs.push((String::from("count"), count.clone()));
                }
                if let Some(level) = &node.level {
                    attrs.push((String::from("level"), level.clone()));
                }
                if let Some(format) = &node.format {
                    attrs.push((String::from("format"), format.clone()));
                }
            }
            Apply => {
                if let Some(select) = &node.expr {
                    attrs.push((String::from("select"), select.clone()));
                }
                if let Some(mode) = &node.mode {
                    attrs.push((String::from("mode"), mode.clone()));
                }
            }
            Call => req("name", &node.name),
            Sort => {
                if let Some(select) = &node.expr {
                    attrs.push((String::from("select"), select.clone()));
                }
                if node.explicit_order {
                    let order = if node.descending { "descending" } else { "ascending" };
                    attrs.push((String::from("order"), order.to_owned()));
                }
                if let Some(data_type) = &node.data_type {
                    attrs.push((String::from("data-type"), data_type.clone()));
                }
            }
            If | When => req("test", &node.expr),
            Message => {
                if node.terminate {
                    attrs.push((String::from("terminate"), String::from("yes")));
                }
            }
            _ => {}
        }

        // Non-root attribute-role children (output, decimal-format)
        if node.kind != Stylesheet {
            for &child in &node.children {
                let child_node = self.arena.node(child);
                if let Some(name) = attribute_role(child_node.kind) {
                    attrs.push((
                        name.to_owned(),
                        child_node.value.clone().unwrap_or_default(),
                    ));
                }
            }
        }
        attrs
    }

    fn child_value(&self, id: NodeId, kind: SymbolKind) -> Option<String> {
        self.arena
            .node(id)
            .children
            .iter()
            .map(|&c| self.arena.node(c))
            .find(|n| n.kind == kind)
            .and_then(|n| n.value.clone())
    }
}

/// Local XML element name for node-role kinds.
fn local_name(kind: SymbolKind) -> &'static str {
    use SymbolKind::*;
    match kind {
        Stylesheet => "stylesheet",
        Import => "import",
        Include => "include",
        StripSpace => "strip-space",
        PreserveSpace => "preserve-space",
        Output => "output",
        Key => "key",
        DecimalFormat => "decimal-format",
        AttributeSet => "attribute-set",
        NamespaceAlias => "namespace-alias",
        Script => "script",
        Match | Proc => "template",
        Param => "param",
        Variable => "variable",
        With => "with-param",
        Element => "element",
        Attribute => "attribute",
        Text => "text",
        Comment => "comment",
        Pi => "processing-instruction",
        ValueOf => "value-of",
        Copy => "copy",
        CopyOf => "copy-of",
        Number => "number",
        Apply => "apply-templates",
        ApplyImports => "apply-imports",
        Call => "call-template",
        ForEach => "for-each",
        Sort => "sort",
        If => "if",
        Choose => "choose",
        When => "when",
        Otherwise => "otherwise",
        Message => "message",
        Fallback => "fallback",
        // Attribute-role kinds never reach element rendering
        _ => "",
    }
}

/// Inline text content for constructs that carry one.
fn inline_text(node: &Node) -> Option<String> {
    use SymbolKind::*;
    match node.kind {
        Text | Comment | Pi | Attribute | Message => node.value.clone(),
        _ => None,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
