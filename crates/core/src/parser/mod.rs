//! Pass 1: recursive-descent parser -- one state machine per production,
//! sharing a single monotone token cursor and an append-only error list.
//!
//! Every parse body consumes tokens from its own keyword (already
//! consumed by the dispatcher) to its natural terminator and leaves the
//! cursor exactly one token past what it consumed. On an unrecognized or
//! misplaced token a body records one typed error and applies one of the
//! four recovery policies, so a single pass reports many independent
//! defects. The only escalating condition is early end of file.

use crate::config::Config;
use crate::error::{EarlyEof, ErrorKind, ErrorList};
use crate::grammar;
use crate::node::{Arena, NodeId};
use crate::symbol::SymbolKind;
use crate::token::{Cursor, LexClass, Token};

mod content;
mod flow;
mod template;
mod toplevel;

/// Resynchronization strategy applied after a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Advance until a terminal keyword is seen
    NextKeyword,
    /// Advance until the line number changes
    NextLine,
    /// Advance until a matching close-bracket, keeping bracket balance
    OutOfBlock,
    /// Consume the offending token in place
    Absorb,
}

/// Everything the parse pass produces: the (possibly partial) tree, the
/// error list so far, and whether the attempt was aborted early.
pub struct ParseOutcome {
    pub arena: Arena,
    pub root: Option<NodeId>,
    pub errors: ErrorList,
    pub aborted: bool,
}

pub fn parse(tokens: &[Token], config: &Config) -> ParseOutcome {
    let mut p = Parser::new(tokens, config);
    let (root, aborted) = p.parse_toplevel();
    check_brackets(tokens, &mut p.errors);
    ParseOutcome {
        arena: p.arena,
        root,
        errors: p.errors,
        aborted,
    }
}

/// Global bracket-nesting balance, checked once after the tree is built.
/// Reported with the signed residual level; never reported at zero.
fn check_brackets(tokens: &[Token], errors: &mut ErrorList) {
    let mut level: i64 = 0;
    let mut last_line = 0;
    for t in tokens {
        match t.kind {
            SymbolKind::OpenBlock => level += 1,
            SymbolKind::CloseBlock => level -= 1,
            _ => {}
        }
        last_line = t.line;
    }
    if level != 0 {
        errors.report(
            ErrorKind::UnmatchedBrackets,
            last_line,
            0,
            format!("unmatched brackets, nesting level {:+} at end of input", level),
        );
    }
}

pub(crate) struct Parser<'a> {
    cur: Cursor<'a>,
    arena: Arena,
    errors: ErrorList,
    config: &'a Config,
    eof_reported: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], config: &'a Config) -> Parser<'a> {
        Parser {
            cur: Cursor::new(tokens),
            arena: Arena::new(),
            errors: ErrorList::new(),
            config,
            eof_reported: false,
        }
    }

    // ── Top level ────────────────────────────────────────────────────

    fn parse_toplevel(&mut self) -> (Option<NodeId>, bool) {
        let mut root = None;
        while !self.cur.at_end() {
            if self.cur.out_of_budget() {
                return (root, true);
            }
            match self.cur.kind() {
                SymbolKind::Stylesheet if root.is_none() => {
                    let tok = self.cur.current();
                    let id = self.arena.alloc(SymbolKind::Stylesheet, tok.line, tok.column);
                    root = Some(id);
                    self.cur.advance();
                    if self.parse_body(SymbolKind::Stylesheet, id).is_err() {
                        return (root, true);
                    }
                }
                SymbolKind::Stylesheet => {
                    self.report_here(
                        ErrorKind::UnexpectedSymbol,
                        "only one 'stylesheet' is allowed per file",
                    );
                    self.recover(Recovery::NextLine);
                }
                kind => {
                    self.report_here(
                        ErrorKind::UnexpectedSymbol,
                        format!("{} outside of 'stylesheet'", kind.display()),
                    );
                    self.recover(Recovery::NextKeyword);
                }
            }
        }
        (root, false)
    }

    /// Production dispatch: one arm per node kind, mapping the tag to its
    /// hand-written state machine. The keyword token is already consumed.
    fn parse_body(&mut self, kind: SymbolKind, id: NodeId) -> Result<(), EarlyEof> {
        use SymbolKind::*;
        match kind {
            Stylesheet => self.parse_stylesheet(id),
            Version => self.parse_setting(id),
            NamespaceDecl => self.parse_namespace(id),
            Import | Include => self.parse_href(id),
            StripSpace | PreserveSpace => self.parse_space(id),
            Output => self.parse_output(id),
            Key => self.parse_key(id),
            DecimalFormat => self.parse_decimal_format(id),
            AttributeSet => self.parse_attribute_set(id),
            NamespaceAlias => self.parse_namespace_alias(id),
            Script => self.parse_script(id),
            Match => self.parse_match(id),
            Proc => self.parse_proc(id),

            Method | Encoding | Indent | Standalone | OmitDeclaration | MediaType
            | DoctypePublic | DoctypeSystem | CdataSections | DecimalSeparator
            | GroupingSeparator | Infinity | MinusSign | NotANumber | Percent | PerMille
            | ZeroDigit | Digit | PatternSeparator => self.parse_setting(id),

            Param | Variable => self.parse_binding(id),
            With => self.parse_binding(id),
            Element => self.parse_element(id),
            Attribute => self.parse_attribute(id),
            Text => self.parse_text(id),
            Comment => self.parse_comment(id),
            Pi => self.parse_pi(id),
            ValueOf => self.parse_value_of(id),
            Copy => self.parse_copy(id),
            CopyOf => self.parse_copy_of(id),
            Number => self.parse_number(id),
            Apply => self.parse_apply(id),
            ApplyImports => Ok(()),
            Call => self.parse_call(id),
            ForEach => self.parse_foreach(id),
            Sort => self.parse_sort(id),
            If => self.parse_if(id),
            Choose => self.parse_choose(id),
            When => self.parse_when(id),
            Otherwise => self.parse_otherwise(id),
            Message => self.parse_message(id),
            Fallback => self.parse_fallback(id),

            // Structural and clause kinds never reach the dispatcher
            _ => Ok(()),
        }
    }

    // ── Child loop shared by every composite production ──────────────

    /// Parse children until the matching close-bracket. The parent's
    /// occurrence map decides which keywords are legal here; everything
    /// else is reported and recovered from.
    fn parse_children(&mut self, parent: NodeId) -> Result<(), EarlyEof> {
        loop {
            if self.cur.out_of_budget() {
                return Err(EarlyEof);
            }
            match self.cur.kind() {
                SymbolKind::CloseBlock => {
                    self.cur.advance();
                    return Ok(());
                }
                SymbolKind::EndOfFile => return Err(self.early_eof()),
                SymbolKind::Unknown => {
                    let text = self.cur.current().text.clone();
                    self.report_here(
                        ErrorKind::UnknownSymbol,
                        format!("unknown symbol '{}'", text),
                    );
                    self.recover(Recovery::Absorb);
                }
                SymbolKind::OpenBlock => {
                    self.report_here(ErrorKind::UnexpectedSymbol, "unexpected '{'");
                    self.recover(Recovery::OutOfBlock);
                }
                kind if self.arena.node(parent).allows_child(kind) => {
                    if grammar::min_version(kind) > self.config.target {
                        self.report_here(
                            ErrorKind::VersionKeyword,
                            format!(
                                "{} requires target version {}",
                                kind.display(),
                                grammar::min_version(kind)
                            ),
                        );
                    }
                    let tok = self.cur.current();
                    let child = self.arena.alloc(kind, tok.line, tok.column);
                    self.arena.attach(parent, child);
                    self.cur.advance();
                    self.parse_body(kind, child)?;
                }
                kind => {
                    let parent_kind = self.arena.node(parent).kind;
                    self.report_here(
                        ErrorKind::UnexpectedSymbol,
                        format!(
                            "{} is not allowed inside {}",
                            kind.display(),
                            parent_kind.display()
                        ),
                    );
                    match self.cur.current().class {
                        LexClass::Keyword => self.recover(Recovery::NextLine),
                        _ => self.recover(Recovery::Absorb),
                    }
                }
            }
        }
    }

    // ── Recovery ─────────────────────────────────────────────────────

    fn recover(&mut self, policy: Recovery) {
        match policy {
            Recovery::Absorb => self.cur.advance(),
            Recovery::NextKeyword => {
                self.cur.advance();
                while !self.cur.at_end() && self.cur.current().class != LexClass::Keyword {
                    self.cur.advance();
                }
            }
            Recovery::NextLine => {
                let line = self.cur.line();
                self.cur.advance();
                while !self.cur.at_end() && self.cur.line() == line {
                    self.cur.advance();
                }
            }
            Recovery::OutOfBlock => self.skip_balanced(),
        }
    }

    /// Skip to one past the close-bracket matching the current nesting
    /// level. Called at an open-bracket it swallows the whole block.
    fn skip_balanced(&mut self) {
        let mut depth: i64 = 0;
        loop {
            if self.cur.out_of_budget() {
                return;
            }
            match self.cur.kind() {
                SymbolKind::OpenBlock => {
                    depth += 1;
                    self.cur.advance();
                }
                SymbolKind::CloseBlock => {
                    self.cur.advance();
                    depth -= 1;
                    if depth <= 0 {
                        return;
                    }
                }
                SymbolKind::EndOfFile => return,
                _ => self.cur.advance(),
            }
        }
    }

    // ── Shared token-taking helpers ──────────────────────────────────

    fn take_expr(&mut self) -> Option<String> {
        if self.cur.at(SymbolKind::Expression) {
            let text = self.cur.current().text.clone();
            self.cur.advance();
            Some(text)
        } else {
            None
        }
    }

    fn take_qname(&mut self) -> Option<String> {
        if self.cur.at(SymbolKind::QName) {
            let text = self.cur.current().text.clone();
            self.cur.advance();
            Some(text)
        } else {
            None
        }
    }

    /// Declared-name position: a bare name, or a keyword misused as one
    /// (reported as a reserved word but still taken, so later passes see
    /// the declaration).
    fn take_decl_name(&mut self, id: NodeId, owner: &str) -> Option<String> {
        if let Some(name) = self.take_qname() {
            return Some(name);
        }
        let tok = self.cur.current();
        if tok.class == LexClass::Keyword
            && !matches!(
                tok.kind,
                SymbolKind::OpenBlock | SymbolKind::CloseBlock | SymbolKind::EndOfFile
            )
        {
            let word = tok.text.clone();
            self.report_here(
                ErrorKind::ReservedWord,
                format!("reserved word '{}' used as a name after {}", word, owner),
            );
            self.cur.advance();
            return Some(word);
        }
        self.report_for(id, ErrorKind::MissingName, format!("missing name after {}", owner));
        None
    }

    /// Consume the clause keyword when present.
    fn eat(&mut self, kind: SymbolKind) -> bool {
        if self.cur.at(kind) {
            self.cur.advance();
            true
        } else {
            false
        }
    }

    /// Required block opener. Reports and resynchronizes to the next
    /// keyword when absent.
    fn open_block(&mut self, id: NodeId) -> Result<bool, EarlyEof> {
        if self.cur.at(SymbolKind::OpenBlock) {
            self.cur.advance();
            self.arena.node_mut(id).has_block = true;
            return Ok(true);
        }
        if self.cur.at_end() {
            return Err(self.early_eof());
        }
        let owner = self.arena.node(id).kind.display();
        self.report_here(
            ErrorKind::ExpectedInstead,
            format!(
                "expected '{{' after {}, found {}",
                owner,
                self.cur.kind().display()
            ),
        );
        self.recover(Recovery::NextKeyword);
        Ok(false)
    }

    /// Optional block opener; no error when absent.
    fn open_optional_block(&mut self, id: NodeId) -> bool {
        if self.cur.at(SymbolKind::OpenBlock) {
            self.cur.advance();
            self.arena.node_mut(id).has_block = true;
            true
        } else {
            false
        }
    }

    // ── Error reporting ──────────────────────────────────────────────

    /// Report at the current token's position.
    fn report_here(&mut self, kind: ErrorKind, detail: impl Into<String>) {
        let (line, column) = (self.cur.line(), self.cur.column());
        self.errors.report(kind, line, column, detail);
    }

    /// Report at a node's opening keyword position.
    fn report_for(&mut self, id: NodeId, kind: ErrorKind, detail: impl Into<String>) {
        let node = self.arena.node(id);
        let (line, column) = (node.line, node.column);
        self.errors.report(kind, line, column, detail);
    }

    fn early_eof(&mut self) -> EarlyEof {
        if !self.eof_reported {
            self.eof_reported = true;
            let (line, column) = (self.cur.line(), self.cur.column());
            self.errors.report(
                ErrorKind::EarlyEndOfFile,
                line,
                column,
                "early end of file inside an open construct",
            );
        }
        EarlyEof
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_src(src: &str) -> ParseOutcome {
        let config = Config::default();
        let tokens = lexer::tokenize(src);
        parse(&tokens, &config)
    }

    #[test]
    fn minimal_stylesheet_parses_without_errors() {
        let out = parse_src(
            r#"stylesheet {
  version "1.0"
  match using "/" {
    element "html" { text "hi" }
  }
}"#,
        );
        assert!(out.errors.is_empty(), "errors: {}", out.errors.listing());
        let root = out.root.expect("root node");
        let node = out.arena.node(root);
        assert_eq!(node.kind, SymbolKind::Stylesheet);
        assert_eq!(node.children.len(), 2, "version + match");
        assert!(!out.aborted);
    }

    #[test]
    fn missing_name_variable_reports_and_recovers() {
        let out = parse_src("stylesheet { version \"1.0\" variable { } }");
        assert!(out.errors.contains(ErrorKind::MissingName));
        assert!(!out.aborted);
    }

    #[test]
    fn unmatched_open_bracket_reports_signed_level() {
        let out = parse_src("stylesheet { version \"1.0\" match using \"/\" { ");
        assert!(out.errors.contains(ErrorKind::UnmatchedBrackets));
        let record = out
            .errors
            .records()
            .iter()
            .find(|r| r.kind == ErrorKind::UnmatchedBrackets)
            .unwrap();
        assert!(
            record.message.contains("+2"),
            "signed residual in message: {}",
            record.message
        );
        // Still inside the stylesheet when the stream ended
        assert!(out.errors.contains(ErrorKind::EarlyEndOfFile));
    }

    #[test]
    fn balanced_input_never_reports_brackets() {
        let out = parse_src("stylesheet { version \"1.0\" }");
        assert!(!out.errors.contains(ErrorKind::UnmatchedBrackets));
    }

    #[test]
    fn misplaced_keyword_is_reported_and_skipped() {
        // 'when' is only legal inside 'choose'
        let out = parse_src(
            "stylesheet {\n  version \"1.0\"\n  when \"x\" { text \"y\" }\n  match using \"/\" { }\n}",
        );
        assert!(out.errors.contains(ErrorKind::UnexpectedSymbol));
        let root = out.root.unwrap();
        let kinds: Vec<SymbolKind> = out
            .arena
            .node(root)
            .children
            .iter()
            .map(|c| out.arena.node(*c).kind)
            .collect();
        assert!(kinds.contains(&SymbolKind::Match), "later siblings still parse");
    }

    #[test]
    fn unknown_symbol_reports_code_1002() {
        let out = parse_src("stylesheet { version \"1.0\" @@ }");
        let record = out
            .errors
            .records()
            .iter()
            .find(|r| r.kind == ErrorKind::UnknownSymbol)
            .expect("unknown symbol record");
        assert_eq!(record.code, 1002);
    }

    #[test]
    fn early_eof_aborts_but_keeps_partial_tree() {
        let out = parse_src("stylesheet { version \"1.0\" match using \"/\" {");
        assert!(out.aborted);
        let root = out.root.expect("partial tree keeps its root");
        assert!(!out.arena.node(root).children.is_empty());
    }

    #[test]
    fn recovery_always_reaches_end_of_stream() {
        // Inject a stray token at every position of a valid source and
        // check the parser terminates with the injection reported. An
        // abort is only legitimate when the escalation was early end of
        // file; a budget-triggered abort would mean a recovery path
        // stopped making progress.
        let src = "stylesheet {\n  version \"1.0\"\n  match using \"/\" {\n    element \"p\" {\n      text \"hi\"\n    }\n  }\n}";
        let base = lexer::tokenize(src);
        let stray = lexer::tokenize("@?!")
            .into_iter()
            .next()
            .expect("stray token");
        for at in 0..base.len() {
            let mut tokens = base.clone();
            tokens.insert(at, stray.clone());
            let config = Config::default();
            let out = parse(&tokens, &config);
            assert!(
                !out.errors.is_empty(),
                "position {at}: injected token must surface somewhere"
            );
            if out.aborted {
                assert!(
                    out.errors.contains(ErrorKind::EarlyEndOfFile),
                    "position {at}: abort without early end of file means a stuck recovery path:\n{}",
                    out.errors.listing()
                );
            }
        }
    }

    #[test]
    fn version_gated_keyword_reports_but_still_parses() {
        let out = parse_src("stylesheet { version \"1.0\" script language \"javascript\" }");
        assert!(out.errors.contains(ErrorKind::VersionKeyword));
        let root = out.root.unwrap();
        let kinds: Vec<SymbolKind> = out
            .arena
            .node(root)
            .children
            .iter()
            .map(|c| out.arena.node(*c).kind)
            .collect();
        assert!(kinds.contains(&SymbolKind::Script));
    }
}
