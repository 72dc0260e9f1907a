//! Token record and the single shared cursor advanced during parse.
//!
//! The core consumes tokens; it never re-tokenizes or mutates the
//! sequence. Any producer honoring this contract can feed
//! [`crate::compile_tokens`] -- the bundled tokenizer is one such
//! producer.

use crate::symbol::SymbolKind;

/// Lexical class of a token, orthogonal to its [`SymbolKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexClass {
    /// Terminal keyword (productions, clauses, brackets)
    Keyword,
    /// Bare qualified name
    Name,
    /// Quoted expression -- content without quotes, escapes resolved
    Expression,
    /// Unclassifiable character run
    Unknown,
}

/// Immutable token record. Lines and columns are 0-based; display adds 1.
#[derive(Debug, Clone)]
pub struct Token {
    pub class: LexClass,
    pub kind: SymbolKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn end_of_file(line: u32, column: u32) -> Token {
        Token {
            class: LexClass::Keyword,
            kind: SymbolKind::EndOfFile,
            text: String::new(),
            line,
            column,
        }
    }
}

/// The one shared token cursor. Advanced monotonically by whichever node
/// is active; call-stack discipline guarantees a single logical writer.
///
/// A defensive step budget guards the top-level loop against runaway
/// cursor corruption: once exceeded, the parse terminates early with
/// whatever partial tree and errors exist.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    steps: usize,
    budget: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Cursor<'a> {
        Cursor {
            tokens,
            pos: 0,
            steps: 0,
            budget: tokens.len() * 4 + 256,
        }
    }

    /// Current token. Clamps at the trailing end-of-file token, which the
    /// contract guarantees is present.
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len().saturating_sub(1))]
    }

    /// One token of lookahead.
    pub fn next(&self) -> &Token {
        self.at_offset(1)
    }

    /// Two tokens of lookahead.
    pub fn after_next(&self) -> &Token {
        self.at_offset(2)
    }

    fn at_offset(&self, off: usize) -> &Token {
        let idx = (self.pos + off).min(self.tokens.len().saturating_sub(1));
        &self.tokens[idx]
    }

    pub fn kind(&self) -> SymbolKind {
        self.current().kind
    }

    pub fn at(&self, kind: SymbolKind) -> bool {
        self.current().kind == kind
    }

    pub fn at_end(&self) -> bool {
        self.at(SymbolKind::EndOfFile)
    }

    pub fn line(&self) -> u32 {
        self.current().line
    }

    pub fn column(&self) -> u32 {
        self.current().column
    }

    /// Advance one token; a no-op once the end-of-file token is current.
    /// Every advance, including clamped ones, burns one budget step.
    pub fn advance(&mut self) {
        self.steps += 1;
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    pub fn out_of_budget(&self) -> bool {
        self.steps > self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, line: u32, column: u32) -> Token {
        Token {
            class: LexClass::Name,
            kind: SymbolKind::QName,
            text: text.to_owned(),
            line,
            column,
        }
    }

    #[test]
    fn cursor_clamps_at_end_of_file() {
        let tokens = vec![word("a", 0, 0), Token::end_of_file(0, 1)];
        let mut cur = Cursor::new(&tokens);
        assert_eq!(cur.current().text, "a");
        cur.advance();
        assert!(cur.at_end());
        cur.advance();
        cur.advance();
        assert!(cur.at_end(), "advance past eof stays at eof");
    }

    #[test]
    fn lookahead_triple_clamps() {
        let tokens = vec![word("a", 0, 0), word("b", 0, 2), Token::end_of_file(0, 3)];
        let cur = Cursor::new(&tokens);
        assert_eq!(cur.current().text, "a");
        assert_eq!(cur.next().text, "b");
        assert_eq!(cur.after_next().kind, SymbolKind::EndOfFile);
    }

    #[test]
    fn budget_trips_after_bounded_steps() {
        let tokens = vec![Token::end_of_file(0, 0)];
        let mut cur = Cursor::new(&tokens);
        for _ in 0..1000 {
            cur.advance();
        }
        assert!(cur.out_of_budget());
    }
}
