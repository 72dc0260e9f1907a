//! Character-level tokenizer: raw text to a flat token list.
//!
//! The tokenizer never fails. Unclassifiable characters become `Unknown`
//! tokens that the parser reports; an unterminated quote yields an
//! expression token running to the end of its line. The list is always
//! terminated by a distinguished end-of-file token.

use crate::symbol::SymbolKind;
use crate::token::{LexClass, Token};

fn is_name_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let mut line: u32 = 0;
    let mut column: u32 = 0;

    macro_rules! step {
        () => {{
            if chars[pos] == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
            pos += 1;
        }};
    }

    while pos < chars.len() {
        let c = chars[pos];

        // Line comment
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
            while pos < chars.len() && chars[pos] != '\n' {
                step!();
            }
            continue;
        }

        // Block comment; an unterminated one silently runs to end of input
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '*' {
            step!();
            step!();
            while pos < chars.len() {
                if chars[pos] == '*' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
                    step!();
                    step!();
                    break;
                }
                step!();
            }
            continue;
        }

        if c.is_whitespace() {
            step!();
            continue;
        }

        let tok_line = line;
        let tok_column = column;

        if c == '{' {
            tokens.push(Token {
                class: LexClass::Keyword,
                kind: SymbolKind::OpenBlock,
                text: "{".to_owned(),
                line: tok_line,
                column: tok_column,
            });
            step!();
            continue;
        }
        if c == '}' {
            tokens.push(Token {
                class: LexClass::Keyword,
                kind: SymbolKind::CloseBlock,
                text: "}".to_owned(),
                line: tok_line,
                column: tok_column,
            });
            step!();
            continue;
        }

        // Quoted expression
        if c == '"' {
            step!();
            let mut text = String::new();
            while pos < chars.len() {
                let sc = chars[pos];
                if sc == '"' {
                    step!();
                    break;
                }
                // Unterminated at end of line: stop there, keep what we have
                if sc == '\n' {
                    break;
                }
                if sc == '\\' && pos + 1 < chars.len() {
                    step!();
                    match chars[pos] {
                        '"' => text.push('"'),
                        '\\' => text.push('\\'),
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        other => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                    step!();
                    continue;
                }
                text.push(sc);
                step!();
            }
            tokens.push(Token {
                class: LexClass::Expression,
                kind: SymbolKind::Expression,
                text,
                line: tok_line,
                column: tok_column,
            });
            continue;
        }

        // Keyword or qualified name
        if is_name_start(c) {
            let start = pos;
            while pos < chars.len() && is_name_char(chars[pos]) {
                step!();
            }
            let word: String = chars[start..pos].iter().collect();
            match SymbolKind::from_keyword(&word) {
                Some(kind) => tokens.push(Token {
                    class: LexClass::Keyword,
                    kind,
                    text: word,
                    line: tok_line,
                    column: tok_column,
                }),
                None => tokens.push(Token {
                    class: LexClass::Name,
                    kind: SymbolKind::QName,
                    text: word,
                    line: tok_line,
                    column: tok_column,
                }),
            }
            continue;
        }

        // Anything else: one Unknown token per run of unclassifiable chars
        let start = pos;
        while pos < chars.len() {
            let uc = chars[pos];
            if uc.is_whitespace() || uc == '{' || uc == '}' || uc == '"' || is_name_start(uc) {
                break;
            }
            step!();
        }
        let text: String = chars[start..pos].iter().collect();
        tokens.push(Token {
            class: LexClass::Unknown,
            kind: SymbolKind::Unknown,
            text,
            line: tok_line,
            column: tok_column,
        });
    }

    tokens.push(Token::end_of_file(line, column));
    tokens
}
