//! Pipeline orchestration: lex, parse, validate, resolve, generate.
//!
//! Every pass runs even when earlier ones recorded defects; only an
//! aborted parse (no root construct) skips generation. The result
//! bundles the markup, the full error list and the optional symbol
//! listing so callers decide how to present and how to exit.

use crate::config::Config;
use crate::error::ErrorList;
use crate::lexer;
use crate::parser;
use crate::pass2_occurrence;
use crate::pass3_scope;
use crate::pass4_generate;
use crate::token::Token;

/// Everything one compilation produced.
pub struct Compilation {
    /// Generated markup; empty when no root construct survived parsing.
    pub markup: String,
    pub errors: ErrorList,
    /// Scope dump, empty unless symbol listing was requested.
    pub symbols: String,
    /// An advisory variable or template reference failed to resolve.
    pub undefined_seen: bool,
    /// The parse gave up early (end of file or step budget).
    pub aborted: bool,
}

impl Compilation {
    /// A compilation succeeds when nothing blocking was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.blocking_count() == 0
    }
}

pub fn compile(source: &str, config: &Config) -> Compilation {
    let tokens = lexer::tokenize(source);
    compile_tokens(&tokens, config)
}

/// Entry point for callers that already hold a token stream.
pub fn compile_tokens(tokens: &[Token], config: &Config) -> Compilation {
    let mut out = parser::parse(tokens, config);

    let mut markup = String::new();
    let mut symbols = String::new();
    let mut undefined_seen = false;

    if let Some(root) = out.root {
        pass2_occurrence::validate_occurrences(&mut out.arena, root, &mut out.errors);
        let resolved = pass3_scope::resolve_scopes(&out.arena, root, config, &mut out.errors);
        undefined_seen = resolved.undefined_seen;
        if config.show_symbols {
            symbols = resolved.scopes.listing();
        }
        markup = pass4_generate::generate(&out.arena, root, config);
    }

    Compilation {
        markup,
        errors: out.errors,
        symbols,
        undefined_seen,
        aborted: out.aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn clean_input_produces_markup_and_no_errors() {
        let result = compile(
            "stylesheet { version \"1.0\" match using \"/\" { copy } }",
            &Config::default(),
        );
        assert!(result.is_clean(), "{}", result.errors.listing());
        assert!(result.markup.contains("<xsl:stylesheet"));
        assert!(!result.aborted);
    }

    #[test]
    fn defective_input_still_generates() {
        let result = compile(
            "stylesheet { version \"1.0\" match using \"/\" { value-of } }",
            &Config::default(),
        );
        assert!(!result.is_clean());
        assert!(result.errors.contains(ErrorKind::MissingExpression));
        assert!(result.markup.contains("<xsl:value-of"), "{}", result.markup);
    }

    #[test]
    fn input_without_stylesheet_generates_nothing() {
        let result = compile("variable x \"1\"", &Config::default());
        assert!(result.markup.is_empty());
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn symbol_listing_is_opt_in() {
        let src = "stylesheet { version \"1.0\" match using \"/\" { variable v \"1\" value-of \"$v\" } }";
        let without = compile(src, &Config::default());
        assert!(without.symbols.is_empty());

        let mut config = Config::default();
        config.show_symbols = true;
        let with = compile(src, &config);
        assert!(with.symbols.contains("variable 'v'"), "{}", with.symbols);
    }

    #[test]
    fn undefined_reference_is_flagged_but_not_blocking() {
        let result = compile(
            "stylesheet { version \"1.0\" match using \"/\" { value-of \"$missing\" } }",
            &Config::default(),
        );
        assert!(result.undefined_seen);
        assert!(result.is_clean());
        assert!(result.errors.contains(ErrorKind::UndefinedVariable));
    }
}
