//! Core compiler for the Slate stylesheet language: a brace-delimited
//! notation that compiles to XSLT markup.
//!
//! The pipeline is four explicit passes over progressively richer data:
//!
//! 1. [`parser::parse`] -- recursive descent with construct-boundary
//!    error recovery over the token stream from [`lexer::tokenize`]
//! 2. [`pass2_occurrence::validate_occurrences`] -- grammar occurrence
//!    bounds and per-construct shape checks
//! 3. [`pass3_scope::resolve_scopes`] -- hierarchical symbol tables,
//!    duplicate detection and reference resolution
//! 4. [`pass4_generate::generate`] -- pure structural markup synthesis
//!
//! [`compile`] runs all of them and never panics on any input: defects
//! are accumulated in an [`ErrorList`] and generation proceeds on
//! whatever tree survived.

pub mod compile;
pub mod config;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod pass2_occurrence;
pub mod pass3_scope;
pub mod pass4_generate;
pub mod symbol;
pub mod symtab;
pub mod token;

/// The XSLT namespace bound to the configured prefix on the root element.
pub const XSLT_NS: &str = "http://www.w3.org/1999/XSL/Transform";

/// Prefix used on generated tags unless overridden.
pub const DEFAULT_PREFIX: &str = "xsl";

pub use compile::{compile, compile_tokens, Compilation};
pub use config::{Config, TargetVersion};
pub use error::{ErrorKind, ErrorList, ErrorRecord, FatalError};
pub use lexer::tokenize;
pub use node::{Arena, NodeId};
pub use parser::{parse, ParseOutcome};
pub use symbol::SymbolKind;
pub use token::{Cursor, LexClass, Token};
