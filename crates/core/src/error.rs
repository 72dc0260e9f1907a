//! Typed error catalogue and the order-preserving, duplicate-suppressed
//! error list shared by every pass.
//!
//! Every kind carries a stable numeric code for downstream exit-code
//! mapping (1xx families by category, 1001/1002 for end-of-file and
//! unknown symbols) and a fixed remediation suggestion. Records never
//! abort a pass; the single escalating condition is early end of file,
//! modelled separately as [`EarlyEof`].

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Marker for the one non-locally-recoverable parse condition: the token
/// stream ended while a construct was still open. Propagated with `?` up
/// the recursive descent to abort the parse attempt; later passes still
/// run on the partial tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyEof;

/// Fatal, non-recorded failures: unreadable input and bad configuration.
/// Surfaced by the CLI only; the core itself performs no I/O.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("cannot read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported target version '{0}' (expected '1.0' or '1.1')")]
    Version(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    // ── Lexical / structural ─────────────────────────────────────────
    UnexpectedSymbol,
    ExpectedInstead,
    UnmatchedBrackets,
    ReservedWord,

    // ── Value / shape ────────────────────────────────────────────────
    MissingName,
    MissingValue,
    MissingExpression,
    MissingNamespace,
    MissingUri,
    InvalidPattern,
    EmptyBlock,
    ValueAndBlock,
    ValueOrBlockMissing,
    InvalidAttributeValue,

    // ── Grammar occurrence ───────────────────────────────────────────
    RequiredChildMissing,
    TooManyChildren,
    OneOrMoreMissing,

    // ── Declaration ──────────────────────────────────────────────────
    DuplicateVariable,
    DuplicateParameter,
    DuplicateTemplate,
    DuplicateNamespace,
    DuplicateDeclaration,

    // ── Ordering ─────────────────────────────────────────────────────
    ParamNotFirst,
    SortNotFirst,

    // ── Version compatibility ────────────────────────────────────────
    VersionKeyword,

    // ── Scope (advisory) ─────────────────────────────────────────────
    UndefinedVariable,
    UndefinedTemplate,

    // ── Non-locally-recoverable ──────────────────────────────────────
    EarlyEndOfFile,
    UnknownSymbol,
}

impl ErrorKind {
    /// Stable numeric code, grouped by category.
    pub fn code(&self) -> u16 {
        use ErrorKind::*;
        match self {
            UnexpectedSymbol => 101,
            ExpectedInstead => 102,
            UnmatchedBrackets => 103,
            ReservedWord => 104,

            MissingName => 110,
            MissingValue => 111,
            MissingExpression => 112,
            MissingNamespace => 113,
            MissingUri => 114,
            InvalidPattern => 115,
            EmptyBlock => 116,
            ValueAndBlock => 117,
            ValueOrBlockMissing => 118,
            InvalidAttributeValue => 119,

            RequiredChildMissing => 120,
            TooManyChildren => 121,
            OneOrMoreMissing => 122,

            DuplicateVariable => 130,
            DuplicateParameter => 131,
            DuplicateTemplate => 132,
            DuplicateNamespace => 133,
            DuplicateDeclaration => 134,

            ParamNotFirst => 140,
            SortNotFirst => 141,

            VersionKeyword => 150,

            UndefinedVariable => 160,
            UndefinedTemplate => 161,

            EarlyEndOfFile => 1001,
            UnknownSymbol => 1002,
        }
    }

    /// Fixed remediation suggestion printed under the message.
    pub fn suggestion(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            UnexpectedSymbol => "remove the symbol or move it where its construct is allowed",
            ExpectedInstead => "insert the expected symbol before this point",
            UnmatchedBrackets => "balance every '{' with a matching '}'",
            ReservedWord => "rename the identifier; this word is reserved",

            MissingName => "supply a name after the keyword",
            MissingValue => "supply a quoted value after the keyword",
            MissingExpression => "supply a quoted expression after the keyword",
            MissingNamespace => "supply a namespace prefix",
            MissingUri => "supply a quoted URI",
            InvalidPattern => "supply a 'using' clause with a quoted pattern",
            EmptyBlock => "add at least one entry inside the block, or remove it",
            ValueAndBlock => "use either an inline value or a block, not both",
            ValueOrBlockMissing => "add an inline value or a block",
            InvalidAttributeValue => "the reported default was substituted; fix the value",

            RequiredChildMissing => "add the required entry to the block",
            TooManyChildren => "remove the extra entry; only one is allowed",
            OneOrMoreMissing => "add at least one such entry to the block",

            DuplicateVariable => "rename or remove one of the two variables",
            DuplicateParameter => "rename or remove one of the two parameters",
            DuplicateTemplate => "rename or remove one of the two templates",
            DuplicateNamespace => "remove the duplicate namespace declaration",
            DuplicateDeclaration => "remove the duplicate declaration",

            ParamNotFirst => "move all 'param' entries to the start of the block",
            SortNotFirst => "move all 'sort' entries to the start of the block",

            VersionKeyword => "raise the target version or remove the construct",

            UndefinedVariable => "declare the variable in an enclosing scope, or ignore if built-in",
            UndefinedTemplate => "declare a 'proc' with this name, or ignore if imported",

            EarlyEndOfFile => "close every open construct before the end of the file",
            UnknownSymbol => "remove the unrecognized characters",
        }
    }

    /// Advisory kinds are suppressible and never affect the exit status
    /// by themselves.
    pub fn is_advisory(&self) -> bool {
        matches!(self, ErrorKind::UndefinedVariable | ErrorKind::UndefinedTemplate)
    }
}

/// One recorded defect: position plus rendered message and suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub code: u16,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub suggestion: &'static str,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**** ({}) {}\n     {}",
            self.code, self.message, self.suggestion
        )
    }
}

/// Append-only error list: order-preserving, duplicate-suppressed by
/// message hash.
#[derive(Debug, Default)]
pub struct ErrorList {
    records: Vec<ErrorRecord>,
    seen: HashSet<u64>,
}

impl ErrorList {
    pub fn new() -> ErrorList {
        ErrorList::default()
    }

    /// Record a defect. The rendered message gets a 1-based "line N"
    /// prefix; identical messages are suppressed.
    pub fn report(&mut self, kind: ErrorKind, line: u32, column: u32, detail: impl Into<String>) {
        let message = format!("line {}: {}", line + 1, detail.into());
        let mut hasher = DefaultHasher::new();
        message.hash(&mut hasher);
        if !self.seen.insert(hasher.finish()) {
            return;
        }
        self.records.push(ErrorRecord {
            kind,
            code: kind.code(),
            line,
            column,
            message,
            suggestion: kind.suggestion(),
        });
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Count of non-advisory records -- the ones that make a run fail.
    pub fn blocking_count(&self) -> usize {
        self.records.iter().filter(|r| !r.kind.is_advisory()).count()
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.records.iter().any(|r| r.kind == kind)
    }

    /// Full listing in the fixed user-visible shape.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for r in &self.records {
            out.push_str(&r.to_string());
            out.push('\n');
        }
        out
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.records).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_has_code_message_and_suggestion_shape() {
        let mut errors = ErrorList::new();
        errors.report(ErrorKind::MissingName, 2, 0, "missing name after 'variable'");
        let listing = errors.listing();
        assert!(
            listing.starts_with("**** (110) line 3: missing name after 'variable'\n     "),
            "unexpected listing: {listing}"
        );
    }

    #[test]
    fn duplicate_messages_are_suppressed() {
        let mut errors = ErrorList::new();
        errors.report(ErrorKind::UnexpectedSymbol, 4, 1, "unexpected '}'");
        errors.report(ErrorKind::UnexpectedSymbol, 4, 1, "unexpected '}'");
        errors.report(ErrorKind::UnexpectedSymbol, 5, 1, "unexpected '}'");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn advisory_kinds_do_not_block() {
        let mut errors = ErrorList::new();
        errors.report(ErrorKind::UndefinedVariable, 1, 0, "could not find variable '$x'");
        assert_eq!(errors.blocking_count(), 0);
        errors.report(ErrorKind::MissingValue, 1, 0, "missing value");
        assert_eq!(errors.blocking_count(), 1);
    }

    #[test]
    fn codes_are_grouped_by_category() {
        assert_eq!(ErrorKind::UnmatchedBrackets.code(), 103);
        assert_eq!(ErrorKind::EarlyEndOfFile.code(), 1001);
        assert_eq!(ErrorKind::UnknownSymbol.code(), 1002);
    }
}
