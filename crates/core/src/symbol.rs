//! Symbol kinds -- one tag per grammar production, plus the structural and
//! clause tokens the tokenizer can produce.
//!
//! The same enum tags both tokens and grammar nodes: a node is always
//! created from the keyword token that opens it, so the two tag spaces
//! coincide by construction.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    // ── Structural tokens ────────────────────────────────────────────
    OpenBlock,
    CloseBlock,
    /// Bare qualified name (identifier)
    QName,
    /// Quoted expression string
    Expression,
    /// Character sequence the tokenizer could not classify
    Unknown,
    /// Distinguished end-of-stream token
    EndOfFile,

    // ── Clause keywords (never become nodes) ─────────────────────────
    Using,
    Mode,
    Priority,
    To,
    Terminate,
    Ascending,
    Descending,
    DataType,
    Level,
    Format,
    Language,
    Uri,
    Value,

    // ── Top-level productions ────────────────────────────────────────
    Stylesheet,
    Version,
    NamespaceDecl,
    Import,
    Include,
    StripSpace,
    PreserveSpace,
    Output,
    Key,
    DecimalFormat,
    AttributeSet,
    NamespaceAlias,
    Script,
    Match,
    Proc,

    // ── Output sub-attributes ────────────────────────────────────────
    Method,
    Encoding,
    Indent,
    Standalone,
    OmitDeclaration,
    MediaType,
    DoctypePublic,
    DoctypeSystem,
    CdataSections,

    // ── decimal-format sub-attributes ────────────────────────────────
    DecimalSeparator,
    GroupingSeparator,
    Infinity,
    MinusSign,
    NotANumber,
    Percent,
    PerMille,
    ZeroDigit,
    Digit,
    PatternSeparator,

    // ── Template content productions ─────────────────────────────────
    Param,
    Variable,
    With,
    Element,
    Attribute,
    Text,
    Comment,
    Pi,
    ValueOf,
    Copy,
    CopyOf,
    Number,
    Apply,
    ApplyImports,
    Call,
    ForEach,
    Sort,
    If,
    Choose,
    When,
    Otherwise,
    Message,
    Fallback,
}

impl SymbolKind {
    /// Keyword-to-kind lookup used by the tokenizer. Clause keywords and
    /// production keywords share one namespace.
    pub fn from_keyword(word: &str) -> Option<SymbolKind> {
        use SymbolKind::*;
        let kind = match word {
            "using" => Using,
            "mode" => Mode,
            "priority" => Priority,
            "to" => To,
            "terminate" => Terminate,
            "ascending" => Ascending,
            "descending" => Descending,
            "data-type" => DataType,
            "level" => Level,
            "format" => Format,
            "language" => Language,
            "uri" => Uri,
            "value" => Value,

            "stylesheet" => Stylesheet,
            "version" => Version,
            "namespace" => NamespaceDecl,
            "import" => Import,
            "include" => Include,
            "strip" => StripSpace,
            "preserve" => PreserveSpace,
            "output" => Output,
            "key" => Key,
            "decimal-format" => DecimalFormat,
            "attribute-set" => AttributeSet,
            "namespace-alias" => NamespaceAlias,
            "script" => Script,
            "match" => Match,
            "proc" => Proc,

            "method" => Method,
            "encoding" => Encoding,
            "indent" => Indent,
            "standalone" => Standalone,
            "omit-declaration" => OmitDeclaration,
            "media-type" => MediaType,
            "doctype-public" => DoctypePublic,
            "doctype-system" => DoctypeSystem,
            "cdata" => CdataSections,

            "decimal-separator" => DecimalSeparator,
            "grouping-separator" => GroupingSeparator,
            "infinity" => Infinity,
            "minus-sign" => MinusSign,
            "nan" => NotANumber,
            "percent" => Percent,
            "permille" => PerMille,
            "zero-digit" => ZeroDigit,
            "digit" => Digit,
            "pattern-separator" => PatternSeparator,

            "param" => Param,
            "variable" => Variable,
            "with" => With,
            "element" => Element,
            "attribute" => Attribute,
            "text" => Text,
            "comment" => Comment,
            "pi" => Pi,
            "value-of" => ValueOf,
            "copy" => Copy,
            "copy-of" => CopyOf,
            "number" => Number,
            "apply" => Apply,
            "apply-imports" => ApplyImports,
            "call" => Call,
            "foreach" => ForEach,
            "sort" => Sort,
            "if" => If,
            "choose" => Choose,
            "when" => When,
            "otherwise" => Otherwise,
            "message" => Message,
            "fallback" => Fallback,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable form used in error messages.
    pub fn display(&self) -> &'static str {
        use SymbolKind::*;
        match self {
            OpenBlock => "'{'",
            CloseBlock => "'}'",
            QName => "name",
            Expression => "quoted value",
            Unknown => "unknown symbol",
            EndOfFile => "end of file",

            Using => "'using'",
            Mode => "'mode'",
            Priority => "'priority'",
            To => "'to'",
            Terminate => "'terminate'",
            Ascending => "'ascending'",
            Descending => "'descending'",
            DataType => "'data-type'",
            Level => "'level'",
            Format => "'format'",
            Language => "'language'",
            Uri => "'uri'",
            Value => "'value'",

            Stylesheet => "'stylesheet'",
            Version => "'version'",
            NamespaceDecl => "'namespace'",
            Import => "'import'",
            Include => "'include'",
            StripSpace => "'strip'",
            PreserveSpace => "'preserve'",
            Output => "'output'",
            Key => "'key'",
            DecimalFormat => "'decimal-format'",
            AttributeSet => "'attribute-set'",
            NamespaceAlias => "'namespace-alias'",
            Script => "'script'",
            Match => "'match'",
            Proc => "'proc'",

            Method => "'method'",
            Encoding => "'encoding'",
            Indent => "'indent'",
            Standalone => "'standalone'",
            OmitDeclaration => "'omit-declaration'",
            MediaType => "'media-type'",
            DoctypePublic => "'doctype-public'",
            DoctypeSystem => "'doctype-system'",
            CdataSections => "'cdata'",

            DecimalSeparator => "'decimal-separator'",
            GroupingSeparator => "'grouping-separator'",
            Infinity => "'infinity'",
            MinusSign => "'minus-sign'",
            NotANumber => "'nan'",
            Percent => "'percent'",
            PerMille => "'permille'",
            ZeroDigit => "'zero-digit'",
            Digit => "'digit'",
            PatternSeparator => "'pattern-separator'",

            Param => "'param'",
            Variable => "'variable'",
            With => "'with'",
            Element => "'element'",
            Attribute => "'attribute'",
            Text => "'text'",
            Comment => "'comment'",
            Pi => "'pi'",
            ValueOf => "'value-of'",
            Copy => "'copy'",
            CopyOf => "'copy-of'",
            Number => "'number'",
            Apply => "'apply'",
            ApplyImports => "'apply-imports'",
            Call => "'call'",
            ForEach => "'foreach'",
            Sort => "'sort'",
            If => "'if'",
            Choose => "'choose'",
            When => "'when'",
            Otherwise => "'otherwise'",
            Message => "'message'",
            Fallback => "'fallback'",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_covers_productions_and_clauses() {
        assert_eq!(
            SymbolKind::from_keyword("stylesheet"),
            Some(SymbolKind::Stylesheet)
        );
        assert_eq!(
            SymbolKind::from_keyword("value-of"),
            Some(SymbolKind::ValueOf)
        );
        assert_eq!(SymbolKind::from_keyword("using"), Some(SymbolKind::Using));
        assert_eq!(SymbolKind::from_keyword("html"), None);
    }

    #[test]
    fn display_quotes_keywords() {
        assert_eq!(SymbolKind::Choose.display(), "'choose'");
        assert_eq!(SymbolKind::OpenBlock.display(), "'{'");
    }
}
