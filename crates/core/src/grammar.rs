//! Grammar-derived occurrence rules: per production, the legal child
//! kinds with their {min, max} bounds.
//!
//! This single table is consulted twice -- by the parser (is this keyword
//! legal here? bump the count) and by the occurrence validator (were the
//! bounds met?). Keeping it in one place keeps the two in lockstep.

use crate::config::TargetVersion;
use crate::node::Occurrence;
use crate::symbol::SymbolKind;

fn many(rules: &mut Vec<Occurrence>, kind: SymbolKind) {
    rules.push(Occurrence::new(kind, 0, None));
}

fn one_opt(rules: &mut Vec<Occurrence>, kind: SymbolKind) {
    rules.push(Occurrence::new(kind, 0, Some(1)));
}

fn exactly_one(rules: &mut Vec<Occurrence>, kind: SymbolKind) {
    rules.push(Occurrence::new(kind, 1, Some(1)));
}

fn one_or_more(rules: &mut Vec<Occurrence>, kind: SymbolKind) {
    rules.push(Occurrence::new(kind, 1, None));
}

/// The shared template-content production set.
fn content(rules: &mut Vec<Occurrence>) {
    use SymbolKind::*;
    for kind in [
        Variable, Element, Attribute, Text, Comment, Pi, ValueOf, Apply, ApplyImports, Call,
        Copy, CopyOf, Number, ForEach, If, Choose, Message, Fallback,
    ] {
        many(rules, kind);
    }
}

/// Text-producing subset allowed inside attribute-like blocks.
fn text_content(rules: &mut Vec<Occurrence>) {
    use SymbolKind::*;
    for kind in [Variable, Text, ValueOf, Apply, Call, ForEach, If, Choose] {
        many(rules, kind);
    }
}

/// Allowed-children occurrence map for one production, instantiated
/// fresh for every node at construction.
pub fn child_rules(kind: SymbolKind) -> Vec<Occurrence> {
    use SymbolKind::*;
    let mut rules = Vec::new();
    match kind {
        Stylesheet => {
            exactly_one(&mut rules, Version);
            many(&mut rules, NamespaceDecl);
            many(&mut rules, Import);
            many(&mut rules, Include);
            many(&mut rules, StripSpace);
            many(&mut rules, PreserveSpace);
            one_opt(&mut rules, Output);
            many(&mut rules, Key);
            many(&mut rules, DecimalFormat);
            many(&mut rules, AttributeSet);
            many(&mut rules, NamespaceAlias);
            many(&mut rules, Script);
            many(&mut rules, Match);
            many(&mut rules, Proc);
            many(&mut rules, Variable);
            many(&mut rules, Param);
        }
        Output => {
            one_opt(&mut rules, Method);
            one_opt(&mut rules, Version);
            one_opt(&mut rules, Encoding);
            one_opt(&mut rules, Indent);
            one_opt(&mut rules, Standalone);
            one_opt(&mut rules, OmitDeclaration);
            one_opt(&mut rules, MediaType);
            one_opt(&mut rules, DoctypePublic);
            one_opt(&mut rules, DoctypeSystem);
            one_opt(&mut rules, CdataSections);
        }
        DecimalFormat => {
            one_opt(&mut rules, DecimalSeparator);
            one_opt(&mut rules, GroupingSeparator);
            one_opt(&mut rules, Infinity);
            one_opt(&mut rules, MinusSign);
            one_opt(&mut rules, NotANumber);
            one_opt(&mut rules, Percent);
            one_opt(&mut rules, PerMille);
            one_opt(&mut rules, ZeroDigit);
            one_opt(&mut rules, Digit);
            one_opt(&mut rules, PatternSeparator);
        }
        AttributeSet => {
            many(&mut rules, Attribute);
        }
        Match => {
            many(&mut rules, Param);
            many(&mut rules, Sort);
            content(&mut rules);
        }
        Proc | Fallback => {
            many(&mut rules, Param);
            content(&mut rules);
        }
        ForEach => {
            many(&mut rules, Sort);
            content(&mut rules);
        }
        Apply => {
            many(&mut rules, With);
            many(&mut rules, Sort);
        }
        Call => {
            many(&mut rules, With);
        }
        Choose => {
            one_or_more(&mut rules, When);
            one_opt(&mut rules, Otherwise);
        }
        When | Otherwise | If | Copy | Message | Element => {
            content(&mut rules);
        }
        Variable | Param | With => {
            content(&mut rules);
        }
        Attribute | Comment | Pi => {
            text_content(&mut rules);
        }
        // Leaves: no legal children
        _ => {}
    }
    rules
}

/// Minimum target version a production keyword is legal for.
pub fn min_version(kind: SymbolKind) -> TargetVersion {
    match kind {
        SymbolKind::Script => TargetVersion::V1_1,
        _ => TargetVersion::V1_0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choose_requires_one_or_more_when_and_at_most_one_otherwise() {
        let rules = child_rules(SymbolKind::Choose);
        let when = rules.iter().find(|o| o.kind == SymbolKind::When).unwrap();
        assert_eq!((when.min, when.max), (1, None));
        let otherwise = rules
            .iter()
            .find(|o| o.kind == SymbolKind::Otherwise)
            .unwrap();
        assert_eq!((otherwise.min, otherwise.max), (0, Some(1)));
    }

    #[test]
    fn stylesheet_requires_exactly_one_version() {
        let rules = child_rules(SymbolKind::Stylesheet);
        let version = rules
            .iter()
            .find(|o| o.kind == SymbolKind::Version)
            .unwrap();
        assert_eq!((version.min, version.max), (1, Some(1)));
    }

    #[test]
    fn leaves_have_no_children() {
        assert!(child_rules(SymbolKind::Text).is_empty());
        assert!(child_rules(SymbolKind::ValueOf).is_empty());
        assert!(child_rules(SymbolKind::Sort).is_empty());
    }

    #[test]
    fn script_is_gated_to_1_1() {
        assert_eq!(min_version(SymbolKind::Script), TargetVersion::V1_1);
        assert_eq!(min_version(SymbolKind::Match), TargetVersion::V1_0);
    }
}
