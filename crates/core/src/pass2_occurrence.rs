//! Pass 2: occurrence validation -- each node's occurrence map checked
//! against its grammar bounds, plus the per-kind shape checks that need
//! the whole construct parsed (value-xor-block, empty settings blocks,
//! single-character attribute values).
//!
//! Shape repair is report-then-substitute: an invalid single-character
//! value is reported and replaced by its default so generation stays
//! total. Nothing in this pass aborts.

use crate::error::{ErrorKind, ErrorList};
use crate::node::{Arena, NodeId};
use crate::symbol::SymbolKind;

pub fn validate_occurrences(arena: &mut Arena, root: NodeId, errors: &mut ErrorList) {
    validate_node(arena, root, errors);
}

fn validate_node(arena: &mut Arena, id: NodeId, errors: &mut ErrorList) {
    check_bounds(arena, id, errors);
    check_shape(arena, id, errors);

    let children: Vec<NodeId> = arena.node(id).children.clone();
    for child in children {
        validate_node(arena, child, errors);
    }
}

/// Generic min/max enforcement over the node's occurrence records.
fn check_bounds(arena: &Arena, id: NodeId, errors: &mut ErrorList) {
    let node = arena.node(id);
    let owner = node.kind.display();
    for occ in &node.occurrences {
        if occ.count < occ.min {
            match occ.max {
                Some(1) => errors.report(
                    ErrorKind::RequiredChildMissing,
                    node.line,
                    node.column,
                    format!("{} requires a {} entry", owner, occ.kind.display()),
                ),
                _ => errors.report(
                    ErrorKind::OneOrMoreMissing,
                    node.line,
                    node.column,
                    format!("{} requires one or more {} entries", owner, occ.kind.display()),
                ),
            }
        }
        if let Some(max) = occ.max {
            if occ.count > max {
                let first = occ.first_line.unwrap_or(node.line);
                errors.report(
                    ErrorKind::TooManyChildren,
                    node.line,
                    node.column,
                    format!(
                        "{} allows at most {} {} entry (first at line {})",
                        owner,
                        max,
                        occ.kind.display(),
                        first + 1
                    ),
                );
            }
        }
    }
}

/// Per-kind shape checks and report-then-substitute repairs.
fn check_shape(arena: &mut Arena, id: NodeId, errors: &mut ErrorList) {
    use SymbolKind::*;
    let kind = arena.node(id).kind;
    match kind {
        Variable | With | Attribute | Comment | Pi => {
            check_value_xor_block(arena, id, errors);
        }
        Param | Message => {
            // Optional default: only both-present is an error
            let node = arena.node(id);
            if node.value.is_some() && node.has_block {
                let owner = node.kind.display();
                errors.report(
                    ErrorKind::ValueAndBlock,
                    node.line,
                    node.column,
                    format!("{} has both an inline value and a block", owner),
                );
            }
        }
        Match => {
            let node = arena.node(id);
            if node.expr.is_none() {
                errors.report(
                    ErrorKind::InvalidPattern,
                    node.line,
                    node.column,
                    "'match' requires a 'using' pattern",
                );
            }
        }
        Output | DecimalFormat => {
            let node = arena.node(id);
            if node.has_block && node.children.is_empty() {
                let owner = node.kind.display();
                errors.report(
                    ErrorKind::EmptyBlock,
                    node.line,
                    node.column,
                    format!("{} block is empty", owner),
                );
            }
        }
        Indent | Standalone | OmitDeclaration => {
            substitute_invalid(arena, id, errors, &["yes", "no"], "no");
        }
        DecimalSeparator => substitute_single_char(arena, id, errors, ","),
        GroupingSeparator => substitute_single_char(arena, id, errors, "."),
        MinusSign => substitute_single_char(arena, id, errors, "-"),
        Percent => substitute_single_char(arena, id, errors, "%"),
        PerMille => substitute_single_char(arena, id, errors, "\u{2030}"),
        ZeroDigit => substitute_single_char(arena, id, errors, "0"),
        Digit => substitute_single_char(arena, id, errors, "#"),
        PatternSeparator => substitute_single_char(arena, id, errors, ";"),
        Number => {
            if arena.node(id).level.is_some() {
                substitute_level(arena, id, errors);
            }
        }
        Sort => {
            if arena.node(id).data_type.is_some() {
                substitute_data_type(arena, id, errors);
            }
        }
        _ => {}
    }
}

fn check_value_xor_block(arena: &Arena, id: NodeId, errors: &mut ErrorList) {
    let node = arena.node(id);
    let owner = node.kind.display();
    if node.value.is_some() && node.has_block {
        errors.report(
            ErrorKind::ValueAndBlock,
            node.line,
            node.column,
            format!("{} has both an inline value and a block", owner),
        );
    } else if node.value.is_none() && !node.has_block {
        errors.report(
            ErrorKind::ValueOrBlockMissing,
            node.line,
            node.column,
            format!("{} has neither an inline value nor a block", owner),
        );
    }
}

/// Invalid enumerated value: report, then substitute the default.
fn substitute_invalid(
    arena: &mut Arena,
    id: NodeId,
    errors: &mut ErrorList,
    allowed: &[&str],
    default: &str,
) {
    let node = arena.node(id);
    let value = match &node.value {
        Some(v) => v.clone(),
        None => return, // missing value already reported during parse
    };
    if allowed.contains(&value.as_str()) {
        return;
    }
    let owner = node.kind.display();
    let (line, column) = (node.line, node.column);
    errors.report(
        ErrorKind::InvalidAttributeValue,
        line,
        column,
        format!(
            "invalid value '{}' for {}, substituting '{}'",
            value, owner, default
        ),
    );
    arena.node_mut(id).value = Some(default.to_owned());
}

/// Single-character decimal-format values: report, then substitute.
fn substitute_single_char(arena: &mut Arena, id: NodeId, errors: &mut ErrorList, default: &str) {
    let node = arena.node(id);
    let value = match &node.value {
        Some(v) => v.clone(),
        None => return,
    };
    if value.chars().count() == 1 {
        return;
    }
    let owner = node.kind.display();
    let (line, column) = (node.line, node.column);
    errors.report(
        ErrorKind::InvalidAttributeValue,
        line,
        column,
        format!(
            "{} requires a single character, got '{}', substituting '{}'",
            owner, value, default
        ),
    );
    arena.node_mut(id).value = Some(default.to_owned());
}

fn substitute_level(arena: &mut Arena, id: NodeId, errors: &mut ErrorList) {
    let node = arena.node(id);
    let level = node.level.clone().unwrap_or_default();
    if matches!(level.as_str(), "single" | "multiple" | "any") {
        return;
    }
    let (line, column) = (node.line, node.column);
    errors.report(
        ErrorKind::InvalidAttributeValue,
        line,
        column,
        format!("invalid level '{}' for 'number', substituting 'single'", level),
    );
    arena.node_mut(id).level = Some("single".to_owned());
}

fn substitute_data_type(arena: &mut Arena, id: NodeId, errors: &mut ErrorList) {
    let node = arena.node(id);
    let data_type = node.data_type.clone().unwrap_or_default();
    if matches!(data_type.as_str(), "text" | "number") {
        return;
    }
    let (line, column) = (node.line, node.column);
    errors.report(
        ErrorKind::InvalidAttributeValue,
        line,
        column,
        format!(
            "invalid data-type '{}' for 'sort', substituting 'text'",
            data_type
        ),
    );
    arena.node_mut(id).data_type = Some("text".to_owned());
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::lexer;
    use crate::parser;

    fn validate_src(src: &str) -> ErrorList {
        let config = Config::default();
        let tokens = lexer::tokenize(src);
        let mut out = parser::parse(&tokens, &config);
        if let Some(root) = out.root {
            validate_occurrences(&mut out.arena, root, &mut out.errors);
        }
        out.errors
    }

    #[test]
    fn choose_without_when_requires_one_or_more() {
        let errors = validate_src(
            "stylesheet { version \"1.0\" match using \"/\" { choose { otherwise { } } } }",
        );
        assert!(errors.contains(ErrorKind::OneOrMoreMissing), "{}", errors.listing());
    }

    #[test]
    fn choose_with_two_otherwise_is_too_many() {
        let errors = validate_src(
            "stylesheet { version \"1.0\" match using \"/\" { choose { when \"a\" { } otherwise { } otherwise { } } } }",
        );
        assert!(errors.contains(ErrorKind::TooManyChildren), "{}", errors.listing());
    }

    #[test]
    fn valid_choose_passes() {
        let errors = validate_src(
            "stylesheet { version \"1.0\" match using \"/\" { choose { when \"a\" { } otherwise { } } } }",
        );
        assert!(errors.is_empty(), "{}", errors.listing());
    }

    #[test]
    fn stylesheet_missing_version_is_required_child() {
        let errors = validate_src("stylesheet { match using \"/\" { } }");
        assert!(errors.contains(ErrorKind::RequiredChildMissing), "{}", errors.listing());
    }

    #[test]
    fn variable_without_name_value_or_block_reports_both_defects() {
        let errors = validate_src("stylesheet { version \"1.0\" variable { } }");
        assert!(errors.contains(ErrorKind::MissingName), "{}", errors.listing());
        assert!(
            errors.contains(ErrorKind::ValueOrBlockMissing),
            "{}",
            errors.listing()
        );
        // Exactly those two defects, no cascade
        assert_eq!(errors.len(), 2, "{}", errors.listing());
    }

    #[test]
    fn variable_with_value_and_block_is_rejected() {
        let errors = validate_src(
            "stylesheet { version \"1.0\" match using \"/\" { variable x \"1\" { text \"y\" } } }",
        );
        assert!(errors.contains(ErrorKind::ValueAndBlock), "{}", errors.listing());
    }

    #[test]
    fn attribute_requires_exactly_one_of_value_or_block() {
        let errors = validate_src(
            "stylesheet { version \"1.0\" match using \"/\" { element \"a\" { attribute \"href\" } } }",
        );
        assert!(
            errors.contains(ErrorKind::ValueOrBlockMissing),
            "{}",
            errors.listing()
        );
    }

    #[test]
    fn long_decimal_separator_is_reported_and_substituted() {
        let config = Config::default();
        let tokens = lexer::tokenize(
            "stylesheet { version \"1.0\" decimal-format { decimal-separator \"xy\" } }",
        );
        let mut out = parser::parse(&tokens, &config);
        let root = out.root.unwrap();
        validate_occurrences(&mut out.arena, root, &mut out.errors);
        assert!(out.errors.contains(ErrorKind::InvalidAttributeValue));

        // Find the substituted node
        let stylesheet = out.arena.node(root);
        let decimal = stylesheet
            .children
            .iter()
            .find(|c| out.arena.node(**c).kind == SymbolKind::DecimalFormat)
            .unwrap();
        let sep = out.arena.node(*out.arena.node(*decimal).children.first().unwrap());
        assert_eq!(sep.value.as_deref(), Some(","));
    }

    #[test]
    fn match_without_pattern_is_invalid() {
        let errors = validate_src("stylesheet { version \"1.0\" match { } }");
        assert!(errors.contains(ErrorKind::InvalidPattern), "{}", errors.listing());
    }

    #[test]
    fn empty_output_block_is_reported() {
        let errors = validate_src("stylesheet { version \"1.0\" output { } }");
        assert!(errors.contains(ErrorKind::EmptyBlock), "{}", errors.listing());
    }
}
