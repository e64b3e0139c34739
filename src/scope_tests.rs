//! Tests for the scope classifier

use super::*;

fn classify(text: &str, rules: &ScopeRules) -> Vec<(usize, char, bool)> {
    let table = BracketTable::standard();
    let chars: Vec<char> = text.chars().collect();
    ScopeClassifier::new(&table, rules)
        .candidates(&chars)
        .into_iter()
        .map(|c| (c.position, c.ch, c.ignored))
        .collect()
}

#[test]
fn test_plain_text_keeps_every_bracket() {
    let result = classify("a(b)\"[\"", &ScopeRules::plain());
    assert_eq!(
        result,
        vec![(1, '(', false), (3, ')', false), (5, '[', false)]
    );
}

#[test]
fn test_line_comment_ignored_until_newline() {
    let result = classify("( // ) x\n)", &ScopeRules::default());
    assert_eq!(result, vec![(0, '(', false), (5, ')', true), (9, ')', false)]);
}

#[test]
fn test_block_comment_spans_lines() {
    let result = classify("{/* (\n] */}", &ScopeRules::default());
    assert_eq!(result, vec![(0, '{', false), (4, '(', true), (6, ']', true), (10, '}', false)]);
}

#[test]
fn test_string_contents_are_ignored() {
    let result = classify("f(\")\")", &ScopeRules::default());
    assert_eq!(result, vec![(1, '(', false), (3, ')', true), (5, ')', false)]);
}

#[test]
fn test_escaped_quote_stays_in_string() {
    let result = classify(r#"("\")")"#, &ScopeRules::default());
    assert_eq!(result, vec![(0, '(', false), (4, ')', true), (6, ')', false)]);
}

#[test]
fn test_escaped_bracket_is_still_reported_ignored() {
    let result = classify(r#""\(" ()"#, &ScopeRules::default());
    assert_eq!(result, vec![(2, '(', true), (5, '(', false), (6, ')', false)]);
}

#[test]
fn test_unterminated_string_ends_at_newline() {
    let result = classify("\"(\n)", &ScopeRules::default());
    assert_eq!(result, vec![(1, '(', true), (3, ')', false)]);
}

#[test]
fn test_comment_marker_inside_string_is_text() {
    let result = classify("\"//\" ()", &ScopeRules::default());
    assert_eq!(result, vec![(5, '(', false), (6, ')', false)]);
}

#[test]
fn test_scope_not_ignored_when_table_says_so() {
    let table = BracketTable::standard().with_ignored_scopes(["comment"]);
    let rules = ScopeRules::default();
    let chars: Vec<char> = "\"(\" // )".chars().collect();
    let result: Vec<bool> = ScopeClassifier::new(&table, &rules)
        .candidates(&chars)
        .iter()
        .map(|c| c.ignored)
        .collect();
    assert_eq!(result, vec![false, true]);
}

#[test]
fn test_multichar_markers() {
    let rules = ScopeRules {
        line_comments: vec![";".to_string()],
        block_comments: vec![("#|".to_string(), "|#".to_string())],
        string_quotes: vec!['"'],
        char_quotes: Vec::new(),
        char_prefixes: Vec::new(),
        escape: Some('\\'),
    };
    let result = classify("(a #| ) |# b) ; )", &rules);
    assert_eq!(result, vec![(0, '(', false), (6, ')', true), (12, ')', false), (16, ')', true)]);
}

fn rust_rules() -> ScopeRules {
    ScopeRules {
        char_quotes: vec!['\''],
        ..ScopeRules::default()
    }
}

#[test]
fn test_char_literal_bracket_is_ignored() {
    let result = classify("f('(')", &rust_rules());
    assert_eq!(result, vec![(1, '(', false), (3, '(', true), (5, ')', false)]);
}

#[test]
fn test_escaped_quote_char_literal() {
    let result = classify(r"'\'' ()", &rust_rules());
    assert_eq!(result, vec![(5, '(', false), (6, ')', false)]);
}

#[test]
fn test_double_quote_char_literal_does_not_open_string() {
    let result = classify("('\"')", &rust_rules());
    assert_eq!(result, vec![(0, '(', false), (4, ')', false)]);
}

#[test]
fn test_lifetimes_are_not_char_literals() {
    let result = classify("fn f<'a>(x: &'a [u8])", &rust_rules());
    assert_eq!(
        result,
        vec![(8, '(', false), (16, '[', false), (19, ']', false), (20, ')', false)]
    );
}

#[test]
fn test_prefixed_char_literal() {
    let rules = ScopeRules {
        line_comments: vec![";".to_string()],
        char_prefixes: vec!["#\\".to_string()],
        ..ScopeRules::default()
    };
    let result = classify(r"(list #\( #\))", &rules);
    assert_eq!(result, vec![(0, '(', false), (8, '(', true), (12, ')', true), (13, ')', false)]);
}

#[test]
fn test_char_quote_without_close_is_text() {
    let result = classify("'(x", &rust_rules());
    assert_eq!(result, vec![(1, '(', false)]);
}
