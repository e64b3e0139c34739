//! Tests for enclosing-pair queries

use super::*;
use crate::matcher::BracketMatcher;
use crate::table::BracketTable;
use crate::tree::{Candidate, Position};

fn forest(text: &str) -> Forest {
    let table = BracketTable::standard();
    let candidates = text
        .chars()
        .enumerate()
        .filter(|(_, ch)| table.is_bracket(*ch))
        .map(|(position, ch)| Candidate::new(position, ch));
    BracketMatcher::new(&table).scan(candidates).forest
}

fn spans(path: &[BracketPair]) -> Vec<(usize, usize)> {
    path.iter()
        .map(|pair| (pair.opening.start, pair.closing.start))
        .collect()
}

#[test]
fn test_path_is_outermost_first() {
    let forest = forest("a(b[c]d)e");
    let path = TreeQuery::new(&forest).enclosing(4..5);
    assert_eq!(spans(&path), vec![(1, 7), (3, 5)]);
    assert_eq!(path[0].bracket, '(');
    assert_eq!(path[1].bracket, '[');
}

#[test]
fn test_range_outside_all_pairs() {
    let forest = forest("a(b)c");
    let query = TreeQuery::new(&forest);
    assert!(query.enclosing(0..1).is_empty());
    assert!(query.enclosing(4..5).is_empty());
}

#[test]
fn test_range_covering_a_bracket_is_not_inside_it() {
    let forest = forest("a(b[c]d)e");
    let path = TreeQuery::new(&forest).enclosing(3..6);
    assert_eq!(spans(&path), vec![(1, 7)]);
}

#[test]
fn test_cursor_touching_opener_from_outside() {
    let forest = forest("x(y)");
    let path = TreeQuery::new(&forest).enclosing(1..1);
    assert_eq!(spans(&path), vec![(1, 3)]);
}

#[test]
fn test_cursor_touching_closer_from_outside() {
    let forest = forest("(y)x");
    let path = TreeQuery::new(&forest).enclosing(3..3);
    assert_eq!(spans(&path), vec![(0, 2)]);
}

#[test]
fn test_cursor_between_adjacent_pairs_picks_one() {
    let forest = forest("()[]");
    let path = TreeQuery::new(&forest).enclosing(2..2);
    assert_eq!(path.len(), 1);
}

#[test]
fn test_innermost() {
    let forest = forest("{[(x)]}");
    let query = TreeQuery::new(&forest);
    let inner = query.innermost(3..4);
    assert_eq!(
        inner.map(|pair| (pair.opening, pair.closing)),
        Some((Position::at(2), Position::at(4)))
    );
    assert_eq!(query.innermost(7..7).map(|pair| pair.bracket), Some('{'));
}

#[test]
fn test_sibling_lookup_among_many() {
    let text = "(a)(b)(c)(d)(e)(f)(g)";
    let forest = forest(text);
    let query = TreeQuery::new(&forest);
    for (i, _) in text.match_indices(char::is_alphabetic) {
        let path = query.enclosing(i..i + 1);
        assert_eq!(spans(&path), vec![(i - 1, i + 1)]);
    }
}

#[test]
fn test_empty_forest() {
    let forest = Forest::default();
    assert!(TreeQuery::new(&forest).enclosing(0..0).is_empty());
}
