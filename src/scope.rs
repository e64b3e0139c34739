//! Lightweight scope classifier that turns document text into the candidate
//! stream consumed by the matchers.
//!
//! It only knows about comments, quoted strings and character literals, which
//! is what decides whether a bracket is structural. Each bracket gets a scope name and is
//! flagged `ignored` when the [`BracketTable`] ignores that scope.

use crate::table::BracketTable;
use crate::tree::Candidate;

pub const SCOPE_SOURCE: &str = "source";
pub const SCOPE_LINE_COMMENT: &str = "comment.line";
pub const SCOPE_BLOCK_COMMENT: &str = "comment.block";
pub const SCOPE_STRING: &str = "string.quoted";
pub const SCOPE_CHAR: &str = "constant.character";

/// Longest escaped char literal body, e.g. `\u{10FFFF}`.
const MAX_ESCAPED_CHAR: usize = 10;

/// Comment, string and character literal delimiters of one syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRules {
    pub line_comments: Vec<String>,
    pub block_comments: Vec<(String, String)>,
    pub string_quotes: Vec<char>,
    /// Quotes around a single character, as in `'('`. A quote not closed
    /// right after one (possibly escaped) character is plain text, so
    /// lifetimes like `'a` pass through.
    pub char_quotes: Vec<char>,
    /// Prefixes followed by exactly one literal character, as in `#\(`.
    pub char_prefixes: Vec<String>,
    pub escape: Option<char>,
}

impl Default for ScopeRules {
    /// C-family comments and double-quoted strings.
    fn default() -> Self {
        ScopeRules {
            line_comments: vec!["//".to_string()],
            block_comments: vec![("/*".to_string(), "*/".to_string())],
            string_quotes: vec!['"'],
            char_quotes: Vec::new(),
            char_prefixes: Vec::new(),
            escape: Some('\\'),
        }
    }
}

impl ScopeRules {
    /// No comments, no strings: every bracket is structural.
    pub fn plain() -> Self {
        ScopeRules {
            line_comments: Vec::new(),
            block_comments: Vec::new(),
            string_quotes: Vec::new(),
            char_quotes: Vec::new(),
            char_prefixes: Vec::new(),
            escape: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Source,
    LineComment,
    /// Index into `block_comments` of the comment being read.
    BlockComment(usize),
    Quoted(char),
    CharLiteral,
}

impl State {
    fn scope(self) -> &'static str {
        match self {
            State::Source => SCOPE_SOURCE,
            State::LineComment => SCOPE_LINE_COMMENT,
            State::BlockComment(_) => SCOPE_BLOCK_COMMENT,
            State::Quoted(_) => SCOPE_STRING,
            State::CharLiteral => SCOPE_CHAR,
        }
    }
}

/// Produces bracket candidates with their ignored flag resolved.
#[derive(Debug, Clone, Copy)]
pub struct ScopeClassifier<'a> {
    table: &'a BracketTable,
    rules: &'a ScopeRules,
}

impl<'a> ScopeClassifier<'a> {
    pub fn new(table: &'a BracketTable, rules: &'a ScopeRules) -> Self {
        ScopeClassifier { table, rules }
    }

    /// Every bracket character of `text` in position order.
    ///
    /// Strings end at their closing quote or at an unescaped newline.
    pub fn candidates(&self, text: &[char]) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut state = State::Source;
        let mut i = 0;

        while i < text.len() {
            let ch = text[i];
            match state {
                State::Source => {
                    if let Some(marker) = self.line_comment_at(text, i) {
                        state = State::LineComment;
                        i += marker;
                        continue;
                    }
                    if let Some((index, marker)) = self.block_comment_at(text, i) {
                        state = State::BlockComment(index);
                        i += marker;
                        continue;
                    }
                    if let Some(end) = self.char_literal_at(text, i) {
                        for (offset, &literal) in text.iter().enumerate().take(end).skip(i) {
                            self.push(&mut out, offset, literal, State::CharLiteral);
                        }
                        i = end;
                        continue;
                    }
                    if self.rules.string_quotes.contains(&ch) {
                        state = State::Quoted(ch);
                        i += 1;
                        continue;
                    }
                }
                State::LineComment => {
                    if ch == '\n' {
                        state = State::Source;
                        i += 1;
                        continue;
                    }
                }
                State::BlockComment(index) => {
                    let end = &self.rules.block_comments[index].1;
                    if matches_at(text, i, end) {
                        state = State::Source;
                        i += end.chars().count();
                        continue;
                    }
                }
                // Never stored in `state`: literals are consumed whole in `Source`.
                State::CharLiteral => {}
                State::Quoted(quote) => {
                    if Some(ch) == self.rules.escape {
                        if let Some(&escaped) = text.get(i + 1) {
                            self.push(&mut out, i + 1, escaped, state);
                        }
                        i += 2;
                        continue;
                    }
                    if ch == quote || ch == '\n' {
                        state = State::Source;
                        i += 1;
                        continue;
                    }
                }
            }

            self.push(&mut out, i, ch, state);
            i += 1;
        }

        #[cfg(debug_assertions)]
        log::debug!(
            "classified {} chars into {} bracket candidates",
            text.len(),
            out.len()
        );

        out
    }

    fn push(&self, out: &mut Vec<Candidate>, position: usize, ch: char, state: State) {
        if !self.table.is_bracket(ch) {
            return;
        }
        out.push(Candidate {
            position,
            ch,
            ignored: self.table.is_ignored_scope(state.scope()),
        });
    }

    /// End offset of the character literal starting at `i`, if there is one.
    fn char_literal_at(&self, text: &[char], i: usize) -> Option<usize> {
        let literal = |at: usize| text.get(at).filter(|&&c| c != '\n');

        if let Some(prefix) = self.rules.char_prefixes.iter().find(|p| matches_at(text, i, p)) {
            let at = i + prefix.chars().count();
            return literal(at).map(|_| at + 1);
        }

        let quote = text[i];
        if !self.rules.char_quotes.contains(&quote) {
            return None;
        }
        let first = *literal(i + 1)?;
        if Some(first) == self.rules.escape {
            // The escaped character itself may be the quote, so the search
            // for the closing quote starts after it.
            return (i + 3..=i + 1 + MAX_ESCAPED_CHAR)
                .take_while(|&at| literal(at).is_some())
                .find(|&at| text[at] == quote)
                .map(|at| at + 1);
        }
        (first != quote && text.get(i + 2) == Some(&quote)).then_some(i + 3)
    }

    fn line_comment_at(&self, text: &[char], i: usize) -> Option<usize> {
        self.rules
            .line_comments
            .iter()
            .find(|marker| matches_at(text, i, marker))
            .map(|marker| marker.chars().count())
    }

    fn block_comment_at(&self, text: &[char], i: usize) -> Option<(usize, usize)> {
        self.rules
            .block_comments
            .iter()
            .position(|(start, _)| matches_at(text, i, start))
            .map(|index| (index, self.rules.block_comments[index].0.chars().count()))
    }
}

fn matches_at(text: &[char], i: usize, marker: &str) -> bool {
    !marker.is_empty()
        && marker
            .chars()
            .enumerate()
            .all(|(offset, ch)| text.get(i + offset) == Some(&ch))
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod scope_tests;
