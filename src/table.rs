//! Bracket pair table: which characters open, which close, which scopes are
//! skipped and how many rainbow levels are cycled through.

use std::collections::HashMap;

use crate::error::BracketError;

/// Level count of the standard table, one per default rainbow color.
pub const DEFAULT_COLOR_LEVELS: usize = 7;

/// Validated opener/closer mapping plus the color level count.
///
/// Construction is the only place configuration errors can surface; a built
/// table is always safe to scan with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTable {
    closers: HashMap<char, char>,
    openers: HashMap<char, char>,
    ignored_scopes: Vec<String>,
    color_levels: usize,
}

impl BracketTable {
    /// Builds a table from `(opener, closer)` pairs.
    ///
    /// Rejects an empty table, zero color levels, a bracket that closes itself
    /// and any character used more than once.
    pub fn new(
        pairs: impl IntoIterator<Item = (char, char)>,
        color_levels: usize,
    ) -> Result<Self, BracketError> {
        if color_levels == 0 {
            return Err(BracketError::ZeroColorLevels);
        }

        let mut closers = HashMap::new();
        let mut openers = HashMap::new();
        for (open, close) in pairs {
            if open == close {
                return Err(BracketError::SymmetricPair(open));
            }
            for ch in [open, close] {
                if closers.contains_key(&ch) || openers.contains_key(&ch) {
                    return Err(BracketError::DuplicateBracket(ch));
                }
            }
            closers.insert(open, close);
            openers.insert(close, open);
        }

        if closers.is_empty() {
            return Err(BracketError::EmptyPairTable);
        }

        Ok(BracketTable {
            closers,
            openers,
            ignored_scopes: Vec::new(),
            color_levels,
        })
    }

    /// Builds a table from config strings, each of which must be one character.
    pub fn from_strings<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
        color_levels: usize,
    ) -> Result<Self, BracketError> {
        let mut chars = Vec::new();
        for (open, close) in pairs {
            chars.push((single_char(open)?, single_char(close)?));
        }
        Self::new(chars, color_levels)
    }

    /// `()`, `[]` and `{}` with the default level count.
    pub fn standard() -> Self {
        BracketTable {
            closers: HashMap::from([('(', ')'), ('[', ']'), ('{', '}')]),
            openers: HashMap::from([(')', '('), (']', '['), ('}', '{')]),
            ignored_scopes: vec![
                "comment".to_string(),
                "string".to_string(),
                "constant.character".to_string(),
            ],
            color_levels: DEFAULT_COLOR_LEVELS,
        }
    }

    pub fn with_ignored_scopes<S: Into<String>>(
        mut self,
        scopes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.ignored_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn color_levels(&self) -> usize {
        self.color_levels
    }

    pub fn is_opener(&self, ch: char) -> bool {
        self.closers.contains_key(&ch)
    }

    pub fn is_closer(&self, ch: char) -> bool {
        self.openers.contains_key(&ch)
    }

    pub fn is_bracket(&self, ch: char) -> bool {
        self.is_opener(ch) || self.is_closer(ch)
    }

    pub fn closer_of(&self, opener: char) -> Option<char> {
        self.closers.get(&opener).copied()
    }

    pub fn opener_of(&self, closer: char) -> Option<char> {
        self.openers.get(&closer).copied()
    }

    /// True when `closer` closes `opener`.
    pub fn closes(&self, opener: char, closer: char) -> bool {
        self.closer_of(opener) == Some(closer)
    }

    /// Opening brackets in character order.
    pub fn openers(&self) -> Vec<char> {
        let mut openers: Vec<char> = self.closers.keys().copied().collect();
        openers.sort_unstable();
        openers
    }

    /// True when `scope` equals an ignored scope or is a dotted child of one,
    /// so `string` ignores `string.quoted.double` but not `strings`.
    pub fn is_ignored_scope(&self, scope: &str) -> bool {
        self.ignored_scopes.iter().any(|ignored| {
            scope
                .strip_prefix(ignored.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    }
}

fn single_char(s: &str) -> Result<char, BracketError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(BracketError::InvalidBracket(s.to_string())),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod table_tests;
