//! Structural bracket commands: select, remove and retype the pair around each
//! cursor.
//!
//! Commands never touch the text themselves. They return an [`EditPlan`] whose
//! edits are ordered by descending position, so applying them one after the
//! other never shifts an offset that a later edit still relies on.

use std::ops::Range;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::BracketError;
use crate::query::TreeQuery;
use crate::table::BracketTable;
use crate::tree::{BracketPair, Forest, Position};

/// Characters after an opener inspected by [`SelectTarget::Prefix`].
pub const LOOKAHEAD: usize = 31;

/// Repeats of the same retype within this window step one pair outward.
pub const DEFAULT_REPEAT_WINDOW: Duration = Duration::from_secs(1);

/// Which enclosing pair a selection should grow to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTarget {
    /// Pair opened by this bracket.
    Bracket(char),
    /// Pair whose content starts with this word, e.g. `defun` in `(defun f ...)`.
    Prefix(String),
}

impl SelectTarget {
    /// Parses a command argument: a configured bracket (either side) selects by
    /// bracket type, anything else is a word prefix.
    pub fn parse(arg: &str, table: &BracketTable) -> Option<Self> {
        let mut chars = arg.chars();
        match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(ch), None) if table.is_opener(ch) => Some(SelectTarget::Bracket(ch)),
            (Some(ch), None) if table.is_closer(ch) => {
                table.opener_of(ch).map(SelectTarget::Bracket)
            }
            _ => Some(SelectTarget::Prefix(arg.to_string())),
        }
    }

    fn matches(&self, pair: &BracketPair, text: &[char]) -> bool {
        match self {
            SelectTarget::Bracket(ch) => pair.bracket == *ch,
            SelectTarget::Prefix(word) => {
                let start = pair.opening.end.min(text.len());
                let end = (start + LOOKAHEAD).min(text.len());
                starts_with_word(&text[start..end], word)
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `window` starts with `word` followed by a word boundary.
fn starts_with_word(window: &[char], word: &str) -> bool {
    let mut len = 0;
    for expected in word.chars() {
        if window.get(len) != Some(&expected) {
            return false;
        }
        len += 1;
    }
    let Some(last) = word.chars().last() else {
        return false;
    };
    match window.get(len) {
        None => true,
        Some(&next) => is_word_char(last) != is_word_char(next),
    }
}

/// One replacement over a character range. Empty `replacement` deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn delete(position: Position) -> Self {
        Edit {
            range: position.range(),
            replacement: String::new(),
        }
    }

    pub fn replace(position: Position, ch: char) -> Self {
        Edit {
            range: position.range(),
            replacement: ch.to_string(),
        }
    }
}

/// Edits in descending position order plus the selections to show afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditPlan {
    pub edits: Vec<Edit>,
    /// `None` leaves the host's selections untouched.
    pub selections: Option<Vec<Range<usize>>>,
}

impl EditPlan {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Applies `edits` (descending order, as produced by the commands) to `text`.
///
/// Edits reaching past the end of the text are skipped.
pub fn apply_edits(text: &str, edits: &[Edit]) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for edit in edits {
        if edit.range.start > edit.range.end || edit.range.end > chars.len() {
            #[cfg(debug_assertions)]
            log::debug!("skipping out-of-range edit {:?}", edit.range);
            continue;
        }
        chars.splice(edit.range.clone(), edit.replacement.chars());
    }
    chars.into_iter().collect()
}

/// State carried between retype invocations by the caller.
///
/// A retype to the same target within `window` of the previous one retypes
/// the pairs just outside the previously retyped ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetypeSession {
    window: Duration,
    last_timestamp: Option<Instant>,
    last_target: Option<char>,
    last_pairs: Vec<BracketPair>,
}

impl Default for RetypeSession {
    fn default() -> Self {
        RetypeSession::new(DEFAULT_REPEAT_WINDOW)
    }
}

impl RetypeSession {
    pub fn new(window: Duration) -> Self {
        RetypeSession {
            window,
            last_timestamp: None,
            last_target: None,
            last_pairs: Vec::new(),
        }
    }

    /// True when a retype to `target` at `now` continues the previous one.
    pub fn is_repeat(&self, target: char, now: Instant) -> bool {
        self.last_target == Some(target)
            && !self.last_pairs.is_empty()
            && self
                .last_timestamp
                .is_some_and(|last| now.saturating_duration_since(last) <= self.window)
    }

    pub fn last_pairs(&self) -> &[BracketPair] {
        &self.last_pairs
    }

    pub fn reset(&mut self) {
        self.last_timestamp = None;
        self.last_target = None;
        self.last_pairs.clear();
    }

    fn record(&mut self, target: char, now: Instant, pairs: Vec<BracketPair>) {
        self.last_timestamp = Some(now);
        self.last_target = Some(target);
        // Stepping past the outermost pair keeps the session where it is.
        if !pairs.is_empty() {
            self.last_pairs = pairs;
        }
    }
}

/// Structural commands over one scan's forest and the text it was built from.
#[derive(Debug, Clone, Copy)]
pub struct StructuralOps<'a> {
    query: TreeQuery<'a>,
    text: &'a [char],
}

impl<'a> StructuralOps<'a> {
    pub fn new(forest: &'a Forest, text: &'a [char]) -> Self {
        StructuralOps {
            query: TreeQuery::new(forest),
            text,
        }
    }

    /// Nearest enclosing pair for each selection, in selection order. Selections
    /// with no pair are skipped and each pair appears once.
    pub fn resolve(&self, selections: &[Range<usize>]) -> Vec<BracketPair> {
        let mut pairs: Vec<BracketPair> = Vec::new();
        for selection in selections {
            let Some(pair) = self.nearest(selection, None) else {
                continue;
            };
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    /// Innermost pair around `selection`, or with a target the outermost pair
    /// that matches it, falling back to the outermost pair on the path.
    fn nearest(
        &self,
        selection: &Range<usize>,
        target: Option<&SelectTarget>,
    ) -> Option<BracketPair> {
        let path = self.query.enclosing(selection.clone());
        match target {
            None => path.last().copied(),
            Some(target) => path
                .iter()
                .find(|pair| target.matches(pair, self.text))
                .or_else(|| path.first())
                .copied(),
        }
    }

    /// Grows each selection to cover its enclosing pair, brackets included.
    /// Selections with no enclosing pair are kept as they are.
    pub fn select(
        &self,
        selections: &[Range<usize>],
        target: Option<&SelectTarget>,
    ) -> Vec<Range<usize>> {
        let mut selected: Vec<Range<usize>> = selections
            .iter()
            .map(|selection| match self.nearest(selection, target) {
                Some(pair) => pair.span(),
                None => selection.clone(),
            })
            .collect();
        selected.dedup();
        selected
    }

    /// Deletes both brackets of each enclosing pair. With `select_content`, the
    /// plan selects what used to sit between each pair's brackets.
    pub fn remove(&self, selections: &[Range<usize>], select_content: bool) -> EditPlan {
        let pairs = self.resolve(selections);

        let mut regions: Vec<Position> = pairs
            .iter()
            .flat_map(|pair| [pair.opening, pair.closing])
            .collect();
        regions.sort_unstable();
        regions.dedup();

        let edits = regions.iter().rev().copied().map(Edit::delete).collect();

        let selections = select_content.then(|| {
            // Every removed region before a bracket shifts it one to the left.
            let shifted = |position: Position| {
                position.start - regions.partition_point(|r| r.start < position.start)
            };
            pairs
                .iter()
                .map(|pair| shifted(pair.opening)..shifted(pair.closing))
                .collect()
        });

        EditPlan { edits, selections }
    }

    /// Replaces each enclosing pair with `to` and its closer. Pairs already
    /// opened by `to` are left alone. Cursors end up on the retyped openers.
    ///
    /// When `session` shows the same retype within its window, the previously
    /// retyped pairs' full spans act as the cursors, which reaches the next
    /// pair outward.
    pub fn transform(
        &self,
        table: &BracketTable,
        selections: &[Range<usize>],
        to: char,
        session: &mut RetypeSession,
        now: Instant,
    ) -> Result<EditPlan, BracketError> {
        let closer = table.closer_of(to).ok_or(BracketError::UnknownBracket(to))?;

        let cursors: Vec<Range<usize>> = if session.is_repeat(to, now) {
            session.last_pairs().iter().map(BracketPair::span).collect()
        } else {
            selections.to_vec()
        };
        let pairs = self.resolve(&cursors);

        let mut edits: Vec<Edit> = Vec::new();
        for pair in pairs.iter().filter(|pair| pair.bracket != to) {
            edits.push(Edit::replace(pair.opening, to));
            edits.push(Edit::replace(pair.closing, closer));
        }
        edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
        edits.dedup_by_key(|edit| edit.range.start);

        #[cfg(debug_assertions)]
        log::debug!(
            "retype to {:?}: {} pairs, {} edits, repeat={}",
            to,
            pairs.len(),
            edits.len(),
            cursors.as_slice() != selections
        );

        let selections = if pairs.is_empty() {
            selections.to_vec()
        } else {
            pairs
                .iter()
                .map(|pair| pair.opening.start..pair.opening.start)
                .collect()
        };
        session.record(to, now, pairs);

        Ok(EditPlan {
            edits,
            selections: Some(selections),
        })
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod ops_tests;
