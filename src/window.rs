//! Bounded matching around a point, for documents too large to rescan fully
//! on every keystroke.
//!
//! The window `[point - size/2, point + size/2)` is split at `point`. The half
//! before the point is scanned backward, the half after it forward, and pairs
//! straddling the point are joined through the *lineal* openers found by the
//! backward scan.
//!
//! Depths are measured from the outermost lineal opener inside the window, so
//! levels are consistent across the point but only relative to the window. A
//! bracket whose partner lies beyond the window edge ends up in
//! [`WindowScan::unmatched`]; the window is never grown to find it.

use std::ops::Range;

use crate::error::BracketError;
use crate::table::BracketTable;
use crate::tree::{Candidate, LevelBucket, LevelBuckets, Position};

/// Default number of characters covered by one windowed scan.
pub const DEFAULT_WINDOW_SIZE: usize = 10_000;

/// Result of one windowed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowScan {
    /// Character range actually scanned.
    pub window: Range<usize>,
    /// Non-empty color levels in ascending order, regions sorted by position.
    pub buckets: Vec<LevelBucket>,
    /// Closers that cannot match within the window.
    pub mismatches: Vec<Position>,
    /// Brackets whose partner would lie outside the window.
    pub unmatched: Vec<Position>,
}

/// Matcher limited to a fixed-size window around a point.
#[derive(Debug, Clone, Copy)]
pub struct WindowedMatcher<'t> {
    table: &'t BracketTable,
    window_size: usize,
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    ch: char,
    position: Position,
}

impl<'t> WindowedMatcher<'t> {
    pub fn new(table: &'t BracketTable, window_size: usize) -> Result<Self, BracketError> {
        if window_size == 0 {
            return Err(BracketError::ZeroWindowSize);
        }
        Ok(WindowedMatcher { table, window_size })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Scans the window around `point`. `candidates` must be sorted by position
    /// and may cover the whole document; only the window is visited.
    pub fn scan(&self, candidates: &[Candidate], point: usize) -> WindowScan {
        let half = self.window_size / 2;
        let window = point.saturating_sub(half)..point.saturating_add(half);

        let lo = candidates.partition_point(|c| c.position < window.start);
        let mid = candidates.partition_point(|c| c.position < point);
        let hi = candidates.partition_point(|c| c.position < window.end);

        let mut state = WindowState::default();
        self.scan_backward(&candidates[lo..mid], &mut state);
        self.scan_forward(&candidates[mid..hi], &mut state);

        #[cfg(debug_assertions)]
        log::debug!(
            "window scan {:?}: {} pairs, {} mismatched, {} unmatched",
            window,
            state.pairs.len(),
            state.mismatches.len(),
            state.unmatched.len()
        );

        state.finish(window, self.table.color_levels())
    }

    /// Walks the half before the point in reverse. Closers wait on the branch
    /// stack for their opener; an opener with nothing to close is lineal and
    /// encloses the point. The lineal count becomes the depth baseline; lineal
    /// openers are left on `state.enclosing`, outermost first.
    fn scan_backward(&self, half: &[Candidate], state: &mut WindowState) {
        let mut branch: Vec<Bracket> = Vec::new();
        let mut lineal: Vec<Bracket> = Vec::new();
        // (opening, closing, branch depth - lineal count) until the baseline is known
        let mut relative: Vec<(Position, Position, i64)> = Vec::new();

        for candidate in half.iter().rev().filter(|c| !c.ignored) {
            let bracket = Bracket {
                ch: candidate.ch,
                position: Position::at(candidate.position),
            };

            if self.table.is_closer(bracket.ch) {
                branch.push(bracket);
                continue;
            }
            if !self.table.is_opener(bracket.ch) {
                continue;
            }

            loop {
                match branch.last().copied() {
                    None => {
                        lineal.push(bracket);
                        break;
                    }
                    Some(closer) if self.table.closes(bracket.ch, closer.ch) => {
                        branch.pop();
                        let rel = branch.len() as i64 - lineal.len() as i64;
                        relative.push((bracket.position, closer.position, rel));
                        break;
                    }
                    Some(closer) => {
                        // Scanning forward, this closer would have met a
                        // different opener on top and matched nothing.
                        branch.pop();
                        state.mismatches.push(closer.position);
                    }
                }
            }
        }

        let baseline = lineal.len() as i64;
        state.pairs.extend(
            relative
                .into_iter()
                .map(|(opening, closing, rel)| (opening, closing, baseline + rel)),
        );
        state
            .unmatched
            .extend(branch.into_iter().map(|closer| closer.position));

        lineal.reverse();
        state.enclosing = lineal;
    }

    /// Walks the half after the point. Openers wait on the branch stack; a
    /// closer with an empty branch stack closes the innermost lineal opener
    /// from the backward half.
    fn scan_forward(&self, half: &[Candidate], state: &mut WindowState) {
        let mut branch: Vec<Bracket> = Vec::new();
        let mut surplus: i64 = 0;

        for candidate in half.iter().filter(|c| !c.ignored) {
            let bracket = Bracket {
                ch: candidate.ch,
                position: Position::at(candidate.position),
            };

            if self.table.is_opener(bracket.ch) {
                branch.push(bracket);
                continue;
            }
            if !self.table.is_closer(bracket.ch) {
                continue;
            }

            if let Some(opener) = branch.last().copied() {
                if self.table.closes(opener.ch, bracket.ch) {
                    branch.pop();
                    let depth = state.enclosing.len() as i64 + branch.len() as i64 - surplus;
                    state.pairs.push((opener.position, bracket.position, depth));
                } else {
                    state.mismatches.push(bracket.position);
                }
                continue;
            }

            match state.enclosing.last().copied() {
                Some(opener) if self.table.closes(opener.ch, bracket.ch) => {
                    state.enclosing.pop();
                    let depth = state.enclosing.len() as i64;
                    state.pairs.push((opener.position, bracket.position, depth));
                }
                Some(_) => state.mismatches.push(bracket.position),
                None => {
                    // Closes something before the window start.
                    surplus += 1;
                    state.unmatched.push(bracket.position);
                }
            }
        }

        state
            .unmatched
            .extend(branch.into_iter().map(|opener| opener.position));
    }
}

#[derive(Debug, Default)]
struct WindowState {
    /// Lineal openers not yet closed by the forward half, outermost first.
    enclosing: Vec<Bracket>,
    /// Resolved pairs with their depth below the outermost lineal opener.
    pairs: Vec<(Position, Position, i64)>,
    mismatches: Vec<Position>,
    unmatched: Vec<Position>,
}

impl WindowState {
    fn finish(mut self, window: Range<usize>, color_levels: usize) -> WindowScan {
        let mut buckets = LevelBuckets::new(color_levels);
        for &(opening, closing, depth) in &self.pairs {
            let level = depth.rem_euclid(color_levels as i64) as usize;
            buckets.push_pair(level, opening, closing);
        }
        let mut buckets = buckets.into_buckets();
        for bucket in &mut buckets {
            bucket.regions.sort_unstable();
        }

        self.unmatched
            .extend(self.enclosing.iter().map(|opener| opener.position));
        self.unmatched.sort_unstable();
        self.mismatches.sort_unstable();

        WindowScan {
            window,
            buckets,
            mismatches: self.mismatches,
            unmatched: self.unmatched,
        }
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod window_tests;
