//! Full-document bracket matching.
//!
//! One forward pass over the candidate stream builds the [`Forest`] of matched
//! pairs, records closers that match nothing, and (when coloring) sorts both
//! brackets of every pair into its rainbow level bucket.

use crate::table::BracketTable;
use crate::tree::{Candidate, Forest, LevelBucket, LevelBuckets, Position, TreeNode};

/// Everything one scan produces. Immutable until the next scan replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub forest: Forest,
    /// Closers with no compatible opener on the stack.
    pub mismatches: Vec<Position>,
    /// Openers still pending at end of input, outermost first. These are not
    /// part of the forest and not counted as mismatches.
    pub unclosed: Vec<Position>,
    /// Non-empty color levels in ascending order; empty unless the scan was
    /// started with [`BracketMatcher::scan_colored`].
    pub buckets: Vec<LevelBucket>,
}

/// Opener waiting for its closer. Only lives on the scan stack.
#[derive(Debug)]
struct PendingNode {
    opening: Position,
    bracket: char,
    children: Vec<TreeNode>,
}

impl PendingNode {
    fn complete(self, closing: Position) -> TreeNode {
        TreeNode {
            opening: self.opening,
            closing,
            bracket: self.bracket,
            children: self.children,
        }
    }
}

/// Single-pass matcher over a validated [`BracketTable`].
#[derive(Debug, Clone, Copy)]
pub struct BracketMatcher<'t> {
    table: &'t BracketTable,
}

impl<'t> BracketMatcher<'t> {
    pub fn new(table: &'t BracketTable) -> Self {
        BracketMatcher { table }
    }

    /// Builds the forest and mismatch list only.
    pub fn scan(&self, candidates: impl IntoIterator<Item = Candidate>) -> ScanResult {
        self.run(candidates, None)
    }

    /// Builds the forest and mismatch list, filling the level buckets in the
    /// same pass.
    pub fn scan_colored(&self, candidates: impl IntoIterator<Item = Candidate>) -> ScanResult {
        let mut buckets = LevelBuckets::new(self.table.color_levels());
        let mut result = self.run(candidates, Some(&mut buckets));
        result.buckets = buckets.into_buckets();
        result
    }

    fn run(
        &self,
        candidates: impl IntoIterator<Item = Candidate>,
        mut buckets: Option<&mut LevelBuckets>,
    ) -> ScanResult {
        // `opening_stack` and `node_stack` move in lockstep; the forest roots
        // collect in `roots`, which plays the synthetic root node.
        let mut opening_stack: Vec<char> = Vec::new();
        let mut node_stack: Vec<PendingNode> = Vec::new();
        let mut roots: Vec<TreeNode> = Vec::new();
        let mut mismatches = Vec::new();

        for candidate in candidates {
            if candidate.ignored {
                continue;
            }
            let position = Position::at(candidate.position);

            if self.table.is_opener(candidate.ch) {
                node_stack.push(PendingNode {
                    opening: position,
                    bracket: candidate.ch,
                    children: Vec::new(),
                });
                opening_stack.push(candidate.ch);
                continue;
            }

            if !self.table.is_closer(candidate.ch) {
                #[cfg(debug_assertions)]
                log::debug!(
                    "skipping non-bracket candidate {:?} at {}",
                    candidate.ch,
                    candidate.position
                );
                continue;
            }

            let closes_top = opening_stack
                .last()
                .is_some_and(|&open| self.table.closes(open, candidate.ch));

            if !closes_top {
                // An unmatched closer closes nothing; the stacks stay as they are.
                mismatches.push(position);
                continue;
            }

            opening_stack.pop();
            let Some(pending) = node_stack.pop() else {
                continue;
            };
            let node = pending.complete(position);
            if let Some(buckets) = buckets.as_deref_mut() {
                buckets.push_pair(opening_stack.len(), node.opening, node.closing);
            }
            match node_stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }

        let unclosed = node_stack.iter().map(|pending| pending.opening).collect();

        ScanResult {
            forest: Forest::new(roots),
            mismatches,
            unclosed,
            buckets: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod matcher_tests;
