//! Enclosing-pair lookup over a [`Forest`].
//!
//! Siblings are sorted and non-overlapping at every depth, so each level is a
//! binary search and a whole query costs `O(depth * log siblings)`.

use std::cmp::Ordering;
use std::ops::Range;

use crate::tree::{BracketPair, Forest, TreeNode};

/// Read-only locator over one scan's forest.
///
/// The forest must belong to the current text; staleness is not detected.
#[derive(Debug, Clone, Copy)]
pub struct TreeQuery<'f> {
    forest: &'f Forest,
}

impl<'f> TreeQuery<'f> {
    pub fn new(forest: &'f Forest) -> Self {
        TreeQuery { forest }
    }

    /// Pairs enclosing `range`, outermost first.
    ///
    /// A non-empty range must sit strictly inside a pair's span. An empty range
    /// (a cursor) also belongs to a pair when it touches the pair from outside:
    /// right before the opener or right after the closer.
    pub fn enclosing(&self, range: Range<usize>) -> Vec<BracketPair> {
        let mut path = Vec::new();
        let mut level = self.forest.roots();

        while let Some(node) = find_container(level, &range) {
            path.push(node.pair());
            level = &node.children;
        }

        path
    }

    /// Deepest pair enclosing `range`.
    pub fn innermost(&self, range: Range<usize>) -> Option<BracketPair> {
        self.enclosing(range).pop()
    }
}

fn find_container<'a>(level: &'a [TreeNode], range: &Range<usize>) -> Option<&'a TreeNode> {
    let (begin, end) = (range.start, range.end);

    let index = level
        .binary_search_by(|node| {
            if node.closing.end < begin {
                Ordering::Less
            } else if node.opening.start > end {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .ok()?;

    let node = &level[index];
    contains(node, begin, end).then_some(node)
}

fn contains(node: &TreeNode, begin: usize, end: usize) -> bool {
    let strict = node.opening.start < begin && end < node.closing.end;
    let touching = begin == end && (end == node.opening.start || begin == node.closing.end);
    strict || touching
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod query_tests;
