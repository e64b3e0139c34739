//! Data model shared by the matchers, the tree query and the structural operations.
//!
//! All offsets are character offsets (Unicode scalar values), so every bracket
//! occupies a 1-width [`Position`].

use serde::Serialize;
use std::ops::Range;

/// Half-open character range `[start, end)` of a single bracket character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    /// Position of the bracket character at `offset`.
    pub fn at(offset: usize) -> Self {
        Position {
            start: offset,
            end: offset + 1,
        }
    }

    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// One bracket-like token handed to a matcher by the scope classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub position: usize,
    pub ch: char,
    /// True when the character sits inside a comment, string or char literal.
    pub ignored: bool,
}

impl Candidate {
    pub fn new(position: usize, ch: char) -> Self {
        Candidate {
            position,
            ch,
            ignored: false,
        }
    }

    pub fn ignored(position: usize, ch: char) -> Self {
        Candidate {
            position,
            ch,
            ignored: true,
        }
    }
}

/// A complete matched pair with its nested pairs.
///
/// Nodes are owned by exactly one parent `children` list (or by the
/// [`Forest`]); there are no back references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub opening: Position,
    pub closing: Position,
    /// The opening bracket character.
    pub bracket: char,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Full span `[opening.start, closing.end)`.
    pub fn span(&self) -> Range<usize> {
        self.opening.start..self.closing.end
    }

    pub fn pair(&self) -> BracketPair {
        BracketPair {
            opening: self.opening,
            closing: self.closing,
            bracket: self.bracket,
        }
    }

    fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

/// A matched pair as reported by queries; a lightweight copy of a [`TreeNode`]
/// without its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BracketPair {
    pub opening: Position,
    pub closing: Position,
    pub bracket: char,
}

impl BracketPair {
    pub fn span(&self) -> Range<usize> {
        self.opening.start..self.closing.end
    }

    /// Range strictly between the two brackets.
    pub fn content(&self) -> Range<usize> {
        self.opening.end..self.closing.start
    }
}

/// Ordered, non-overlapping root-level pairs of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    roots: Vec<TreeNode>,
}

impl Forest {
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Forest { roots }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Deepest nesting of matched pairs; 0 for an empty forest.
    pub fn max_depth(&self) -> usize {
        self.roots.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Number of matched pairs at every depth.
    pub fn pair_count(&self) -> usize {
        self.pairs().count()
    }

    /// Pre-order iterator over every pair, parents before children.
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs {
            stack: self.roots.iter().rev().map(|root| (0, root)).collect(),
        }
    }

    /// Re-emits the forest as a candidate stream: every opening and closing
    /// bracket in position order.
    pub fn flatten(&self, closer_of: impl Fn(char) -> Option<char>) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(self.pair_count() * 2);
        for root in &self.roots {
            flatten_node(root, &closer_of, &mut out);
        }
        out
    }
}

fn flatten_node(
    node: &TreeNode,
    closer_of: &impl Fn(char) -> Option<char>,
    out: &mut Vec<Candidate>,
) {
    out.push(Candidate::new(node.opening.start, node.bracket));
    for child in &node.children {
        flatten_node(child, closer_of, out);
    }
    if let Some(closer) = closer_of(node.bracket) {
        out.push(Candidate::new(node.closing.start, closer));
    }
}

/// Iterator returned by [`Forest::pairs`], yielding `(depth, node)`.
pub struct Pairs<'f> {
    stack: Vec<(usize, &'f TreeNode)>,
}

impl<'f> Iterator for Pairs<'f> {
    type Item = (usize, &'f TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// Positions of both brackets of every pair painted with color `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelBucket {
    pub level: usize,
    pub regions: Vec<Position>,
}

/// Collects regions per color level and emits only the non-empty ones.
#[derive(Debug, Clone)]
pub(crate) struct LevelBuckets {
    levels: Vec<Vec<Position>>,
}

impl LevelBuckets {
    pub(crate) fn new(color_levels: usize) -> Self {
        LevelBuckets {
            levels: vec![Vec::new(); color_levels],
        }
    }

    /// Adds both brackets of a pair found at nesting `depth`.
    pub(crate) fn push_pair(&mut self, depth: usize, opening: Position, closing: Position) {
        let level = depth % self.levels.len();
        let bucket = &mut self.levels[level];
        bucket.push(opening);
        bucket.push(closing);
    }

    pub(crate) fn into_buckets(self) -> Vec<LevelBucket> {
        self.levels
            .into_iter()
            .enumerate()
            .filter(|(_, regions)| !regions.is_empty())
            .map(|(level, regions)| LevelBucket { level, regions })
            .collect()
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
