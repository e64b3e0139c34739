//! Turning scan output into something a terminal or another program can show.
//!
//! - [`paint`] colors each bracket with its level color using ANSI escapes
//! - [`annotate`] writes a plain marker line under every line with brackets
//! - [`outline`] prints the forest as an indented tree
//! - [`Report`] is the JSON-serializable summary used by `--json`

use std::collections::BTreeMap;
use std::ops::Range;

use crossterm::style::{Color, Stylize, style};
use serde::Serialize;

use crate::error::BracketError;
use crate::matcher::ScanResult;
use crate::table::BracketTable;
use crate::tree::{BracketPair, Forest, LevelBucket, Position, TreeNode};
use crate::window::WindowScan;

/// Default rainbow, one color per level.
pub const DEFAULT_RAINBOW: [&str; 7] = [
    "#FF0000", "#FF6A00", "#FFD800", "#00FF00", "#0094FF", "#0041FF", "#7D00E5",
];

pub const DEFAULT_MISMATCH_COLOR: &str = "#FF0000";

/// Level colors plus the mismatch color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    levels: Vec<Color>,
    mismatch: Color,
}

impl Palette {
    pub fn from_hex<S: AsRef<str>>(levels: &[S], mismatch: &str) -> Result<Self, BracketError> {
        let levels = levels
            .iter()
            .map(|hex| parse_hex_color(hex.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if levels.is_empty() {
            return Err(BracketError::ZeroColorLevels);
        }
        Ok(Palette {
            levels,
            mismatch: parse_hex_color(mismatch)?,
        })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, level: usize) -> Color {
        self.levels[level % self.levels.len()]
    }

    pub fn mismatch(&self) -> Color {
        self.mismatch
    }
}

impl Default for Palette {
    fn default() -> Self {
        // The built-in colors are well-formed.
        Palette::from_hex(&DEFAULT_RAINBOW, DEFAULT_MISMATCH_COLOR).unwrap_or(Palette {
            levels: vec![Color::Reset],
            mismatch: Color::Red,
        })
    }
}

/// Parses `#RRGGBB` into an RGB terminal color.
pub fn parse_hex_color(hex: &str) -> Result<Color, BracketError> {
    let invalid = || BracketError::InvalidColor(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
    Ok(Color::Rgb {
        r: (value >> 16) as u8,
        g: (value >> 8) as u8,
        b: value as u8,
    })
}

/// How a single bracket character is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Level(usize),
    Mismatch,
    /// Partner outside the scanned window.
    Unmatched,
}

/// Marks keyed by character offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks(BTreeMap<usize, Mark>);

impl Marks {
    pub fn from_scan(scan: &ScanResult) -> Self {
        let mut marks = Marks::default();
        marks.add_buckets(&scan.buckets);
        marks.add(&scan.mismatches, Mark::Mismatch);
        marks
    }

    pub fn from_window(scan: &WindowScan) -> Self {
        let mut marks = Marks::default();
        marks.add_buckets(&scan.buckets);
        marks.add(&scan.unmatched, Mark::Unmatched);
        marks.add(&scan.mismatches, Mark::Mismatch);
        marks
    }

    pub fn get(&self, offset: usize) -> Option<Mark> {
        self.0.get(&offset).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn add_buckets(&mut self, buckets: &[LevelBucket]) {
        for bucket in buckets {
            self.add(&bucket.regions, Mark::Level(bucket.level));
        }
    }

    fn add(&mut self, positions: &[Position], mark: Mark) {
        for position in positions {
            self.0.insert(position.start, mark);
        }
    }
}

/// Text with every marked bracket wrapped in ANSI color escapes.
pub fn paint(text: &[char], marks: &Marks, palette: &Palette) -> String {
    let mut out = String::with_capacity(text.len() + marks.len() * 20);
    for (offset, &ch) in text.iter().enumerate() {
        let styled = match marks.get(offset) {
            Some(Mark::Level(level)) => style(ch).with(palette.level(level)),
            Some(Mark::Mismatch) => style(ch).with(palette.mismatch()).bold(),
            Some(Mark::Unmatched) => style(ch).dim(),
            None => {
                out.push(ch);
                continue;
            }
        };
        out.push_str(&styled.to_string());
    }
    out
}

fn mark_char(mark: Option<Mark>) -> char {
    match mark {
        Some(Mark::Level(level)) => std::char::from_digit(level as u32, 36).unwrap_or('#'),
        Some(Mark::Mismatch) => '!',
        Some(Mark::Unmatched) => '?',
        None => ' ',
    }
}

/// Each line of `text`, followed by a marker line when the line holds marked
/// brackets: the level (base 36) under matched brackets, `!` under mismatches
/// and `?` under brackets whose partner is outside the window.
pub fn annotate(text: &[char], marks: &Marks) -> String {
    let mut out = String::new();
    let mut offset = 0;

    for line in text.split(|&c| c == '\n') {
        let markers: String = (offset..offset + line.len())
            .map(|i| mark_char(marks.get(i)))
            .collect();

        out.extend(line.iter());
        out.push('\n');
        let markers = markers.trim_end();
        if !markers.is_empty() {
            out.push_str(markers);
            out.push('\n');
        }
        offset += line.len() + 1;
    }

    out.truncate(out.trim_end_matches('\n').len());
    out
}

/// The forest as an indented tree, one pair per line: `(…) 3..17`.
pub fn outline(forest: &Forest, table: &BracketTable) -> String {
    let mut out = String::new();
    for root in forest.roots() {
        outline_node(root, table, 0, &mut out);
    }
    out.truncate(out.trim_end_matches('\n').len());
    out
}

fn outline_node(node: &TreeNode, table: &BracketTable, depth: usize, out: &mut String) {
    let closer = table.closer_of(node.bracket).unwrap_or('?');
    let span = node.span();
    out.push_str(&format!(
        "{}{}{} {}..{}\n",
        "  ".repeat(depth),
        node.bracket,
        closer,
        span.start,
        span.end
    ));
    for child in &node.children {
        outline_node(child, table, depth + 1, out);
    }
}

/// 1-based line and column of a character offset.
pub fn line_col(text: &[char], offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.iter().filter(|&&c| c == '\n').count() + 1;
    let column = before.iter().rev().take_while(|&&c| c != '\n').count() + 1;
    (line, column)
}

/// Machine-readable summary of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub syntax: String,
    pub mode: ScanMode,
    pub window: Option<Range<usize>>,
    pub max_depth: Option<usize>,
    pub levels: Vec<LevelBucket>,
    pub mismatches: Vec<Position>,
    pub unclosed: Vec<Position>,
    pub unmatched: Vec<Position>,
    pub pairs: Vec<BracketPair>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Full,
    Window,
}

impl Report {
    pub fn from_scan(syntax: &str, scan: &ScanResult) -> Self {
        Report {
            syntax: syntax.to_string(),
            mode: ScanMode::Full,
            window: None,
            max_depth: Some(scan.forest.max_depth()),
            levels: scan.buckets.clone(),
            mismatches: scan.mismatches.clone(),
            unclosed: scan.unclosed.clone(),
            unmatched: Vec::new(),
            pairs: scan.forest.pairs().map(|(_, node)| node.pair()).collect(),
        }
    }

    pub fn from_window(syntax: &str, scan: &WindowScan) -> Self {
        Report {
            syntax: syntax.to_string(),
            mode: ScanMode::Window,
            window: Some(scan.window.clone()),
            max_depth: None,
            levels: scan.buckets.clone(),
            mismatches: scan.mismatches.clone(),
            unclosed: Vec::new(),
            unmatched: scan.unmatched.clone(),
            pairs: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
