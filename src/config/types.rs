//! Config file schema and per-syntax resolution into validated
//! [`SyntaxSettings`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::BracketError;
use crate::render::{DEFAULT_MISMATCH_COLOR, DEFAULT_RAINBOW, Palette};
use crate::scope::ScopeRules;
use crate::table::BracketTable;
use crate::window::DEFAULT_WINDOW_SIZE;

/// Name of the fallback syntax used when nothing more specific matches.
pub const DEFAULT_SYNTAX: &str = "default";

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

/// Documents longer than this (in characters) are colored around the cursor only
fn default_large_file_threshold() -> usize {
    1_000_000
}

/// Per-syntax settings. Every key is optional; missing keys fall back to the
/// `[default]` section and then to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyntaxConfig {
    #[serde(default)]
    pub extensions: Vec<String>,
    pub enabled: Option<bool>,
    pub coloring: Option<bool>,
    pub bracket_pairs: Option<BTreeMap<String, String>>,
    pub rainbow_colors: Option<Vec<String>>,
    pub mismatch_color: Option<String>,
    pub ignored_scopes: Option<Vec<String>>,
    pub line_comments: Option<Vec<String>>,
    pub block_comments: Option<Vec<(String, String)>>,
    pub string_quotes: Option<Vec<char>>,
    pub char_quotes: Option<Vec<char>>,
    pub char_prefixes: Option<Vec<String>>,
}

impl SyntaxConfig {
    fn handles(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    /// Fills every unset key of `self` from `fallback`.
    fn or(&self, fallback: &SyntaxConfig) -> SyntaxConfig {
        SyntaxConfig {
            extensions: self.extensions.clone(),
            enabled: self.enabled.or(fallback.enabled),
            coloring: self.coloring.or(fallback.coloring),
            bracket_pairs: self.bracket_pairs.clone().or_else(|| fallback.bracket_pairs.clone()),
            rainbow_colors: self.rainbow_colors.clone().or_else(|| fallback.rainbow_colors.clone()),
            mismatch_color: self.mismatch_color.clone().or_else(|| fallback.mismatch_color.clone()),
            ignored_scopes: self.ignored_scopes.clone().or_else(|| fallback.ignored_scopes.clone()),
            line_comments: self.line_comments.clone().or_else(|| fallback.line_comments.clone()),
            block_comments: self.block_comments.clone().or_else(|| fallback.block_comments.clone()),
            string_quotes: self.string_quotes.clone().or_else(|| fallback.string_quotes.clone()),
            char_quotes: self.char_quotes.clone().or_else(|| fallback.char_quotes.clone()),
            char_prefixes: self.char_prefixes.clone().or_else(|| fallback.char_prefixes.clone()),
        }
    }
}

/// Values used when neither the syntax nor `[default]` sets a key.
fn builtin_default() -> SyntaxConfig {
    let rules = ScopeRules::default();
    SyntaxConfig {
        extensions: Vec::new(),
        enabled: Some(true),
        coloring: Some(true),
        bracket_pairs: Some(BTreeMap::from([
            ("(".to_string(), ")".to_string()),
            ("[".to_string(), "]".to_string()),
            ("{".to_string(), "}".to_string()),
        ])),
        rainbow_colors: Some(DEFAULT_RAINBOW.iter().map(|c| c.to_string()).collect()),
        mismatch_color: Some(DEFAULT_MISMATCH_COLOR.to_string()),
        ignored_scopes: Some(strings(&["comment", "string", "constant.character"])),
        line_comments: Some(rules.line_comments),
        block_comments: Some(rules.block_comments),
        string_quotes: Some(rules.string_quotes),
        char_quotes: Some(rules.char_quotes),
        char_prefixes: Some(rules.char_prefixes),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Syntaxes known without any config file. A `[syntax.<name>]` section with
/// the same name replaces the built-in entry.
fn builtin_syntax(name: &str) -> Option<SyntaxConfig> {
    let syntax = match name {
        "rust" => SyntaxConfig {
            extensions: strings(&["rs"]),
            char_quotes: Some(vec!['\'']),
            ..SyntaxConfig::default()
        },
        "c" => SyntaxConfig {
            extensions: strings(&["c", "h", "cc", "cpp", "hpp", "java", "js", "ts", "go"]),
            string_quotes: Some(vec!['"', '\'']),
            ..SyntaxConfig::default()
        },
        "python" => SyntaxConfig {
            extensions: strings(&["py", "pyi"]),
            line_comments: Some(strings(&["#"])),
            block_comments: Some(Vec::new()),
            string_quotes: Some(vec!['"', '\'']),
            ..SyntaxConfig::default()
        },
        "lisp" => SyntaxConfig {
            extensions: strings(&["lisp", "el", "clj", "cljs", "scm", "rkt"]),
            line_comments: Some(strings(&[";"])),
            block_comments: Some(vec![("#|".to_string(), "|#".to_string())]),
            string_quotes: Some(vec!['"']),
            char_prefixes: Some(strings(&["#\\"])),
            ..SyntaxConfig::default()
        },
        "json" => SyntaxConfig {
            extensions: strings(&["json"]),
            line_comments: Some(Vec::new()),
            block_comments: Some(Vec::new()),
            ..SyntaxConfig::default()
        },
        _ => return None,
    };
    Some(syntax)
}

const BUILTIN_SYNTAXES: [&str; 5] = ["rust", "c", "python", "lisp", "json"];

/// Everything a document needs to scan and paint, resolved for one syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxSettings {
    pub name: String,
    pub enabled: bool,
    pub coloring: bool,
    pub table: BracketTable,
    pub rules: ScopeRules,
    pub palette: Palette,
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: usize,
    #[serde(default)]
    pub default: SyntaxConfig,
    #[serde(default)]
    pub syntax: BTreeMap<String, SyntaxConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debug: false,
            window_size: default_window_size(),
            large_file_threshold: default_large_file_threshold(),
            default: SyntaxConfig::default(),
            syntax: BTreeMap::new(),
        }
    }
}

impl Config {
    fn lookup(&self, name: &str) -> Option<SyntaxConfig> {
        self.syntax.get(name).cloned().or_else(|| builtin_syntax(name))
    }

    /// Picks the syntax for a document: an explicit name wins, then the file
    /// extension, then [`DEFAULT_SYNTAX`].
    pub fn syntax_for_path(&self, explicit: Option<&str>, path: Option<&Path>) -> String {
        if let Some(name) = explicit {
            return name.to_string();
        }

        let Some(ext) = path.and_then(|p| p.extension()).and_then(|e| e.to_str()) else {
            return DEFAULT_SYNTAX.to_string();
        };

        let configured = self
            .syntax
            .iter()
            .find(|(_, syntax)| syntax.handles(ext))
            .map(|(name, _)| name.clone());

        configured
            .or_else(|| {
                BUILTIN_SYNTAXES
                    .into_iter()
                    .filter(|name| !self.syntax.contains_key(*name))
                    .find(|name| builtin_syntax(name).is_some_and(|s| s.handles(ext)))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_SYNTAX.to_string())
    }

    /// Merges a syntax with `[default]` and the built-in defaults and validates
    /// the result.
    pub fn resolve(&self, name: &str) -> Result<SyntaxSettings, BracketError> {
        let base = self.default.or(&builtin_default());
        let merged = if name == DEFAULT_SYNTAX {
            base
        } else {
            self.lookup(name)
                .ok_or_else(|| BracketError::UnknownSyntax(name.to_string()))?
                .or(&base)
        };

        let colors = merged.rainbow_colors.unwrap_or_default();
        let mismatch = merged
            .mismatch_color
            .unwrap_or_else(|| DEFAULT_MISMATCH_COLOR.to_string());
        let pairs = merged.bracket_pairs.unwrap_or_default();

        let table = BracketTable::from_strings(
            pairs.iter().map(|(open, close)| (open.as_str(), close.as_str())),
            colors.len(),
        )?
        .with_ignored_scopes(merged.ignored_scopes.unwrap_or_default());

        let rules = ScopeRules {
            line_comments: merged.line_comments.unwrap_or_default(),
            block_comments: merged.block_comments.unwrap_or_default(),
            string_quotes: merged.string_quotes.unwrap_or_default(),
            char_quotes: merged.char_quotes.unwrap_or_default(),
            char_prefixes: merged.char_prefixes.unwrap_or_default(),
            escape: Some('\\'),
        };

        Ok(SyntaxSettings {
            name: name.to_string(),
            enabled: merged.enabled.unwrap_or(true),
            coloring: merged.coloring.unwrap_or(true),
            palette: Palette::from_hex(&colors, &mismatch)?,
            table,
            rules,
        })
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
