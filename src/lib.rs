//! rainbow-brackets library - rainbow bracket matching and structural editing
//!
//! The core is a single-pass matcher that turns a stream of bracket candidates
//! into a [`Forest`] of matched pairs, a list of mismatched closers and, when
//! coloring, one bucket of positions per rainbow level. Around it sit a tree
//! query, a windowed matcher for large documents, structural commands and the
//! host pieces (scope classification, config, document sessions, rendering)
//! used by the `rainbow-brackets` binary.

pub mod config;
pub mod document;
pub mod error;
pub mod matcher;
pub mod ops;
pub mod query;
pub mod render;
pub mod scope;
pub mod table;
pub mod tree;
pub mod window;

// Re-export commonly used types for convenience
pub use config::{Config, SyntaxSettings};
pub use document::DocumentSession;
pub use error::BracketError;
pub use matcher::{BracketMatcher, ScanResult};
pub use ops::{Edit, EditPlan, RetypeSession, SelectTarget, StructuralOps};
pub use query::TreeQuery;
pub use table::BracketTable;
pub use tree::{BracketPair, Candidate, Forest, LevelBucket, Position, TreeNode};
pub use window::{WindowScan, WindowedMatcher};
