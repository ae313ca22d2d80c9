//! treedump - Directory Snapshot Printer
//!
//! treedump prints every regular file under a root directory as its resolved path followed by
//! a fenced block of its raw contents. Files and directories matched by the root `.gitignore`
//! are skipped, and ignored directories are never entered.
//!
//! ## Architecture
//!
//! - `patterns` compiles the rules file into an ordered `RuleSet`
//! - `matcher` decides ignored / not ignored (last matching rule wins)
//! - `scanner` walks the tree with walkdir, following symlinks, and prunes ignored directories
//! - `output` reads emitted files and renders the fenced blocks
//!
//! Only the root `.gitignore` is read; nested rules files are not consulted.

pub mod error;
pub mod matcher;
pub mod output;
pub mod patterns;
pub mod scanner;

// Re-export commonly used items
pub use error::DumpError;
pub use matcher::{is_ignored, rule_matches};
pub use output::{dump_paths, dump_tree, DumpStats, Dumper, FENCE};
pub use patterns::{compile, load_rules, Rule, RuleSet, RULES_FILE};
pub use scanner::{
    relative_posix, resolve_path, validate_root, walk_tree, EntryKind, TraversalEntry, WalkStats,
};
