//! Tree traversal that applies the ignore rules.

use crate::error::DumpError;
use crate::patterns::RuleSet;

use std::cell::Cell;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Kind of a visited filesystem entry, after following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    /// Devices, sockets, FIFOs
    Other,
}

/// A single visited node, consumed immediately by the walker
#[derive(Debug, Clone)]
pub struct TraversalEntry {
    pub path: PathBuf,
    /// Path relative to the root, always `/`-separated
    pub relative: String,
    pub kind: EntryKind,
}

impl TraversalEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Counters collected during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs_visited: u64,
    pub files_emitted: u64,
    pub entries_ignored: u64,
    /// Unreadable directories and dangling symlinks
    pub unreadable_entries: u64,
}

/// Resolve a path to its absolute canonical form, keeping it as-is when
/// that fails (e.g. the path vanished).
pub fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Check that the scan root exists and is a directory, and resolve it
pub fn validate_root(path: &Path) -> Result<PathBuf, DumpError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(resolve_path(path)),
        _ => Err(DumpError::RootNotFound(path.to_path_buf())),
    }
}

/// Express `path` relative to `root` with `/` separators
pub fn relative_posix(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether an entry is a directory once symlinks are followed.
///
/// Sorting sees the raw entry, so symlinks are stat'ed here.
fn targets_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn entry_kind(entry: &DirEntry) -> EntryKind {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        EntryKind::Dir
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

impl TraversalEntry {
    fn from_walk(root: &Path, entry: &DirEntry) -> Self {
        TraversalEntry {
            path: entry.path().to_path_buf(),
            relative: relative_posix(root, entry.path()),
            kind: entry_kind(entry),
        }
    }
}

/// Walk the tree under `root`, calling `emit` with the resolved path of
/// every regular file that is neither ignored nor in `exclude`.
///
/// Symlinks are followed; a link back to one of its own ancestors is
/// reported by walkdir as a loop and skipped. Ignored directories are
/// pruned without being entered. Within a directory, files are emitted in
/// name order before any subdirectory is entered. Unreadable directories
/// and dangling links are skipped and only counted.
pub fn walk_tree<F>(root: &Path, rules: &RuleSet, exclude: &[PathBuf], mut emit: F) -> WalkStats
where
    F: FnMut(&Path),
{
    let root = resolve_path(root);
    let exclude: HashSet<PathBuf> = exclude.iter().map(|p| resolve_path(p)).collect();

    let mut stats = WalkStats::default();
    let ignored = Cell::new(0u64);

    let walker = WalkDir::new(&root)
        .follow_links(true)
        .sort_by(|a, b| {
            targets_dir(a)
                .cmp(&targets_dir(b))
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let entry = TraversalEntry::from_walk(&root, entry);
            if rules.is_ignored(&entry.relative, entry.is_dir()) {
                tracing::debug!(path = %entry.relative, dir = entry.is_dir(), "ignored");
                ignored.set(ignored.get() + 1);
                return false;
            }
            true
        });

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(ancestor) = err.loop_ancestor() {
                    tracing::debug!(path = ?err.path(), ancestor = %ancestor.display(), "symlink loop, skipping");
                } else {
                    tracing::debug!(error = %err, "cannot read entry, skipping");
                    stats.unreadable_entries += 1;
                }
                continue;
            }
        };

        let entry = TraversalEntry::from_walk(&root, &entry);
        match entry.kind {
            EntryKind::Dir => stats.dirs_visited += 1,
            EntryKind::File => {
                let resolved = resolve_path(&entry.path);
                if exclude.contains(&resolved) {
                    tracing::debug!(path = %resolved.display(), "excluded");
                    continue;
                }
                stats.files_emitted += 1;
                emit(&resolved);
            }
            EntryKind::Other => {
                tracing::debug!(path = %entry.relative, "not a regular file, skipping");
            }
        }
    }

    stats.entries_ignored = ignored.get();
    stats
}
