//! Fenced-block rendering of emitted files.

use crate::patterns::RuleSet;
use crate::scanner::{walk_tree, WalkStats};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Marker line opening and closing each file's contents
pub const FENCE: &str = "```";

/// Number of files read concurrently before their blocks are written
const READ_BATCH: usize = 64;

/// Totals for one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    pub files_written: u64,
    pub read_errors: u64,
    pub bytes_written: u64,
    pub walk: WalkStats,
}

/// Writes file blocks and read-error lines to a sink
pub struct Dumper<W: Write> {
    out: W,
    stats: DumpStats,
}

impl<W: Write> Dumper<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stats: DumpStats::default(),
        }
    }

    /// Write one file block: path line, fence, raw bytes, fence, blank line.
    /// A newline is added when non-empty contents do not end in one.
    pub fn write_file(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.write_path(path)?;
        writeln!(self.out)?;
        writeln!(self.out, "{FENCE}")?;
        self.out.write_all(contents)?;
        if contents.last().is_some_and(|&b| b != b'\n') {
            writeln!(self.out)?;
        }
        writeln!(self.out, "{FENCE}")?;
        writeln!(self.out)?;

        self.stats.files_written += 1;
        self.stats.bytes_written += contents.len() as u64;
        Ok(())
    }

    /// Report an unreadable file inline and on stderr
    pub fn write_read_error(&mut self, path: &Path, err: &io::Error) -> io::Result<()> {
        eprintln!("Failed to read file {}: {}", path.display(), err);
        write!(self.out, "Failed to read file ")?;
        self.write_path(path)?;
        writeln!(self.out, ": {err}")?;
        writeln!(self.out)?;

        self.stats.read_errors += 1;
        Ok(())
    }

    /// Paths go out as their raw bytes, not a lossy rendering
    fn write_path(&mut self, path: &Path) -> io::Result<()> {
        self.out.write_all(path.as_os_str().as_encoded_bytes())
    }

    pub fn write_entry(&mut self, path: &Path, contents: io::Result<Vec<u8>>) -> io::Result<()> {
        match contents {
            Ok(bytes) => self.write_file(path, &bytes),
            Err(err) => self.write_read_error(path, &err),
        }
    }

    /// Flush the sink and hand it back with the totals
    pub fn finish(mut self) -> io::Result<(W, DumpStats)> {
        self.out.flush()?;
        Ok((self.out, self.stats))
    }
}

/// Walk `root` and write every emitted file to `out`.
pub fn dump_tree<W: Write>(
    root: &Path,
    rules: &RuleSet,
    exclude: &[PathBuf],
    out: W,
    progress: &ProgressBar,
) -> Result<DumpStats> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let walk = walk_tree(root, rules, exclude, |path| {
        paths.push(path.to_path_buf());
        if paths.len() % 100 == 0 {
            progress.set_message(format!("Scanning: {} files found", paths.len()));
        }
    });

    tracing::debug!(
        files = walk.files_emitted,
        dirs = walk.dirs_visited,
        ignored = walk.entries_ignored,
        unreadable = walk.unreadable_entries,
        "walk finished"
    );

    let mut stats = dump_paths(&paths, out, progress)?;
    stats.walk = walk;

    tracing::info!(
        files = stats.files_written,
        errors = stats.read_errors,
        bytes = stats.bytes_written,
        "snapshot complete"
    );

    Ok(stats)
}

/// Write the blocks for `paths` to `out`, in order.
///
/// Files are read in parallel batches but written in the given order. Read
/// failures become inline error lines and the run continues. Failures
/// writing to `out` abort.
pub fn dump_paths<W: Write>(paths: &[PathBuf], out: W, progress: &ProgressBar) -> Result<DumpStats> {
    progress.set_length(paths.len() as u64);
    progress.set_message("Writing files");

    let mut dumper = Dumper::new(out);
    for batch in paths.chunks(READ_BATCH) {
        let contents: Vec<io::Result<Vec<u8>>> = batch.par_iter().map(fs::read).collect();

        for (path, result) in batch.iter().zip(contents) {
            dumper
                .write_entry(path, result)
                .with_context(|| format!("Failed to write entry for {}", path.display()))?;
            progress.inc(1);
        }
    }

    let (_, stats) = dumper.finish().context("Failed to flush output")?;
    Ok(stats)
}
