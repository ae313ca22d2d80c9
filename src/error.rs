//! Fatal errors that abort a whole run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DumpError {
    /// The scan root is missing or is not a directory
    #[error("Error: directory '{}' not found.", .0.display())]
    RootNotFound(PathBuf),

    /// The requested output file could not be opened for writing
    #[error("Error writing to '{}'", .path.display())]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
