//! Error types for whole-scan failures.
//!
//! Per-file problems (unreadable source, malformed config) are logged and
//! recovered from; only failures that make the scan meaningless surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The root could not be stat'ed or canonicalized
    #[error("cannot access project root {}: {source}", path.display())]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project root {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// The directory walk failed at the root itself
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;
