//! Error types for the detector, normalizer and problem protocol.

use std::path::PathBuf;

/// Failure while normalizing a single mod tree.
///
/// Either variant aborts normalization of that tree; other trees are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Error renaming {} to {}, {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error getting matching filename in game data directory, path was {}", .path.display())]
    Lookup {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Errors surfaced to the host through the problem protocol.
#[derive(Debug, thiserror::Error)]
pub enum DiagnoseError {
    #[error("Invalid problem key {0}")]
    InvalidProblemKey(u32),

    #[error("Failed to list mods: {0}")]
    ModList(#[source] std::io::Error),
}
