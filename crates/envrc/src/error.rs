use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or rewriting an environment file.
///
/// Unknown keys and malformed assignment lines are not errors: they are
/// skipped or passed through unchanged.
#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read lines from {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Value for {key} in {} spans several lines", path.display())]
    MultilineValue { path: PathBuf, key: String },
}

impl EnvFileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The file the failing operation was working on.
    ///
    /// For a failed copy this is the destination.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Scan { path, .. } | Self::MultilineValue { path, .. } => {
                path
            }
            Self::Copy { to, .. } => to,
        }
    }
}
