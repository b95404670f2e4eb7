//! Planned file-operation records.
//!
//! These records are the exact contract between the planner and the
//! executor. Operations carry no required ordering relative to each other:
//! each is safe to execute independently and batches may be de-duplicated
//! by record identity.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One planned filesystem operation.
///
/// Wire shape: `{"op":"delete","path":...}` or
/// `{"op":"copy","from":...,"to":...}`, all paths absolute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum FileOp {
    /// Remove `path` recursively if it exists.
    Delete {
        /// Absolute path to remove.
        path: PathBuf,
    },
    /// Copy `from` recursively to `to`, creating parent directories.
    Copy {
        /// Absolute source path.
        from: PathBuf,
        /// Absolute destination path.
        to: PathBuf,
    },
}

impl FileOp {
    /// Build a delete operation.
    pub fn delete(path: impl Into<PathBuf>) -> Self {
        FileOp::Delete { path: path.into() }
    }

    /// Build a copy operation.
    pub fn copy(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        FileOp::Copy {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The path this operation writes to or removes.
    pub fn destination(&self) -> &Path {
        match self {
            FileOp::Delete { path } => path,
            FileOp::Copy { to, .. } => to,
        }
    }
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOp::Delete { path } => write!(f, "delete {}", path.display()),
            FileOp::Copy { from, to } => {
                write!(f, "copy {} -> {}", from.display(), to.display())
            }
        }
    }
}
