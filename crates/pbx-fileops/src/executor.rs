//! The file-operation executor.
//!
//! Applies a planned batch sequentially against a [`FileSystem`]. The
//! batch has no transactional semantics: there is no rollback, and a
//! failed or skipped operation never aborts the rest. Partial completion
//! is an accepted outcome, observable through the returned report and the
//! emitted diagnostics.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::ops::FileOp;

/// What happened while applying a batch of operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Operations that completed.
    pub applied: usize,
    /// Deletes whose target did not exist (skipped silently).
    pub skipped_deletes: usize,
    /// Copy sources that did not exist; the copies were not performed.
    pub missing_sources: Vec<PathBuf>,
    /// Operations that failed with an I/O error, with the error text.
    pub failures: Vec<(FileOp, String)>,
}

impl ExecutionReport {
    /// Returns `true` if every operation completed or was a silent skip.
    pub fn is_clean(&self) -> bool {
        self.missing_sources.is_empty() && self.failures.is_empty()
    }
}

/// Apply each planned operation in order.
///
/// - `delete`: if the path exists, remove it recursively; otherwise skip
///   silently.
/// - `copy`: ensure the destination's parent directory exists, creating it
///   recursively if absent; if the source exists, copy it recursively; if
///   not, report the missing source and continue.
pub fn execute_file_ops(ops: &[FileOp], fs: &dyn FileSystem) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for op in ops {
        match op {
            FileOp::Delete { path } => {
                if !fs.exists(path) {
                    debug!(path = %path.display(), "delete target absent, skipping");
                    report.skipped_deletes += 1;
                    continue;
                }
                match fs.remove_recursive(path) {
                    Ok(()) => {
                        debug!(path = %path.display(), "deleted");
                        report.applied += 1;
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "delete failed");
                        report.failures.push((op.clone(), err.to_string()));
                    }
                }
            }
            FileOp::Copy { from, to } => {
                if let Some(parent) = to.parent() {
                    if !fs.exists(parent) {
                        if let Err(err) = fs.create_dir_all(parent) {
                            warn!(path = %parent.display(), error = %err, "mkdir failed");
                            report.failures.push((op.clone(), err.to_string()));
                            continue;
                        }
                    }
                }
                if !fs.exists(from) {
                    warn!(from = %from.display(), "copy source missing, skipping");
                    report.missing_sources.push(from.clone());
                    continue;
                }
                match fs.copy_recursive(from, to) {
                    Ok(()) => {
                        debug!(from = %from.display(), to = %to.display(), "copied");
                        report.applied += 1;
                    }
                    Err(err) => {
                        warn!(from = %from.display(), error = %err, "copy failed");
                        report.failures.push((op.clone(), err.to_string()));
                    }
                }
            }
        }
    }

    report
}
