//! The file-operation planner.
//!
//! Correlates, by file-reference identity key, the receiver's resolved
//! paths before and after the merge with the donor's own layout, and turns
//! the differences into copy/delete operations. The planner always makes a
//! full pass: every file the donor carries yields a copy even when its
//! path did not change, so a freshly-merged project directory is complete
//! rather than merely patched.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use pbx_fileops::FileOp;
use pbx_xref::XrefKey;

/// One resolved file view: identity key plus project-relative path, in
/// traversal order.
pub type FileIndex = Vec<(XrefKey, String)>;

/// Plan the operations that bring the receiver's directory in line with
/// its merged graph.
///
/// - Path changed: delete the old receiver path, copy from the donor.
/// - New file: copy from the donor.
/// - Unchanged path known to the donor: copy from the donor (full pass).
/// - Receiver-only file relocated by the merge (the donor has no copy of
///   it): copy from the receiver's old path, no delete; the batch is
///   unordered, so deleting the copy source would race it.
/// - Hidden files (relative path starting with `.`) yield no operations.
///
/// The returned batch is de-duplicated by record identity and carries no
/// required ordering.
pub fn plan_file_ops(
    before: &FileIndex,
    after: &FileIndex,
    donor_files: &FileIndex,
    receiver_base: &Path,
    donor_base: &Path,
) -> Vec<FileOp> {
    let before_map = first_by_key(before);
    let donor_map = first_by_key(donor_files);

    let mut ops = Vec::new();
    let mut seen: HashSet<FileOp> = HashSet::new();
    let mut push = |op: FileOp, ops: &mut Vec<FileOp>| {
        if seen.insert(op.clone()) {
            ops.push(op);
        }
    };

    for (key, new_rel) in after {
        if is_hidden(new_rel) {
            continue;
        }
        let old_rel = before_map.get(key).copied();
        let donor_rel = donor_map.get(key).copied();

        match old_rel {
            Some(old) if old != new_rel.as_str() => {
                match donor_rel {
                    Some(donor) => {
                        push(FileOp::delete(receiver_base.join(old)), &mut ops);
                        push(
                            FileOp::copy(donor_base.join(donor), receiver_base.join(new_rel)),
                            &mut ops,
                        );
                    }
                    None => {
                        // Relocated by a donor group rename, but the donor
                        // has no copy to source from.
                        debug!(old, new = %new_rel, "receiver-only file moved");
                        push(
                            FileOp::copy(receiver_base.join(old), receiver_base.join(new_rel)),
                            &mut ops,
                        );
                    }
                }
            }
            Some(_) => {
                if let Some(donor) = donor_rel {
                    push(
                        FileOp::copy(donor_base.join(donor), receiver_base.join(new_rel)),
                        &mut ops,
                    );
                }
            }
            None => match donor_rel {
                Some(donor) => push(
                    FileOp::copy(donor_base.join(donor), receiver_base.join(new_rel)),
                    &mut ops,
                ),
                None => debug!(path = %new_rel, "new file has no donor source"),
            },
        }
    }

    ops
}

fn first_by_key(index: &FileIndex) -> HashMap<&XrefKey, &str> {
    let mut map = HashMap::new();
    for (key, path) in index {
        map.entry(key).or_insert(path.as_str());
    }
    map
}

fn is_hidden(relative: &str) -> bool {
    relative.starts_with('.')
}
