//! The importer capability facade.
//!
//! Bundles the engine's four entry points behind one explicitly
//! constructed handle. Callers build an [`Importer`] with the filesystem
//! they want operations executed against and pass it where needed; there
//! is no ambient global registry to look capabilities up in.

use std::sync::Arc;

use tracing::debug;

use pbx_fileops::{execute_file_ops, ExecutionReport, FileOp, FileSystem, StdFileSystem};
use pbx_graph::ProjectGraph;
use pbx_merge::import_project;
use pbx_xref::{bin_mappings, cross_reference, Bins, XrefMap};

use crate::error::SdkResult;

/// Handle exposing the merge engine to callers.
pub struct Importer {
    fs: Arc<dyn FileSystem>,
}

impl Importer {
    /// Build an importer that executes file operations against `fs`.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Build an importer backed by the real filesystem.
    pub fn with_std_fs() -> Self {
        Self::new(Arc::new(StdFileSystem::new()))
    }

    /// Merge `donor` into `receiver` and return the planned operations.
    ///
    /// The receiver becomes the union of both graphs; the donor is left
    /// untouched. The returned batch has not been executed; hand it to
    /// [`execute_file_ops`](Importer::execute_file_ops) or persist it.
    pub fn import_project(
        &self,
        donor: &ProjectGraph,
        receiver: &mut ProjectGraph,
    ) -> SdkResult<Vec<FileOp>> {
        Ok(import_project(donor, receiver)?)
    }

    /// Match every node reachable in `b` against `a` by identity key.
    pub fn cross_reference(&self, a: &ProjectGraph, b: &ProjectGraph) -> SdkResult<XrefMap> {
        Ok(cross_reference(a, b)?)
    }

    /// Partition matched nodes of `a` into the merge/overwrite bins.
    pub fn bin_mappings(&self, map: &XrefMap, a: &ProjectGraph) -> SdkResult<Bins> {
        Ok(bin_mappings(map, a)?)
    }

    /// Apply a planned batch against this importer's filesystem.
    pub fn execute_file_ops(&self, ops: &[FileOp]) -> ExecutionReport {
        execute_file_ops(ops, self.fs.as_ref())
    }

    /// Merge and immediately execute the resulting batch.
    pub fn import_and_execute(
        &self,
        donor: &ProjectGraph,
        receiver: &mut ProjectGraph,
    ) -> SdkResult<ExecutionReport> {
        let ops = self.import_project(donor, receiver)?;
        debug!(operations = ops.len(), "executing planned batch");
        Ok(self.execute_file_ops(&ops))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbx_fileops::InMemoryFileSystem;
    use pbx_graph::{Kind, Node, Value};
    use std::path::Path;

    fn project_with_file(base: &str, path: &str) -> ProjectGraph {
        let mut graph = ProjectGraph::new(base);
        let file = graph.insert(Node::new(Kind::FileReference).with_attr("path", path));
        let group = graph.insert(
            Node::new(Kind::Group).with_attr("children", Value::List(vec![Value::Ref(file)])),
        );
        let root = graph.root();
        graph.set_attr(root, "mainGroup", group).unwrap();
        graph
    }

    #[test]
    fn facade_runs_the_full_merge_and_execute_path() {
        let fs = Arc::new(InMemoryFileSystem::new());
        fs.write_file("/proj/Donor/New.m", "new file");
        fs.write_file("/proj/App/main.m", "existing");

        let donor = project_with_file("/proj/Donor", "New.m");
        let mut receiver = project_with_file("/proj/App", "main.m");

        let importer = Importer::new(fs.clone());
        let report = importer.import_and_execute(&donor, &mut receiver).unwrap();

        assert!(report.is_clean());
        assert_eq!(
            fs.read_file(Path::new("/proj/App/New.m")),
            Some(b"new file".to_vec())
        );
        assert_eq!(
            receiver.all_files().unwrap().len(),
            2,
            "receiver should now track both files"
        );
    }

    #[test]
    fn facade_exposes_matching_and_classification() {
        let receiver = project_with_file("/proj/App", "main.m");
        let donor = receiver.structural_clone().unwrap();

        let importer = Importer::new(Arc::new(InMemoryFileSystem::new()));
        let map = importer.cross_reference(&receiver, &donor).unwrap();
        assert_eq!(map.len(), donor.reachable_ids().unwrap().len());

        let bins = importer.bin_mappings(&map, &receiver).unwrap();
        assert!(bins.merge.is_disjoint(&bins.overwrite));
        assert!(!bins.merge.contains(&receiver.root()));
    }

    #[test]
    fn execute_reports_missing_sources_without_aborting() {
        let fs = Arc::new(InMemoryFileSystem::new());
        fs.write_file("/proj/ok.m", "ok");

        let importer = Importer::new(fs.clone());
        let ops = vec![
            FileOp::copy("/proj/ok.m", "/proj/dest/ok.m"),
            FileOp::copy("/proj/ghost.m", "/proj/dest/ghost.m"),
        ];
        let report = importer.execute_file_ops(&ops);

        assert_eq!(report.applied, 1);
        assert_eq!(report.missing_sources.len(), 1);
        assert!(report.missing_sources[0].ends_with("ghost.m"));
    }
}
