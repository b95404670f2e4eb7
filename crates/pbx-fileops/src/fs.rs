//! Filesystem abstraction.
//!
//! All OS access from the executor flows through [`FileSystem`] so tests
//! can substitute an in-memory double. [`StdFileSystem`] is the real
//! implementation; [`InMemoryFileSystem`] models just enough path
//! semantics (files, directories, recursive copy/remove) for executor
//! tests.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use walkdir::WalkDir;

/// The OS file primitives the executor needs.
///
/// Implementations must treat all operations as blocking and synchronous.
/// Copy and remove are recursive: a path may name either a file or a
/// directory tree.
pub trait FileSystem {
    /// Returns `true` if `path` names an existing file or directory.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file or directory tree. The path is known to exist.
    fn remove_recursive(&self, path: &Path) -> io::Result<()>;

    /// Copy a file or directory tree. The source is known to exist; the
    /// destination's parent directory is known to exist.
    fn copy_recursive(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a directory and all missing ancestors.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create the standard filesystem handle.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_recursive(&self, path: &Path) -> io::Result<()> {
        if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn copy_recursive(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from.is_dir() {
            for entry in WalkDir::new(from) {
                let entry = entry.map_err(io::Error::other)?;
                let relative = entry
                    .path()
                    .strip_prefix(from)
                    .map_err(io::Error::other)?;
                let destination = to.join(relative);
                if entry.file_type().is_dir() {
                    std::fs::create_dir_all(&destination)?;
                } else {
                    std::fs::copy(entry.path(), &destination)?;
                }
            }
            Ok(())
        } else {
            std::fs::copy(from, to).map(|_| ())
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// In-memory [`FileSystem`] double for tests and embedding.
///
/// Tracks file contents and explicitly-created directories. A path counts
/// as an existing directory when it was created explicitly or when some
/// file lives beneath it.
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
    state: RwLock<MemFsState>,
}

#[derive(Debug, Default)]
struct MemFsState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl InMemoryFileSystem {
    /// Create an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with the given contents, creating implied directories.
    pub fn write_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let mut state = self.state.write().expect("lock poisoned");
        state.files.insert(path.into(), contents.into());
    }

    /// Read a file's contents, if present.
    pub fn read_file(&self, path: &Path) -> Option<Vec<u8>> {
        let state = self.state.read().expect("lock poisoned");
        state.files.get(path).cloned()
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.state.read().expect("lock poisoned").files.len()
    }
}

fn is_under(path: &Path, ancestor: &Path) -> bool {
    path.strip_prefix(ancestor).is_ok() && path != ancestor
}

impl FileSystem for InMemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.read().expect("lock poisoned");
        state.files.contains_key(path)
            || state.dirs.contains(path)
            || state.files.keys().any(|file| is_under(file, path))
    }

    fn remove_recursive(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.write().expect("lock poisoned");
        state.files.remove(path);
        state
            .files
            .retain(|file, _| !is_under(file, path));
        state.dirs.retain(|dir| dir != path && !is_under(dir, path));
        Ok(())
    }

    fn copy_recursive(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.state.write().expect("lock poisoned");
        if let Some(contents) = state.files.get(from).cloned() {
            state.files.insert(to.to_path_buf(), contents);
            return Ok(());
        }

        let nested: Vec<(PathBuf, Vec<u8>)> = state
            .files
            .iter()
            .filter(|(file, _)| is_under(file, from))
            .map(|(file, contents)| (file.clone(), contents.clone()))
            .collect();
        if nested.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such path: {}", from.display()),
            ));
        }
        for (file, contents) in nested {
            let relative = file.strip_prefix(from).map_err(io::Error::other)?;
            state.files.insert(to.join(relative), contents);
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.write().expect("lock poisoned");
        let mut current = path.to_path_buf();
        loop {
            state.dirs.insert(current.clone());
            match current.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    current = parent.to_path_buf();
                }
                _ => break,
            }
        }
        Ok(())
    }
}
