//! Bottom-up directory enumeration
//!
//! [`PostOrderDirs`] yields every directory of a tree after all of its
//! subdirectories, finishing with the root. It is lazy: a directory is listed
//! only when the traversal first enters it, so workers can already be deleting
//! the leaves yielded so far.

use crate::error::{RemoverError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::vec;

/// A directory that has been listed but not yet yielded
struct Frame {
    path: PathBuf,
    subdirs: vec::IntoIter<PathBuf>,
}

/// Post-order iterator over the directories of a tree
///
/// Symbolic links are never followed or yielded. Errors are yielded once
/// and end the iteration.
pub struct PostOrderDirs {
    root: Option<PathBuf>,
    stack: Vec<Frame>,
    failed: bool,
}

impl PostOrderDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            stack: Vec::new(),
            failed: false,
        }
    }

    fn enter(&mut self, dir: PathBuf) -> Result<()> {
        let subdirs = list_subdirs(&dir).map_err(|source| RemoverError::Enumerate {
            path: dir.clone(),
            source,
        })?;

        self.stack.push(Frame {
            path: dir,
            subdirs: subdirs.into_iter(),
        });
        Ok(())
    }

    fn fail(&mut self, error: RemoverError) -> Option<Result<PathBuf>> {
        self.failed = true;
        self.stack.clear();
        Some(Err(error))
    }
}

impl Iterator for PostOrderDirs {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some(root) = self.root.take() {
            if let Err(e) = self.enter(root) {
                return self.fail(e);
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            match frame.subdirs.next() {
                Some(child) => {
                    if let Err(e) = self.enter(child) {
                        return self.fail(e);
                    }
                }
                None => {
                    let frame = self.stack.pop()?;
                    return Some(Ok(frame.path));
                }
            }
        }
    }
}

/// Direct subdirectories of `dir`, symlinks excluded
fn list_subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // DirEntry::file_type does not follow symlinks
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
        }
    }
    Ok(subdirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn collect(root: &Path) -> Vec<PathBuf> {
        PostOrderDirs::new(root)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_single_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(collect(dir.path()), vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn test_children_before_parents() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        for sub in ["a/x", "a/y/z", "b", "c/d/e/f"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        fs::write(root.join("a/file.txt"), "data").unwrap();

        let order = collect(root);
        let position: HashMap<&Path, usize> = order
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_path(), i))
            .collect();

        // every directory, exactly once
        assert_eq!(order.len(), 10);
        assert_eq!(position.len(), order.len());

        for (path, &index) in &position {
            if let Some(parent) = path.parent() {
                if let Some(&parent_index) = position.get(parent) {
                    assert!(
                        parent_index > index,
                        "{} yielded before its child {}",
                        parent.display(),
                        path.display()
                    );
                }
            }
        }

        assert_eq!(order.last().unwrap(), root);
    }

    #[test]
    fn test_files_are_not_yielded() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("plain.txt"), "x").unwrap();
        assert_eq!(collect(dir.path()).len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_not_followed() {
        let outside = tempdir().unwrap();
        fs::create_dir_all(outside.path().join("deep/er")).unwrap();

        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let order = collect(dir.path());
        assert_eq!(order, vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn test_missing_root_yields_error_once() {
        let dir = tempdir().unwrap();
        let mut dirs = PostOrderDirs::new(dir.path().join("missing"));

        match dirs.next() {
            Some(Err(RemoverError::Enumerate { source, .. })) => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected enumeration error, got {:?}", other),
        }
        assert!(dirs.next().is_none());
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let dir = tempdir().unwrap();
        let mut deep = dir.path().to_path_buf();
        for _ in 0..200 {
            deep.push("d");
        }
        fs::create_dir_all(&deep).unwrap();

        let order = collect(dir.path());
        assert_eq!(order.len(), 201);
        assert_eq!(order[0], deep);
    }
}
