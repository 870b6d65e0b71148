//! Shared directory traversal
//!
//! Both the copier and the comparator see trees through this module: a
//! deterministic, sorted, pre-order walk that never follows symlinks and
//! never filters entries. A directory is always yielded before any of its
//! children.

use crate::types::{EntryMeta, ReplikError};
use std::fs;
use std::path::{Path, PathBuf};

/// One entry produced by the walk
#[derive(Debug, Clone)]
pub struct WalkedEntry {
    /// Absolute path of the entry
    pub path: PathBuf,

    /// Path relative to the walk root (empty for the root itself)
    pub rel_path: PathBuf,

    /// Link-aware metadata snapshot
    pub meta: EntryMeta,
}

/// Pre-order walk over `root`.
///
/// Entries come back sorted by file name within each directory, so two
/// walks over equal trees yield entries in the same order. Hidden files
/// and ignore-file rules are deliberately not honored: replication must
/// see every entry.
pub fn walk(root: &Path) -> Walk {
    let inner = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(std::ffi::OsStr::cmp)
        .build();

    Walk {
        root: root.to_path_buf(),
        inner,
    }
}

/// Iterator returned by [`walk`]
pub struct Walk {
    root: PathBuf,
    inner: ignore::Walk,
}

impl Iterator for Walk {
    type Item = Result<WalkedEntry, ReplikError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(error) => return Some(Err(walk_error(&self.root, error))),
        };

        Some(walked_entry(&self.root, entry.path()))
    }
}

fn walked_entry(root: &Path, path: &Path) -> Result<WalkedEntry, ReplikError> {
    let meta = read_meta(path)?;
    let rel_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();

    Ok(WalkedEntry {
        path: path.to_path_buf(),
        rel_path,
        meta,
    })
}

/// Read link-aware metadata for a single path.
///
/// Uses `symlink_metadata` (lstat), so a symlink is described as a link;
/// for symlinks the raw target string is captured via `read_link` and
/// never resolved.
pub fn read_meta(path: &Path) -> Result<EntryMeta, ReplikError> {
    let metadata =
        fs::symlink_metadata(path).map_err(|error| ReplikError::read(path, error))?;

    let symlink_target = if metadata.file_type().is_symlink() {
        Some(fs::read_link(path).map_err(|error| ReplikError::read(path, error))?)
    } else {
        None
    };

    Ok(EntryMeta::from_metadata(&metadata, symlink_target))
}

fn walk_error(root: &Path, error: ignore::Error) -> ReplikError {
    let path = match &error {
        ignore::Error::WithPath { path, .. } => path.clone(),
        _ => root.to_path_buf(),
    };
    let message = error.to_string();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));

    ReplikError::read(path, source)
}
