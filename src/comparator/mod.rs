//! Tree comparator
//!
//! Walks two trees in lockstep and reports semantic divergences as data.
//! Cheap checks run first (kind, child-name sets, size, mode, ownership,
//! xattrs), content last, by streaming digest. Hardlink topology is
//! compared as a relation between paths: absolute inode numbers are never
//! compared across trees.

use crate::hash;
use crate::types::{DiffReport, Difference, EntryKind, EntryMeta, FileIdentity, ReplikError};
use crate::walk;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one compare operation
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareOptions {
    /// Collect every difference instead of stopping at the first
    pub report_all: bool,

    /// Also compare modification times
    pub check_times: bool,
}

/// Compare the trees rooted at `left_root` and `right_root`.
///
/// Returns a report of divergences (empty when the trees are
/// indistinguishable). System faults - an unreadable entry, a vanished
/// file - are errors, not differences.
pub fn compare_dirs(
    left_root: &Path,
    right_root: &Path,
    options: CompareOptions,
) -> Result<DiffReport, ReplikError> {
    let mut comparator = TreeComparator {
        left_root,
        right_root,
        options,
        report: DiffReport::new(),
    };

    comparator.compare_entry(Path::new(""))?;

    // The topology pass re-walks both trees; in first-divergence mode a
    // terminal difference has already been found and reported.
    if options.report_all || comparator.report.is_identical() {
        comparator.compare_hardlink_topology()?;
    }

    Ok(comparator.report)
}

struct TreeComparator<'a> {
    left_root: &'a Path,
    right_root: &'a Path,
    options: CompareOptions,
    report: DiffReport,
}

impl TreeComparator<'_> {
    /// True once the walk should stop recording (first-divergence mode)
    fn done(&self) -> bool {
        !self.options.report_all && !self.report.is_identical()
    }

    fn compare_entry(&mut self, rel: &Path) -> Result<(), ReplikError> {
        let left_path = self.left_root.join(rel);
        let right_path = self.right_root.join(rel);
        let left = walk::read_meta(&left_path)?;
        let right = walk::read_meta(&right_path)?;

        if left.kind != right.kind {
            self.report.record(Difference::Kind {
                path: rel.to_path_buf(),
                left: left.kind,
                right: right.kind,
            });
            return Ok(()); // terminal: nothing below is comparable
        }

        match left.kind {
            EntryKind::Directory => {
                self.compare_attributes(rel, &left_path, &right_path, &left, &right, true)?;
                if self.done() {
                    return Ok(());
                }
                self.compare_children(rel)
            }
            EntryKind::RegularFile => {
                self.compare_regular_file(rel, &left_path, &right_path, &left, &right)
            }
            EntryKind::Symlink => {
                if left.symlink_target != right.symlink_target {
                    self.report.record(Difference::SymlinkTarget {
                        path: rel.to_path_buf(),
                        left: left.symlink_target.clone().unwrap_or_default(),
                        right: right.symlink_target.clone().unwrap_or_default(),
                    });
                    if self.done() {
                        return Ok(());
                    }
                }
                // Mode bits on the link itself are not settable portably,
                // so they are not part of symlink identity here.
                self.compare_attributes(rel, &left_path, &right_path, &left, &right, false)
            }
            EntryKind::Other => {
                self.compare_attributes(rel, &left_path, &right_path, &left, &right, true)
            }
        }
    }

    fn compare_regular_file(
        &mut self,
        rel: &Path,
        left_path: &Path,
        right_path: &Path,
        left: &EntryMeta,
        right: &EntryMeta,
    ) -> Result<(), ReplikError> {
        self.compare_attributes(rel, left_path, right_path, left, right, true)?;
        if self.done() {
            return Ok(());
        }

        if left.size != right.size {
            self.report.record(Difference::Size {
                path: rel.to_path_buf(),
                left: left.size,
                right: right.size,
            });
            return Ok(()); // different sizes, no point digesting
        }

        if !hash::files_identical(left_path, right_path)? {
            self.report.record(Difference::Content {
                path: rel.to_path_buf(),
            });
        }

        Ok(())
    }

    fn compare_attributes(
        &mut self,
        rel: &Path,
        left_path: &Path,
        right_path: &Path,
        left: &EntryMeta,
        right: &EntryMeta,
        include_mode: bool,
    ) -> Result<(), ReplikError> {
        if include_mode && left.permissions() != right.permissions() {
            self.report.record(Difference::Mode {
                path: rel.to_path_buf(),
                left: left.permissions(),
                right: right.permissions(),
            });
            if self.done() {
                return Ok(());
            }
        }

        if (left.uid, left.gid) != (right.uid, right.gid) {
            self.report.record(Difference::Ownership {
                path: rel.to_path_buf(),
                left: (left.uid, left.gid),
                right: (right.uid, right.gid),
            });
            if self.done() {
                return Ok(());
            }
        }

        if let Some(detail) = xattr_difference(left_path, right_path)? {
            self.report.record(Difference::Xattrs {
                path: rel.to_path_buf(),
                detail,
            });
            if self.done() {
                return Ok(());
            }
        }

        if self.options.check_times && left.mtime != right.mtime {
            self.report.record(Difference::Mtime {
                path: rel.to_path_buf(),
            });
        }

        Ok(())
    }

    fn compare_children(&mut self, rel: &Path) -> Result<(), ReplikError> {
        let left_names = read_child_names(&self.left_root.join(rel))?;
        let right_names = read_child_names(&self.right_root.join(rel))?;

        for name in left_names.difference(&right_names) {
            self.report.record(Difference::OnlyInLeft {
                path: rel.join(name),
            });
            if self.done() {
                return Ok(());
            }
        }

        for name in right_names.difference(&left_names) {
            self.report.record(Difference::OnlyInRight {
                path: rel.join(name),
            });
            if self.done() {
                return Ok(());
            }
        }

        for name in left_names.intersection(&right_names) {
            self.compare_entry(&rel.join(name))?;
            if self.done() {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Paths that are one file in one tree must be one file in the other.
    ///
    /// Groups each tree's hardlinked regular files by their own identity
    /// and compares the resulting partitions of relative paths.
    fn compare_hardlink_topology(&mut self) -> Result<(), ReplikError> {
        let left_groups = hardlink_groups(self.left_root)?;
        let right_groups = hardlink_groups(self.right_root)?;

        for group in left_groups.difference(&right_groups) {
            self.report.record(topology_difference(group, "left"));
            if self.done() {
                return Ok(());
            }
        }

        for group in right_groups.difference(&left_groups) {
            self.report.record(topology_difference(group, "right"));
            if self.done() {
                return Ok(());
            }
        }

        Ok(())
    }
}

fn topology_difference(group: &BTreeSet<PathBuf>, tree: &str) -> Difference {
    let members = group
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    Difference::HardlinkTopology {
        path: group.iter().next().cloned().unwrap_or_default(),
        detail: format!("[{members}] share one file in the {tree} tree only"),
    }
}

/// First extended-attribute divergence between two entries, if any.
///
/// Reads attributes with no-follow calls so a symlink's own attribute set
/// is compared, not its target's.
#[cfg(unix)]
fn xattr_difference(left: &Path, right: &Path) -> Result<Option<String>, ReplikError> {
    let left_attrs = read_xattrs(left)?;
    let right_attrs = read_xattrs(right)?;

    for (name, value) in &left_attrs {
        match right_attrs.get(name) {
            None => return Ok(Some(format!("{name:?} only in left tree"))),
            Some(other) if other != value => {
                return Ok(Some(format!("{name:?} value mismatch")));
            }
            Some(_) => {}
        }
    }

    for name in right_attrs.keys() {
        if !left_attrs.contains_key(name) {
            return Ok(Some(format!("{name:?} only in right tree")));
        }
    }

    Ok(None)
}

#[cfg(not(unix))]
fn xattr_difference(_left: &Path, _right: &Path) -> Result<Option<String>, ReplikError> {
    Ok(None)
}

#[cfg(unix)]
fn read_xattrs(path: &Path) -> Result<BTreeMap<OsString, Vec<u8>>, ReplikError> {
    let mut attrs = BTreeMap::new();

    let names = match xattr::list(path) {
        Ok(names) => names,
        Err(error) if error.kind() == std::io::ErrorKind::Unsupported => return Ok(attrs),
        Err(error) => return Err(ReplikError::read(path, error)),
    };

    for name in names {
        if let Some(value) =
            xattr::get(path, &name).map_err(|error| ReplikError::read(path, error))?
        {
            attrs.insert(name, value);
        }
    }

    Ok(attrs)
}

fn read_child_names(dir: &Path) -> Result<BTreeSet<OsString>, ReplikError> {
    let mut names = BTreeSet::new();
    let entries = fs::read_dir(dir).map_err(|error| ReplikError::read(dir, error))?;

    for entry in entries {
        let entry = entry.map_err(|error| ReplikError::read(dir, error))?;
        names.insert(entry.file_name());
    }

    Ok(names)
}

/// Sets of relative paths that alias the same file within `root`.
///
/// Only groups with at least two members inside the tree matter: a file
/// with extra links outside the walked root is not observable topology.
fn hardlink_groups(root: &Path) -> Result<BTreeSet<BTreeSet<PathBuf>>, ReplikError> {
    let mut by_identity: BTreeMap<FileIdentity, BTreeSet<PathBuf>> = BTreeMap::new();

    for walked in walk::walk(root) {
        let entry = walked?;
        if !entry.meta.is_hardlinked_file() {
            continue;
        }
        if let Some(identity) = entry.meta.identity {
            by_identity.entry(identity).or_default().insert(entry.rel_path);
        }
    }

    Ok(by_identity
        .into_values()
        .filter(|group| group.len() >= 2)
        .collect())
}
