//! Difference - divergences found by the tree comparator
//!
//! Divergences are data, not errors: the comparator's job is to detect and
//! describe them. System faults (unreadable entries etc.) stay in
//! `ReplikError`.

use super::EntryKind;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One semantic difference between two trees, located by the path relative
/// to the compared roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Difference {
    /// Entry exists in the left tree only
    OnlyInLeft { path: PathBuf },

    /// Entry exists in the right tree only
    OnlyInRight { path: PathBuf },

    /// Entry kinds disagree (e.g. directory vs regular file)
    Kind {
        path: PathBuf,
        left: EntryKind,
        right: EntryKind,
    },

    /// Regular-file sizes disagree
    Size { path: PathBuf, left: u64, right: u64 },

    /// Permission bits disagree
    Mode { path: PathBuf, left: u32, right: u32 },

    /// uid/gid disagree
    Ownership {
        path: PathBuf,
        left: (u32, u32),
        right: (u32, u32),
    },

    /// Extended attribute sets disagree
    Xattrs { path: PathBuf, detail: String },

    /// Regular-file content disagrees (sizes equal, bytes differ)
    Content { path: PathBuf },

    /// Raw symlink targets disagree
    SymlinkTarget {
        path: PathBuf,
        left: PathBuf,
        right: PathBuf,
    },

    /// Paths hardlinked together in one tree are not hardlinked together
    /// in the other
    HardlinkTopology { path: PathBuf, detail: String },

    /// Modification times disagree (only checked when requested)
    Mtime { path: PathBuf },
}

impl Difference {
    /// The relative path this difference is anchored at
    pub fn path(&self) -> &Path {
        match self {
            Difference::OnlyInLeft { path }
            | Difference::OnlyInRight { path }
            | Difference::Kind { path, .. }
            | Difference::Size { path, .. }
            | Difference::Mode { path, .. }
            | Difference::Ownership { path, .. }
            | Difference::Xattrs { path, .. }
            | Difference::Content { path }
            | Difference::SymlinkTarget { path, .. }
            | Difference::HardlinkTopology { path, .. }
            | Difference::Mtime { path } => path,
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::OnlyInLeft { path } => {
                write!(f, "{}: only in left tree", path.display())
            }
            Difference::OnlyInRight { path } => {
                write!(f, "{}: only in right tree", path.display())
            }
            Difference::Kind { path, left, right } => write!(
                f,
                "{}: kind mismatch ({} vs {})",
                path.display(),
                left.label(),
                right.label()
            ),
            Difference::Size { path, left, right } => write!(
                f,
                "{}: size mismatch ({} vs {} bytes)",
                path.display(),
                left,
                right
            ),
            Difference::Mode { path, left, right } => write!(
                f,
                "{}: mode mismatch ({:o} vs {:o})",
                path.display(),
                left,
                right
            ),
            Difference::Ownership { path, left, right } => write!(
                f,
                "{}: ownership mismatch ({}:{} vs {}:{})",
                path.display(),
                left.0,
                left.1,
                right.0,
                right.1
            ),
            Difference::Xattrs { path, detail } => {
                write!(f, "{}: xattr mismatch ({})", path.display(), detail)
            }
            Difference::Content { path } => {
                write!(f, "{}: content mismatch", path.display())
            }
            Difference::SymlinkTarget { path, left, right } => write!(
                f,
                "{}: symlink target mismatch ({:?} vs {:?})",
                path.display(),
                left,
                right
            ),
            Difference::HardlinkTopology { path, detail } => {
                write!(f, "{}: hardlink topology mismatch ({})", path.display(), detail)
            }
            Difference::Mtime { path } => {
                write!(f, "{}: modification time mismatch", path.display())
            }
        }
    }
}

/// Ordered collection of differences found by one compare operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Differences in traversal order
    pub differences: Vec<Difference>,
}

impl DiffReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one difference
    pub fn record(&mut self, difference: Difference) {
        self.differences.push(difference);
    }

    /// Check that no difference was found
    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
    }

    /// Number of recorded differences
    pub fn len(&self) -> usize {
        self.differences.len()
    }

    /// Check if the report is empty (alias of `is_identical`)
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// The first difference in traversal order, if any
    pub fn first(&self) -> Option<&Difference> {
        self.differences.first()
    }

    /// Iterator over recorded differences
    pub fn iter(&self) -> impl Iterator<Item = &Difference> {
        self.differences.iter()
    }
}
