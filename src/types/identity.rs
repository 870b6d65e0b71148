//! FileIdentity - same-file identity for hardlink topology

use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Identifies one underlying file across the multiple directory entries
/// that reference it.
///
/// On Unix this is the (device, inode) pair. It is stable for the lifetime
/// of a single copy or compare operation and meaningless across operations:
/// inode numbers are never preserved into a destination tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    /// Identity of the entry described by `metadata`.
    ///
    /// Returns `None` on platforms without an inode concept; callers then
    /// treat every path as its own file and hardlink topology becomes
    /// best-effort instead of an error.
    #[cfg(unix)]
    pub fn of(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn of(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Map from source-file identity to the destination path already
/// materialized for that identity.
///
/// Owned by exactly one in-flight copy operation and passed through the
/// walk explicitly; discarded when the operation completes.
#[derive(Debug, Default)]
pub struct InodeMap {
    seen: HashMap<FileIdentity, PathBuf>,
}

impl InodeMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// The destination path recorded for `identity`, if content for it was
    /// already copied during this operation
    pub fn first_destination(&self, identity: FileIdentity) -> Option<&Path> {
        self.seen.get(&identity).map(PathBuf::as_path)
    }

    /// Record that content for `identity` now lives at `destination`
    pub fn record(&mut self, identity: FileIdentity, destination: PathBuf) {
        self.seen.insert(identity, destination);
    }

    /// Number of distinct identities copied so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if no identity has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
