//! EntryMeta - Link-aware metadata snapshot of one directory entry

use super::FileIdentity;
use filetime::FileTime;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::PathBuf;

/// Kind of a directory entry, read without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Directory,
    RegularFile,
    Symlink,
    /// Sockets, devices, fifos - content cannot be replicated
    Other,
}

impl EntryKind {
    /// Classify a file type obtained from link-aware metadata
    pub fn from_file_type(file_type: &std::fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::RegularFile
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        }
    }

    /// Human-readable label for messages and reports
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::RegularFile => "file",
            EntryKind::Symlink => "symlink",
            EntryKind::Other => "special file",
        }
    }
}

/// Metadata snapshot of a single entry, taken with lstat semantics:
/// a symlink describes the link itself, never its target.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryMeta {
    /// Entry kind
    pub kind: EntryKind,

    /// Full mode bits as reported by the OS (type + permission bits)
    pub mode: u32,

    /// Owning user id (0 on platforms without the concept)
    pub uid: u32,

    /// Owning group id (0 on platforms without the concept)
    pub gid: u32,

    /// Size in bytes (for symlinks: length of the target string)
    pub size: u64,

    /// Hardlink count
    pub nlink: u64,

    /// Last modification time
    pub mtime: FileTime,

    /// Same-file identity, when the platform can provide one
    pub identity: Option<FileIdentity>,

    /// Raw symlink target, exactly as stored - never resolved
    pub symlink_target: Option<PathBuf>,
}

impl EntryMeta {
    /// Build an EntryMeta from link-aware `std::fs::Metadata`.
    ///
    /// `symlink_target` must be provided for symlink entries (the raw
    /// result of `read_link`) and `None` for everything else.
    pub fn from_metadata(metadata: &Metadata, symlink_target: Option<PathBuf>) -> Self {
        let kind = EntryKind::from_file_type(&metadata.file_type());

        #[cfg(unix)]
        let (mode, uid, gid, nlink) = {
            use std::os::unix::fs::MetadataExt;
            (metadata.mode(), metadata.uid(), metadata.gid(), metadata.nlink())
        };

        #[cfg(not(unix))]
        let (mode, uid, gid, nlink) = (0o644u32, 0u32, 0u32, 1u64);

        Self {
            kind,
            mode,
            uid,
            gid,
            size: metadata.len(),
            nlink,
            mtime: FileTime::from_last_modification_time(metadata),
            identity: FileIdentity::of(metadata),
            symlink_target,
        }
    }

    /// Permission bits only (mode with the file-type bits masked off)
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }

    /// True for a regular file that is one of several names for the same
    /// underlying storage
    pub fn is_hardlinked_file(&self) -> bool {
        self.kind == EntryKind::RegularFile && self.nlink > 1
    }
}
