//! Tree copier
//!
//! Walks a source tree once, in pre-order, and materializes an equivalent
//! tree at the destination: directories first, regular files streamed (or
//! hardlinked when the source entry aliases content already copied),
//! symlinks recreated with their raw target. Metadata lands after each
//! entry exists; directory metadata is deferred until the whole subtree
//! beneath it is in place.

mod content;
mod meta;

pub use content::stream_copy;
pub use meta::apply_metadata;

use crate::config::{Config, UnsupportedPolicy};
use crate::types::{EntryKind, EntryMeta, InodeMap, ReplikError};
use crate::walk::{self, WalkedEntry};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Aggregate counters for one copy operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    /// Directories created
    pub dirs_created: usize,
    /// Regular files whose content was streamed
    pub files_copied: usize,
    /// Destination entries created as hardlinks to already-copied content
    pub hardlinks_created: usize,
    /// Symlinks recreated
    pub symlinks_created: usize,
    /// Entries or attribute sets skipped under the skip policy
    pub skipped: usize,
    /// Total content bytes streamed (hardlink aliases add nothing here)
    pub bytes_copied: u64,
}

impl CopyStats {
    /// Total destination entries materialized
    pub fn entries_created(&self) -> usize {
        self.dirs_created + self.files_copied + self.hardlinks_created + self.symlinks_created
    }
}

/// Events emitted while copying
#[derive(Debug)]
pub enum CopyEvent {
    /// One destination entry was materialized
    EntryCreated {
        kind: EntryKind,
        rel_path: PathBuf,
        bytes_copied: u64,
    },
    /// An entry or attribute set was skipped under the skip policy
    Skipped { rel_path: PathBuf, detail: String },
    /// Copy completed
    Complete { stats: CopyStats },
}

/// Optional callback used to receive copy events
pub type CopyCallback = dyn Fn(&CopyEvent) + Send + Sync;

/// Replicate the tree at `config.source` into `config.destination`.
///
/// The destination root is created if missing; any other path collision
/// inside it surfaces as a write error (entries are never merged over
/// existing ones of a different shape). The walk aborts on the first
/// error with the offending path attached; partial output is left in
/// place, never rolled back.
pub fn copy_dir(config: &Config, on_event: Option<&CopyCallback>) -> Result<CopyStats, ReplikError> {
    let source_root = config.source.as_path();
    let dest_root = config.destination.as_path();

    let mut stats = CopyStats::default();
    let mut inodes = InodeMap::new();
    // One record per directory, in walk order; metadata applied in
    // reverse so children settle first.
    let mut deferred_dirs: Vec<DeferredDir> = Vec::new();

    for walked in walk::walk(source_root) {
        let entry = walked?;
        let dest_path = if entry.rel_path.as_os_str().is_empty() {
            dest_root.to_path_buf()
        } else {
            dest_root.join(&entry.rel_path)
        };

        match entry.meta.kind {
            EntryKind::Directory => {
                create_directory(&entry, &dest_path)?;
                stats.dirs_created += 1;
                deferred_dirs.push(DeferredDir {
                    src_path: entry.path.clone(),
                    dest_path,
                    rel_path: entry.rel_path.clone(),
                    meta: entry.meta.clone(),
                });
                emit(
                    on_event,
                    CopyEvent::EntryCreated {
                        kind: EntryKind::Directory,
                        rel_path: entry.rel_path,
                        bytes_copied: 0,
                    },
                );
            }
            EntryKind::RegularFile => {
                copy_regular_file(config, &entry, &dest_path, &mut inodes, &mut stats, on_event)?;
            }
            EntryKind::Symlink => {
                copy_symlink(config, &entry, &dest_path, &mut stats, on_event)?;
            }
            EntryKind::Other => match config.unsupported {
                UnsupportedPolicy::Fail => {
                    return Err(ReplikError::unsupported(
                        entry.path,
                        "special file (socket, device node, or fifo)",
                    ));
                }
                UnsupportedPolicy::Skip => {
                    stats.skipped += 1;
                    emit(
                        on_event,
                        CopyEvent::Skipped {
                            rel_path: entry.rel_path,
                            detail: "special file (socket, device node, or fifo)".to_string(),
                        },
                    );
                }
            },
        }
    }

    // Deepest directories first: applying a parent's mode or mtime before
    // its children are finalized would be undone (mtime) or could lock us
    // out (read-only modes).
    for dir in deferred_dirs.iter().rev() {
        apply_with_policy(
            config,
            &dir.src_path,
            &dir.dest_path,
            &dir.rel_path,
            &dir.meta,
            &mut stats,
            on_event,
        )?;
    }

    emit(
        on_event,
        CopyEvent::Complete {
            stats: stats.clone(),
        },
    );

    Ok(stats)
}

/// Directory whose metadata application waits until its subtree is built
#[derive(Debug)]
struct DeferredDir {
    src_path: PathBuf,
    dest_path: PathBuf,
    rel_path: PathBuf,
    meta: EntryMeta,
}

fn create_directory(entry: &WalkedEntry, dest_path: &Path) -> Result<(), ReplikError> {
    let result = if entry.rel_path.as_os_str().is_empty() {
        // The destination root itself may legitimately pre-exist (empty).
        fs::create_dir_all(dest_path)
    } else {
        fs::create_dir(dest_path)
    };

    result.map_err(|error| ReplikError::write(dest_path, error))
}

fn copy_regular_file(
    config: &Config,
    entry: &WalkedEntry,
    dest_path: &Path,
    inodes: &mut InodeMap,
    stats: &mut CopyStats,
    on_event: Option<&CopyCallback>,
) -> Result<(), ReplikError> {
    if entry.meta.is_hardlinked_file() {
        if let Some(identity) = entry.meta.identity {
            if let Some(first_dest) = inodes.first_destination(identity) {
                // Content for this identity already exists; alias it
                // instead of inflating the tree with an independent copy.
                fs::hard_link(first_dest, dest_path)
                    .map_err(|error| ReplikError::write(dest_path, error))?;
                stats.hardlinks_created += 1;
                emit(
                    on_event,
                    CopyEvent::EntryCreated {
                        kind: EntryKind::RegularFile,
                        rel_path: entry.rel_path.clone(),
                        bytes_copied: 0,
                    },
                );
                return Ok(());
            }
            inodes.record(identity, dest_path.to_path_buf());
        }
    }

    let bytes_copied = stream_copy(&entry.path, dest_path)?;
    apply_with_policy(
        config,
        &entry.path,
        dest_path,
        &entry.rel_path,
        &entry.meta,
        stats,
        on_event,
    )?;

    stats.files_copied += 1;
    stats.bytes_copied += bytes_copied;
    emit(
        on_event,
        CopyEvent::EntryCreated {
            kind: EntryKind::RegularFile,
            rel_path: entry.rel_path.clone(),
            bytes_copied,
        },
    );

    Ok(())
}

fn copy_symlink(
    config: &Config,
    entry: &WalkedEntry,
    dest_path: &Path,
    stats: &mut CopyStats,
    on_event: Option<&CopyCallback>,
) -> Result<(), ReplikError> {
    let target = entry.meta.symlink_target.as_ref().ok_or_else(|| {
        ReplikError::read(
            &entry.path,
            std::io::Error::other("symlink entry without a target"),
        )
    })?;

    create_symlink(target, dest_path)?;
    apply_with_policy(
        config,
        &entry.path,
        dest_path,
        &entry.rel_path,
        &entry.meta,
        stats,
        on_event,
    )?;

    stats.symlinks_created += 1;
    emit(
        on_event,
        CopyEvent::EntryCreated {
            kind: EntryKind::Symlink,
            rel_path: entry.rel_path.clone(),
            bytes_copied: 0,
        },
    );

    Ok(())
}

/// Apply metadata, routing privilege gaps through the unsupported policy
fn apply_with_policy(
    config: &Config,
    src_path: &Path,
    dest_path: &Path,
    rel_path: &Path,
    entry_meta: &EntryMeta,
    stats: &mut CopyStats,
    on_event: Option<&CopyCallback>,
) -> Result<(), ReplikError> {
    match apply_metadata(src_path, dest_path, entry_meta) {
        Ok(()) => Ok(()),
        Err(error) if error.is_unsupported() && config.unsupported == UnsupportedPolicy::Skip => {
            stats.skipped += 1;
            emit(
                on_event,
                CopyEvent::Skipped {
                    rel_path: rel_path.to_path_buf(),
                    detail: error.to_string(),
                },
            );
            Ok(())
        }
        Err(error) => Err(error),
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link_path: &Path) -> Result<(), ReplikError> {
    std::os::unix::fs::symlink(target, link_path)
        .map_err(|error| ReplikError::write(link_path, error))
}

#[cfg(windows)]
fn create_symlink(target: &Path, link_path: &Path) -> Result<(), ReplikError> {
    use std::os::windows::fs::{symlink_dir, symlink_file};

    match symlink_file(target, link_path) {
        Ok(()) => Ok(()),
        Err(file_err) => match symlink_dir(target, link_path) {
            Ok(()) => Ok(()),
            Err(_) => Err(ReplikError::write(link_path, file_err)),
        },
    }
}

fn emit(on_event: Option<&CopyCallback>, event: CopyEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
