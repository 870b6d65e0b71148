//! Declarative fixture builder shared by the integration tests.
//!
//! Synthesizes a real directory tree from a list of operations, so each
//! test states its tree instead of hand-rolling filesystem calls.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One fixture operation
#[derive(Debug, Clone)]
pub enum FixtureOp {
    CreateDir {
        path: String,
        mode: u32,
    },
    CreateFile {
        path: String,
        content: Vec<u8>,
        mode: u32,
    },
    Hardlink {
        original: String,
        link: String,
    },
    Symlink {
        target: String,
        link: String,
    },
    /// Deterministic pseudo-random content of the given size
    RandomFile {
        path: String,
        seed: u64,
        size: u64,
        mode: u32,
    },
}

pub fn dir(path: &str, mode: u32) -> FixtureOp {
    FixtureOp::CreateDir {
        path: path.to_string(),
        mode,
    }
}

pub fn file(path: &str, content: &[u8], mode: u32) -> FixtureOp {
    FixtureOp::CreateFile {
        path: path.to_string(),
        content: content.to_vec(),
        mode,
    }
}

pub fn hardlink(original: &str, link: &str) -> FixtureOp {
    FixtureOp::Hardlink {
        original: original.to_string(),
        link: link.to_string(),
    }
}

pub fn symlink(target: &str, link: &str) -> FixtureOp {
    FixtureOp::Symlink {
        target: target.to_string(),
        link: link.to_string(),
    }
}

pub fn random_file(path: &str, seed: u64, size: u64, mode: u32) -> FixtureOp {
    FixtureOp::RandomFile {
        path: path.to_string(),
        seed,
        size,
        mode,
    }
}

/// Apply the operations, in order, onto `root`
pub fn apply(root: &Path, ops: &[FixtureOp]) {
    for op in ops {
        match op {
            FixtureOp::CreateDir { path, mode } => {
                let full = join(root, path);
                fs::create_dir_all(&full).expect("fixture: create dir");
                set_mode(&full, *mode);
            }
            FixtureOp::CreateFile {
                path,
                content,
                mode,
            } => {
                let full = join(root, path);
                fs::write(&full, content).expect("fixture: write file");
                set_mode(&full, *mode);
            }
            FixtureOp::Hardlink { original, link } => {
                fs::hard_link(join(root, original), join(root, link))
                    .expect("fixture: create hardlink");
            }
            FixtureOp::Symlink { target, link } => {
                #[cfg(unix)]
                std::os::unix::fs::symlink(target, join(root, link))
                    .expect("fixture: create symlink");

                #[cfg(not(unix))]
                let _ = (target, link);
            }
            FixtureOp::RandomFile {
                path,
                seed,
                size,
                mode,
            } => {
                let full = join(root, path);
                write_random(&full, *seed, *size);
                set_mode(&full, *mode);
            }
        }
    }
}

fn join(root: &Path, rel: &str) -> PathBuf {
    root.join(rel.trim_start_matches('/'))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("fixture: set mode");
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) {}

/// Seeded linear congruential generator, chunked writes so large fixture
/// files never sit in memory whole
fn write_random(path: &Path, seed: u64, size: u64) {
    let mut out = fs::File::create(path).expect("fixture: create random file");
    let mut state = seed;
    let mut remaining = size;
    let mut chunk = vec![0u8; 64 * 1024];

    while remaining > 0 {
        let len = chunk.len().min(remaining as usize);
        for byte in chunk[..len].iter_mut() {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            *byte = (state >> 33) as u8;
        }
        out.write_all(&chunk[..len]).expect("fixture: write random chunk");
        remaining -= len as u64;
    }

    out.flush().expect("fixture: flush random file");
}

/// Set an extended attribute on a fixture entry, or return false when the
/// filesystem does not support user xattrs (test should then skip).
#[cfg(unix)]
pub fn try_set_xattr(path: &Path, name: &str, value: &[u8]) -> bool {
    match xattr::set(path, name, value) {
        Ok(()) => true,
        Err(error)
            if error.kind() == std::io::ErrorKind::Unsupported
                || error.kind() == std::io::ErrorKind::PermissionDenied =>
        {
            false
        }
        Err(error) => panic!("fixture: set xattr: {error}"),
    }
}

/// Normalize every mtime under `root` (dirs, files, symlinks) to `stamp`,
/// deepest entries first so parent directory times stick
pub fn stamp_all(root: &Path, stamp: filetime::FileTime) {
    fn visit(path: &Path, stamp: filetime::FileTime) {
        let meta = fs::symlink_metadata(path).expect("stamp: lstat");
        if meta.is_dir() {
            for entry in fs::read_dir(path).expect("stamp: read dir") {
                visit(&entry.expect("stamp: dir entry").path(), stamp);
            }
        }
        if meta.file_type().is_symlink() {
            filetime::set_symlink_file_times(path, stamp, stamp).expect("stamp: link times");
        } else {
            filetime::set_file_mtime(path, stamp).expect("stamp: mtime");
        }
    }

    visit(root, stamp);
}

/// Assert that two trees compare as identical, printing the report if not
pub fn assert_identical(left: &Path, right: &Path) {
    let report = replik::compare_dirs(
        left,
        right,
        replik::CompareOptions {
            report_all: true,
            check_times: false,
        },
    )
    .expect("compare should succeed");

    assert!(
        report.is_identical(),
        "trees differ:\n{}",
        report
            .iter()
            .map(|d| format!("  {d}"))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
