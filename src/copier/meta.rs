//! Metadata application
//!
//! Every operation in this module acts on the destination entry itself and
//! never follows it when it is a symlink. A symlink in the destination may
//! alias another path in the same tree; following it here would redirect a
//! metadata write onto the aliased file.

use crate::types::{EntryKind, EntryMeta, ReplikError};
use std::io::ErrorKind;
use std::path::Path;

/// Apply mode bits, ownership, extended attributes and modification time
/// from a source entry onto its destination counterpart.
///
/// `src` is re-read for extended attributes; everything else comes from the
/// `meta` snapshot. Privilege failures (chown, privileged xattr namespaces)
/// surface as `ReplikError::Unsupported` so the caller can route them
/// through its unsupported-entry policy.
pub fn apply_metadata(src: &Path, dest: &Path, meta: &EntryMeta) -> Result<(), ReplikError> {
    // chown clears setuid/setgid bits, so ownership must land before the
    // mode bits do.
    set_ownership(dest, meta)?;

    // No lchmod on Linux: mode bits on the link itself are not settable,
    // and fs::set_permissions would follow the link.
    if meta.kind != EntryKind::Symlink {
        set_mode(dest, meta.mode)?;
    }

    copy_xattrs(src, dest)?;
    set_times(dest, meta)
}

#[cfg(unix)]
fn set_mode(dest: &Path, mode: u32) -> Result<(), ReplikError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(dest, std::fs::Permissions::from_mode(mode))
        .map_err(|error| ReplikError::metadata(dest, error))
}

#[cfg(not(unix))]
fn set_mode(_dest: &Path, _mode: u32) -> Result<(), ReplikError> {
    Ok(())
}

#[cfg(unix)]
fn set_ownership(dest: &Path, meta: &EntryMeta) -> Result<(), ReplikError> {
    use rustix::fs::{chownat, AtFlags, CWD};

    let owner = Some(uid_from_raw(meta.uid));
    let group = Some(gid_from_raw(meta.gid));

    chownat(CWD, dest, owner, group, AtFlags::SYMLINK_NOFOLLOW).map_err(|errno| {
        let error = std::io::Error::from(errno);
        if error.kind() == ErrorKind::PermissionDenied {
            ReplikError::unsupported(
                dest,
                format!(
                    "changing ownership to {}:{} requires elevated privilege",
                    meta.uid, meta.gid
                ),
            )
        } else {
            ReplikError::metadata(dest, error)
        }
    })
}

#[cfg(not(unix))]
fn set_ownership(_dest: &Path, _meta: &EntryMeta) -> Result<(), ReplikError> {
    Ok(())
}

#[cfg(unix)]
fn uid_from_raw(raw: rustix::process::RawUid) -> rustix::fs::Uid {
    rustix::fs::Uid::from_raw(raw)
}

#[cfg(unix)]
fn gid_from_raw(raw: rustix::process::RawGid) -> rustix::fs::Gid {
    rustix::fs::Gid::from_raw(raw)
}

/// Copy every extended attribute from `src` to `dest`.
///
/// Uses the no-follow xattr calls throughout (`lgetxattr`/`lsetxattr`
/// semantics). A filesystem without xattr support on the source side means
/// there is nothing to copy; on the destination side, or a namespace the
/// process may not write (EPERM), it is an unsupported attribute class.
#[cfg(unix)]
fn copy_xattrs(src: &Path, dest: &Path) -> Result<(), ReplikError> {
    let names = match xattr::list(src) {
        Ok(names) => names,
        Err(error) if error.kind() == ErrorKind::Unsupported => return Ok(()),
        Err(error) => return Err(ReplikError::read(src, error)),
    };

    for name in names {
        let value = match xattr::get(src, &name) {
            Ok(Some(value)) => value,
            Ok(None) => continue, // attribute vanished between list and get
            Err(error) => return Err(ReplikError::read(src, error)),
        };

        match xattr::set(dest, &name, &value) {
            Ok(()) => {}
            Err(error)
                if error.kind() == ErrorKind::PermissionDenied
                    || error.kind() == ErrorKind::Unsupported =>
            {
                return Err(ReplikError::unsupported(
                    dest,
                    format!(
                        "cannot write extended attribute {:?} ({})",
                        name,
                        error.kind()
                    ),
                ));
            }
            Err(error) => return Err(ReplikError::metadata(dest, error)),
        }
    }

    Ok(())
}

#[cfg(not(unix))]
fn copy_xattrs(_src: &Path, _dest: &Path) -> Result<(), ReplikError> {
    Ok(())
}

fn set_times(dest: &Path, meta: &EntryMeta) -> Result<(), ReplikError> {
    let result = if meta.kind == EntryKind::Symlink {
        filetime::set_symlink_file_times(dest, meta.mtime, meta.mtime)
    } else {
        filetime::set_file_mtime(dest, meta.mtime)
    };

    result.map_err(|error| ReplikError::metadata(dest, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::read_meta;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[cfg(unix)]
    fn test_applies_mode_and_mtime() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("src.txt");
        let dest = temp.path().join("dest.txt");
        fs::write(&src, b"payload").expect("write src");
        fs::write(&dest, b"payload").expect("write dest");

        fs::set_permissions(&src, fs::Permissions::from_mode(0o604)).expect("chmod src");
        let past = filetime::FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&src, past).expect("set src mtime");

        let meta = read_meta(&src).expect("read src meta");
        apply_metadata(&src, &dest, &meta).expect("apply metadata");

        let applied = read_meta(&dest).expect("read dest meta");
        assert_eq!(applied.permissions(), 0o604);
        assert_eq!(applied.mtime, past);
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_metadata_does_not_touch_target() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("create temp dir");
        let target = temp.path().join("target.txt");
        fs::write(&target, b"guarded").expect("write target");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).expect("chmod target");
        let target_mtime = filetime::FileTime::from_unix_time(1_400_000_000, 0);
        filetime::set_file_mtime(&target, target_mtime).expect("set target mtime");

        let src_link = temp.path().join("src-link");
        let dest_link = temp.path().join("dest-link");
        std::os::unix::fs::symlink("target.txt", &src_link).expect("create src link");
        std::os::unix::fs::symlink("target.txt", &dest_link).expect("create dest link");

        let meta = read_meta(&src_link).expect("read link meta");
        apply_metadata(&src_link, &dest_link, &meta).expect("apply metadata");

        let target_after = read_meta(&target).expect("read target meta");
        assert_eq!(target_after.permissions(), 0o640);
        assert_eq!(target_after.mtime, target_mtime);
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_mtime_set_on_the_link() {
        let temp = TempDir::new().expect("create temp dir");
        let src_link = temp.path().join("src-link");
        let dest_link = temp.path().join("dest-link");
        std::os::unix::fs::symlink("missing", &src_link).expect("create src link");
        std::os::unix::fs::symlink("missing", &dest_link).expect("create dest link");

        let stamp = filetime::FileTime::from_unix_time(1_300_000_000, 0);
        filetime::set_symlink_file_times(&src_link, stamp, stamp).expect("stamp src link");

        let meta = read_meta(&src_link).expect("read link meta");
        apply_metadata(&src_link, &dest_link, &meta).expect("apply metadata");

        let applied = read_meta(&dest_link).expect("read dest link meta");
        assert_eq!(applied.mtime, stamp);
    }
}
