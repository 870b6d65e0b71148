//! Streaming file content copy

use crate::types::ReplikError;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

/// Copy buffer size. Bounded regardless of file size.
const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Stream-copy file content from `src` to a newly created file at `dest`.
///
/// The destination must not exist yet: an existing entry at `dest` is a
/// path collision and surfaces as a write error instead of being silently
/// replaced. Content moves through a fixed 128KB buffer with a 64-bit byte
/// counter, so files past the 4 GiB boundary copy without truncation or
/// counter wrap-around.
///
/// Returns the number of bytes copied.
pub fn stream_copy(src: &Path, dest: &Path) -> Result<u64, ReplikError> {
    let mut src_file = File::open(src).map_err(|error| ReplikError::read(src, error))?;
    let mut dest_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|error| ReplikError::write(dest, error))?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file
            .read(&mut buffer)
            .map_err(|error| ReplikError::read(src, error))?;

        if bytes_read == 0 {
            break; // EOF
        }

        dest_file
            .write_all(&buffer[0..bytes_read])
            .map_err(|error| ReplikError::write(dest, error))?;
        total_bytes += bytes_read as u64;
    }

    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copies_exact_bytes() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("src.bin");
        let dest = temp.path().join("dest.bin");

        let content: Vec<u8> = (0..COPY_BUFFER_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &content).expect("write source");

        let copied = stream_copy(&src, &dest).expect("stream copy");

        assert_eq!(copied, content.len() as u64);
        assert_eq!(fs::read(&dest).expect("read dest"), content);
    }

    #[test]
    fn test_copies_empty_file() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("empty");
        let dest = temp.path().join("empty-copy");
        fs::write(&src, b"").expect("write source");

        let copied = stream_copy(&src, &dest).expect("stream copy");

        assert_eq!(copied, 0);
        assert!(dest.exists());
    }

    #[test]
    fn test_refuses_existing_destination() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::write(&src, b"new").expect("write source");
        fs::write(&dest, b"old").expect("write pre-existing dest");

        let error = stream_copy(&src, &dest).expect_err("copy should fail");

        assert_eq!(error.path(), Some(dest.as_path()));
        assert_eq!(fs::read(&dest).expect("read dest"), b"old");
    }

    #[test]
    fn test_missing_source_names_the_path() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("vanished");
        let dest = temp.path().join("dest");

        let error = stream_copy(&src, &dest).expect_err("copy should fail");

        assert_eq!(error.path(), Some(src.as_path()));
        assert!(!dest.exists());
    }
}
