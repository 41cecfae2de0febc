//! Byte-for-byte comparison of shelved file contents.

use super::error::CompareResult;
use crate::vcs::{PendingChange, VersionControl};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tempfile::NamedTempFile;

/// Compare two files byte by byte.
///
/// Stops at the first differing byte, or as soon as one file ends before
/// the other. Identical paths are equal without being opened.
pub fn files_equal(first: &Path, second: &Path) -> io::Result<bool> {
    if first == second {
        return Ok(true);
    }

    let mut first = BufReader::new(File::open(first)?).bytes();
    let mut second = BufReader::new(File::open(second)?).bytes();

    loop {
        match (first.next().transpose()?, second.next().transpose()?) {
            (None, None) => return Ok(true),
            (Some(a), Some(b)) if a == b => continue,
            _ => return Ok(false),
        }
    }
}

/// Whether two pending changes carry identical shelved content.
///
/// A pending delete is never content-equal to anything, including another
/// delete of the same item. Both sides are downloaded to temporary files
/// which are removed when this function returns, on every path.
pub fn shelved_contents_equal<B: VersionControl + ?Sized>(
    backend: &B,
    first: &PendingChange,
    second: &PendingChange,
) -> CompareResult<bool> {
    if first.is_delete() || second.is_delete() {
        return Ok(false);
    }

    let first_file = NamedTempFile::new()?;
    backend.download_shelved_file(first, first_file.path())?;

    let second_file = NamedTempFile::new()?;
    backend.download_shelved_file(second, second_file.path())?;

    let same = files_equal(first_file.path(), second_file.path())?;
    tracing::trace!(
        first = %first.server_path(),
        second = %second.server_path(),
        same,
        "compared shelved content"
    );

    release(first_file);
    release(second_file);
    Ok(same)
}

fn release(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        tracing::debug!(path = %path.display(), error = %e, "failed to remove temp file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::memory::MemoryBackend;
    use crate::vcs::ChangeType;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_identical_files() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"hello world");
        let b = write(&dir, "b", b"hello world");
        assert!(files_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_last_byte_differs() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"hello world");
        let b = write(&dir, "b", b"hello worle");
        assert!(!files_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_different_lengths() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"hello");
        let b = write(&dir, "b", b"hello world");
        assert!(!files_equal(&a, &b).unwrap());
        assert!(!files_equal(&b, &a).unwrap());
    }

    #[test]
    fn test_empty_files_are_equal() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"");
        let b = write(&dir, "b", b"");
        assert!(files_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_same_path_is_not_opened() {
        let missing = Path::new("/definitely/not/here");
        assert!(files_equal(missing, missing).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"x");
        assert!(files_equal(&a, &dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_shelved_contents() {
        let mut backend = MemoryBackend::new("alice");
        let a = backend.change(1, "$/p/a.cs", ChangeType::Edit, b"X");
        let same = backend.change(1, "$/p/a.cs", ChangeType::Edit, b"X");
        let other = backend.change(1, "$/p/a.cs", ChangeType::Edit, b"Y");

        assert!(shelved_contents_equal(&backend, &a, &same).unwrap());
        assert!(!shelved_contents_equal(&backend, &a, &other).unwrap());
        assert_eq!(backend.downloads.get(), 4);
    }

    #[test]
    fn test_temp_files_removed_on_success_and_failure() {
        let mut backend = MemoryBackend::new("alice");
        let a = backend.change(1, "$/p/a.cs", ChangeType::Edit, b"X");
        let b = backend.change(1, "$/p/a.cs", ChangeType::Edit, b"X");

        assert!(shelved_contents_equal(&backend, &a, &b).unwrap());
        backend.fail_download = Some(4);
        assert!(shelved_contents_equal(&backend, &a, &b).is_err());

        let destinations = backend.destinations.borrow();
        assert_eq!(destinations.len(), 4);
        for path in destinations.iter() {
            assert!(!path.exists(), "{} was left behind", path.display());
        }
    }

    #[test]
    fn test_deletes_never_match() {
        let mut backend = MemoryBackend::new("alice");
        let first = backend.change(1, "$/p/a.cs", ChangeType::Delete, b"");
        let second = backend.change(1, "$/p/a.cs", ChangeType::Delete, b"");
        let edit = backend.change(1, "$/p/a.cs", ChangeType::Edit, b"X");

        assert!(!shelved_contents_equal(&backend, &first, &second).unwrap());
        assert!(!shelved_contents_equal(&backend, &edit, &second).unwrap());
        assert_eq!(backend.downloads.get(), 0);
    }
}
