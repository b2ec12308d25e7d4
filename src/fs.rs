//! Filesystem access behind a trait so the pipeline can run against an
//! in-memory tree in tests.
//!
//! Reads and writes made by the scanner and the report sink go through
//! [`read_with_retry`] / [`write_with_retry`], which retry transient failures
//! a fixed number of times before giving up.

use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Attempts made for one read or write before the error is surfaced.
pub const IO_ATTEMPTS: usize = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// Trait for filesystem operations, enabling dependency injection and testing.
pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write content to a file, creating it if it doesn't exist.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if a path (file or directory) exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation using std::fs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

pub fn default_fs() -> &'static RealFs {
    static INSTANCE: RealFs = RealFs;
    &INSTANCE
}

/// Errors that will not go away by trying again.
fn is_permanent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::InvalidData
            | io::ErrorKind::IsADirectory
    )
}

fn retry<T>(path: &Path, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < IO_ATTEMPTS && !is_permanent(&err) => {
                tracing::debug!(path = %path.display(), attempt, error = %err, "retrying I/O");
                thread::sleep(RETRY_BACKOFF * attempt as u32);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

pub fn read_with_retry(fs: &dyn FileSystem, path: &Path) -> io::Result<String> {
    retry(path, || fs.read_to_string(path))
}

pub fn write_with_retry(fs: &dyn FileSystem, path: &Path, content: &str) -> io::Result<()> {
    retry(path, || fs.write(path, content))
}
