//! File access helpers shared by the persistence adapter.
//!
//! Reads hold a shared advisory lock for the duration of the call. Writes go
//! to a temp file in the target's directory, are fsynced, and then renamed
//! over the target so readers never observe a half-written file.

use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Open `path` under a shared lock and hand the file to `f`.
///
/// Returns `Ok(None)` if the file does not exist. The lock is released when
/// `f` returns, or when the handle is dropped on an error path.
pub(crate) fn with_shared<T, F>(path: &Path, f: F) -> Result<Option<T>>
where
    F: FnOnce(&File) -> Result<T>,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let value = f(&file)?;
    file.unlock()?;

    Ok(Some(value))
}

/// Read a whole file under a shared lock. `Ok(None)` if it does not exist.
pub(crate) fn read_to_string_shared(path: &Path) -> Result<Option<String>> {
    with_shared(path, |file| {
        let mut contents = String::new();
        std::io::BufReader::new(file).read_to_string(&mut contents)?;
        Ok(contents)
    })
}

/// Create an empty file unless one already exists.
///
/// Returns `true` if this call created it.
pub(crate) fn create_empty(path: &Path) -> Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Replace the contents of `path` with whatever `write` produces.
///
/// Atomically writes by:
/// 1. Writing to a temp file in the same directory
/// 2. Syncing to disk
/// 3. Renaming over the original
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(parent)?;

    // Serialize concurrent writers on the temp file
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
