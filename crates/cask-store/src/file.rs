//! Filesystem backend: one file per entry.
//!
//! Layout of a backend directory:
//!
//! ```text
//! <dir>/
//!     1234abcd...   # file name = identifier, contents = stored value
//!     4567cdef...
//! ```
//!
//! Values are written to a temporary file in the same directory and renamed
//! into place, so a reader never sees a partially written entry. Durable
//! ordering across a crash (fsync of the directory) is not guaranteed.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use cask_types::{is_valid_format, Identifier};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::Backend;

/// Mode of content files: read-only for the owner. Content never changes.
pub const CONTENT_FILE_MODE: u32 = 0o400;

/// Mode of pointer files: read/write for the owner.
pub const POINTER_FILE_MODE: u32 = 0o600;

/// Backend storing each entry as a file named by its identifier.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    file_mode: u32,
    // Serializes writers against each other and against directory scans.
    lock: RwLock<()>,
}

impl FileBackend {
    /// Open a backend over an existing directory.
    ///
    /// `file_mode` is applied to every file this backend creates (unix only).
    /// Fails with `StoreError::Initialization` if `dir` is missing or is not a
    /// directory.
    pub fn open(dir: impl Into<PathBuf>, file_mode: u32) -> StoreResult<Self> {
        let dir = dir.into();
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(StoreError::Initialization {
                    path: dir,
                    reason: "not a directory".into(),
                })
            }
            Err(e) => {
                return Err(StoreError::Initialization {
                    path: dir,
                    reason: e.to_string(),
                })
            }
        }
        Ok(Self {
            dir,
            file_mode,
            lock: RwLock::new(()),
        })
    }

    /// The directory this backend stores entries in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, id: &Identifier) -> PathBuf {
        self.dir.join(id.as_str())
    }

    fn read_unlocked(&self, id: &Identifier) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.entry_path(id)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn exists_unlocked(&self, id: &Identifier) -> StoreResult<bool> {
        match fs::metadata(self.entry_path(id)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn write_unlocked(&self, id: &Identifier, value: &[u8]) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        set_mode(tmp.as_file(), self.file_mode)?;
        tmp.persist(self.entry_path(id)).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Backend for FileBackend {
    fn read(&self, id: &Identifier) -> StoreResult<Option<Vec<u8>>> {
        let _guard = self.lock.read().map_err(StoreError::poisoned)?;
        self.read_unlocked(id)
    }

    fn insert_if_absent(&self, id: &Identifier, value: &[u8]) -> StoreResult<bool> {
        let _guard = self.lock.write().map_err(StoreError::poisoned)?;
        if self.exists_unlocked(id)? {
            return Ok(false);
        }
        self.write_unlocked(id, value)?;
        Ok(true)
    }

    fn replace(&self, id: &Identifier, value: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let _guard = self.lock.write().map_err(StoreError::poisoned)?;
        let previous = self.read_unlocked(id)?;
        self.write_unlocked(id, value)?;
        Ok(previous)
    }

    fn delete(&self, id: &Identifier) -> StoreResult<Option<Vec<u8>>> {
        let _guard = self.lock.write().map_err(StoreError::poisoned)?;
        let previous = self.read_unlocked(id)?;
        if previous.is_some() {
            fs::remove_file(self.entry_path(id))?;
        }
        Ok(previous)
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<HashSet<Identifier>> {
        let _guard = self.lock.read().map_err(StoreError::poisoned)?;
        let mut keys = HashSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                debug!(dir = %self.dir.display(), "skipping non-UTF-8 file name");
                continue;
            };
            if !is_valid_format(name) {
                debug!(file = name, "skipping file that is not an entry");
                continue;
            }
            if name.starts_with(prefix) && entry.file_type()?.is_file() {
                keys.insert(Identifier::parse(name)?);
            }
        }
        Ok(keys)
    }

    fn contains(&self, id: &Identifier) -> StoreResult<bool> {
        let _guard = self.lock.read().map_err(StoreError::poisoned)?;
        self.exists_unlocked(id)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}
