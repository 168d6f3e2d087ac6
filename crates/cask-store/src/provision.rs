//! On-disk layout of a file-backed data store.
//!
//! ```text
//! <root>/            0o700
//!     content_db/    0o700   one file per content entry
//!     pointer_db/    0o700   one file per pointer entry
//! ```

use std::fs::{self, DirBuilder};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Name of the content database directory under the root.
pub const CONTENT_DIR: &str = "content_db";

/// Name of the pointer database directory under the root.
pub const POINTER_DIR: &str = "pointer_db";

/// Mode of every provisioned directory: owner read/write/execute only.
pub const DIR_MODE: u32 = 0o700;

/// Resolved paths of a provisioned store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreLayout {
    pub root: PathBuf,
    pub content_dir: PathBuf,
    pub pointer_dir: PathBuf,
}

impl StoreLayout {
    /// The layout under `root`, without touching the filesystem.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            content_dir: root.join(CONTENT_DIR),
            pointer_dir: root.join(POINTER_DIR),
            root,
        }
    }
}

/// Create the root, `content_db` and `pointer_db` directories when absent,
/// then check that each one is a directory.
///
/// Existing directories keep their permissions. Fails with
/// `StoreError::Initialization` naming the first path that cannot be created
/// or is not a directory.
pub fn provision(root: impl AsRef<Path>) -> StoreResult<StoreLayout> {
    let layout = StoreLayout::under(root.as_ref());
    for dir in [&layout.root, &layout.content_dir, &layout.pointer_dir] {
        ensure_dir(dir)?;
    }
    debug!(root = %layout.root.display(), "store layout provisioned");
    Ok(layout)
}

fn ensure_dir(path: &Path) -> StoreResult<()> {
    if !path.exists() {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        set_dir_mode(&mut builder);
        builder.create(path).map_err(|e| StoreError::Initialization {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(StoreError::Initialization {
            path: path.to_path_buf(),
            reason: "not a directory".into(),
        }),
        Err(e) => Err(StoreError::Initialization {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(unix)]
fn set_dir_mode(builder: &mut DirBuilder) {
    use std::os::unix::fs::DirBuilderExt;
    builder.mode(DIR_MODE);
}

#[cfg(not(unix))]
fn set_dir_mode(_builder: &mut DirBuilder) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_all_three_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("store");
        let layout = provision(&root).unwrap();
        assert_eq!(layout.root, root);
        assert!(layout.content_dir.is_dir());
        assert!(layout.pointer_dir.is_dir());
        assert_eq!(layout.content_dir, root.join("content_db"));
        assert_eq!(layout.pointer_dir, root.join("pointer_db"));
    }

    #[test]
    fn provisioning_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let first = provision(tmp.path()).unwrap();
        let second = provision(tmp.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn file_in_place_of_subdirectory_fails() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(POINTER_DIR), b"oops").unwrap();
        let err = provision(tmp.path()).unwrap_err();
        match err {
            StoreError::Initialization { path, .. } => {
                assert_eq!(path, tmp.path().join(POINTER_DIR));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_as_root_fails() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("plain-file");
        fs::write(&root, b"").unwrap();
        assert!(matches!(
            provision(&root),
            Err(StoreError::Initialization { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn new_directories_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let layout = provision(tmp.path().join("fresh")).unwrap();
        for dir in [&layout.root, &layout.content_dir, &layout.pointer_dir] {
            let mode = fs::metadata(dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, DIR_MODE, "{}", dir.display());
        }
    }
}
