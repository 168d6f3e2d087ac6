use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cask_crypto::{ContentHasher, DigestAlgorithm};
use cask_types::Identifier;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{BackendKind, StoreConfig};
use crate::content::ContentDb;
use crate::error::{StoreError, StoreResult};
use crate::file::{FileBackend, CONTENT_FILE_MODE, POINTER_FILE_MODE};
use crate::memory::InMemoryBackend;
use crate::pointer::PointerDb;
use crate::provision::provision;
use crate::traits::KeyedStore;

/// Selects one of the two databases of a [`DataStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Content,
    Pointer,
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Content => "content",
            Self::Pointer => "pointer",
        })
    }
}

impl FromStr for Database {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "pointer" => Ok(Self::Pointer),
            other => Err(StoreError::Config(format!("unknown database {other:?}"))),
        }
    }
}

/// One content database and one pointer database under one lifecycle.
///
/// A `DataStore` is an owned value: open it once and pass it by reference
/// (or in an `Arc`) to whoever needs it. Both databases are locked
/// independently. Dropping the store releases everything; there is no close
/// protocol.
pub struct DataStore {
    backend: BackendKind,
    root: Option<PathBuf>,
    content: ContentDb,
    pointers: PointerDb,
}

impl DataStore {
    /// A fresh, empty, memory-backed store using SHA-256.
    pub fn in_memory() -> Self {
        Self::in_memory_with(ContentHasher::default())
    }

    /// A fresh, empty, memory-backed store using `hasher`.
    pub fn in_memory_with(hasher: ContentHasher) -> Self {
        Self {
            backend: BackendKind::Memory,
            root: None,
            content: ContentDb::new(Box::new(InMemoryBackend::new()), hasher),
            pointers: PointerDb::in_memory(),
        }
    }

    /// Open (provisioning if needed) a file-backed store at `root` using
    /// SHA-256.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(&StoreConfig::with_root(root.as_ref()))
    }

    /// Open a store as described by `config`.
    ///
    /// For the file backend this provisions `root`, `root/content_db` and
    /// `root/pointer_db` and fails with `StoreError::Initialization` if any
    /// of them cannot be created or is not a directory. No partially opened
    /// store is ever returned.
    pub fn open_with(config: &StoreConfig) -> StoreResult<Self> {
        let hasher = ContentHasher::new(config.algorithm);
        let store = match config.backend {
            BackendKind::Memory => Self::in_memory_with(hasher),
            BackendKind::File => {
                let layout = provision(&config.root)?;
                let content = FileBackend::open(&layout.content_dir, CONTENT_FILE_MODE)?;
                let pointers = FileBackend::open(&layout.pointer_dir, POINTER_FILE_MODE)?;
                Self {
                    backend: BackendKind::File,
                    root: Some(layout.root),
                    content: ContentDb::new(Box::new(content), hasher),
                    pointers: PointerDb::new(Box::new(pointers)),
                }
            }
        };
        info!(
            backend = %config.backend,
            algorithm = %config.algorithm,
            root = ?store.root,
            "data store opened"
        );
        Ok(store)
    }

    /// The content database.
    pub fn content_db(&self) -> &ContentDb {
        &self.content
    }

    /// The pointer database.
    pub fn pointer_db(&self) -> &PointerDb {
        &self.pointers
    }

    /// The selected database as a [`KeyedStore`].
    pub fn database(&self, db: Database) -> &dyn KeyedStore {
        match db {
            Database::Content => &self.content,
            Database::Pointer => &self.pointers,
        }
    }

    /// Which backend both databases use.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Root directory, for file-backed stores.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Digest algorithm of the content database.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.content.hasher().algorithm()
    }

    /// Identifiers starting with `prefix` in either database, sorted and
    /// without duplicates.
    pub fn find(&self, prefix: &str) -> StoreResult<BTreeSet<Identifier>> {
        let mut all: BTreeSet<Identifier> = self.content.find(prefix)?.into_iter().collect();
        all.extend(self.pointers.find(prefix)?);
        Ok(all)
    }

    /// Expand a short prefix into the one identifier in `db` it denotes.
    ///
    /// A full-length identifier is returned as is, whether stored or not.
    /// Fails with `NotFound` when nothing matches and `Ambiguous` when more
    /// than one identifier does.
    pub fn expand(&self, db: Database, partial: &str) -> StoreResult<Identifier> {
        if let Ok(id) = Identifier::parse(partial) {
            return Ok(id);
        }
        let matches = self.database(db).find(partial)?;
        let mut iter = matches.into_iter();
        match (iter.next(), iter.next()) {
            (Some(id), None) => Ok(id),
            (None, _) => Err(StoreError::NotFound {
                prefix: partial.to_string(),
            }),
            (Some(_), Some(_)) => Err(StoreError::Ambiguous {
                prefix: partial.to_string(),
                matches: 2 + iter.count(),
            }),
        }
    }

    /// Follow `pointer` into the content database.
    ///
    /// `None` when the pointer is unbound or its content has been removed.
    pub fn fetch(&self, pointer: &str) -> StoreResult<Option<Vec<u8>>> {
        match self.pointers.resolve(pointer)? {
            Some(content) => self.content.get(content.as_str()),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("backend", &self.backend)
            .field("root", &self.root)
            .field("content", &self.content)
            .field("pointers", &self.pointers)
            .finish()
    }
}
