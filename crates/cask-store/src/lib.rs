//! Content-addressed storage for cask.
//!
//! A [`DataStore`] owns two keyed stores:
//!
//! - [`ContentDb`] -- payloads keyed by the digest of their bytes; adding the
//!   same bytes twice stores them once.
//! - [`PointerDb`] -- caller-chosen names bound to content identifiers; a
//!   binding can be replaced.
//!
//! Both implement [`KeyedStore`] (get / remove / find / contains) over a
//! pluggable [`Backend`]:
//!
//! - [`InMemoryBackend`] -- `HashMap` behind a `RwLock`, for tests and embedding
//! - [`FileBackend`] -- one file per entry under the store root
//!
//! # Design Rules
//!
//! 1. Every key is validated before a backend sees it; a malformed key never
//!    causes a write.
//! 2. Content entries are never overwritten: the first payload stored under
//!    an identifier wins.
//! 3. Writes and prefix scans on one database are mutually exclusive; the two
//!    databases lock independently.
//! 4. "Not found" is `Ok(None)`, never an error.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod content;
pub mod datastore;
pub mod error;
pub mod file;
pub mod memory;
pub mod pointer;
pub mod provision;
pub mod traits;

pub use config::{resolve_root, BackendKind, StoreConfig, ENV_ALGORITHM, ENV_DIR};
pub use content::ContentDb;
pub use datastore::{DataStore, Database};
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use pointer::PointerDb;
pub use provision::{provision, StoreLayout};
pub use traits::{Backend, KeyedStore};
