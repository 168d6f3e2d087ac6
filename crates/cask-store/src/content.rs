use std::fmt;

use cask_crypto::ContentHasher;
use cask_types::Identifier;
use tracing::debug;

use crate::error::StoreResult;
use crate::memory::InMemoryBackend;
use crate::traits::{sealed, Backend, KeyedStore};

/// Content database: payloads keyed by the digest of their own bytes.
///
/// Every entry satisfies `id == hash(payload)`. Because an entry is written
/// only when its key is absent, a payload is stored at most once and the
/// first value stored under a key is never overwritten.
pub struct ContentDb {
    backend: Box<dyn Backend>,
    hasher: ContentHasher,
}

impl ContentDb {
    /// Wrap a backend, deriving identifiers with `hasher`.
    pub fn new(backend: Box<dyn Backend>, hasher: ContentHasher) -> Self {
        Self { backend, hasher }
    }

    /// An empty memory-backed content database using SHA-256.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryBackend::new()), ContentHasher::default())
    }

    /// Store `payload` and return its identifier.
    ///
    /// Idempotent: adding the same bytes again writes nothing and returns the
    /// same identifier. Any payload is accepted, including the empty one.
    pub fn add(&self, payload: &[u8]) -> StoreResult<Identifier> {
        let id = self.hasher.hash(payload);
        let written = self.backend.insert_if_absent(&id, payload)?;
        debug!(
            id = %id.short(),
            bytes = payload.len(),
            deduplicated = !written,
            "content added"
        );
        Ok(id)
    }

    /// The hasher identifiers are derived with.
    pub fn hasher(&self) -> ContentHasher {
        self.hasher
    }
}

impl sealed::HasBackend for ContentDb {
    fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl KeyedStore for ContentDb {}

impl fmt::Debug for ContentDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentDb")
            .field("backend", &self.backend.name())
            .field("algorithm", &self.hasher.algorithm())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::file::{FileBackend, CONTENT_FILE_MODE};
    use cask_crypto::digest;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const BYTE_CRAP_ID: &str = "2623edbac31f2bdfe402badb859ec2d633fcb7d56a3a8c303cff7bbe9f1fd22d";

    // -----------------------------------------------------------------------
    // add / get
    // -----------------------------------------------------------------------

    #[test]
    fn byte_crap_scenario() {
        let db = ContentDb::in_memory();
        let payload = b"This is some byte crap";

        let id = db.add(payload).unwrap();
        assert_eq!(id.as_str(), BYTE_CRAP_ID);
        assert_eq!(id.as_str().len(), 64);

        assert_eq!(db.add(payload).unwrap(), id);
        assert_eq!(db.len().unwrap(), 1);

        assert_eq!(db.get(id.as_str()).unwrap().unwrap(), payload);
    }

    #[test]
    fn empty_payload_is_accepted() {
        let db = ContentDb::in_memory();
        let id = db.add(b"").unwrap();
        assert_eq!(id, digest(b""));
        assert_eq!(db.get(id.as_str()).unwrap().unwrap(), b"");
    }

    #[test]
    fn get_missing_is_none() {
        let db = ContentDb::in_memory();
        assert!(db.get(digest(b"nothing").as_str()).unwrap().is_none());
    }

    #[test]
    fn blake3_hasher_changes_identifiers() {
        let db = ContentDb::new(Box::new(InMemoryBackend::new()), ContentHasher::BLAKE3);
        let id = db.add(b"data").unwrap();
        assert_eq!(id, ContentHasher::BLAKE3.hash(b"data"));
        assert_ne!(id, digest(b"data"));
    }

    // -----------------------------------------------------------------------
    // remove / contains / find
    // -----------------------------------------------------------------------

    #[test]
    fn remove_returns_payload_once() {
        let db = ContentDb::in_memory();
        let id = db.add(b"bye").unwrap();
        assert!(db.contains_key(id.as_str()).unwrap());
        assert_eq!(db.remove(id.as_str()).unwrap().unwrap(), b"bye");
        assert!(db.remove(id.as_str()).unwrap().is_none());
        assert!(!db.contains_key(id.as_str()).unwrap());
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn readd_after_remove_restores_entry() {
        let db = ContentDb::in_memory();
        let id = db.add(b"again").unwrap();
        db.remove(id.as_str()).unwrap();
        assert_eq!(db.add(b"again").unwrap(), id);
        assert!(db.contains_key(id.as_str()).unwrap());
    }

    #[test]
    fn find_non_canonical_prefix_matches_nothing() {
        let db = ContentDb::in_memory();
        let id = db.add(b"x").unwrap();
        let upper = id.as_str()[..4].to_uppercase();
        if upper != id.as_str()[..4] {
            assert!(db.find(&upper).unwrap().is_empty());
        }
        assert!(db.find("zz").unwrap().is_empty());
        assert!(db.find(&format!("{id}0")).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn malformed_keys_are_rejected() {
        let db = ContentDb::in_memory();
        db.add(b"keep").unwrap();
        let bad_keys = [
            String::new(),
            "abc".to_string(),
            "A".repeat(64),
            "g".repeat(64),
            "0".repeat(65),
        ];
        for bad in &bad_keys {
            assert!(db.get(bad).unwrap_err().is_invalid_identifier());
            assert!(db.remove(bad).unwrap_err().is_invalid_identifier());
            assert!(matches!(
                db.contains_key(bad),
                Err(StoreError::InvalidIdentifier(_))
            ));
        }
        assert_eq!(db.len().unwrap(), 1);
    }

    // -----------------------------------------------------------------------
    // File backend
    // -----------------------------------------------------------------------

    #[test]
    fn dedup_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let open = || {
            ContentDb::new(
                Box::new(FileBackend::open(dir.path(), CONTENT_FILE_MODE).unwrap()),
                ContentHasher::default(),
            )
        };
        let id = open().add(b"persisted").unwrap();
        let db = open();
        assert_eq!(db.add(b"persisted").unwrap(), id);
        assert_eq!(db.len().unwrap(), 1);
        assert_eq!(db.get(id.as_str()).unwrap().unwrap(), b"persisted");
    }

    proptest! {
        #[test]
        fn round_trip(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
            let db = ContentDb::in_memory();
            let id = db.add(&payload).unwrap();
            prop_assert_eq!(db.get(id.as_str()).unwrap().unwrap(), payload);
        }

        #[test]
        fn prefix_search_is_total(
            payloads in proptest::collection::hash_set(proptest::collection::vec(any::<u8>(), 0..16), 0..24),
            prefix in "[0-9a-f]{0,2}",
        ) {
            let db = ContentDb::in_memory();
            let stored: HashSet<Identifier> =
                payloads.iter().map(|p| db.add(p).unwrap()).collect();

            prop_assert_eq!(db.find("").unwrap(), stored.clone());
            let expected: HashSet<Identifier> =
                stored.into_iter().filter(|id| id.starts_with(&prefix)).collect();
            prop_assert_eq!(db.find(&prefix).unwrap(), expected);
        }

        #[test]
        fn wrong_length_keys_never_mutate(key in "[0-9a-f]{0,63}") {
            let db = ContentDb::in_memory();
            let id = db.add(b"present").unwrap();
            prop_assert!(db.remove(&key).is_err());
            prop_assert!(db.contains_key(id.as_str()).unwrap());
        }
    }
}
