use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use cask_types::Identifier;

use crate::error::{StoreError, StoreResult};
use crate::traits::Backend;

/// In-memory, HashMap-based backend.
///
/// All entries are held behind one `RwLock`: writers and prefix scans take
/// it exclusively or shared, so a scan never observes a half-applied write.
/// Nothing survives the process.
pub struct InMemoryBackend {
    entries: RwLock<HashMap<Identifier, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn read(&self, id: &Identifier) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(StoreError::poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn insert_if_absent(&self, id: &Identifier, value: &[u8]) -> StoreResult<bool> {
        let mut map = self.entries.write().map_err(StoreError::poisoned)?;
        if map.contains_key(id) {
            return Ok(false);
        }
        map.insert(id.clone(), value.to_vec());
        Ok(true)
    }

    fn replace(&self, id: &Identifier, value: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let mut map = self.entries.write().map_err(StoreError::poisoned)?;
        Ok(map.insert(id.clone(), value.to_vec()))
    }

    fn delete(&self, id: &Identifier) -> StoreResult<Option<Vec<u8>>> {
        let mut map = self.entries.write().map_err(StoreError::poisoned)?;
        Ok(map.remove(id))
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<HashSet<Identifier>> {
        let map = self.entries.read().map_err(StoreError::poisoned)?;
        Ok(map
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn contains(&self, id: &Identifier) -> StoreResult<bool> {
        let map = self.entries.read().map_err(StoreError::poisoned)?;
        Ok(map.contains_key(id))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.read().map_err(StoreError::poisoned)?.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("InMemoryBackend")
            .field("entry_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_crypto::digest;

    fn id(data: &[u8]) -> Identifier {
        digest(data)
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    #[test]
    fn insert_and_read() {
        let backend = InMemoryBackend::new();
        assert!(backend.insert_if_absent(&id(b"a"), b"a").unwrap());
        assert_eq!(backend.read(&id(b"a")).unwrap().as_deref(), Some(&b"a"[..]));
    }

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let backend = InMemoryBackend::new();
        let key = id(b"key");
        assert!(backend.insert_if_absent(&key, b"first").unwrap());
        assert!(!backend.insert_if_absent(&key, b"second").unwrap());
        assert_eq!(backend.read(&key).unwrap().unwrap(), b"first");
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn replace_returns_previous() {
        let backend = InMemoryBackend::new();
        let key = id(b"key");
        assert!(backend.replace(&key, b"one").unwrap().is_none());
        assert_eq!(backend.replace(&key, b"two").unwrap().unwrap(), b"one");
        assert_eq!(backend.read(&key).unwrap().unwrap(), b"two");
    }

    #[test]
    fn delete_present_and_missing() {
        let backend = InMemoryBackend::new();
        let key = id(b"gone");
        backend.insert_if_absent(&key, b"gone").unwrap();
        assert_eq!(backend.delete(&key).unwrap().unwrap(), b"gone");
        assert!(backend.delete(&key).unwrap().is_none());
        assert!(!backend.contains(&key).unwrap());
    }

    #[test]
    fn prefix_scan() {
        let backend = InMemoryBackend::new();
        let keys: Vec<Identifier> = (0..20u8).map(|i| id(&[i])).collect();
        for k in &keys {
            backend.insert_if_absent(k, b"").unwrap();
        }
        assert_eq!(backend.keys_with_prefix("").unwrap().len(), 20);
        let first = &keys[0];
        let hits = backend.keys_with_prefix(&first.as_str()[..1]).unwrap();
        assert!(hits.contains(first));
        assert!(hits.iter().all(|k| k.as_str().starts_with(&first.as_str()[..1])));
        assert!(backend.keys_with_prefix("XYZ").unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_inserts_do_not_lose_updates() {
        use std::sync::Arc;
        use std::thread;

        let backend = Arc::new(InMemoryBackend::new());
        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || {
                    for i in 0..100u8 {
                        let data = [t, i];
                        backend.insert_if_absent(&digest(&data), &data).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(backend.len().unwrap(), 800);
    }

    #[test]
    fn debug_format() {
        let backend = InMemoryBackend::new();
        backend.insert_if_absent(&id(b"x"), b"x").unwrap();
        let debug = format!("{backend:?}");
        assert!(debug.contains("InMemoryBackend"));
        assert!(debug.contains("entry_count: 1"));
    }
}
