use std::collections::HashSet;
use std::fmt;

use cask_types::Identifier;

use crate::error::StoreResult;

/// Raw storage backend: a map from identifier to bytes.
///
/// Backends see only well-formed keys; format validation happens in
/// [`KeyedStore`] before a call reaches them. All implementations must
/// satisfy these invariants:
/// - Writes (`insert_if_absent`, `replace`, `delete`) are mutually exclusive
///   with each other and with `keys_with_prefix`, so a prefix scan always
///   sees a consistent snapshot.
/// - `insert_if_absent` is atomic: check and write happen under one lock.
/// - Every operation finishes in bounded time; no background work.
/// - All I/O errors are propagated, never silently ignored.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Read the value stored under `id`.
    fn read(&self, id: &Identifier) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `id` unless an entry already exists.
    ///
    /// Returns `true` if the value was written.
    fn insert_if_absent(&self, id: &Identifier, value: &[u8]) -> StoreResult<bool>;

    /// Store `value` under `id`, returning the value it replaced.
    fn replace(&self, id: &Identifier, value: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Remove the entry under `id`, returning its value.
    fn delete(&self, id: &Identifier) -> StoreResult<Option<Vec<u8>>>;

    /// Every stored identifier whose text starts with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<HashSet<Identifier>>;

    /// Membership test.
    fn contains(&self, id: &Identifier) -> StoreResult<bool>;

    /// Number of stored entries.
    fn len(&self) -> StoreResult<usize> {
        Ok(self.keys_with_prefix("")?.len())
    }

    /// Short backend name for logs ("memory", "file").
    fn name(&self) -> &'static str;
}

pub(crate) mod sealed {
    use super::Backend;

    pub trait HasBackend {
        fn backend(&self) -> &dyn Backend;
    }
}

/// The capability set shared by the content and pointer databases.
///
/// Every method that takes a key validates it against the identifier format
/// predicate first and fails with `StoreError::InvalidIdentifier` before
/// touching the backend. Absence is a normal `Ok(None)` result, never an
/// error.
pub trait KeyedStore: sealed::HasBackend {
    /// Get the value stored under `id`.
    fn get(&self, id: &str) -> StoreResult<Option<Vec<u8>>> {
        let id = Identifier::parse(id)?;
        self.backend().read(&id)
    }

    /// Remove and return the value stored under `id`.
    fn remove(&self, id: &str) -> StoreResult<Option<Vec<u8>>> {
        let id = Identifier::parse(id)?;
        let removed = self.backend().delete(&id)?;
        tracing::debug!(id = %id.short(), existed = removed.is_some(), "entry removed");
        Ok(removed)
    }

    /// Every stored identifier whose canonical text starts with `prefix`.
    ///
    /// `""` returns all identifiers. Matching is case-sensitive; a prefix
    /// outside the canonical alphabet simply matches nothing.
    fn find(&self, prefix: &str) -> StoreResult<HashSet<Identifier>> {
        self.backend().keys_with_prefix(prefix)
    }

    /// Returns `true` if an entry exists under `id`.
    fn contains_key(&self, id: &str) -> StoreResult<bool> {
        let id = Identifier::parse(id)?;
        self.backend().contains(&id)
    }

    /// Number of stored entries.
    fn len(&self) -> StoreResult<usize> {
        self.backend().len()
    }

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
