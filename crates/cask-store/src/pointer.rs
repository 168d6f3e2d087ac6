use std::fmt;

use cask_types::Identifier;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryBackend;
use crate::traits::{sealed, Backend, KeyedStore};

/// Pointer database: caller-chosen names bound to content identifiers.
///
/// Names must pass the same format predicate as content identifiers. The
/// stored value of an entry is the 64 ASCII bytes of the bound identifier,
/// so `get` returns those bytes and [`PointerDb::resolve`] parses them.
/// Bindings are mutable: `put` replaces whatever was there.
pub struct PointerDb {
    backend: Box<dyn Backend>,
}

impl PointerDb {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// An empty memory-backed pointer database.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryBackend::new()))
    }

    /// Bind `pointer` to `content`, returning the previous binding.
    ///
    /// Both arguments are validated before anything is written: if either
    /// fails, the call returns `InvalidIdentifier` and the database is
    /// unchanged. A previous value that no longer decodes is logged and
    /// reported as absent.
    pub fn put(&self, pointer: &str, content: &str) -> StoreResult<Option<Identifier>> {
        let pointer = Identifier::parse(pointer)?;
        let content = Identifier::parse(content)?;
        self.bind(&pointer, &content)
    }

    /// [`PointerDb::put`] for already-validated identifiers.
    pub fn bind(
        &self,
        pointer: &Identifier,
        content: &Identifier,
    ) -> StoreResult<Option<Identifier>> {
        let previous = self
            .backend
            .replace(pointer, content.as_str().as_bytes())?;
        debug!(pointer = %pointer.short(), content = %content.short(), "pointer bound");

        Ok(previous.and_then(|bytes| match Identifier::try_from(bytes.as_slice()) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(pointer = %pointer, error = %e, "replaced corrupt pointer value");
                None
            }
        }))
    }

    /// The content identifier `pointer` is bound to, if any.
    ///
    /// Fails with `Corrupt` when the stored value is not an identifier.
    pub fn resolve(&self, pointer: &str) -> StoreResult<Option<Identifier>> {
        let pointer = Identifier::parse(pointer)?;
        match self.backend.read(&pointer)? {
            None => Ok(None),
            Some(bytes) => Identifier::try_from(bytes.as_slice())
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    id: pointer,
                    reason: e.to_string(),
                }),
        }
    }
}

impl sealed::HasBackend for PointerDb {
    fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl KeyedStore for PointerDb {}

impl fmt::Debug for PointerDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerDb")
            .field("backend", &self.backend.name())
            .finish()
    }
}
