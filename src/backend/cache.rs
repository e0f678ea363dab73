//! Per-key slot holding the current backend handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::{installed, BackendKey, RsaBackend};
use crate::errors::Result;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// A backend key together with an id for log records.
pub(crate) struct BackendHandle {
    id: u64,
    key: Box<dyn BackendKey>,
}

impl BackendHandle {
    fn new(key: Box<dyn BackendKey>) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            key,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn key(&self) -> &dyn BackendKey {
        self.key.as_ref()
    }
}

impl Drop for BackendHandle {
    fn drop(&mut self) {
        log::trace!("releasing backend handle #{}", self.id);
    }
}

/// Lazily populated slot for the backend handle of one key.
///
/// Readers take an `Arc` to the current handle, so clearing the slot or
/// dropping the key never invalidates a handle that an operation is using.
pub(crate) struct HandleCache {
    backend: Option<Arc<dyn RsaBackend>>,
    slot: ArcSwapOption<BackendHandle>,
}

impl HandleCache {
    pub(crate) fn new() -> Self {
        Self {
            backend: None,
            slot: ArcSwapOption::empty(),
        }
    }

    pub(crate) fn with_backend(backend: Arc<dyn RsaBackend>) -> Self {
        Self {
            backend: Some(backend),
            slot: ArcSwapOption::empty(),
        }
    }

    /// The backend this key imports into: its own, else the installed one.
    pub(crate) fn backend(&self) -> Option<Arc<dyn RsaBackend>> {
        self.backend.clone().or_else(installed)
    }

    /// Return the installed handle, creating one with `create` if the slot is
    /// empty.
    ///
    /// Concurrent callers may each run `create`. The first to install wins;
    /// the others drop their handle and return the winner. `None` means there
    /// is no backend or the import failed; a later call tries again.
    pub(crate) fn get_or_create<F>(&self, create: F) -> Option<Arc<BackendHandle>>
    where
        F: FnOnce(&dyn RsaBackend) -> Result<Box<dyn BackendKey>>,
    {
        if let Some(handle) = self.slot.load_full() {
            return Some(handle);
        }

        let backend = self.backend()?;
        let fresh = match create(backend.as_ref()) {
            Ok(key) => Arc::new(BackendHandle::new(key)),
            Err(err) => {
                log::debug!(
                    "backend `{}` could not import key, using portable path: {err}",
                    backend.name()
                );
                return None;
            }
        };

        let previous = self
            .slot
            .compare_and_swap(&None::<Arc<BackendHandle>>, Some(Arc::clone(&fresh)));
        match &*previous {
            None => {
                log::trace!(
                    "installed backend handle #{} from `{}`",
                    fresh.id,
                    backend.name()
                );
                Some(fresh)
            }
            Some(winner) => {
                log::trace!(
                    "backend handle #{} lost the install race to #{}",
                    fresh.id,
                    winner.id
                );
                Some(Arc::clone(winner))
            }
        }
    }

    pub(crate) fn is_populated(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Empty the slot. The handle is released once no operation uses it.
    pub(crate) fn clear(&self) {
        if let Some(handle) = self.slot.swap(None) {
            log::trace!("cleared backend handle #{}", handle.id);
        }
    }
}

impl Default for HandleCache {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone keeps the backend selection and starts with an empty slot.
impl Clone for HandleCache {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            slot: ArcSwapOption::empty(),
        }
    }
}

impl Drop for HandleCache {
    fn drop(&mut self) {
        if let Some(handle) = self.slot.swap(None) {
            log::trace!("key dropped, detaching backend handle #{}", handle.id);
        }
    }
}
