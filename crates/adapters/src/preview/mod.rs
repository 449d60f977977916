use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use livi_media_application::PreviewRegistry;
use livi_media_domain::PreviewHandle;
use tracing::{debug, warn};

/// Process-local preview handles. Each handle keeps a copy of the bytes it
/// was created from until it is released.
#[derive(Debug, Default)]
pub struct InMemoryPreviewRegistry {
    next: AtomicU64,
    live: Mutex<HashMap<PreviewHandle, Vec<u8>>>,
}

impl InMemoryPreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<PreviewHandle, Vec<u8>>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn bytes(&self, handle: PreviewHandle) -> Option<Vec<u8>> {
        self.live().get(&handle).cloned()
    }
}

impl PreviewRegistry for InMemoryPreviewRegistry {
    fn create(&self, bytes: &[u8]) -> PreviewHandle {
        let handle = PreviewHandle::new(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        self.live().insert(handle, bytes.to_vec());
        debug!(%handle, bytes = bytes.len(), "preview created");
        handle
    }

    fn release(&self, handle: PreviewHandle) -> bool {
        let released = self.live().remove(&handle).is_some();
        if !released {
            warn!(%handle, "preview released twice or never created");
        }
        released
    }

    fn live_count(&self) -> usize {
        self.live().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_released_once() {
        let registry = InMemoryPreviewRegistry::new();
        let first = registry.create(b"one");
        let second = registry.create(b"two");

        assert_ne!(first, second);
        assert_eq!(registry.live_count(), 2);
        assert_eq!(registry.bytes(first), Some(b"one".to_vec()));

        assert!(registry.release(first));
        assert!(!registry.release(first));
        assert_eq!(registry.bytes(first), None);
        assert_eq!(registry.live_count(), 1);
    }
}
