use std::sync::Arc;

use crate::entries::memory::InMemoryEntryStore;
use crate::entries::repository::EntryRepository;
use crate::entries::store::EntryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub entries: EntryRepository,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            entries: EntryRepository::new(store),
        }
    }

    /// State backed by a fresh, non-durable in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryEntryStore::new()))
    }
}
