use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use stratus_types::{ResourceDescriptor, ResourcePath};

/// Shared path → descriptor cache.
///
/// A lister with a cache attached records every descriptor it builds,
/// including those its filter rejects, so later attribute lookups for the
/// same paths need no remote call. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct AttributeCache {
    entries: Arc<RwLock<HashMap<ResourcePath, ResourceDescriptor>>>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, descriptor: ResourceDescriptor) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(descriptor.path.clone(), descriptor);
    }

    pub fn get(&self, path: &ResourcePath) -> Option<ResourceDescriptor> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn remove(&self, path: &ResourcePath) -> Option<ResourceDescriptor> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
