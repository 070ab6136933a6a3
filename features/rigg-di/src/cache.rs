use std::{collections::HashMap, sync::Arc};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::{errors::ResolveError, key::ServiceKey, types::Instance};

type Slot = Arc<OnceCell<Instance>>;

/// Already constructed singletons
///
/// Every key has its own slot, so builds of different keys never wait on
/// each other, even when a factory resolves on another thread. Replacing or
/// removing a slot detaches it: a build still running in it finishes for its
/// own callers only, later resolutions see the new slot.
#[derive(Default)]
pub(crate) struct SingletonCache {
    slots: RwLock<HashMap<ServiceKey, Slot>>,
}

impl SingletonCache {
    pub fn get(&self, key: &ServiceKey) -> Option<Instance> {
        self.slots.read().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Stores a finished instance, returning the one it replaced
    pub fn insert(&self, key: ServiceKey, instance: Instance) -> Option<Instance> {
        let slot = Arc::new(OnceCell::with_value(instance));
        self.slots
            .write()
            .insert(key, slot)
            .and_then(|replaced| replaced.get().cloned())
    }

    pub fn remove(&self, key: &ServiceKey) -> Option<Instance> {
        self.slots
            .write()
            .remove(key)
            .and_then(|removed| removed.get().cloned())
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.get(key).is_some()
    }

    /// Returns the cached instance or runs `create` and caches its result.
    ///
    /// `create` runs at most once per slot, even with concurrent callers.
    /// Failed creations are not cached. A key must not be created again from
    /// inside its own `create` on the same thread.
    pub fn get_or_create(
        &self,
        key: &ServiceKey,
        create: impl FnOnce() -> Result<Instance, ResolveError>,
    ) -> Result<Instance, ResolveError> {
        let existing = self.slots.read().get(key).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => self.slots.write().entry(key.clone()).or_default().clone(),
        };

        slot.get_or_try_init(create).cloned()
    }

    pub fn keys(&self) -> Vec<ServiceKey> {
        self.slots
            .read()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }
}
