use super::store::{AnyComponentStore, ComponentStore};
use crate::ecs::{Component, TypeKey};
use std::collections::HashMap;
use tracing::trace;

/// Proof of one registration against a component store.
///
/// Handed out by `acquire` and consumed when the value it stands for is
/// removed. Leases cannot be cloned, so a store can never be released
/// more often than it was acquired.
#[derive(Debug)]
#[must_use]
pub struct StoreLease {
    key: TypeKey,
}

impl StoreLease {
    pub fn key(&self) -> TypeKey {
        self.key
    }
}

struct StoreEntry {
    store: Box<dyn AnyComponentStore>,
    leases: usize,
}

/// Owns every component store, keyed by component type.
#[derive(Default)]
pub(crate) struct StoreRegistry {
    stores: HashMap<TypeKey, StoreEntry>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            stores: HashMap::new(),
        }
    }

    /// Register one more value of `T`, creating the store on first use.
    pub fn acquire<T: Component>(&mut self) -> Option<(&mut ComponentStore<T>, StoreLease)> {
        let key = T::type_key();
        let StoreEntry { store, leases } = self.stores.entry(key).or_insert_with(|| {
            trace!(component = %key, "creating component store");
            StoreEntry {
                store: Box::new(ComponentStore::<T>::new()),
                leases: 0,
            }
        });

        let store = store.as_any_mut().downcast_mut::<ComponentStore<T>>()?;
        *leases += 1;
        Some((store, StoreLease { key }))
    }

    /// Remove the value at `position` and surrender its lease.
    pub fn take<T: Component>(&mut self, lease: StoreLease, position: usize) -> Option<T> {
        let value = self.get_mut::<T>()?.remove(position);
        self.release(lease);
        value
    }

    /// Type-erased counterpart of [`take`](Self::take); the value is dropped.
    pub fn discard(&mut self, lease: StoreLease, position: usize) -> bool {
        let erased = self
            .stores
            .get_mut(&lease.key)
            .is_some_and(|entry| entry.store.erase(position));
        self.release(lease);
        erased
    }

    fn release(&mut self, lease: StoreLease) {
        let key = lease.key;
        let Some(entry) = self.stores.get_mut(&key) else {
            return;
        };

        entry.leases = entry.leases.saturating_sub(1);
        debug_assert_eq!(entry.leases, entry.store.len());
        if entry.leases == 0 {
            trace!(component = %key, "discarding component store");
            self.stores.remove(&key);
        }
    }

    pub fn get<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&T::type_key())?
            .store
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&T::type_key())?
            .store
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }

    /// Move the values of `T` out for exclusive use. The store stays
    /// registered but reads as empty until [`checkin`](Self::checkin).
    pub fn checkout<T: Component>(&mut self) -> ComponentStore<T> {
        self.get_mut::<T>().map(std::mem::take).unwrap_or_default()
    }

    pub fn checkin<T: Component>(&mut self, values: ComponentStore<T>) {
        if let Some(store) = self.get_mut::<T>() {
            *store = values;
        }
    }

    /// Number of outstanding leases for `key`; zero once the store is gone.
    pub fn lease_count(&self, key: TypeKey) -> usize {
        self.stores.get(&key).map_or(0, |entry| entry.leases)
    }

    #[cfg(test)]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.stores.contains_key(&key)
    }

    #[cfg(test)]
    pub fn stored_len(&self, key: TypeKey) -> usize {
        self.stores.get(&key).map_or(0, |entry| entry.store.len())
    }
}
