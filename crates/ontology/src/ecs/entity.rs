// entity.rs - Entity identifiers and per-entity component slots

use crate::ecs::storage::StoreLease;
use crate::ecs::{Component, TypeKey, TypeSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque entity identifier, unique within one world and never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-world identifier counter. Yields every `u32` once, then nothing.
#[derive(Debug)]
pub(crate) struct EntityIdAllocator {
    next: Option<u32>,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self { next: Some(0) }
    }

    pub fn allocate(&mut self) -> Option<EntityId> {
        let raw = self.next?;
        self.next = raw.checked_add(1);
        Some(EntityId(raw))
    }

    #[cfg(test)]
    pub fn starting_at(raw: u32) -> Self {
        Self { next: Some(raw) }
    }
}

/// Records where one of an entity's components lives in its store.
#[derive(Debug)]
pub(crate) struct ComponentSlot {
    pub key: TypeKey,
    pub position: usize,
    pub lease: StoreLease,
}

/// An entity: a stable identifier plus one slot per owned component type,
/// in the order the components were added.
///
/// Entities move but never clone; each slot holds the lease that keeps its
/// component store registered.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    slots: Vec<ComponentSlot>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            slots: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.has_key(T::type_key())
    }

    pub fn has_key(&self, key: TypeKey) -> bool {
        self.slots.iter().any(|slot| slot.key == key)
    }

    /// Position of this entity's `T` inside the `T` store.
    pub fn position_of<T: Component>(&self) -> Option<usize> {
        self.position_of_key(T::type_key())
    }

    pub fn position_of_key(&self, key: TypeKey) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| slot.key == key)
            .map(|slot| slot.position)
    }

    /// Owned component types, in the order they were added.
    pub fn component_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.slots.iter().map(|slot| slot.key)
    }

    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the entity owns every type in `required`.
    pub fn supports(&self, required: &TypeSet) -> bool {
        required.iter().all(|key| self.has_key(key))
    }

    /// Like [`supports`](Self::supports), but pretends `excluded` is already gone.
    pub(crate) fn supports_without(&self, required: &TypeSet, excluded: TypeKey) -> bool {
        required
            .iter()
            .all(|key| key != excluded && self.has_key(key))
    }

    pub(crate) fn push_slot(&mut self, slot: ComponentSlot) {
        self.slots.push(slot);
    }

    pub(crate) fn slot_mut(&mut self, key: TypeKey) -> Option<&mut ComponentSlot> {
        self.slots.iter_mut().find(|slot| slot.key == key)
    }

    pub(crate) fn take_slot(&mut self, key: TypeKey) -> Option<ComponentSlot> {
        let at = self.slots.iter().position(|slot| slot.key == key)?;
        Some(self.slots.remove(at))
    }

    pub(crate) fn first_key(&self) -> Option<TypeKey> {
        self.slots.first().map(|slot| slot.key)
    }
}
