// entity_manager.rs - Entity storage, component placement and notifications
//
// Entities live in a dense array in creation order. Each component type
// has one store whose values follow that same order, so inserting or
// removing a value means shifting the recorded positions of every other
// owner of that type.

use crate::ecs::entity::{ComponentSlot, EntityIdAllocator};
use crate::ecs::error::ensure;
use crate::ecs::storage::{ComponentStore, StoreRegistry};
use crate::ecs::{
    Component, EcsError, Entity, EntityId, EntityLookup, EntityManagerListener, EntityPrototype,
    ErrorMode, ListenerId, TypeKey,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, trace};

type BoxedListener = Box<dyn EntityManagerListener + Send + Sync>;

/// Owns every entity, every component store and the named prototypes.
///
/// Mutations made directly on an `EntityManager` notify its registered
/// listeners. A [`World`](crate::ecs::World) additionally routes every
/// notification to its system manager first.
pub struct EntityManager {
    entities: Vec<Entity>,
    index_of: HashMap<EntityId, usize>,
    stores: StoreRegistry,
    prototypes: HashMap<String, EntityPrototype>,
    listeners: Vec<(ListenerId, BoxedListener)>,
    next_listener: u32,
    ids: EntityIdAllocator,
    error_mode: ErrorMode,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::with_error_mode(ErrorMode::default())
    }

    pub fn with_error_mode(error_mode: ErrorMode) -> Self {
        Self {
            entities: Vec::new(),
            index_of: HashMap::new(),
            stores: StoreRegistry::new(),
            prototypes: HashMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
            ids: EntityIdAllocator::new(),
            error_mode,
        }
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    pub fn set_error_mode(&mut self, error_mode: ErrorMode) {
        self.error_mode = error_mode;
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Reserve room for `additional` entities. Growing the array notifies
    /// listeners of a reallocation.
    pub fn reserve(&mut self, additional: usize) {
        self.reserve_observed(additional, &mut ());
    }

    pub(crate) fn reserve_observed(
        &mut self,
        additional: usize,
        observer: &mut dyn EntityManagerListener,
    ) {
        let capacity = self.entities.capacity();
        self.entities.reserve(additional);
        if self.entities.capacity() != capacity {
            self.notify(observer, |listener, entities| {
                listener.on_entities_reallocated(entities)
            });
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of.contains_key(&id)
    }

    /// Like [`get_entity`](Self::get_entity), without the error policy.
    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.index_of.get(&id).map(|&index| &self.entities[index])
    }

    pub fn get_entity(&self, id: EntityId) -> Result<&Entity, EcsError> {
        let index = self.lookup(id, "get_entity")?;
        Ok(&self.entities[index])
    }

    pub fn entity_at(&self, position: usize) -> Result<&Entity, EcsError> {
        match self.entities.get(position) {
            Some(entity) => Ok(entity),
            None => self.error_mode.reject(EcsError::InvalidEntity {
                operation: "entity_at",
                entity: EntityLookup::Position(position),
            }),
        }
    }

    /// Position of `id` in the dense entity array.
    pub fn entity_index(&self, id: EntityId) -> Result<usize, EcsError> {
        self.lookup(id, "entity_index")
    }

    pub(crate) fn lookup(&self, id: EntityId, operation: &'static str) -> Result<usize, EcsError> {
        match self.index_of.get(&id) {
            Some(&index) => Ok(index),
            None => self.error_mode.reject(EcsError::InvalidEntity {
                operation,
                entity: EntityLookup::Id(id),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    pub fn create_entity(&mut self) -> Result<EntityId, EcsError> {
        self.create_entity_observed(None, &mut ())
    }

    /// Create an entity carrying a copy of every component in the named
    /// prototype.
    pub fn create_entity_from(&mut self, prototype: &str) -> Result<EntityId, EcsError> {
        self.create_entity_observed(Some(prototype), &mut ())
    }

    pub(crate) fn create_entity_observed(
        &mut self,
        prototype: Option<&str>,
        observer: &mut dyn EntityManagerListener,
    ) -> Result<EntityId, EcsError> {
        let operation = if prototype.is_some() {
            "create_entity_from"
        } else {
            "create_entity"
        };

        if let Some(name) = prototype {
            if !self.prototypes.contains_key(name) {
                return self.error_mode.reject(EcsError::InvalidPrototype {
                    operation,
                    name: name.to_owned(),
                });
            }
        }

        let Some(id) = self.ids.allocate() else {
            return self
                .error_mode
                .reject(EcsError::IdentifierOverflow { operation });
        };

        let capacity = self.entities.capacity();
        let index = self.entities.len();
        self.entities.push(Entity::new(id));
        self.index_of.insert(id, index);
        trace!(entity = %id, "created entity");

        if self.entities.capacity() != capacity {
            self.notify(observer, |listener, entities| {
                listener.on_entities_reallocated(entities)
            });
        }
        self.notify(observer, |listener, entities| {
            listener.on_create_entity(entities, id)
        });

        if let Some(name) = prototype {
            self.stamp_prototype(name, index, observer)?;
        }

        Ok(id)
    }

    fn stamp_prototype(
        &mut self,
        name: &str,
        index: usize,
        observer: &mut dyn EntityManagerListener,
    ) -> Result<(), EcsError> {
        let Some(prototype) = self.prototypes.remove(name) else {
            return Ok(());
        };

        let mut result = Ok(());
        for component in prototype.components() {
            result = component.stamp(self, index, observer);
            if result.is_err() {
                break;
            }
        }

        self.prototypes.insert(name.to_owned(), prototype);
        result
    }

    /// Remove every component of `id`, then the entity itself.
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<(), EcsError> {
        self.destroy_entity_observed(id, &mut ())
    }

    pub(crate) fn destroy_entity_observed(
        &mut self,
        id: EntityId,
        observer: &mut dyn EntityManagerListener,
    ) -> Result<(), EcsError> {
        let index = self.lookup(id, "destroy_entity")?;
        self.remove_all_components_at(index, observer, "destroy_entity")?;

        self.notify(observer, |listener, entities| {
            listener.on_destroy_entity(entities, id)
        });

        self.entities.remove(index);
        self.index_of.remove(&id);
        for (offset, entity) in self.entities[index..].iter().enumerate() {
            self.index_of.insert(entity.id(), index + offset);
        }

        trace!(entity = %id, "destroyed entity");
        Ok(())
    }

    /// Destroy every entity, newest first.
    pub fn destroy_all_entities(&mut self) -> Result<(), EcsError> {
        self.destroy_all_entities_observed(&mut ())
    }

    pub(crate) fn destroy_all_entities_observed(
        &mut self,
        observer: &mut dyn EntityManagerListener,
    ) -> Result<(), EcsError> {
        while let Some(last) = self.entities.last() {
            let id = last.id();
            self.destroy_entity_observed(id, observer)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    pub fn add_component<T: Component>(&mut self, id: EntityId, value: T) -> Result<(), EcsError> {
        let index = self.lookup(id, "add_component")?;
        self.insert_component(index, value, &mut (), "add_component")
    }

    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Result<T, EcsError> {
        let index = self.lookup(id, "remove_component")?;
        self.take_component(index, &mut ())
    }

    pub fn remove_all_components(&mut self, id: EntityId) -> Result<(), EcsError> {
        let index = self.lookup(id, "remove_all_components")?;
        self.remove_all_components_at(index, &mut (), "remove_all_components")
    }

    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.index_of
            .get(&id)
            .is_some_and(|&index| self.entities[index].has_component::<T>())
    }

    pub fn get_component<T: Component>(&self, id: EntityId) -> Result<&T, EcsError> {
        let index = self.lookup(id, "get_component")?;
        self.component_at(index, "get_component")
    }

    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Result<&mut T, EcsError> {
        let index = self.lookup(id, "get_component_mut")?;
        self.component_at_mut(index, "get_component_mut")
    }

    /// The dense store of `T`, in entity creation order. `None` while no
    /// entity owns a `T`.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores.get::<T>()
    }

    /// Number of live registrations of `T`'s store.
    pub fn store_lease_count<T: Component>(&self) -> usize {
        self.stores.lease_count(T::type_key())
    }

    pub(crate) fn stores_mut(&mut self) -> &mut StoreRegistry {
        &mut self.stores
    }

    pub(crate) fn component_at<T: Component>(
        &self,
        index: usize,
        operation: &'static str,
    ) -> Result<&T, EcsError> {
        let entity = &self.entities[index];
        let value = entity
            .position_of::<T>()
            .and_then(|position| self.stores.get::<T>()?.get(position));

        match value {
            Some(value) => Ok(value),
            None => self.error_mode.reject(EcsError::InvalidComponent {
                operation,
                entity: entity.id(),
                component: T::type_key(),
            }),
        }
    }

    pub(crate) fn component_at_mut<T: Component>(
        &mut self,
        index: usize,
        operation: &'static str,
    ) -> Result<&mut T, EcsError> {
        let entity = &self.entities[index];
        let id = entity.id();
        let position = entity.position_of::<T>();

        let error_mode = self.error_mode;
        let value = position.and_then(|position| self.stores.get_mut::<T>()?.get_mut(position));
        match value {
            Some(value) => Ok(value),
            None => error_mode.reject(EcsError::InvalidComponent {
                operation,
                entity: id,
                component: T::type_key(),
            }),
        }
    }

    /// Place `value` in the `T` store so the store stays in entity order.
    pub(crate) fn insert_component<T: Component>(
        &mut self,
        index: usize,
        value: T,
        observer: &mut dyn EntityManagerListener,
        operation: &'static str,
    ) -> Result<(), EcsError> {
        let key = T::type_key();
        let id = self.entities[index].id();
        ensure!(
            self.error_mode,
            !self.entities[index].has_key(key),
            EcsError::DuplicateComponent {
                operation,
                entity: id,
                component: key,
            }
        );

        // The first later owner gives up its position; otherwise append.
        let successor = self.entities[index + 1..]
            .iter()
            .find_map(|later| later.position_of_key(key));

        let Some((store, lease)) = self.stores.acquire::<T>() else {
            return self.error_mode.reject(EcsError::InvalidComponent {
                operation,
                entity: id,
                component: key,
            });
        };
        let position = successor.unwrap_or(store.len());
        store.insert(position, value);

        if successor.is_some() {
            for other in &mut self.entities {
                if let Some(slot) = other.slot_mut(key) {
                    if slot.position >= position {
                        slot.position += 1;
                    }
                }
            }
        }

        self.entities[index].push_slot(ComponentSlot {
            key,
            position,
            lease,
        });

        self.notify(observer, |listener, entities| {
            listener.on_add_component(entities, id, key)
        });
        Ok(())
    }

    pub(crate) fn take_component<T: Component>(
        &mut self,
        index: usize,
        observer: &mut dyn EntityManagerListener,
    ) -> Result<T, EcsError> {
        const OPERATION: &str = "remove_component";

        let slot = self.detach(index, T::type_key(), observer, OPERATION)?;
        match self.stores.take::<T>(slot.lease, slot.position) {
            Some(value) => Ok(value),
            None => self.error_mode.reject(EcsError::InvalidComponent {
                operation: OPERATION,
                entity: self.entities[index].id(),
                component: T::type_key(),
            }),
        }
    }

    pub(crate) fn remove_all_components_at(
        &mut self,
        index: usize,
        observer: &mut dyn EntityManagerListener,
        operation: &'static str,
    ) -> Result<(), EcsError> {
        while let Some(key) = self.entities[index].first_key() {
            let slot = self.detach(index, key, observer, operation)?;
            self.stores.discard(slot.lease, slot.position);
        }
        Ok(())
    }

    /// Notify, then unlink the entity's slot for `key` and close the gap
    /// its value leaves in the store. The caller erases the value.
    fn detach(
        &mut self,
        index: usize,
        key: TypeKey,
        observer: &mut dyn EntityManagerListener,
        operation: &'static str,
    ) -> Result<ComponentSlot, EcsError> {
        let id = self.entities[index].id();
        if !self.entities[index].has_key(key) {
            return self.error_mode.reject(EcsError::InvalidComponent {
                operation,
                entity: id,
                component: key,
            });
        }

        self.notify(observer, |listener, entities| {
            listener.on_remove_component(entities, id, key)
        });

        let Some(slot) = self.entities[index].take_slot(key) else {
            return self.error_mode.reject(EcsError::InvalidComponent {
                operation,
                entity: id,
                component: key,
            });
        };

        for other in &mut self.entities {
            if let Some(other_slot) = other.slot_mut(key) {
                if other_slot.position > slot.position {
                    other_slot.position -= 1;
                }
            }
        }

        Ok(slot)
    }

    // ------------------------------------------------------------------
    // Prototypes
    // ------------------------------------------------------------------

    /// Register an empty prototype and return it for filling.
    pub fn add_prototype(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut EntityPrototype, EcsError> {
        let name = name.into();
        ensure!(
            self.error_mode,
            !self.prototypes.contains_key(&name),
            EcsError::DuplicatePrototype {
                operation: "add_prototype",
                name,
            }
        );

        debug!(prototype = %name, "registered prototype");
        let prototype = EntityPrototype::new(name.clone());
        Ok(match self.prototypes.entry(name) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(prototype);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(prototype),
        })
    }

    pub fn remove_prototype(&mut self, name: &str) -> Result<EntityPrototype, EcsError> {
        match self.prototypes.remove(name) {
            Some(prototype) => Ok(prototype),
            None => self.error_mode.reject(EcsError::InvalidPrototype {
                operation: "remove_prototype",
                name: name.to_owned(),
            }),
        }
    }

    pub fn has_prototype(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    pub fn prototype(&self, name: &str) -> Option<&EntityPrototype> {
        self.prototypes.get(name)
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    pub fn add_listener<L>(&mut self, listener: L) -> ListenerId
    where
        L: EntityManagerListener + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was registered under `id`.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver one event to `observer`, then to every registered listener
    /// in registration order.
    fn notify<F>(&mut self, observer: &mut dyn EntityManagerListener, event: F)
    where
        F: Fn(&mut dyn EntityManagerListener, &EntityManager),
    {
        event(observer, &*self);

        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in &mut listeners {
            event(listener.as_mut(), &*self);
        }
        self.listeners = listeners;
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;
    use crate::ecs::{ErrorKind, Keyed};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Score(u32);
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Tag;
    #[derive(Clone, Debug, PartialEq)]
    struct Label(&'static str);
    define_component!(Score, Tag, Label);

    fn spawn(manager: &mut EntityManager, count: usize) -> Vec<EntityId> {
        (0..count)
            .map(|_| manager.create_entity().unwrap())
            .collect()
    }

    fn scores(manager: &EntityManager) -> Vec<u32> {
        manager
            .store::<Score>()
            .map(|store| store.iter().map(|score| score.0).collect())
            .unwrap_or_default()
    }

    fn position(manager: &EntityManager, id: EntityId) -> Option<usize> {
        manager.get_entity(id).unwrap().position_of::<Score>()
    }

    #[test]
    fn remove_shifts_later_positions() {
        let mut manager = EntityManager::new();
        let ids = spawn(&mut manager, 3);
        for (id, value) in ids.iter().zip([55, 66, 77]) {
            manager.add_component(*id, Score(value)).unwrap();
        }
        assert_eq!(scores(&manager), vec![55, 66, 77]);

        assert_eq!(manager.remove_component::<Score>(ids[0]).unwrap(), Score(55));
        assert_eq!(scores(&manager), vec![66, 77]);
        assert_eq!(position(&manager, ids[0]), None);
        assert_eq!(position(&manager, ids[1]), Some(0));
        assert_eq!(position(&manager, ids[2]), Some(1));
    }

    #[test]
    fn out_of_order_adds_keep_entity_order() {
        let mut manager = EntityManager::new();
        let ids = spawn(&mut manager, 4);

        manager.add_component(ids[3], Score(3)).unwrap();
        manager.add_component(ids[1], Score(1)).unwrap();
        manager.add_component(ids[2], Score(2)).unwrap();
        manager.add_component(ids[0], Score(0)).unwrap();

        assert_eq!(scores(&manager), vec![0, 1, 2, 3]);
        for (expected, id) in ids.iter().enumerate() {
            assert_eq!(position(&manager, *id), Some(expected));
        }
    }

    #[test]
    fn duplicate_add_leaves_store_untouched() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity().unwrap();
        manager.add_component(id, Score(1)).unwrap();

        let error = manager.add_component(id, Score(2)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DuplicateComponent);
        assert_eq!(scores(&manager), vec![1]);
        assert_eq!(manager.store_lease_count::<Score>(), 1);
    }

    #[test]
    fn missing_component_and_entity_are_errors() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity().unwrap();

        let error = manager.remove_component::<Score>(id).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidComponent);
        assert!(manager.get_component::<Score>(id).is_err());

        let ghost = EntityId::from_raw(99);
        assert_eq!(
            manager.destroy_entity(ghost).unwrap_err().kind(),
            ErrorKind::InvalidEntity
        );
        assert_eq!(
            manager.entity_at(5).unwrap_err().kind(),
            ErrorKind::InvalidEntity
        );
    }

    #[test]
    fn unchecked_mode_still_reports_missing_values() {
        let mut manager = EntityManager::with_error_mode(ErrorMode::Unchecked);
        let id = manager.create_entity().unwrap();
        assert!(manager.get_component::<Score>(id).is_err());
        assert!(manager.remove_component::<Score>(id).is_err());
    }

    #[test]
    #[should_panic(expected = "already has component")]
    fn assert_mode_panics_on_duplicate() {
        let mut manager = EntityManager::with_error_mode(ErrorMode::Assert);
        let id = manager.create_entity().unwrap();
        manager.add_component(id, Tag).unwrap();
        let _ = manager.add_component(id, Tag);
    }

    #[test]
    fn destroy_shifts_index_map_and_stores() {
        let mut manager = EntityManager::new();
        let ids = spawn(&mut manager, 4);
        for (value, id) in ids.iter().enumerate() {
            manager.add_component(*id, Score(value as u32)).unwrap();
        }
        manager.add_component(ids[1], Tag).unwrap();

        manager.destroy_entity(ids[1]).unwrap();

        assert_eq!(manager.len(), 3);
        assert!(!manager.contains(ids[1]));
        assert_eq!(manager.entity_index(ids[2]).unwrap(), 1);
        assert_eq!(manager.entity_index(ids[3]).unwrap(), 2);
        assert_eq!(manager.entity_at(1).unwrap().id(), ids[2]);
        assert_eq!(scores(&manager), vec![0, 2, 3]);
        assert_eq!(position(&manager, ids[3]), Some(2));
        assert!(manager.store::<Tag>().is_none());
    }

    #[test]
    fn store_is_discarded_with_its_last_value() {
        let mut manager = EntityManager::new();
        let ids = spawn(&mut manager, 2);
        manager.add_component(ids[0], Score(1)).unwrap();
        manager.add_component(ids[1], Score(2)).unwrap();
        assert_eq!(manager.store_lease_count::<Score>(), 2);

        manager.remove_all_components(ids[0]).unwrap();
        assert_eq!(manager.store_lease_count::<Score>(), 1);

        manager.destroy_all_entities().unwrap();
        assert!(manager.is_empty());
        assert!(manager.store::<Score>().is_none());
        assert_eq!(manager.store_lease_count::<Score>(), 0);
    }

    #[test]
    fn identifiers_are_never_reused() {
        let mut manager = EntityManager::new();
        let first = manager.create_entity().unwrap();
        manager.destroy_entity(first).unwrap();
        let second = manager.create_entity().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn identifier_exhaustion_is_reported() {
        let mut manager = EntityManager::new();
        manager.ids = EntityIdAllocator::starting_at(u32::MAX);
        manager.create_entity().unwrap();

        let error = manager.create_entity().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::IdentifierOverflow);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn prototypes_stamp_components() {
        let mut manager = EntityManager::new();
        manager
            .add_prototype("scored")
            .unwrap()
            .with(Score(10))
            .with(Label("hero"));

        let id = manager.create_entity_from("scored").unwrap();
        assert_eq!(manager.get_component::<Score>(id).unwrap(), &Score(10));
        assert_eq!(manager.get_component::<Label>(id).unwrap().0, "hero");
        assert!(manager.has_prototype("scored"));

        let again = manager.create_entity_from("scored").unwrap();
        *manager.get_component_mut::<Score>(again).unwrap() = Score(11);
        assert_eq!(scores(&manager), vec![10, 11]);
    }

    #[test]
    fn prototype_errors() {
        let mut manager = EntityManager::new();
        manager.add_prototype("empty").unwrap();

        assert_eq!(
            manager.add_prototype("empty").unwrap_err().kind(),
            ErrorKind::DuplicatePrototype
        );
        assert_eq!(
            manager.create_entity_from("missing").unwrap_err().kind(),
            ErrorKind::InvalidPrototype
        );
        assert!(manager.is_empty());

        manager.remove_prototype("empty").unwrap();
        assert_eq!(
            manager.remove_prototype("empty").unwrap_err().kind(),
            ErrorKind::InvalidPrototype
        );
    }

    /// Arbitrary add/remove sequences keep every store in entity order.
    #[test]
    fn store_order_survives_random_churn() {
        let mut manager = EntityManager::new();
        let ids = spawn(&mut manager, 48);
        let mut rng = StdRng::seed_from_u64(0x2545_f491);

        for _ in 0..2000 {
            let id = ids[rng.gen_range(0..ids.len())];
            if manager.has_component::<Score>(id) {
                manager.remove_component::<Score>(id).unwrap();
            } else {
                manager.add_component(id, Score(id.raw())).unwrap();
            }
        }

        let values = scores(&manager);
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(manager.store_lease_count::<Score>(), values.len());
        for entity in manager.entities() {
            if let Some(at) = entity.position_of::<Score>() {
                assert_eq!(values[at], entity.id().raw());
            }
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn push(&self, line: String) {
            self.log.lock().unwrap().push(line);
        }
    }

    impl EntityManagerListener for Recorder {
        fn on_create_entity(&mut self, _: &EntityManager, entity: EntityId) {
            self.push(format!("create {entity}"));
        }

        fn on_destroy_entity(&mut self, entities: &EntityManager, entity: EntityId) {
            let remaining = entities.get_entity(entity).unwrap().component_count();
            self.push(format!("destroy {entity} with {remaining}"));
        }

        fn on_add_component(&mut self, _: &EntityManager, entity: EntityId, key: TypeKey) {
            self.push(format!("add {entity} {}", key == Score::type_key()));
        }

        fn on_remove_component(&mut self, entities: &EntityManager, entity: EntityId, _: TypeKey) {
            let value = entities.get_component::<Score>(entity).unwrap().0;
            self.push(format!("remove {entity} {value}"));
        }

        fn on_entities_reallocated(&mut self, _: &EntityManager) {
            self.push("realloc".to_string());
        }
    }

    #[test]
    fn listeners_see_events_in_order() {
        let mut manager = EntityManager::new();
        let recorder = Recorder::default();
        let listener = manager.add_listener(recorder.clone());

        let id = manager.create_entity().unwrap();
        manager.add_component(id, Score(5)).unwrap();
        manager.destroy_entity(id).unwrap();

        assert_eq!(
            *recorder.log.lock().unwrap(),
            vec![
                "realloc".to_string(),
                "create #0".to_string(),
                "add #0 true".to_string(),
                "remove #0 5".to_string(),
                "destroy #0 with 0".to_string(),
            ]
        );

        assert!(manager.remove_listener(listener));
        assert!(!manager.remove_listener(listener));
        manager.create_entity().unwrap();
        assert_eq!(recorder.log.lock().unwrap().len(), 5);
    }
}
