// view.rs - Borrowed handles onto a single entity

use crate::ecs::{Component, EcsError, Entity, EntityId, EntityManager, SystemManager};

/// Read-only handle to one entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    entities: &'a EntityManager,
    index: usize,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(entities: &'a EntityManager, index: usize) -> Self {
        Self { entities, index }
    }

    pub fn id(&self) -> EntityId {
        self.entity().id()
    }

    pub fn entity(&self) -> &'a Entity {
        &self.entities.entities()[self.index]
    }

    pub fn has<T: Component>(&self) -> bool {
        self.entity().has_component::<T>()
    }

    pub fn get<T: Component>(&self) -> Result<&'a T, EcsError> {
        self.entities.component_at(self.index, "get_component")
    }

    /// The whole manager, for reading other entities.
    pub fn entities(&self) -> &'a EntityManager {
        self.entities
    }
}

/// Handle given to serial systems: mutable component values, no
/// structural changes.
pub struct EntityView<'a> {
    entities: &'a mut EntityManager,
    index: usize,
}

impl<'a> EntityView<'a> {
    pub(crate) fn new(entities: &'a mut EntityManager, index: usize) -> Self {
        Self { entities, index }
    }

    pub fn id(&self) -> EntityId {
        self.entity().id()
    }

    pub fn entity(&self) -> &Entity {
        &self.entities.entities()[self.index]
    }

    pub fn has<T: Component>(&self) -> bool {
        self.entity().has_component::<T>()
    }

    pub fn get<T: Component>(&self) -> Result<&T, EcsError> {
        self.entities.component_at(self.index, "get_component")
    }

    pub fn get_mut<T: Component>(&mut self) -> Result<&mut T, EcsError> {
        self.entities.component_at_mut(self.index, "get_component_mut")
    }

    pub fn component_of<T: Component>(&self, other: EntityId) -> Result<&T, EcsError> {
        self.entities.get_component(other)
    }

    /// Mutate another entity's component value.
    pub fn component_of_mut<T: Component>(&mut self, other: EntityId) -> Result<&mut T, EcsError> {
        self.entities.get_component_mut(other)
    }

    pub fn entities(&self) -> &EntityManager {
        &*self.entities
    }
}

/// Mutable handle from [`World::entity_mut`](crate::ecs::World::entity_mut).
/// Structural changes made through it keep system working sets current.
pub struct EntityMut<'w> {
    entities: &'w mut EntityManager,
    systems: &'w mut SystemManager,
    index: usize,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(
        entities: &'w mut EntityManager,
        systems: &'w mut SystemManager,
        index: usize,
    ) -> Self {
        Self {
            entities,
            systems,
            index,
        }
    }

    pub fn id(&self) -> EntityId {
        self.entity().id()
    }

    pub fn entity(&self) -> &Entity {
        &self.entities.entities()[self.index]
    }

    pub fn add_component<T: Component>(&mut self, value: T) -> Result<&mut Self, EcsError> {
        self.entities
            .insert_component(self.index, value, self.systems, "add_component")?;
        Ok(self)
    }

    pub fn remove_component<T: Component>(&mut self) -> Result<T, EcsError> {
        self.entities.take_component(self.index, self.systems)
    }

    pub fn remove_all_components(&mut self) -> Result<(), EcsError> {
        self.entities
            .remove_all_components_at(self.index, self.systems, "remove_all_components")
    }

    pub fn has<T: Component>(&self) -> bool {
        self.entity().has_component::<T>()
    }

    pub fn get<T: Component>(&self) -> Result<&T, EcsError> {
        self.entities.component_at(self.index, "get_component")
    }

    pub fn get_mut<T: Component>(&mut self) -> Result<&mut T, EcsError> {
        self.entities.component_at_mut(self.index, "get_component_mut")
    }
}
