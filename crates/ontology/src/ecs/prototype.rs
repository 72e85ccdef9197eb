// prototype.rs - Named component templates for entity creation

use crate::ecs::{Component, EcsError, EntityManager, EntityManagerListener, TypeKey};
use std::fmt;

/// A component value that can be stamped onto new entities.
pub(crate) trait PrototypeComponent: Send + Sync {
    fn key(&self) -> TypeKey;

    fn stamp(
        &self,
        entities: &mut EntityManager,
        index: usize,
        observer: &mut dyn EntityManagerListener,
    ) -> Result<(), EcsError>;
}

struct PrototypeValue<T>(T);

impl<T: Component + Clone> PrototypeComponent for PrototypeValue<T> {
    fn key(&self) -> TypeKey {
        T::type_key()
    }

    fn stamp(
        &self,
        entities: &mut EntityManager,
        index: usize,
        observer: &mut dyn EntityManagerListener,
    ) -> Result<(), EcsError> {
        entities.insert_component(index, self.0.clone(), observer, "create_entity_from")
    }
}

/// Component values copied onto every entity created from this prototype.
///
/// # Example
/// ```ignore
/// world
///     .add_prototype("asteroid")?
///     .with(Position { x: 0.0, y: 0.0 })
///     .with(Velocity { x: 1.0, y: 0.0 });
/// let rock = world.create_entity_from("asteroid")?;
/// ```
pub struct EntityPrototype {
    name: String,
    components: Vec<Box<dyn PrototypeComponent>>,
}

impl EntityPrototype {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            components: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a component value. A second value of the same type replaces the
    /// first.
    pub fn with<T: Component + Clone>(&mut self, value: T) -> &mut Self {
        let component: Box<dyn PrototypeComponent> = Box::new(PrototypeValue(value));
        match self.components.iter().position(|c| c.key() == T::type_key()) {
            Some(at) => self.components[at] = component,
            None => self.components.push(component),
        }
        self
    }

    pub fn has<T: Component>(&self) -> bool {
        self.components.iter().any(|c| c.key() == T::type_key())
    }

    /// Component types in the order they will be added.
    pub fn component_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.components.iter().map(|c| c.key())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn components(&self) -> &[Box<dyn PrototypeComponent>] {
        &self.components
    }
}

impl fmt::Debug for EntityPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityPrototype")
            .field("name", &self.name)
            .field("components", &self.component_keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;
    use crate::ecs::Keyed;

    #[derive(Clone)]
    struct Hull(#[allow(dead_code)] u8);
    #[derive(Clone)]
    struct Shield(#[allow(dead_code)] u8);
    define_component!(Hull, Shield);

    #[test]
    fn with_replaces_same_type() {
        let mut prototype = EntityPrototype::new("ship".into());
        prototype.with(Hull(1)).with(Shield(2)).with(Hull(3));

        assert_eq!(prototype.len(), 2);
        assert!(prototype.has::<Shield>());
        let keys: Vec<_> = prototype.component_keys().collect();
        assert_eq!(keys, vec![Hull::type_key(), Shield::type_key()]);
    }
}
