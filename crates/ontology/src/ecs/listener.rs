// listener.rs - Lifecycle notifications from the entity manager

use crate::ecs::{EntityId, EntityManager, TypeKey};

/// Observes entity and component lifecycle changes.
///
/// Calls are synchronous and arrive before the mutating call returns.
/// Removal notifications arrive while the component is still readable;
/// destruction arrives after the entity's components are gone but while
/// the entity itself can still be looked up.
#[allow(unused_variables)]
pub trait EntityManagerListener {
    fn on_create_entity(&mut self, entities: &EntityManager, entity: EntityId) {}

    fn on_destroy_entity(&mut self, entities: &EntityManager, entity: EntityId) {}

    fn on_add_component(&mut self, entities: &EntityManager, entity: EntityId, component: TypeKey) {}

    fn on_remove_component(
        &mut self,
        entities: &EntityManager,
        entity: EntityId,
        component: TypeKey,
    ) {
    }

    /// The dense entity array moved. Anything caching positions into it
    /// must rebuild.
    fn on_entities_reallocated(&mut self, entities: &EntityManager) {}
}

/// The silent observer, for mutations made outside a world.
impl EntityManagerListener for () {}

/// Handle returned by `add_listener`, used to remove it again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u32);
