// world.rs - ECS World tying entities and systems together

use crate::config::WorldConfig;
use crate::ecs::{
    EcsError, EntityId, EntityManager, EntityManagerListener, EntityMut, EntityPrototype,
    EntityRef, Keyed, ListenerId, ParallelSystem, System, SystemDescriptor, SystemManager,
};
use ontology_metrics::{SystemProfiler, TickTimer};
use tracing::debug;

/// The main ECS world: one entity manager and one system manager.
///
/// Every structural change made through the world is reported to the
/// system manager before any external listener, so working sets are
/// current by the time listeners run.
pub struct World {
    entities: EntityManager,
    systems: SystemManager,
    config: WorldConfig,
}

impl World {
    /// Create a new empty world with default settings.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        let mut entities = EntityManager::with_error_mode(config.error_mode);
        entities.reserve(config.entity_capacity);
        let systems = SystemManager::new(config.dispatch, config.error_mode);

        debug!(?config, "created world");
        Self {
            entities,
            systems,
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Read access to every entity, component store and prototype.
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    pub fn create_entity(&mut self) -> Result<EntityId, EcsError> {
        self.entities
            .create_entity_observed(None, &mut self.systems)
    }

    pub fn create_entity_from(&mut self, prototype: &str) -> Result<EntityId, EcsError> {
        self.entities
            .create_entity_observed(Some(prototype), &mut self.systems)
    }

    pub fn destroy_entity(&mut self, id: EntityId) -> Result<(), EcsError> {
        self.entities
            .destroy_entity_observed(id, &mut self.systems)
    }

    pub fn destroy_all_entities(&mut self) -> Result<(), EcsError> {
        self.entities
            .destroy_all_entities_observed(&mut self.systems)
    }

    pub fn reserve_entities(&mut self, additional: usize) {
        self.entities
            .reserve_observed(additional, &mut self.systems);
    }

    pub fn entity(&self, id: EntityId) -> Result<EntityRef<'_>, EcsError> {
        let index = self.entities.lookup(id, "entity")?;
        Ok(EntityRef::new(&self.entities, index))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<EntityMut<'_>, EcsError> {
        let index = self.entities.lookup(id, "entity_mut")?;
        Ok(EntityMut::new(&mut self.entities, &mut self.systems, index))
    }

    pub fn add_prototype(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut EntityPrototype, EcsError> {
        self.entities.add_prototype(name)
    }

    pub fn remove_prototype(&mut self, name: &str) -> Result<EntityPrototype, EcsError> {
        self.entities.remove_prototype(name)
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    pub fn add_system<S: System>(
        &mut self,
        system: S,
        descriptor: SystemDescriptor,
    ) -> Result<(), EcsError> {
        self.systems.add_system(system, descriptor, &self.entities)
    }

    pub fn add_parallel_system<S: ParallelSystem>(
        &mut self,
        system: S,
        descriptor: SystemDescriptor,
    ) -> Result<(), EcsError> {
        self.systems
            .add_parallel_system(system, descriptor, &self.entities)
    }

    pub fn get_system<S: Keyed>(&self) -> Result<&S, EcsError> {
        self.systems.get_system::<S>()
    }

    pub fn get_system_mut<S: Keyed>(&mut self) -> Result<&mut S, EcsError> {
        self.systems.get_system_mut::<S>()
    }

    pub fn remove_system<S: Keyed>(&mut self) -> Result<S, EcsError> {
        self.systems.remove_system::<S>()
    }

    /// Resolve the execution order and initialise new systems. `update`
    /// does this on its own whenever the system set changed.
    pub fn initialise(&mut self) -> Result<(), EcsError> {
        self.systems.initialise()
    }

    /// Run one tick.
    pub fn update(&mut self) -> Result<(), EcsError> {
        self.systems.update(&mut self.entities)
    }

    // ------------------------------------------------------------------
    // Listeners and metrics
    // ------------------------------------------------------------------

    pub fn add_listener<L>(&mut self, listener: L) -> ListenerId
    where
        L: EntityManagerListener + Send + Sync + 'static,
    {
        self.entities.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.entities.remove_listener(id)
    }

    pub fn profiler(&self) -> &SystemProfiler {
        self.systems.profiler()
    }

    pub fn tick_timer(&self) -> &TickTimer {
        self.systems.tick_timer()
    }

    pub fn tick_count(&self) -> u64 {
        self.systems.tick_count()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
