// system_manager.rs - System registration, ordering and per-tick dispatch
//
// The manager listens to the entity manager and keeps one working list
// per system: the live entities owning every required component, in the
// order they qualified.

use crate::config::DispatchMode;
use crate::ecs::error::ensure;
use crate::ecs::schedule::resolve_order;
use crate::ecs::system::{ParallelRunner, SerialRunner, SystemRunner};
use crate::ecs::{
    EcsError, Entity, EntityId, EntityManager, EntityManagerListener, ErrorMode, Keyed,
    ParallelSystem, System, SystemDescriptor, TypeKey, TypeSet,
};
use ontology_metrics::{SystemProfiler, TickTimer};
use std::collections::HashSet;
use tracing::{debug, warn};

struct SystemEntry {
    key: TypeKey,
    runner: Box<dyn SystemRunner>,
    required: TypeSet,
    predecessors: Vec<TypeKey>,
    receives_entities: bool,
    working: Vec<EntityId>,
    members: HashSet<EntityId>,
    initialised: bool,
}

impl SystemEntry {
    fn qualifies(&self, entity: &Entity, removing: Option<TypeKey>) -> bool {
        self.receives_entities
            && match removing {
                Some(key) => entity.supports_without(&self.required, key),
                None => entity.supports(&self.required),
            }
    }

    fn admit(&mut self, id: EntityId) {
        if self.members.insert(id) {
            self.working.push(id);
        }
    }

    fn evict(&mut self, id: EntityId) {
        if self.members.remove(&id) {
            if let Some(at) = self.working.iter().rposition(|member| *member == id) {
                self.working.remove(at);
            }
        }
    }

    fn rebuild(&mut self, entities: &EntityManager) {
        self.working.clear();
        self.members.clear();
        for entity in entities.entities() {
            if self.qualifies(entity, None) {
                self.admit(entity.id());
            }
        }
    }
}

/// Owns the registered systems and runs them in dependency order.
pub struct SystemManager {
    systems: Vec<SystemEntry>,
    order: Option<Vec<usize>>,
    resolution_failed: bool,
    dispatch: DispatchMode,
    error_mode: ErrorMode,
    profiler: SystemProfiler,
    tick_timer: TickTimer,
    tick_count: u64,
}

impl SystemManager {
    pub fn new(dispatch: DispatchMode, error_mode: ErrorMode) -> Self {
        Self {
            systems: Vec::new(),
            order: None,
            resolution_failed: false,
            dispatch,
            error_mode,
            profiler: SystemProfiler::new(),
            tick_timer: TickTimer::default(),
            tick_count: 0,
        }
    }

    /// Register a serial system. Its working list is built from the live
    /// entities right away.
    pub fn add_system<S: System>(
        &mut self,
        system: S,
        descriptor: SystemDescriptor,
        entities: &EntityManager,
    ) -> Result<(), EcsError> {
        self.register(S::type_key(), Box::new(SerialRunner(system)), descriptor, entities)
    }

    /// Register a parallel system. Its `Target` type is always required.
    pub fn add_parallel_system<S: ParallelSystem>(
        &mut self,
        system: S,
        descriptor: SystemDescriptor,
        entities: &EntityManager,
    ) -> Result<(), EcsError> {
        let descriptor = descriptor.with_component::<S::Target>();
        self.register(
            S::type_key(),
            Box::new(ParallelRunner(system)),
            descriptor,
            entities,
        )
    }

    fn register(
        &mut self,
        key: TypeKey,
        runner: Box<dyn SystemRunner>,
        descriptor: SystemDescriptor,
        entities: &EntityManager,
    ) -> Result<(), EcsError> {
        ensure!(
            self.error_mode,
            self.position(key).is_none(),
            EcsError::DuplicateSystem {
                operation: "add_system",
                system: key,
            }
        );

        let (required, predecessors, receives_entities) = descriptor.into_parts();
        let mut entry = SystemEntry {
            key,
            runner,
            required,
            predecessors,
            receives_entities,
            working: Vec::new(),
            members: HashSet::new(),
            initialised: false,
        };
        entry.rebuild(entities);

        debug!(
            system = %key,
            components = ?entry.required.as_slice(),
            after = ?entry.predecessors,
            entities = entry.working.len(),
            "registered system"
        );

        self.systems.push(entry);
        self.order = None;
        Ok(())
    }

    fn position(&self, key: TypeKey) -> Option<usize> {
        self.systems.iter().position(|entry| entry.key == key)
    }

    fn missing<T>(&self, operation: &'static str, system: TypeKey) -> Result<T, EcsError> {
        self.error_mode
            .reject(EcsError::InvalidSystem { operation, system })
    }

    pub fn has_system<S: Keyed>(&self) -> bool {
        self.position(S::type_key()).is_some()
    }

    pub fn get_system<S: Keyed>(&self) -> Result<&S, EcsError> {
        let key = S::type_key();
        let system = self
            .position(key)
            .and_then(|at| self.systems[at].runner.system().downcast_ref::<S>());
        match system {
            Some(system) => Ok(system),
            None => self.missing("get_system", key),
        }
    }

    pub fn get_system_mut<S: Keyed>(&mut self) -> Result<&mut S, EcsError> {
        let key = S::type_key();
        let Some(at) = self.position(key) else {
            return self.missing("get_system_mut", key);
        };

        let error_mode = self.error_mode;
        match self.systems[at].runner.system_mut().downcast_mut::<S>() {
            Some(system) => Ok(system),
            None => error_mode.reject(EcsError::InvalidSystem {
                operation: "get_system_mut",
                system: key,
            }),
        }
    }

    /// Unregister a system and hand it back. The execution order is
    /// recomputed on the next update.
    pub fn remove_system<S: Keyed>(&mut self) -> Result<S, EcsError> {
        let key = S::type_key();
        let Some(at) = self.position(key) else {
            return self.missing("remove_system", key);
        };

        let entry = self.systems.remove(at);
        self.order = None;
        self.profiler.forget(key.name());
        debug!(system = %key, "removed system");

        match entry.runner.into_system().downcast::<S>() {
            Ok(system) => Ok(*system),
            Err(_) => self.missing("remove_system", key),
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Entities `S` will process on the next update, in processing order.
    pub fn working_set<S: Keyed>(&self) -> Result<&[EntityId], EcsError> {
        let key = S::type_key();
        match self.position(key) {
            Some(at) => Ok(&self.systems[at].working),
            None => self.missing("working_set", key),
        }
    }

    /// Resolved order, or `None` while it is stale.
    pub fn execution_order(&self) -> Option<Vec<TypeKey>> {
        self.order
            .as_ref()
            .map(|order| order.iter().map(|&at| self.systems[at].key).collect())
    }

    /// Compute the execution order and run `initialise` on every system
    /// that has not been initialised yet.
    pub fn initialise(&mut self) -> Result<(), EcsError> {
        let nodes: Vec<(TypeKey, &[TypeKey])> = self
            .systems
            .iter()
            .map(|entry| (entry.key, entry.predecessors.as_slice()))
            .collect();

        let order = match resolve_order(&nodes) {
            Ok(order) => order,
            Err(error) => {
                self.order = None;
                self.resolution_failed = true;
                return self.error_mode.reject(error);
            }
        };

        let names: Vec<&'static str> = order.iter().map(|&at| self.systems[at].key.name()).collect();
        debug!(order = %names.join(" -> "), "resolved execution order");

        for &at in &order {
            let entry = &mut self.systems[at];
            if !entry.initialised {
                entry.runner.initialise();
                entry.initialised = true;
            }
        }

        self.order = Some(order);
        self.resolution_failed = false;
        Ok(())
    }

    /// Run every system once, in execution order. The first processing
    /// error aborts the tick.
    pub fn update(&mut self, entities: &mut EntityManager) -> Result<(), EcsError> {
        if self.order.is_none() {
            if self.resolution_failed {
                warn!("update with an unresolved execution order; resolving again");
            }
            self.initialise()?;
        }

        let Some(order) = self.order.clone() else {
            return Ok(());
        };

        let dispatch = self.dispatch;
        self.tick_timer.begin();
        for at in order {
            let entry = &mut self.systems[at];
            let outcome = self
                .profiler
                .record(entry.key.name(), entry.working.len(), || {
                    entry.runner.run(&entry.working, entities, dispatch)
                });

            if let Err(error) = outcome {
                self.tick_timer.end();
                return Err(error);
            }
        }
        self.tick_timer.end();
        self.tick_count += 1;
        Ok(())
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    pub fn tick_timer(&self) -> &TickTimer {
        &self.tick_timer
    }

    /// Number of completed updates.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    fn retest(&mut self, entities: &EntityManager, id: EntityId, removing: Option<TypeKey>) {
        let Some(entity) = entities.find_entity(id) else {
            return;
        };

        for entry in &mut self.systems {
            if entry.qualifies(entity, removing) {
                entry.admit(id);
            } else {
                entry.evict(id);
            }
        }
    }
}

impl EntityManagerListener for SystemManager {
    fn on_create_entity(&mut self, entities: &EntityManager, entity: EntityId) {
        self.retest(entities, entity, None);
    }

    fn on_destroy_entity(&mut self, _entities: &EntityManager, entity: EntityId) {
        for entry in &mut self.systems {
            entry.evict(entity);
        }
    }

    fn on_add_component(&mut self, entities: &EntityManager, entity: EntityId, _: TypeKey) {
        self.retest(entities, entity, None);
    }

    // Fires before the slot is erased, so test as if it were already gone.
    fn on_remove_component(&mut self, entities: &EntityManager, entity: EntityId, component: TypeKey) {
        self.retest(entities, entity, Some(component));
    }

    fn on_entities_reallocated(&mut self, entities: &EntityManager) {
        for entry in &mut self.systems {
            entry.rebuild(entities);
        }
    }
}
