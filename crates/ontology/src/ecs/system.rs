// system.rs - Processing units run by the system manager

use crate::config::DispatchMode;
use crate::ecs::storage::ComponentStore;
use crate::ecs::{Component, EcsError, EntityId, EntityManager, EntityRef, EntityView, Keyed};
use rayon::prelude::*;
use std::any::Any;

/// A system that visits its entities one at a time on the calling thread.
///
/// # Example
/// ```ignore
/// struct Gravity;
/// define_system!(Gravity);
///
/// impl System for Gravity {
///     fn process_entity(&mut self, mut entity: EntityView<'_>) -> Result<(), EcsError> {
///         entity.get_mut::<Velocity>()?.y -= 9.81;
///         Ok(())
///     }
/// }
/// ```
pub trait System: Keyed + Send {
    /// Called once, before the first update after registration.
    fn initialise(&mut self) {}

    fn process_entity(&mut self, entity: EntityView<'_>) -> Result<(), EcsError>;
}

/// A system whose per-entity work may run concurrently.
///
/// Each call may only mutate its own entity's `Target` component; every
/// other component is read-only. During the system's run the `Target`
/// store is lent out, so reading `Target` through the `EntityRef` fails.
pub trait ParallelSystem: Keyed + Send + Sync {
    type Target: Component;

    fn initialise(&mut self) {}

    fn process_entity(
        &self,
        entity: EntityRef<'_>,
        target: &mut Self::Target,
    ) -> Result<(), EcsError>;
}

/// Object-safe driver shared by both system kinds.
pub(crate) trait SystemRunner: Send {
    fn initialise(&mut self);

    fn run(
        &mut self,
        working: &[EntityId],
        entities: &mut EntityManager,
        dispatch: DispatchMode,
    ) -> Result<(), EcsError>;

    fn system(&self) -> &dyn Any;
    fn system_mut(&mut self) -> &mut dyn Any;
    fn into_system(self: Box<Self>) -> Box<dyn Any>;
}

pub(crate) struct SerialRunner<S>(pub S);

impl<S: System> SystemRunner for SerialRunner<S> {
    fn initialise(&mut self) {
        self.0.initialise();
    }

    fn run(
        &mut self,
        working: &[EntityId],
        entities: &mut EntityManager,
        _dispatch: DispatchMode,
    ) -> Result<(), EcsError> {
        for &id in working {
            let index = entities.lookup(id, "update")?;
            self.0.process_entity(EntityView::new(entities, index))?;
        }
        Ok(())
    }

    fn system(&self) -> &dyn Any {
        &self.0
    }

    fn system_mut(&mut self) -> &mut dyn Any {
        &mut self.0
    }

    fn into_system(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.0)
    }
}

/// A store moved out of the registry for the length of one run. Dropping
/// it puts the values back, also when a system panics mid-run.
struct Lent<'a, T: Component> {
    entities: &'a mut EntityManager,
    values: ComponentStore<T>,
}

impl<'a, T: Component> Lent<'a, T> {
    fn checkout(entities: &'a mut EntityManager) -> Self {
        let values = entities.stores_mut().checkout::<T>();
        Self { entities, values }
    }
}

impl<T: Component> Drop for Lent<'_, T> {
    fn drop(&mut self) {
        let values = std::mem::take(&mut self.values);
        self.entities.stores_mut().checkin(values);
    }
}

pub(crate) struct ParallelRunner<S>(pub S);

impl<S: ParallelSystem> SystemRunner for ParallelRunner<S> {
    fn initialise(&mut self) {
        self.0.initialise();
    }

    fn run(
        &mut self,
        working: &[EntityId],
        entities: &mut EntityManager,
        dispatch: DispatchMode,
    ) -> Result<(), EcsError> {
        let key = <S::Target as Keyed>::type_key();

        // (store position, entity index) of every target, in working order
        let mut targets = Vec::with_capacity(working.len());
        for &id in working {
            let index = entities.lookup(id, "update")?;
            if let Some(position) = entities.entities()[index].position_of_key(key) {
                targets.push((position, index));
            }
        }

        let mut lent = Lent::<S::Target>::checkout(entities);
        let system = &self.0;
        let shared: &EntityManager = &*lent.entities;
        let values = &mut lent.values;

        let result = match dispatch {
            DispatchMode::Serial => targets.iter().try_for_each(|&(position, index)| {
                match values.get_mut(position) {
                    Some(value) => system.process_entity(EntityRef::new(shared, index), value),
                    None => Ok(()),
                }
            }),
            DispatchMode::Parallel => {
                let mut owners = vec![None; values.len()];
                for &(position, index) in &targets {
                    if let Some(owner) = owners.get_mut(position) {
                        *owner = Some(index);
                    }
                }

                values
                    .as_mut_slice()
                    .par_iter_mut()
                    .zip(owners.par_iter())
                    .try_for_each(|(value, owner)| match owner {
                        Some(index) => system.process_entity(EntityRef::new(shared, *index), value),
                        None => Ok(()),
                    })
            }
        };

        drop(lent);
        result
    }

    fn system(&self) -> &dyn Any {
        &self.0
    }

    fn system_mut(&mut self) -> &mut dyn Any {
        &mut self.0
    }

    fn into_system(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.0)
    }
}
