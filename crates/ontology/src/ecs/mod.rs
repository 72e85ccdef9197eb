//! Entity Component System core types.
//!
//! Entities are identifiers plus a list of component slots. Every
//! component type has one dense store kept in entity creation order, and
//! systems run in an order derived from their declared dependencies over
//! the entities that own the components they require.

mod component;
mod entity;
mod entity_manager;
mod error;
mod listener;
mod prototype;
mod schedule;
pub mod storage;
mod system;
mod system_descriptor;
mod system_manager;
mod type_key;
mod view;
mod world;

pub use component::{Component, ComponentSet};
pub use entity::{Entity, EntityId};
pub use entity_manager::EntityManager;
pub use error::{EcsError, EntityLookup, ErrorKind, ErrorMode};
pub use listener::{EntityManagerListener, ListenerId};
pub use prototype::EntityPrototype;
pub use system::{ParallelSystem, System};
pub use system_descriptor::SystemDescriptor;
pub use system_manager::SystemManager;
pub use type_key::{KeySet, Keyed, TypeKey, TypeKeyCell, TypeSet};
pub use view::{EntityMut, EntityRef, EntityView};
pub use world::World;
