//! Component storage.
//!
//! Each component type has one dense [`ComponentStore`] shared by every
//! entity that owns a value of that type. Values are kept in entity
//! creation order. The [`StoreRegistry`] owns the stores, counts
//! registrations through [`StoreLease`]s and drops a store when its last
//! value goes away.

mod registry;
mod store;

pub use registry::StoreLease;
pub(crate) use registry::StoreRegistry;
pub use store::ComponentStore;
