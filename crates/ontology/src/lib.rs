//! Ontology
//!
//! Entity-component-system runtime core:
//! - Per-type component stores kept in entity creation order
//! - Systems scheduled by declared dependencies
//! - Working sets kept current through lifecycle notifications
//! - Serial or rayon-backed parallel dispatch

pub mod config;
pub mod ecs;

pub use config::{DispatchMode, WorldConfig};
pub use ecs::{EcsError, ErrorMode, World};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
