// error.rs - ECS error types and the configurable failure policy

use crate::ecs::{EntityId, TypeKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How an entity was looked up when the lookup failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityLookup {
    Id(EntityId),
    Position(usize),
}

impl fmt::Display for EntityLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityLookup::Id(id) => write!(f, "entity {id}"),
            EntityLookup::Position(position) => write!(f, "entity at position {position}"),
        }
    }
}

/// Errors raised by entity, component and system operations.
///
/// All of these are programmer errors. Checks run before any state
/// changes, so a failed call leaves the world as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    #[error("{operation}: entity {entity} already has component {component}")]
    DuplicateComponent {
        operation: &'static str,
        entity: EntityId,
        component: TypeKey,
    },

    #[error("{operation}: entity {entity} has no component {component}")]
    InvalidComponent {
        operation: &'static str,
        entity: EntityId,
        component: TypeKey,
    },

    #[error("{operation}: system {system} is already registered")]
    DuplicateSystem {
        operation: &'static str,
        system: TypeKey,
    },

    #[error("{operation}: system {system} is not registered")]
    InvalidSystem {
        operation: &'static str,
        system: TypeKey,
    },

    #[error("{operation}: no such {entity}")]
    InvalidEntity {
        operation: &'static str,
        entity: EntityLookup,
    },

    #[error("{operation}: prototype '{name}' does not exist")]
    InvalidPrototype { operation: &'static str, name: String },

    #[error("{operation}: prototype '{name}' already exists")]
    DuplicatePrototype { operation: &'static str, name: String },

    #[error("{operation}: system {system} depends on {dependency}, which is already being resolved")]
    CircularDependency {
        operation: &'static str,
        system: TypeKey,
        dependency: TypeKey,
    },

    #[error("{operation}: entity identifiers exhausted")]
    IdentifierOverflow { operation: &'static str },
}

/// Discriminant of an [`EcsError`], for matching without the payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateComponent,
    InvalidComponent,
    DuplicateSystem,
    InvalidSystem,
    InvalidEntity,
    InvalidPrototype,
    DuplicatePrototype,
    CircularDependency,
    IdentifierOverflow,
}

impl EcsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EcsError::DuplicateComponent { .. } => ErrorKind::DuplicateComponent,
            EcsError::InvalidComponent { .. } => ErrorKind::InvalidComponent,
            EcsError::DuplicateSystem { .. } => ErrorKind::DuplicateSystem,
            EcsError::InvalidSystem { .. } => ErrorKind::InvalidSystem,
            EcsError::InvalidEntity { .. } => ErrorKind::InvalidEntity,
            EcsError::InvalidPrototype { .. } => ErrorKind::InvalidPrototype,
            EcsError::DuplicatePrototype { .. } => ErrorKind::DuplicatePrototype,
            EcsError::CircularDependency { .. } => ErrorKind::CircularDependency,
            EcsError::IdentifierOverflow { .. } => ErrorKind::IdentifierOverflow,
        }
    }

    /// Name of the operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            EcsError::DuplicateComponent { operation, .. }
            | EcsError::InvalidComponent { operation, .. }
            | EcsError::DuplicateSystem { operation, .. }
            | EcsError::InvalidSystem { operation, .. }
            | EcsError::InvalidEntity { operation, .. }
            | EcsError::InvalidPrototype { operation, .. }
            | EcsError::DuplicatePrototype { operation, .. }
            | EcsError::CircularDependency { operation, .. }
            | EcsError::IdentifierOverflow { operation } => operation,
        }
    }
}

/// What happens when a precondition fails.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Return the error to the caller.
    #[default]
    Raise,
    /// Panic with the error's message.
    Assert,
    /// Skip checks that only guard against duplicates. Failures that leave
    /// nothing to return are still reported as errors.
    Unchecked,
}

impl ErrorMode {
    /// Whether duplicate checks run.
    #[inline]
    pub fn checks_enabled(self) -> bool {
        self != ErrorMode::Unchecked
    }

    /// Route a failure according to the mode.
    #[track_caller]
    pub fn reject<T>(self, error: EcsError) -> Result<T, EcsError> {
        if self == ErrorMode::Assert {
            panic!("{error}");
        }
        Err(error)
    }
}

/// Fail the enclosing function when a skippable precondition does not hold.
///
/// The error expression is only evaluated on failure.
macro_rules! ensure {
    ($mode:expr, $cond:expr, $error:expr $(,)?) => {
        if $mode.checks_enabled() && !$cond {
            return $mode.reject($error);
        }
    };
}

pub(crate) use ensure;

#[cfg(test)]
mod tests {
    use super::*;

    fn overflow() -> EcsError {
        EcsError::IdentifierOverflow {
            operation: "create_entity",
        }
    }

    #[test]
    fn raise_returns_error() {
        let result: Result<(), EcsError> = ErrorMode::Raise.reject(overflow());
        let error = result.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::IdentifierOverflow);
        assert_eq!(error.operation(), "create_entity");
    }

    #[test]
    #[should_panic(expected = "entity identifiers exhausted")]
    fn assert_panics_with_message() {
        let _: Result<(), EcsError> = ErrorMode::Assert.reject(overflow());
    }

    #[test]
    fn unchecked_skips_ensure() {
        fn guarded(mode: ErrorMode) -> Result<u32, EcsError> {
            ensure!(mode, false, overflow());
            Ok(7)
        }
        assert_eq!(guarded(ErrorMode::Unchecked), Ok(7));
        assert!(guarded(ErrorMode::Raise).is_err());
    }

    #[test]
    fn messages_name_operation_and_keys() {
        let error = EcsError::InvalidEntity {
            operation: "destroy_entity",
            entity: EntityLookup::Id(EntityId::from_raw(4)),
        };
        assert_eq!(error.to_string(), "destroy_entity: no such entity #4");
    }
}
