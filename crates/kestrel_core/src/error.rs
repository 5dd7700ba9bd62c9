//! # ECS Error Types
//!
//! All recoverable errors surfaced by the runtime.
//!
//! Contract violations (initializing a system twice, updating a world that
//! has been shut down) are not errors; they are debug assertions.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur when operating on a [`World`](crate::World).
#[derive(Error, Debug)]
pub enum EcsError {
    /// The entity handle is dead, stale, or `Entity::NULL`.
    #[error("invalid entity: {0} is not alive")]
    InvalidEntity(Entity),

    /// The entity is alive but does not carry the requested component.
    #[error("component not found: {entity} has no {component}")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// Parenting would make an entity its own ancestor.
    #[error("hierarchy cycle: {child} cannot be parented to {parent}")]
    HierarchyCycle {
        /// The entity being re-parented.
        child: Entity,
        /// The requested parent.
        parent: Entity,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl EcsError {
    /// Builds a [`EcsError::ComponentNotFound`] for component type `C`.
    #[must_use]
    pub fn component_not_found<C: 'static>(entity: Entity) -> Self {
        Self::ComponentNotFound {
            entity,
            component: std::any::type_name::<C>(),
        }
    }

    /// Returns true if this error reports a dead or stale handle.
    #[must_use]
    pub const fn is_invalid_entity(&self) -> bool {
        matches!(self, Self::InvalidEntity(_))
    }

    /// Returns true if this error reports a missing component.
    #[must_use]
    pub const fn is_component_not_found(&self) -> bool {
        matches!(self, Self::ComponentNotFound { .. })
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
