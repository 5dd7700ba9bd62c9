//! # Entity Hierarchy
//!
//! Parent/child links and names, stored as ordinary components.
//!
//! ```text
//! window ── Children([toolbar, body])
//!   ├─ toolbar ── Parent(window)
//!   └─ body    ── Parent(window), Children([input])
//!        └─ input ── Parent(body)
//! ```
//!
//! Links are kept consistent on both sides by the [`Hierarchy`] methods.
//! Despawning a parent with plain [`World::despawn`] leaves its children
//! orphaned; [`Hierarchy::despawn_recursive`] removes the whole subtree.

use std::fmt;

use tracing::warn;

use crate::ecs::{Entity, World};
use crate::error::{EcsError, EcsResult};

/// The entity this one is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Entities attached to this one, in attachment order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Children(pub Vec<Entity>);

/// Human-readable entity name, used for lookup and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    /// Creates a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tree and naming operations on a [`World`].
///
/// # Example
///
/// ```rust
/// use kestrel_core::{Hierarchy, World};
///
/// let mut world = World::new();
/// let window = world.spawn().named("window").build();
/// let button = world.spawn().named("ok").child_of(window).build();
///
/// assert_eq!(world.parent(button), Some(window));
/// assert_eq!(world.find_by_name("ok"), Some(button));
///
/// assert_eq!(world.despawn_recursive(window), 2);
/// assert!(!world.is_alive(button));
/// ```
pub trait Hierarchy {
    /// Attaches `child` under `parent`, detaching it from any previous parent.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if either entity is not alive
    /// - [`EcsError::HierarchyCycle`] if `parent` is `child` or one of its
    ///   descendants
    fn set_parent(&mut self, child: Entity, parent: Entity) -> EcsResult<()>;

    /// Detaches `child` from its parent. Returns whether it had one.
    fn clear_parent(&mut self, child: Entity) -> bool;

    /// Returns the live parent of `child`, if any.
    fn parent(&self, child: Entity) -> Option<Entity>;

    /// Returns the live children of `parent`, in attachment order.
    fn children(&self, parent: Entity) -> Vec<Entity>;

    /// Returns every live descendant of `root`, depth-first, pre-order.
    fn descendants(&self, root: Entity) -> Vec<Entity>;

    /// Sets the [`Name`] of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] if the entity is not alive.
    fn set_name(&mut self, entity: Entity, name: impl Into<String>) -> EcsResult<()>;

    /// Returns the name of an entity.
    fn name(&self, entity: Entity) -> Option<&str>;

    /// Finds the first entity (in storage order) with the given name.
    fn find_by_name(&self, name: &str) -> Option<Entity>;

    /// Despawns `root` and all of its descendants. Returns how many entities
    /// were despawned.
    fn despawn_recursive(&mut self, root: Entity) -> usize;
}

impl Hierarchy for World {
    fn set_parent(&mut self, child: Entity, parent: Entity) -> EcsResult<()> {
        for entity in [child, parent] {
            if !self.is_alive(entity) {
                return Err(EcsError::InvalidEntity(entity));
            }
        }

        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                warn!(%child, %parent, "rejected hierarchy cycle");
                return Err(EcsError::HierarchyCycle { child, parent });
            }
            cursor = self.parent(ancestor);
        }

        self.clear_parent(child);
        self.add(child, Parent(parent))?;
        match self.try_get_mut::<Children>(parent) {
            Some(children) => children.0.push(child),
            None => {
                self.add(parent, Children(vec![child]))?;
            }
        }
        Ok(())
    }

    fn clear_parent(&mut self, child: Entity) -> bool {
        let Some(Parent(parent)) = self.take::<Parent>(child) else {
            return false;
        };
        if let Some(children) = self.try_get_mut::<Children>(parent) {
            children.0.retain(|&entry| entry != child);
        }
        true
    }

    fn parent(&self, child: Entity) -> Option<Entity> {
        self.try_get::<Parent>(child)
            .map(|parent| parent.0)
            .filter(|&parent| self.is_alive(parent))
    }

    fn children(&self, parent: Entity) -> Vec<Entity> {
        self.try_get::<Children>(parent)
            .map(|children| {
                children
                    .0
                    .iter()
                    .copied()
                    .filter(|&child| self.is_alive(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn descendants(&self, root: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut stack: Vec<Entity> = self.children(root).into_iter().rev().collect();
        while let Some(entity) = stack.pop() {
            out.push(entity);
            stack.extend(self.children(entity).into_iter().rev());
        }
        out
    }

    fn set_name(&mut self, entity: Entity, name: impl Into<String>) -> EcsResult<()> {
        self.add(entity, Name::new(name)).map(|_| ())
    }

    fn name(&self, entity: Entity) -> Option<&str> {
        self.try_get::<Name>(entity).map(Name::as_str)
    }

    fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.iter::<Name>()
            .find(|(_, candidate)| candidate.as_str() == name)
            .map(|(entity, _)| entity)
    }

    fn despawn_recursive(&mut self, root: Entity) -> usize {
        if !self.is_alive(root) {
            return 0;
        }
        let subtree = self.descendants(root);
        self.clear_parent(root);

        let mut despawned = usize::from(self.despawn(root));
        for entity in subtree {
            despawned += usize::from(self.despawn(entity));
        }
        despawned
    }
}
