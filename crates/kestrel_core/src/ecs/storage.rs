//! # Component Storage
//!
//! Sparse-set storage for a single component type.
//!
//! ```text
//! sparse:   [2, -, 0, -, 1]      <- entity index -> dense slot
//! entities: [E2, E4, E0]          <- packed, iteration order
//! data:     [C2, C4, C0]
//! ```
//!
//! - Insert, lookup and remove are O(1)
//! - Removal swap-removes, so the dense arrays stay packed
//! - Every lookup checks the stored generation, so stale handles miss

use std::any::Any;

use super::component::Component;
use super::entity::Entity;

/// Sentinel for an unoccupied sparse entry.
const EMPTY: u32 = u32::MAX;

/// Type-erased view of a component store.
///
/// The world keeps one boxed store per component type and uses this trait
/// for the operations that do not need the concrete type (despawn,
/// exclusion filters, diagnostics).
pub trait AnyStorage {
    /// Removes whatever entry occupies `index`, ignoring generations.
    ///
    /// Used by despawn, after the allocator has validated the handle.
    fn remove_index(&mut self, index: u32) -> bool;

    /// Checks if the store holds a value for exactly this handle.
    fn contains(&self, entity: Entity) -> bool;

    /// Returns the number of stored components.
    fn len(&self) -> usize;

    /// Checks if the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&mut self);

    /// Returns the component type name.
    fn component_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete store.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete store.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Storage for one component type.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{ComponentStorage, Entity};
///
/// let mut storage: ComponentStorage<u32> = ComponentStorage::new();
/// let entity = Entity::new(7, 0);
/// storage.insert(entity, 42);
/// assert_eq!(storage.get(entity), Some(&42));
/// assert_eq!(storage.get(Entity::new(7, 1)), None);
/// ```
#[derive(Debug)]
pub struct ComponentStorage<C> {
    /// Entity index -> dense slot.
    sparse: Vec<u32>,
    /// Dense entity handles, parallel to `data`.
    entities: Vec<Entity>,
    /// Dense component values.
    data: Vec<C>,
}

impl<C> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            data: Vec::new(),
        }
    }
}

impl<C: Component> ComponentStorage<C> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let slot = *self.sparse.get(entity.index() as usize)?;
        if slot == EMPTY {
            return None;
        }
        let dense = slot as usize;
        (self.entities[dense] == entity).then_some(dense)
    }

    /// Inserts or overwrites the component for `entity`.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, entity: Entity, component: C) -> Option<C> {
        let index = entity.index() as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, EMPTY);
        }

        let slot = self.sparse[index];
        if slot != EMPTY {
            let dense = slot as usize;
            self.entities[dense] = entity;
            return Some(std::mem::replace(&mut self.data[dense], component));
        }

        self.sparse[index] = self.entities.len() as u32;
        self.entities.push(entity);
        self.data.push(component);
        None
    }

    /// Gets the component for `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        self.dense_index(entity).map(|dense| &self.data[dense])
    }

    /// Gets the component for `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        self.dense_index(entity).map(|dense| &mut self.data[dense])
    }

    /// Removes and returns the component for `entity`.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let dense = self.dense_index(entity)?;
        Some(self.swap_remove(dense))
    }

    fn swap_remove(&mut self, dense: usize) -> C {
        let removed = self.entities[dense];
        self.sparse[removed.index() as usize] = EMPTY;

        let last = self.entities.len() - 1;
        if dense != last {
            let moved = self.entities[last];
            self.sparse[moved.index() as usize] = dense as u32;
        }
        self.entities.swap_remove(dense);
        self.data.swap_remove(dense)
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if the store is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the packed entity handles in iteration order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the handle at a dense slot.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, dense: usize) -> Entity {
        self.entities[dense]
    }

    /// Returns the packed component values.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }

    /// Returns the packed component values mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.data
    }

    /// Iterates over `(entity, component)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.entities.iter().copied().zip(self.data.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut C)> {
        self.entities.iter().copied().zip(self.data.iter_mut())
    }
}

impl<C: Component> AnyStorage for ComponentStorage<C> {
    fn remove_index(&mut self, index: u32) -> bool {
        match self.sparse.get(index as usize) {
            Some(&slot) if slot != EMPTY => {
                self.swap_remove(slot as usize);
                true
            }
            _ => false,
        }
    }

    fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn clear(&mut self) {
        self.sparse.clear();
        self.entities.clear();
        self.data.clear();
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
