//! # ECS World
//!
//! The central container for all entities, components, event subscriptions
//! and systems.
//!
//! Query, event and scheduler operations live next to their machinery in
//! `query.rs`, `event.rs` and `system.rs`; this file owns entity lifecycle
//! and single-entity component access.

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use super::component::{Component, ComponentInfo, ComponentRegistry};
use super::entity::{Entity, EntityAllocator};
use super::event::EventBus;
use super::storage::{AnyStorage, ComponentStorage};
use super::system::Scheduler;
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};
use crate::hierarchy::{Hierarchy, Name};

/// The ECS World - container for all UI state.
///
/// A world is single-threaded: it is neither `Send` nor `Sync`, and nothing
/// in it takes a lock.
///
/// # Example
///
/// ```rust
/// use kestrel_core::World;
///
/// struct Position(f32, f32);
/// struct Velocity(f32, f32);
///
/// let mut world = World::new();
/// let entity = world
///     .spawn()
///     .with(Position(0.0, 0.0))
///     .with(Velocity(1.0, 2.0))
///     .build();
///
/// world.join_mut::<Position, Velocity>(|_, pos, vel| {
///     pos.0 += vel.0;
///     pos.1 += vel.1;
/// });
///
/// assert_eq!(world.get::<Position>(entity).unwrap().1, 2.0);
/// ```
pub struct World {
    /// Generational index allocator.
    pub(crate) entities: EntityAllocator,
    /// Component type -> dense id.
    pub(crate) registry: ComponentRegistry,
    /// One store per registered component, indexed by `ComponentId`.
    pub(crate) stores: Vec<Box<dyn AnyStorage>>,
    /// Synchronous publish/subscribe.
    pub(crate) events: EventBus,
    /// Ordered systems.
    pub(crate) scheduler: Scheduler,
    /// World-scoped unique values keyed by type.
    singletons: FxHashMap<TypeId, Box<dyn Any>>,
    /// Nesting depth of `send` calls currently on the stack.
    pub(crate) dispatch_depth: usize,
    /// Settings this world was created with.
    pub(crate) config: WorldConfig,
}

impl World {
    /// Creates an empty world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world with the given configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            entities: EntityAllocator::with_capacity(config.initial_entity_capacity),
            registry: ComponentRegistry::new(),
            stores: Vec::new(),
            events: EventBus::new(),
            scheduler: Scheduler::new(),
            singletons: FxHashMap::default(),
            dispatch_depth: 0,
            config,
        }
    }

    /// Returns the configuration this world was created with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Starts building a new entity.
    ///
    /// The entity is allocated immediately; components added through the
    /// builder are visible to queries as soon as [`EntityBuilder::build`]
    /// returns.
    pub fn spawn(&mut self) -> EntityBuilder<'_> {
        let entity = self.spawn_empty();
        EntityBuilder {
            world: self,
            entity,
        }
    }

    /// Spawns an entity with no components.
    pub fn spawn_empty(&mut self) -> Entity {
        let entity = self.entities.allocate();
        trace!(%entity, "spawned entity");
        entity
    }

    /// Despawns an entity, removing all of its components.
    ///
    /// Returns `false` without side effects if the handle is dead, stale or
    /// null.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            trace!(%entity, "despawn ignored for dead handle");
            return false;
        }

        for store in &mut self.stores {
            store.remove_index(entity.index());
        }
        self.entities.free(entity);
        trace!(%entity, "despawned entity");
        true
    }

    /// Checks if the handle refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Iterates over all live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Reserves room for `additional` more entities.
    pub fn reserve(&mut self, additional: usize) {
        self.entities.reserve(additional);
    }

    /// Despawns every entity. Subscriptions, systems and singletons stay.
    pub fn clear(&mut self) {
        let alive: Vec<Entity> = self.entities.iter().collect();
        for entity in alive {
            self.despawn(entity);
        }
    }

    // =========================================================================
    // Component access
    // =========================================================================

    /// Attaches a component, overwriting any previous value of that type.
    ///
    /// Returns the previous value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] if the entity is not alive.
    pub fn add<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<Option<C>> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        Ok(self.storage_or_register::<C>().insert(entity, component))
    }

    /// Alias for [`World::add`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] if the entity is not alive.
    #[inline]
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<Option<C>> {
        self.add(entity, component)
    }

    /// Gets a component.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the entity is not alive
    /// - [`EcsError::ComponentNotFound`] if it has no `C`
    pub fn get<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.storage::<C>()
            .and_then(|store| store.get(entity))
            .ok_or_else(|| EcsError::component_not_found::<C>(entity))
    }

    /// Gets a component mutably.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the entity is not alive
    /// - [`EcsError::ComponentNotFound`] if it has no `C`
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.storage_mut::<C>()
            .and_then(|store| store.get_mut(entity))
            .ok_or_else(|| EcsError::component_not_found::<C>(entity))
    }

    /// Gets a component, or `None` if the entity is dead or lacks it.
    #[inline]
    #[must_use]
    pub fn try_get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.storage::<C>()?.get(entity)
    }

    /// Gets a component mutably, or `None` if the entity is dead or lacks it.
    #[inline]
    pub fn try_get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.storage_mut::<C>()?.get_mut(entity)
    }

    /// Checks if the entity is alive and carries a `C`. Never fails.
    #[inline]
    #[must_use]
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.storage::<C>().is_some_and(|store| store.get(entity).is_some())
    }

    /// Removes a component. Returns whether anything was removed.
    pub fn remove<C: Component>(&mut self, entity: Entity) -> bool {
        self.take::<C>(entity).is_some()
    }

    /// Removes a component and returns it.
    pub fn take<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.storage_mut::<C>()?.remove(entity)
    }

    /// Returns metadata for every component type attached to `entity`.
    ///
    /// This is the entity's implicit archetype; it is computed on demand.
    #[must_use]
    pub fn component_types(&self, entity: Entity) -> Vec<ComponentInfo> {
        if !self.entities.is_alive(entity) {
            return Vec::new();
        }
        self.registry
            .iter()
            .filter(|info| self.stores[info.id.index()].contains(entity))
            .copied()
            .collect()
    }

    /// Returns metadata for every component type registered so far.
    pub fn registered_components(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.registry.iter()
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Returns the store for `C`, if the type has been used.
    #[must_use]
    pub fn storage<C: Component>(&self) -> Option<&ComponentStorage<C>> {
        let id = self.registry.id_of::<C>()?;
        self.stores[id.index()].as_any().downcast_ref()
    }

    /// Returns the store for `C` mutably, if the type has been used.
    pub fn storage_mut<C: Component>(&mut self) -> Option<&mut ComponentStorage<C>> {
        let id = self.registry.id_of::<C>()?;
        self.stores[id.index()].as_any_mut().downcast_mut()
    }

    /// Returns the type-erased store for `C`, if the type has been used.
    pub(crate) fn erased_storage<C: Component>(&self) -> Option<&dyn AnyStorage> {
        let id = self.registry.id_of::<C>()?;
        Some(self.stores[id.index()].as_ref())
    }

    fn storage_or_register<C: Component>(&mut self) -> &mut ComponentStorage<C> {
        let (id, created) = self.registry.register::<C>();
        if created {
            trace!(component = std::any::type_name::<C>(), id = id.index(), "registered component");
            self.stores.push(Box::new(ComponentStorage::<C>::with_capacity(
                self.config.initial_component_capacity,
            )));
        }
        self.stores[id.index()]
            .as_any_mut()
            .downcast_mut()
            .expect("component store registered under the wrong type")
    }

    // =========================================================================
    // Singletons
    // =========================================================================

    /// Stores a world-scoped unique value, returning the previous one.
    pub fn set_singleton<T: 'static>(&mut self, value: T) -> Option<T> {
        self.singletons
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Gets a singleton.
    #[must_use]
    pub fn singleton<T: 'static>(&self) -> Option<&T> {
        self.singletons.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Gets a singleton mutably.
    pub fn singleton_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.singletons.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// Checks if a singleton of type `T` is set.
    #[must_use]
    pub fn has_singleton<T: 'static>(&self) -> bool {
        self.singletons.contains_key(&TypeId::of::<T>())
    }

    /// Removes a singleton and returns it.
    pub fn remove_singleton<T: 'static>(&mut self) -> Option<T> {
        self.singletons
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fluent entity construction, returned by [`World::spawn`].
pub struct EntityBuilder<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl EntityBuilder<'_> {
    /// Attaches a component.
    #[must_use]
    pub fn with<C: Component>(self, component: C) -> Self {
        self.world.storage_or_register::<C>().insert(self.entity, component);
        self
    }

    /// Attaches a [`Name`].
    #[must_use]
    pub fn named(self, name: impl Into<String>) -> Self {
        self.with(Name::new(name))
    }

    /// Parents the entity under `parent`.
    ///
    /// A dead parent is logged and ignored.
    #[must_use]
    pub fn child_of(self, parent: Entity) -> Self {
        if let Err(err) = self.world.set_parent(self.entity, parent) {
            warn!(entity = %self.entity, %err, "ignoring parent for new entity");
        }
        self
    }

    /// Returns the handle of the entity under construction.
    #[must_use]
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Finishes construction.
    pub fn build(self) -> Entity {
        self.entity
    }
}
