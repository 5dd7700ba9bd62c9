//! # Queries
//!
//! Multi-component iteration over sparse-set stores.
//!
//! A query walks the smallest store among its component types and probes
//! the others by entity index, so `(Rare, Common)` costs `O(|Rare|)`.
//!
//! ```text
//! query::<(Position, Velocity)>()
//!   driver = smaller of { Position.entities, Velocity.entities }
//!   for entity in driver:
//!       Position.get(entity)? , Velocity.get(entity)? , !excluded(entity)
//! ```
//!
//! Queries borrow the world immutably. To mutate structure (despawn, add or
//! remove components) while walking matches, take an [`EntitySnapshot`]
//! first. For in-place mutation of two or three components, use
//! [`World::join_mut`] / [`World::join3_mut`].

use std::any::TypeId;

use super::component::Component;
use super::entity::Entity;
use super::storage::{AnyStorage, ComponentStorage};
use super::world::World;

/// A tuple of component types that can be queried together.
///
/// Implemented for tuples of one to four component types.
pub trait QueryData: 'static {
    /// Borrowed stores, one per component type.
    type Stores<'w>: Copy;
    /// References yielded per matching entity.
    type Item<'w>;

    /// Looks up every store. `None` if any type has never been used, in
    /// which case nothing can match.
    fn fetch_stores(world: &World) -> Option<Self::Stores<'_>>;

    /// Returns the packed entity list of the smallest store.
    fn driver<'w>(stores: Self::Stores<'w>) -> &'w [Entity];

    /// Fetches every component of `entity`, or `None` if one is missing.
    fn fetch<'w>(stores: Self::Stores<'w>, entity: Entity) -> Option<Self::Item<'w>>;
}

macro_rules! impl_query_data {
    ($($name:ident),+) => {
        impl<$($name: Component),+> QueryData for ($($name,)+) {
            type Stores<'w> = ($(&'w ComponentStorage<$name>,)+);
            type Item<'w> = ($(&'w $name,)+);

            fn fetch_stores(world: &World) -> Option<Self::Stores<'_>> {
                Some(($(world.storage::<$name>()?,)+))
            }

            #[allow(non_snake_case)]
            fn driver<'w>(stores: Self::Stores<'w>) -> &'w [Entity] {
                let ($($name,)+) = stores;
                [$($name.entities()),+]
                    .into_iter()
                    .min_by_key(|entities| entities.len())
                    .unwrap_or(&[])
            }

            #[allow(non_snake_case)]
            fn fetch<'w>(stores: Self::Stores<'w>, entity: Entity) -> Option<Self::Item<'w>> {
                let ($($name,)+) = stores;
                Some(($($name.get(entity)?,)+))
            }
        }
    };
}

impl_query_data!(A);
impl_query_data!(A, B);
impl_query_data!(A, B, C);
impl_query_data!(A, B, C, D);

/// Iterator over entities carrying every component in `Q`.
///
/// Yields `(entity, (&A, &B, ...))`. Created by [`World::query`].
pub struct Query<'w, Q: QueryData> {
    world: &'w World,
    stores: Option<Q::Stores<'w>>,
    driver: &'w [Entity],
    cursor: usize,
    excluded: Vec<&'w dyn AnyStorage>,
}

impl<'w, Q: QueryData> Query<'w, Q> {
    fn new(world: &'w World) -> Self {
        let stores = Q::fetch_stores(world);
        let driver = stores.map_or(&[][..], Q::driver);
        Self {
            world,
            stores,
            driver,
            cursor: 0,
            excluded: Vec::new(),
        }
    }

    /// Skips entities that carry a `C`.
    #[must_use]
    pub fn without<C: Component>(mut self) -> Self {
        if let Some(store) = self.world.erased_storage::<C>() {
            self.excluded.push(store);
        }
        self
    }

    /// Iterates over matching entities only.
    pub fn entities(self) -> impl Iterator<Item = Entity> + 'w {
        self.map(|(entity, _)| entity)
    }

    /// Collects the matching entities into an owned snapshot.
    #[must_use]
    pub fn snapshot(self) -> EntitySnapshot {
        EntitySnapshot {
            entities: self.entities().collect(),
        }
    }
}

impl<'w, Q: QueryData> Iterator for Query<'w, Q> {
    type Item = (Entity, Q::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        let stores = self.stores?;
        while let Some(&entity) = self.driver.get(self.cursor) {
            self.cursor += 1;
            if self.excluded.iter().any(|store| store.contains(entity)) {
                continue;
            }
            if let Some(item) = Q::fetch(stores, entity) {
                return Some((entity, item));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.driver.len() - self.cursor))
    }
}

/// Owned list of entities captured from a query.
///
/// Holds no borrow of the world, so the world may be changed freely while
/// walking it. Entities despawned in the meantime are still listed; check
/// [`World::is_alive`] where it matters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntitySnapshot {
    entities: Vec<Entity>,
}

impl EntitySnapshot {
    /// Returns the number of captured entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over the captured entities.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    /// Checks if `entity` was captured.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Returns the captured entities as a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Entity> {
        self.entities
    }
}

impl IntoIterator for EntitySnapshot {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a EntitySnapshot {
    type Item = Entity;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Entity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter().copied()
    }
}

impl World {
    /// Iterates over entities carrying every component in `Q`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use kestrel_core::World;
    ///
    /// struct Position(f32);
    /// struct Velocity(f32);
    /// struct Frozen;
    ///
    /// let mut world = World::new();
    /// world.spawn().with(Position(0.0)).with(Velocity(1.0)).build();
    /// world.spawn().with(Position(0.0)).with(Velocity(1.0)).with(Frozen).build();
    /// world.spawn().with(Position(0.0)).build();
    ///
    /// let moving = world.query::<(Position, Velocity)>().without::<Frozen>().count();
    /// assert_eq!(moving, 1);
    /// ```
    #[must_use]
    pub fn query<Q: QueryData>(&self) -> Query<'_, Q> {
        Query::new(self)
    }

    /// Captures the entities matching `Q` into an owned snapshot.
    #[must_use]
    pub fn query_entities<Q: QueryData>(&self) -> EntitySnapshot {
        self.query::<Q>().snapshot()
    }

    /// Like [`World::query_entities`], skipping entities that carry an `X`.
    #[must_use]
    pub fn query_entities_without<Q: QueryData, X: Component>(&self) -> EntitySnapshot {
        self.query::<Q>().without::<X>().snapshot()
    }

    /// Counts the entities matching `Q`.
    #[must_use]
    pub fn count<Q: QueryData>(&self) -> usize {
        self.query::<Q>().count()
    }

    /// Iterates over every `(entity, &C)` pair in storage order.
    pub fn iter<C: Component>(&self) -> impl Iterator<Item = (Entity, &C)> + '_ {
        self.storage::<C>().into_iter().flat_map(|store| store.iter())
    }

    /// Iterates mutably over every `(entity, &mut C)` pair in storage order.
    pub fn iter_mut<C: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut C)> + '_ {
        self.storage_mut::<C>().into_iter().flat_map(|store| store.iter_mut())
    }

    /// Visits every entity carrying both `A` and `B`, with mutable access to
    /// each.
    ///
    /// `A` and `B` must be different types.
    pub fn join_mut<A, B>(&mut self, mut f: impl FnMut(Entity, &mut A, &mut B))
    where
        A: Component,
        B: Component,
    {
        debug_assert_ne!(TypeId::of::<A>(), TypeId::of::<B>(), "join_mut needs distinct component types");
        let (Some(a_id), Some(b_id)) = (self.registry.id_of::<A>(), self.registry.id_of::<B>()) else {
            return;
        };

        let mut a_store = None;
        let mut b_store = None;
        for (index, store) in self.stores.iter_mut().enumerate() {
            if index == a_id.index() {
                a_store = store.as_any_mut().downcast_mut::<ComponentStorage<A>>();
            } else if index == b_id.index() {
                b_store = store.as_any_mut().downcast_mut::<ComponentStorage<B>>();
            }
        }
        let (Some(a), Some(b)) = (a_store, b_store) else {
            return;
        };

        if a.len() <= b.len() {
            for (entity, a) in a.iter_mut() {
                if let Some(b) = b.get_mut(entity) {
                    f(entity, a, b);
                }
            }
        } else {
            for (entity, b) in b.iter_mut() {
                if let Some(a) = a.get_mut(entity) {
                    f(entity, a, b);
                }
            }
        }
    }

    /// Visits every entity carrying `A`, `B` and `C`, with mutable access to
    /// each.
    ///
    /// The three types must be distinct.
    pub fn join3_mut<A, B, C>(&mut self, mut f: impl FnMut(Entity, &mut A, &mut B, &mut C))
    where
        A: Component,
        B: Component,
        C: Component,
    {
        debug_assert!(
            TypeId::of::<A>() != TypeId::of::<B>()
                && TypeId::of::<A>() != TypeId::of::<C>()
                && TypeId::of::<B>() != TypeId::of::<C>(),
            "join3_mut needs distinct component types"
        );
        let (Some(a_id), Some(b_id), Some(c_id)) = (
            self.registry.id_of::<A>(),
            self.registry.id_of::<B>(),
            self.registry.id_of::<C>(),
        ) else {
            return;
        };

        let mut a_store = None;
        let mut b_store = None;
        let mut c_store = None;
        for (index, store) in self.stores.iter_mut().enumerate() {
            if index == a_id.index() {
                a_store = store.as_any_mut().downcast_mut::<ComponentStorage<A>>();
            } else if index == b_id.index() {
                b_store = store.as_any_mut().downcast_mut::<ComponentStorage<B>>();
            } else if index == c_id.index() {
                c_store = store.as_any_mut().downcast_mut::<ComponentStorage<C>>();
            }
        }
        let (Some(a), Some(b), Some(c)) = (a_store, b_store, c_store) else {
            return;
        };

        let smallest = a.len().min(b.len()).min(c.len());
        if a.len() == smallest {
            for (entity, a) in a.iter_mut() {
                if let (Some(b), Some(c)) = (b.get_mut(entity), c.get_mut(entity)) {
                    f(entity, a, b, c);
                }
            }
        } else if b.len() == smallest {
            for (entity, b) in b.iter_mut() {
                if let (Some(a), Some(c)) = (a.get_mut(entity), c.get_mut(entity)) {
                    f(entity, a, b, c);
                }
            }
        } else {
            for (entity, c) in c.iter_mut() {
                if let (Some(a), Some(b)) = (a.get_mut(entity), b.get_mut(entity)) {
                    f(entity, a, b, c);
                }
            }
        }
    }
}
