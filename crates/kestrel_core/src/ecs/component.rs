//! # Component System
//!
//! Components are pure data containers with no behavior.
//!
//! Any `'static` type can be a component. Types are registered with the
//! [`ComponentRegistry`] on first use and receive a dense [`ComponentId`]
//! that indexes the world's store table.

use std::any::TypeId;

use rustc_hash::FxHashMap;

/// Marker trait for ECS components.
///
/// Implemented for every `'static` type; exists so bounds read as intent.
///
/// # Example
///
/// ```rust
/// use kestrel_core::World;
///
/// #[derive(Debug, PartialEq)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// let mut world = World::new();
/// let entity = world.spawn().with(Position { x: 1.0, y: 2.0 }).build();
/// assert_eq!(world.get::<Position>(entity).unwrap().x, 1.0);
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Dense identifier assigned to a component type at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Returns the id as a store-table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Metadata about a registered component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Dense id.
    pub id: ComponentId,
    /// Rust type id.
    pub type_id: TypeId,
    /// Rust type name, for diagnostics only.
    pub name: &'static str,
}

/// Maps component types to dense ids.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_type: FxHashMap<TypeId, ComponentId>,
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `C` if needed and returns its id.
    ///
    /// The second value is `true` when this call performed the registration.
    pub fn register<C: Component>(&mut self) -> (ComponentId, bool) {
        let type_id = TypeId::of::<C>();
        if let Some(&id) = self.by_type.get(&type_id) {
            return (id, false);
        }

        let id = ComponentId(self.infos.len() as u32);
        self.infos.push(ComponentInfo {
            id,
            type_id,
            name: std::any::type_name::<C>(),
        });
        self.by_type.insert(type_id, id);
        (id, true)
    }

    /// Returns the id of `C` if it has been registered.
    #[inline]
    #[must_use]
    pub fn id_of<C: Component>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<C>()).copied()
    }

    /// Returns metadata for a registered id.
    #[must_use]
    pub fn info(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.infos.get(id.index())
    }

    /// Returns the number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Checks if no component type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterates over all registered component types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.infos.iter()
    }
}
