//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into component stores
//! - A generation counter for safe reuse
//!
//! The [`EntityAllocator`] hands out the lowest free index first and bumps
//! the slot generation every time an index is released, so a handle taken
//! before a despawn can never alias the entity that later reuses its slot.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

/// Opaque handle to an entity.
///
/// Two handles are equal only if both index and generation match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Handle that never refers to a live entity.
    ///
    /// The allocator never hands out index `u32::MAX`, so lookups against
    /// `NULL` always miss.
    pub const NULL: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Creates a handle from raw parts.
    ///
    /// Mostly useful in tests; handles for live entities come from
    /// [`World::spawn`](crate::World::spawn).
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Checks if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }

    /// Packs the handle into 64 bits: generation high, index low.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Unpacks a handle produced by [`Entity::to_bits`].
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Entity(NULL)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Generational index allocator.
///
/// - `allocate`: O(log f) where f is the number of free slots
/// - `free`: O(log f)
/// - `is_alive`: O(1)
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// One slot per index ever handed out.
    slots: Vec<Slot>,
    /// Min-heap of released indices, so the lowest is reused first.
    free: BinaryHeap<Reverse<u32>>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl EntityAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: BinaryHeap::new(),
            alive_count: 0,
        }
    }

    /// Reserves room for `additional` more slots.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Allocates the lowest free index.
    ///
    /// # Panics
    ///
    /// Panics if all `u32::MAX` indices are in use.
    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;

        if let Some(Reverse(index)) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            return Entity::new(index, slot.generation);
        }

        let index = self.slots.len();
        assert!(
            index < u32::MAX as usize,
            "entity index space exhausted"
        );
        self.slots.push(Slot {
            generation: 0,
            alive: true,
        });
        Entity::new(index as u32, 0)
    }

    /// Releases an entity, bumping its slot generation.
    ///
    /// A slot that has reached the last generation is retired instead, so
    /// handle generations strictly increase for as long as an index is in use.
    ///
    /// Returns `false` for dead, stale, or null handles.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.index() as usize];
        slot.alive = false;
        self.alive_count -= 1;
        // A slot whose generation is exhausted is retired, never reused.
        if let Some(generation) = slot.generation.checked_add(1) {
            slot.generation = generation;
            self.free.push(Reverse(entity.index()));
        }
        true
    }

    /// Checks if the handle refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    /// Returns the live handle occupying `index`, if any.
    #[must_use]
    pub fn current(&self, index: u32) -> Option<Entity> {
        let slot = self.slots.get(index as usize)?;
        slot.alive.then(|| Entity::new(index, slot.generation))
    }

    /// Returns the number of alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the number of slots ever allocated.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over all alive entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| Entity::new(index as u32, slot.generation))
    }
}
