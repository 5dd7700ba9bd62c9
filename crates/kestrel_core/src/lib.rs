//! # Kestrel Core
//!
//! Entity Component System runtime for the Kestrel widget toolkit:
//! - Generational entity handles with lowest-index reuse
//! - Sparse-set component stores with O(1) insert, lookup and removal
//! - Tuple queries, mutable joins and deferred command buffers
//! - A typed, synchronous event bus
//! - Ordered systems with an initialize/update/dispose lifecycle
//!
//! ## Architecture Rules
//!
//! 1. **Single-threaded** - a `World` is owned by one thread and takes no locks
//! 2. **Data lives in components** - systems and handlers keep only handles
//! 3. **Immediate dispatch** - `send` returns after every handler has run
//!
//! ## Example
//!
//! ```rust
//! use kestrel_core::World;
//!
//! struct Position(f32, f32);
//! struct Velocity(f32, f32);
//!
//! let mut world = World::new();
//! let moving = world.spawn().with(Position(0.0, 0.0)).with(Velocity(1.0, 0.0)).build();
//! world.spawn().with(Position(5.0, 5.0)).build();
//!
//! let matched: Vec<_> = world.query::<(Position, Velocity)>().entities().collect();
//! assert_eq!(matched, vec![moving]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod hierarchy;

pub use config::WorldConfig;
pub use ecs::{
    AnyStorage, CommandBuffer, Component, ComponentId, ComponentInfo, ComponentRegistry,
    ComponentStorage, Entity, EntityAllocator, EntityBuilder, EntitySnapshot, Query, QueryData,
    SpawnCommand, SubscriptionHandle, Subscriptions, System, World,
};
pub use error::{EcsError, EcsResult};
pub use hierarchy::{Children, Hierarchy, Name, Parent};
