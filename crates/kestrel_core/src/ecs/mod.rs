//! # Entity Component System
//!
//! A sparse-set ECS for retained-mode UI state.
//!
//! ## Design Philosophy
//!
//! - Entities are generational handles; stale handles never alias new ones
//! - Each component type has its own packed store, created on first use
//! - Systems are plain objects; all persistent state lives in components
//! - Events dispatch synchronously, on the sender's stack

mod commands;
mod component;
mod entity;
mod event;
mod query;
mod storage;
mod system;
mod world;

pub use commands::{CommandBuffer, SpawnCommand};
pub use component::{Component, ComponentId, ComponentInfo, ComponentRegistry};
pub use entity::{Entity, EntityAllocator};
pub use event::{Handler, SubscriptionHandle, Subscriptions};
pub use query::{EntitySnapshot, Query, QueryData};
pub use storage::{AnyStorage, ComponentStorage};
pub use system::System;
pub use world::{EntityBuilder, World};
