//! # Command Buffer
//!
//! Deferred structural changes, recorded while the world is borrowed and
//! applied later in recording order.
//!
//! ```text
//! for (entity, _) in world.query::<(Health,)>() {   // world borrowed
//!     commands.despawn(entity);                    // recorded only
//! }
//! commands.apply(&mut world);                      // executed here
//! ```

use tracing::trace;

use super::component::Component;
use super::entity::Entity;
use super::world::World;

/// Type-erased "attach this component to that entity".
type Attach = Box<dyn FnOnce(&mut World, Entity)>;

/// A recorded structural change.
enum Command {
    Spawn { components: Vec<Attach> },
    Despawn { entity: Entity },
    Insert { entity: Entity, attach: Attach },
    Remove { entity: Entity, detach: Attach },
}

/// Records spawns, despawns and component changes for later application.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{CommandBuffer, World};
///
/// struct Health(i32);
///
/// let mut world = World::new();
/// world.spawn().with(Health(0)).build();
/// world.spawn().with(Health(5)).build();
///
/// let mut commands = CommandBuffer::new();
/// for (entity, (health,)) in world.query::<(Health,)>() {
///     if health.0 <= 0 {
///         commands.despawn(entity);
///     }
/// }
/// commands.spawn().with(Health(10));
/// commands.apply(&mut world);
///
/// assert_eq!(world.entity_count(), 2);
/// ```
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a spawn. Components are attached through the returned builder.
    pub fn spawn(&mut self) -> SpawnCommand<'_> {
        self.commands.push(Command::Spawn { components: Vec::new() });
        SpawnCommand { buffer: self }
    }

    /// Records a despawn.
    pub fn despawn(&mut self, entity: Entity) {
        self.commands.push(Command::Despawn { entity });
    }

    /// Records attaching (or overwriting) a component.
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) {
        self.commands.push(Command::Insert {
            entity,
            attach: Box::new(move |world: &mut World, entity: Entity| {
                // Liveness is checked in `apply`.
                let _ = world.add(entity, component);
            }),
        });
    }

    /// Records removing a component.
    pub fn remove<C: Component>(&mut self, entity: Entity) {
        self.commands.push(Command::Remove {
            entity,
            detach: Box::new(|world: &mut World, entity: Entity| {
                world.remove::<C>(entity);
            }),
        });
    }

    /// Returns the number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Checks if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Applies every command in recording order and empties the buffer.
    ///
    /// Commands aimed at entities that are no longer alive are skipped.
    /// Returns the entities created by recorded spawns, in order.
    pub fn apply(&mut self, world: &mut World) -> Vec<Entity> {
        let mut spawned = Vec::new();
        let mut skipped = 0usize;

        for command in self.commands.drain(..) {
            match command {
                Command::Spawn { components } => {
                    let entity = world.spawn_empty();
                    for attach in components {
                        attach(world, entity);
                    }
                    spawned.push(entity);
                }
                Command::Despawn { entity } => {
                    if !world.despawn(entity) {
                        skipped += 1;
                    }
                }
                Command::Insert { entity, attach: apply } | Command::Remove { entity, detach: apply } => {
                    if world.is_alive(entity) {
                        apply(world, entity);
                    } else {
                        skipped += 1;
                    }
                }
            }
        }

        trace!(spawned = spawned.len(), skipped, "applied command buffer");
        spawned
    }
}

/// Builder for a recorded spawn, returned by [`CommandBuffer::spawn`].
pub struct SpawnCommand<'a> {
    buffer: &'a mut CommandBuffer,
}

impl SpawnCommand<'_> {
    /// Attaches a component to the entity once it is spawned.
    pub fn with<C: Component>(self, component: C) -> Self {
        if let Some(Command::Spawn { components }) = self.buffer.commands.last_mut() {
            components.push(Box::new(move |world: &mut World, entity: Entity| {
                let _ = world.add(entity, component);
            }));
        }
        self
    }
}
