//! # System Scheduler
//!
//! Systems hold no world state of their own; everything persistent lives in
//! components. They are run in registration order, once per
//! [`World::update`].
//!
//! Lifecycle:
//!
//! ```text
//! add_system ──> initialize (eager, exactly once)
//! update     ──> update(dt) for every enabled system, in order
//! shutdown   ──> dispose, reverse order, then dropped
//! ```

use tracing::debug;

use super::world::World;

/// A unit of per-frame behavior.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{System, World};
///
/// struct Velocity(f32);
/// struct Position(f32);
///
/// struct Movement;
///
/// impl System for Movement {
///     fn update(&mut self, world: &mut World, delta_time: f32) {
///         world.join_mut::<Position, Velocity>(|_, pos, vel| pos.0 += vel.0 * delta_time);
///     }
/// }
///
/// let mut world = World::new();
/// let entity = world.spawn().with(Position(0.0)).with(Velocity(2.0)).build();
/// world.add_system(Movement);
/// world.update(0.5);
/// assert_eq!(world.get::<Position>(entity).unwrap().0, 1.0);
/// ```
pub trait System: 'static {
    /// Name used for logging and for [`World::set_system_enabled`].
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once, when the system is added to a world.
    fn initialize(&mut self, _world: &mut World) {}

    /// Called every tick.
    fn update(&mut self, world: &mut World, delta_time: f32);

    /// Called once, when the world shuts down. Release subscriptions here.
    fn dispose(&mut self, _world: &mut World) {}
}

pub(crate) struct SystemEntry {
    name: String,
    enabled: bool,
    /// `None` while the system is running or after disposal.
    system: Option<Box<dyn System>>,
}

/// Ordered list of systems owned by a world.
#[derive(Default)]
pub(crate) struct Scheduler {
    entries: Vec<SystemEntry>,
    tick: u64,
    shut_down: bool,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl World {
    /// Registers a system and initializes it immediately.
    ///
    /// Systems added from inside another system's `update` first run on the
    /// next tick.
    pub fn add_system<S: System>(&mut self, mut system: S) {
        debug_assert!(
            !self.scheduler.shut_down,
            "add_system called on a world that has been shut down"
        );

        let name = system.name().to_owned();
        debug!(system = %name, "initializing system");
        system.initialize(self);

        self.scheduler.entries.push(SystemEntry {
            name,
            enabled: true,
            system: Some(Box::new(system)),
        });
    }

    /// Runs one tick: every enabled system's `update`, in registration order.
    pub fn update(&mut self, delta_time: f32) {
        debug_assert!(
            !self.scheduler.shut_down,
            "update called on a world that has been shut down"
        );
        if self.scheduler.shut_down {
            return;
        }

        let count = self.scheduler.entries.len();
        for index in 0..count {
            let Some(entry) = self.scheduler.entries.get_mut(index) else {
                break;
            };
            if !entry.enabled {
                continue;
            }
            let Some(mut system) = entry.system.take() else {
                continue;
            };

            system.update(self, delta_time);

            // `shutdown` from inside `update` skipped the running system.
            if self.scheduler.shut_down {
                debug!(system = %system.name(), "disposing system after shutdown during update");
                system.dispose(self);
                return;
            }
            if let Some(entry) = self.scheduler.entries.get_mut(index) {
                entry.system = Some(system);
            }
        }
        self.scheduler.tick += 1;
    }

    /// Disposes every system in reverse registration order.
    ///
    /// Idempotent; also performed when the world is dropped. When called from
    /// a system's `update`, that system is disposed last, once its `update`
    /// returns, and the rest of the tick is skipped.
    pub fn shutdown(&mut self) {
        if self.scheduler.shut_down {
            return;
        }
        self.scheduler.shut_down = true;

        let mut entries = std::mem::take(&mut self.scheduler.entries);
        for entry in entries.iter_mut().rev() {
            if let Some(system) = entry.system.as_mut() {
                debug!(system = %entry.name, "disposing system");
                system.dispose(self);
            }
        }
        debug!(
            systems = entries.len(),
            subscribers = self.events.total_subscribers(),
            "world shut down"
        );
    }

    /// Checks if [`World::shutdown`] has run.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.scheduler.shut_down
    }

    /// Enables or disables a system by name. Returns whether it was found.
    pub fn set_system_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.scheduler.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.enabled = enabled;
                debug!(system = %name, enabled, "system toggled");
                true
            }
            None => false,
        }
    }

    /// Returns the names of all systems in registration order.
    #[must_use]
    pub fn system_names(&self) -> Vec<&str> {
        self.scheduler.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Returns the number of completed [`World::update`] calls.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.scheduler.tick
    }
}
