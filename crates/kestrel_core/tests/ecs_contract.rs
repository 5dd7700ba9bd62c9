//! # ECS Contract Tests
//!
//! Behavioral guarantees of the runtime, exercised through the public API
//! only:
//!
//! 1. **Identity**: stale handles never alias reused slots
//! 2. **Storage**: add/get/has/remove agree with each other
//! 3. **Queries**: exactly the live holders are returned
//! 4. **Events**: ordered, snapshotted, re-entrant dispatch
//!
//! Run with: cargo test -p kestrel_core --test ecs_contract

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use kestrel_core::{Entity, Hierarchy, System, World, WorldConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct Label(String);

struct Ping;

// ============================================================================
// IDENTITY
// ============================================================================

#[test]
fn reused_index_gets_new_generation() {
    let mut world = World::new();

    let a = world.spawn_empty();
    assert_eq!((a.index(), a.generation()), (0, 0));
    world.despawn(a);

    let b = world.spawn_empty();
    assert_eq!((b.index(), b.generation()), (0, 1));
    assert_ne!(a, b);
    assert!(!world.is_alive(a));
    assert!(world.is_alive(b));
}

#[test]
fn stale_handles_stay_dead_across_churn() {
    let mut world = World::new();
    let mut live: Vec<Entity> = Vec::new();
    let mut dead: Vec<Entity> = Vec::new();

    // Deterministic mix of spawns and despawns.
    for step in 0..500_u32 {
        if step % 3 == 2 && !live.is_empty() {
            let victim = live.remove((step as usize * 7) % live.len());
            assert!(world.despawn(victim));
            dead.push(victim);
        } else {
            live.push(world.spawn_empty());
        }

        for &entity in &dead {
            assert!(!world.is_alive(entity), "{entity} came back to life at step {step}");
        }
    }

    assert_eq!(world.entity_count(), live.len());
    assert!(live.iter().all(|&entity| world.is_alive(entity)));
}

#[test]
fn null_entity_is_never_alive() {
    let mut world = World::new();
    world.spawn_empty();

    assert!(Entity::NULL.is_null());
    assert!(!world.is_alive(Entity::NULL));
    assert!(!world.despawn(Entity::NULL));
    assert!(!world.has::<Position>(Entity::NULL));
}

// ============================================================================
// STORAGE
// ============================================================================

#[test]
fn add_get_remove_round_trip() {
    let mut world = World::new();
    let entity = world.spawn_empty();

    for value in [-3.5_f32, 0.0, 1.0, f32::MAX] {
        world.add(entity, Position { x: value, y: -value }).unwrap();
        assert_eq!(world.get::<Position>(entity).unwrap(), &Position { x: value, y: -value });
    }

    assert!(world.remove::<Position>(entity));
    assert!(!world.has::<Position>(entity));
    assert!(!world.has::<Velocity>(entity));
    assert!(world.get::<Position>(entity).unwrap_err().is_component_not_found());
}

#[test]
fn get_mut_writes_in_place() {
    let mut world = World::new();
    let entity = world.spawn().with(Label("old".into())).build();

    world.get_mut::<Label>(entity).unwrap().0.push_str("-new");
    assert_eq!(world.get::<Label>(entity).unwrap().0, "old-new");
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn query_returns_exactly_live_holders() {
    let mut world = World::new();
    let mut expected = BTreeSet::new();

    for i in 0..40_u32 {
        let entity = world.spawn_empty();
        if i % 2 == 0 {
            world.add(entity, Position { x: 0.0, y: 0.0 }).unwrap();
            expected.insert(entity.to_bits());
        }
        if i % 5 == 0 && world.remove::<Position>(entity) {
            expected.remove(&entity.to_bits());
        }
        if i % 7 == 0 {
            world.despawn(entity);
            expected.remove(&entity.to_bits());
        }
    }

    let actual: BTreeSet<u64> = world.query::<(Position,)>().map(|(entity, _)| entity.to_bits()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn query_tracks_component_removal() {
    let mut world = World::new();
    let entity = world
        .spawn()
        .with(Position { x: 1.0, y: 1.0 })
        .with(Velocity { dx: 0.5, dy: 0.5 })
        .build();

    let both: Vec<Entity> = world.query::<(Position, Velocity)>().entities().collect();
    assert_eq!(both, vec![entity]);

    world.remove::<Velocity>(entity);
    assert_eq!(world.query::<(Position, Velocity)>().count(), 0);
    let positions: Vec<Entity> = world.query::<(Position,)>().entities().collect();
    assert_eq!(positions, vec![entity]);
}

#[test]
fn movement_system_through_update() {
    struct Movement;

    impl System for Movement {
        fn update(&mut self, world: &mut World, delta_time: f32) {
            world.join_mut::<Position, Velocity>(|_, pos, vel| {
                pos.x += vel.dx * delta_time;
                pos.y += vel.dy * delta_time;
            });
        }
    }

    let mut world = World::with_config(WorldConfig::default().with_trace_events(true));
    let mover = world
        .spawn()
        .with(Position { x: 0.0, y: 0.0 })
        .with(Velocity { dx: 2.0, dy: -4.0 })
        .build();
    let anchor = world.spawn().with(Position { x: 9.0, y: 9.0 }).build();

    world.add_system(Movement);
    world.update(0.5);
    world.update(0.5);

    assert_eq!(world.get::<Position>(mover).unwrap(), &Position { x: 2.0, y: -4.0 });
    assert_eq!(world.get::<Position>(anchor).unwrap(), &Position { x: 9.0, y: 9.0 });
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn unsubscribe_inside_handler_applies_from_next_send() {
    let mut world = World::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let h2 = Rc::new(Cell::new(None));

    {
        let log = Rc::clone(&log);
        let h2 = Rc::clone(&h2);
        world.subscribe(move |world: &mut World, _: &Ping| {
            log.borrow_mut().push("H1");
            if let Some(handle) = h2.get() {
                world.unsubscribe(handle);
            }
        });
    }
    {
        let log = Rc::clone(&log);
        h2.set(Some(world.subscribe(move |_: &mut World, _: &Ping| log.borrow_mut().push("H2"))));
    }

    world.send(Ping);
    assert_eq!(*log.borrow(), vec!["H1", "H2"]);

    world.send(Ping);
    assert_eq!(*log.borrow(), vec!["H1", "H2", "H1"]);
}

#[test]
fn handler_can_despawn_and_spawn() {
    struct Reset;

    let mut world = World::new();
    let old = world.spawn().with(Label("old".into())).build();

    world.subscribe(move |world: &mut World, _: &Reset| {
        world.despawn(old);
        world.spawn().with(Label("new".into())).build();
    });
    world.send(Reset);

    assert!(!world.is_alive(old));
    let labels: Vec<String> = world.iter::<Label>().map(|(_, label)| label.0.clone()).collect();
    assert_eq!(labels, vec!["new".to_string()]);
}

#[test]
fn shutdown_runs_on_drop_and_hierarchy_survives_until_then() {
    let disposed = Rc::new(Cell::new(false));

    struct Tracker(Rc<Cell<bool>>);

    impl System for Tracker {
        fn update(&mut self, _world: &mut World, _delta_time: f32) {}

        fn dispose(&mut self, world: &mut World) {
            assert!(world.find_by_name("root").is_some());
            self.0.set(true);
        }
    }

    {
        let mut world = World::new();
        let root = world.spawn().named("root").build();
        world.spawn().child_of(root).build();
        world.add_system(Tracker(Rc::clone(&disposed)));
        world.update(0.016);
        assert_eq!(world.descendants(root).len(), 1);
    }

    assert!(disposed.get());
}
