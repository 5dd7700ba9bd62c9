//! Dockable panels.
//!
//! A panel is either floating at its own rectangle or docked into one of the
//! five zones of the [`DockSpace`]:
//!
//! ```text
//! ┌──────┬──────────────┬───────┐
//! │      │     Top      │       │
//! │      ├──────────────┤       │
//! │ Left │    Center    │ Right │
//! │      ├──────────────┤       │
//! │      │    Bottom    │       │
//! └──────┴──────────────┴───────┘
//! ```
//!
//! Requests arrive as [`DockRequest`] / [`UndockRequest`] events and are
//! applied immediately; [`DockSystem::update`] then reconciles zone
//! occupancy with the panels' own state and writes every panel's
//! [`Bounds`].

use std::collections::BTreeMap;

use kestrel_core::{CommandBuffer, Entity, Subscriptions, System, World};
use tracing::{debug, trace};

use crate::layout::{Bounds, Direction, Rect};

/// Where a panel can be docked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DockZone {
    /// Full-height strip on the left.
    Left,
    /// Full-height strip on the right.
    Right,
    /// Strip above the center.
    Top,
    /// Strip below the center.
    Bottom,
    /// Whatever remains; panels here are tabbed.
    Center,
}

impl DockZone {
    /// Every zone, in layout order.
    pub const ALL: [Self; 5] = [Self::Left, Self::Right, Self::Top, Self::Bottom, Self::Center];
}

/// Docking state of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockState {
    /// Positioned at the panel's `floating_rect`.
    Floating,
    /// Laid out by the dock space.
    Docked(DockZone),
}

/// A dockable panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DockPanel {
    /// Title shown in the panel header.
    pub title: String,
    /// Current docking state.
    pub state: DockState,
    /// Where the panel sits while floating.
    pub floating_rect: Rect,
}

/// Ask for a panel to be docked into a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockRequest {
    /// The panel to dock.
    pub panel: Entity,
    /// Target zone.
    pub zone: DockZone,
}

/// Ask for a docked panel to float again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndockRequest {
    /// The panel to undock.
    pub panel: Entity,
}

/// A panel entered a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelDocked {
    /// The panel.
    pub panel: Entity,
    /// The zone it entered.
    pub zone: DockZone,
}

/// A panel left its zone and is floating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelUndocked {
    /// The panel.
    pub panel: Entity,
    /// The zone it left.
    pub zone: DockZone,
}

/// Zone layout and occupancy. Stored as a world singleton.
#[derive(Debug, Clone, PartialEq)]
pub struct DockSpace {
    /// Area managed by the dock space.
    pub bounds: Rect,
    /// Share of the width (left/right) or height (top/bottom) each side
    /// zone takes.
    side_fraction: f32,
    /// Docked panels per zone, in docking order.
    occupants: BTreeMap<DockZone, Vec<Entity>>,
}

impl DockSpace {
    /// Default side-zone share.
    pub const DEFAULT_SIDE_FRACTION: f32 = 0.25;

    /// Creates an empty dock space covering `bounds`.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            side_fraction: Self::DEFAULT_SIDE_FRACTION,
            occupants: BTreeMap::new(),
        }
    }

    /// Sets the side-zone share, clamped so the center never vanishes.
    #[must_use]
    pub fn with_side_fraction(mut self, fraction: f32) -> Self {
        self.side_fraction = fraction.clamp(0.0, 0.45);
        self
    }

    /// Returns the panels docked in `zone`, in docking order.
    #[must_use]
    pub fn occupants(&self, zone: DockZone) -> &[Entity] {
        self.occupants.get(&zone).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the zone a panel is docked in.
    #[must_use]
    pub fn zone_of(&self, panel: Entity) -> Option<DockZone> {
        self.occupants
            .iter()
            .find(|(_, panels)| panels.contains(&panel))
            .map(|(&zone, _)| zone)
    }

    /// Returns the screen rectangle of a zone.
    #[must_use]
    pub fn zone_rect(&self, zone: DockZone) -> Rect {
        let fraction = self.side_fraction;
        let side_width = self.bounds.width * fraction;
        let middle = Rect::new(
            self.bounds.x + side_width,
            self.bounds.y,
            self.bounds.width - 2.0 * side_width,
            self.bounds.height,
        );

        match zone {
            DockZone::Left => self.bounds.split_left(fraction).0,
            DockZone::Right => self.bounds.split_right(fraction).0,
            DockZone::Top => middle.split_top(fraction).0,
            DockZone::Bottom => middle.split_bottom(fraction).0,
            DockZone::Center => {
                let side_height = middle.height * fraction;
                Rect::new(middle.x, middle.y + side_height, middle.width, middle.height - 2.0 * side_height)
            }
        }
    }

    /// Returns the rectangle of every occupant, zone by zone.
    #[must_use]
    pub fn layout(&self) -> Vec<(Entity, Rect)> {
        let mut placed = Vec::new();
        for zone in DockZone::ALL {
            let panels = self.occupants(zone);
            let rect = self.zone_rect(zone);
            let cells = match zone {
                DockZone::Left | DockZone::Right => rect.divide(panels.len(), Direction::Vertical),
                DockZone::Top | DockZone::Bottom => rect.divide(panels.len(), Direction::Horizontal),
                DockZone::Center => vec![rect; panels.len()],
            };
            placed.extend(panels.iter().copied().zip(cells));
        }
        placed
    }

    fn insert(&mut self, zone: DockZone, panel: Entity) {
        self.remove(panel);
        self.occupants.entry(zone).or_default().push(panel);
    }

    fn remove(&mut self, panel: Entity) -> bool {
        let mut removed = false;
        for panels in self.occupants.values_mut() {
            let before = panels.len();
            panels.retain(|&entry| entry != panel);
            removed |= panels.len() != before;
        }
        removed
    }

    fn iter(&self) -> impl Iterator<Item = (DockZone, Entity)> + '_ {
        self.occupants
            .iter()
            .flat_map(|(&zone, panels)| panels.iter().map(move |&panel| (zone, panel)))
    }
}

/// Applies dock requests and lays out panels.
pub struct DockSystem {
    bounds: Rect,
    subscriptions: Subscriptions,
}

impl DockSystem {
    /// Creates the system. A [`DockSpace`] covering `bounds` is installed on
    /// initialize unless the world already has one.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            subscriptions: Subscriptions::new(),
        }
    }
}

impl System for DockSystem {
    fn name(&self) -> &str {
        "dock"
    }

    fn initialize(&mut self, world: &mut World) {
        if !world.has_singleton::<DockSpace>() {
            world.set_singleton(DockSpace::new(self.bounds));
        }
        self.subscriptions
            .subscribe(world, |world: &mut World, request: &DockRequest| dock(world, request.panel, request.zone));
        self.subscriptions
            .subscribe(world, |world: &mut World, request: &UndockRequest| undock(world, request.panel));
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) {
        reconcile(world);

        let mut commands = CommandBuffer::new();
        if let Some(space) = world.singleton::<DockSpace>() {
            for (panel, rect) in space.layout() {
                commands.insert(panel, Bounds(rect));
            }
        }
        for (entity, (panel,)) in world.query::<(DockPanel,)>() {
            if panel.state == DockState::Floating {
                commands.insert(entity, Bounds(panel.floating_rect));
            }
        }
        commands.apply(world);
    }

    fn dispose(&mut self, world: &mut World) {
        self.subscriptions.release(world);
    }
}

fn dock(world: &mut World, panel: Entity, zone: DockZone) {
    let Some(dock_panel) = world.try_get_mut::<DockPanel>(panel) else {
        trace!(%panel, "dock request for a non-panel ignored");
        return;
    };
    if dock_panel.state == DockState::Docked(zone) {
        trace!(%panel, ?zone, "panel already docked there");
        return;
    }
    dock_panel.state = DockState::Docked(zone);

    if let Some(space) = world.singleton_mut::<DockSpace>() {
        space.insert(zone, panel);
    }
    debug!(%panel, ?zone, "panel docked");
    world.send(PanelDocked { panel, zone });
}

fn undock(world: &mut World, panel: Entity) {
    let Some(dock_panel) = world.try_get_mut::<DockPanel>(panel) else {
        trace!(%panel, "undock request for a non-panel ignored");
        return;
    };
    let DockState::Docked(zone) = dock_panel.state else {
        trace!(%panel, "undock request for a floating panel ignored");
        return;
    };
    dock_panel.state = DockState::Floating;

    if let Some(space) = world.singleton_mut::<DockSpace>() {
        space.remove(panel);
    }
    debug!(%panel, ?zone, "panel undocked");
    world.send(PanelUndocked { panel, zone });
}

/// Brings zone occupancy in line with the panels' own state: drops dead or
/// floating occupants and adds docked panels that are missing.
fn reconcile(world: &mut World) {
    let Some(space) = world.singleton::<DockSpace>() else {
        return;
    };

    let stale: Vec<Entity> = space
        .iter()
        .filter(|&(zone, panel)| {
            world.try_get::<DockPanel>(panel).map(|p| p.state) != Some(DockState::Docked(zone))
        })
        .map(|(_, panel)| panel)
        .collect();
    let missing: Vec<(DockZone, Entity)> = world
        .query::<(DockPanel,)>()
        .filter_map(|(entity, (panel,))| match panel.state {
            DockState::Docked(zone) if space.zone_of(entity) != Some(zone) => Some((zone, entity)),
            _ => None,
        })
        .collect();

    if stale.is_empty() && missing.is_empty() {
        return;
    }
    if let Some(space) = world.singleton_mut::<DockSpace>() {
        for panel in stale {
            space.remove(panel);
        }
        for (zone, panel) in missing {
            space.insert(zone, panel);
        }
        trace!("dock occupancy reconciled");
    }
}

/// Spawns a floating dock panel.
pub fn spawn_dock_panel(world: &mut World, title: impl Into<String>, floating_rect: Rect) -> Entity {
    let title = title.into();
    world
        .spawn()
        .named(title.clone())
        .with(DockPanel {
            title,
            state: DockState::Floating,
            floating_rect,
        })
        .with(Bounds(floating_rect))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> World {
        let mut world = World::new();
        world.add_system(DockSystem::new(Rect::new(0.0, 0.0, 400.0, 200.0)));
        world
    }

    fn state(world: &World, panel: Entity) -> DockState {
        world.get::<DockPanel>(panel).unwrap().state
    }

    #[test]
    fn test_zone_rects() {
        let space = DockSpace::new(Rect::new(0.0, 0.0, 400.0, 200.0));

        assert_eq!(space.zone_rect(DockZone::Left), Rect::new(0.0, 0.0, 100.0, 200.0));
        assert_eq!(space.zone_rect(DockZone::Right), Rect::new(300.0, 0.0, 100.0, 200.0));
        assert_eq!(space.zone_rect(DockZone::Top), Rect::new(100.0, 0.0, 200.0, 50.0));
        assert_eq!(space.zone_rect(DockZone::Bottom), Rect::new(100.0, 150.0, 200.0, 50.0));
        assert_eq!(space.zone_rect(DockZone::Center), Rect::new(100.0, 50.0, 200.0, 100.0));
    }

    #[test]
    fn test_dock_and_undock() {
        let mut world = setup();
        let panel = spawn_dock_panel(&mut world, "Outliner", Rect::new(10.0, 10.0, 50.0, 50.0));

        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = Rc::clone(&log);
            world.subscribe(move |_: &mut World, event: &PanelDocked| log.borrow_mut().push(format!("docked {:?}", event.zone)));
        }
        {
            let log = Rc::clone(&log);
            world.subscribe(move |_: &mut World, event: &PanelUndocked| log.borrow_mut().push(format!("undocked {:?}", event.zone)));
        }

        world.send(DockRequest { panel, zone: DockZone::Left });
        assert_eq!(state(&world, panel), DockState::Docked(DockZone::Left));
        assert_eq!(world.singleton::<DockSpace>().unwrap().occupants(DockZone::Left), &[panel]);

        // Same zone again is ignored, a different zone moves the panel.
        world.send(DockRequest { panel, zone: DockZone::Left });
        world.send(DockRequest { panel, zone: DockZone::Right });
        assert_eq!(world.singleton::<DockSpace>().unwrap().zone_of(panel), Some(DockZone::Right));

        world.send(UndockRequest { panel });
        world.send(UndockRequest { panel });
        assert_eq!(state(&world, panel), DockState::Floating);

        assert_eq!(*log.borrow(), vec!["docked Left", "docked Right", "undocked Right"]);
    }

    #[test]
    fn test_requests_for_non_panels_are_ignored() {
        let mut world = setup();
        let plain = world.spawn().build();

        world.send(DockRequest { panel: plain, zone: DockZone::Center });
        world.send(DockRequest { panel: Entity::NULL, zone: DockZone::Center });
        world.send(UndockRequest { panel: plain });

        assert!(world.singleton::<DockSpace>().unwrap().occupants(DockZone::Center).is_empty());
        assert!(!world.has::<DockPanel>(plain));
    }

    #[test]
    fn test_update_lays_out_panels() {
        let mut world = setup();
        let a = spawn_dock_panel(&mut world, "a", Rect::ZERO);
        let b = spawn_dock_panel(&mut world, "b", Rect::ZERO);
        let floating = spawn_dock_panel(&mut world, "float", Rect::new(5.0, 5.0, 20.0, 20.0));

        world.send(DockRequest { panel: a, zone: DockZone::Left });
        world.send(DockRequest { panel: b, zone: DockZone::Left });
        world.update(0.016);

        assert_eq!(world.get::<Bounds>(a).unwrap().0, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(world.get::<Bounds>(b).unwrap().0, Rect::new(0.0, 100.0, 100.0, 100.0));
        assert_eq!(world.get::<Bounds>(floating).unwrap().0, Rect::new(5.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn test_update_reconciles_occupancy() {
        let mut world = setup();
        let gone = spawn_dock_panel(&mut world, "gone", Rect::ZERO);
        let sneaky = spawn_dock_panel(&mut world, "sneaky", Rect::ZERO);

        world.send(DockRequest { panel: gone, zone: DockZone::Bottom });
        world.despawn(gone);
        // State changed without going through a request.
        world.get_mut::<DockPanel>(sneaky).unwrap().state = DockState::Docked(DockZone::Top);

        world.update(0.016);

        let space = world.singleton::<DockSpace>().unwrap();
        assert!(space.occupants(DockZone::Bottom).is_empty());
        assert_eq!(space.occupants(DockZone::Top), &[sneaky]);
        assert_eq!(world.get::<Bounds>(sneaky).unwrap().0, space.zone_rect(DockZone::Top));
    }

    #[test]
    fn test_dispose_unsubscribes() {
        let mut world = setup();
        assert_eq!(world.subscriber_count::<DockRequest>(), 1);
        world.shutdown();
        assert_eq!(world.subscriber_count::<DockRequest>(), 0);
    }
}
