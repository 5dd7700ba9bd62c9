//! Radial (pie) menus.
//!
//! Slices are laid out clockwise starting at twelve o'clock. Moving the
//! pointer outside the inner radius selects the slice under it; a left
//! click confirms the selection.
//!
//! ```text
//!            0
//!        ╲       ╱
//!     3    (dead)    1        pointer inside inner_radius: no selection
//!        ╱       ╲
//!            2
//! ```
//!
//! Confirming a slice that has a submenu closes this menu and opens the
//! submenu at the same center, both inside the confirming dispatch.

use std::f32::consts::TAU;

use kestrel_core::{Entity, Subscriptions, System, World};
use tracing::{debug, trace};

use crate::input::{Key, KeyPressed, MouseButton, PointerMoved, PointerPressed};

/// One entry of a radial menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadialSlice {
    /// Text shown on the slice.
    pub label: String,
    /// Menu opened when this slice is confirmed.
    pub submenu: Option<Entity>,
}

impl RadialSlice {
    /// Creates a leaf slice.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            submenu: None,
        }
    }

    /// Makes the slice open `submenu` when confirmed.
    #[must_use]
    pub fn with_submenu(mut self, submenu: Entity) -> Self {
        self.submenu = Some(submenu);
        self
    }
}

/// A radial menu widget.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialMenu {
    /// Whether the menu is showing.
    pub is_open: bool,
    /// Slice under the pointer, if any.
    pub selected_index: Option<usize>,
    /// Screen position the menu is centered on.
    pub center: (f32, f32),
    /// Radius of the dead zone around the center.
    pub inner_radius: f32,
    /// Slices, clockwise from the top.
    pub slices: Vec<RadialSlice>,
}

impl RadialMenu {
    /// Returns the slice under `(x, y)`, or `None` inside the dead zone.
    #[must_use]
    pub fn slice_at(&self, x: f32, y: f32) -> Option<usize> {
        if self.slices.is_empty() {
            return None;
        }
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        if dx.hypot(dy) < self.inner_radius {
            return None;
        }

        // Zero points up and grows clockwise; screen y grows downward.
        let angle = dx.atan2(-dy).rem_euclid(TAU);
        #[allow(clippy::cast_precision_loss)]
        let span = TAU / self.slices.len() as f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = ((angle + span * 0.5) / span) as usize;
        Some(index % self.slices.len())
    }
}

/// Open a menu centered at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenRadialMenu {
    /// The menu entity.
    pub menu: Entity,
    /// Center X.
    pub x: f32,
    /// Center Y.
    pub y: f32,
}

/// Close a menu without confirming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseRadialMenu {
    /// The menu entity.
    pub menu: Entity,
}

/// A slice was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadialSliceConfirmed {
    /// The menu entity.
    pub menu: Entity,
    /// Index of the confirmed slice.
    pub index: usize,
}

/// A menu became visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadialMenuOpened {
    /// The menu entity.
    pub menu: Entity,
}

/// A menu was hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadialMenuClosed {
    /// The menu entity.
    pub menu: Entity,
    /// Selection at the time it closed.
    pub selected: Option<usize>,
}

/// Drives radial menus from pointer and key input.
#[derive(Default)]
pub struct RadialMenuSystem {
    subscriptions: Subscriptions,
}

impl RadialMenuSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for RadialMenuSystem {
    fn name(&self) -> &str {
        "radial_menu"
    }

    fn initialize(&mut self, world: &mut World) {
        let subs = &mut self.subscriptions;
        subs.subscribe(world, |world: &mut World, event: &OpenRadialMenu| {
            open(world, event.menu, (event.x, event.y));
        });
        subs.subscribe(world, |world: &mut World, event: &CloseRadialMenu| close(world, event.menu));
        subs.subscribe(world, |world: &mut World, event: &RadialSliceConfirmed| {
            confirm(world, event.menu, event.index);
        });
        subs.subscribe(world, |world: &mut World, event: &PointerMoved| {
            for menu in open_menus(world) {
                if let Some(radial) = world.try_get_mut::<RadialMenu>(menu) {
                    let selected = radial.slice_at(event.x, event.y);
                    if radial.selected_index != selected {
                        trace!(%menu, ?selected, "radial selection changed");
                        radial.selected_index = selected;
                    }
                }
            }
        });
        subs.subscribe(world, |world: &mut World, event: &PointerPressed| match event.button {
            MouseButton::Left => {
                for menu in open_menus(world) {
                    let selected = world.try_get::<RadialMenu>(menu).and_then(|radial| radial.selected_index);
                    if let Some(index) = selected {
                        world.send(RadialSliceConfirmed { menu, index });
                    }
                }
            }
            MouseButton::Right => {
                for menu in open_menus(world) {
                    world.send(CloseRadialMenu { menu });
                }
            }
            MouseButton::Middle => {}
        });
        subs.subscribe(world, |world: &mut World, event: &KeyPressed| {
            if event.key == Key::Escape {
                for menu in open_menus(world) {
                    world.send(CloseRadialMenu { menu });
                }
            }
        });
    }

    fn update(&mut self, _world: &mut World, _delta_time: f32) {}

    fn dispose(&mut self, world: &mut World) {
        self.subscriptions.release(world);
    }
}

fn open_menus(world: &World) -> Vec<Entity> {
    world
        .query::<(RadialMenu,)>()
        .filter(|(_, (radial,))| radial.is_open)
        .map(|(menu, _)| menu)
        .collect()
}

fn open(world: &mut World, menu: Entity, center: (f32, f32)) {
    let Some(radial) = world.try_get_mut::<RadialMenu>(menu) else {
        trace!(%menu, "open request for a non-menu ignored");
        return;
    };
    if radial.is_open {
        return;
    }
    radial.is_open = true;
    radial.center = center;
    radial.selected_index = None;

    debug!(%menu, ?center, "radial menu opened");
    world.send(RadialMenuOpened { menu });
}

fn close(world: &mut World, menu: Entity) {
    let Some(radial) = world.try_get_mut::<RadialMenu>(menu) else {
        return;
    };
    if !radial.is_open {
        return;
    }
    radial.is_open = false;
    let selected = radial.selected_index.take();

    debug!(%menu, ?selected, "radial menu closed");
    world.send(RadialMenuClosed { menu, selected });
}

fn confirm(world: &mut World, menu: Entity, index: usize) {
    let Some(radial) = world.try_get::<RadialMenu>(menu) else {
        return;
    };
    let Some(slice) = radial.slices.get(index).filter(|_| radial.is_open) else {
        trace!(%menu, index, "confirmation for a closed menu or missing slice ignored");
        return;
    };
    let submenu = slice.submenu;
    let center = radial.center;

    world.send(CloseRadialMenu { menu });
    if let Some(submenu) = submenu {
        world.send(OpenRadialMenu {
            menu: submenu,
            x: center.0,
            y: center.1,
        });
    }
}

/// Spawns a closed radial menu.
pub fn spawn_radial_menu(world: &mut World, inner_radius: f32, slices: impl IntoIterator<Item = RadialSlice>) -> Entity {
    world
        .spawn()
        .with(RadialMenu {
            is_open: false,
            selected_index: None,
            center: (0.0, 0.0),
            inner_radius,
            slices: slices.into_iter().collect(),
        })
        .build()
}
