//! Widgets built on the ECS runtime.
//!
//! Each widget is a set of components plus a system that reacts to input
//! and request events. State lives in components; systems only hold their
//! subscriptions.

mod dock;
mod radial;
mod text_input;

pub use dock::{
    spawn_dock_panel, DockPanel, DockRequest, DockSpace, DockState, DockSystem, DockZone,
    PanelDocked, PanelUndocked, UndockRequest,
};
pub use radial::{
    spawn_radial_menu, CloseRadialMenu, OpenRadialMenu, RadialMenu, RadialMenuClosed,
    RadialMenuOpened, RadialMenuSystem, RadialSlice, RadialSliceConfirmed,
};
pub use text_input::{
    blur_all, focus, focused_input, spawn_text_input, Focused, TextChanged, TextInput,
    TextInputSystem, TextSubmitted,
};

use kestrel_core::World;

use crate::layout::Rect;

/// Registers every widget system, with docking laid out inside `dock_bounds`.
///
/// Order: docking, radial menus, text inputs.
pub fn add_widget_systems(world: &mut World, dock_bounds: Rect) {
    world.add_system(DockSystem::new(dock_bounds));
    world.add_system(RadialMenuSystem::new());
    world.add_system(TextInputSystem::new());
}
