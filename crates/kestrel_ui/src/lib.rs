//! # Kestrel UI
//!
//! Retained-mode widgets running on [`kestrel_core`]:
//! - Docking panels arranged around a central area
//! - Radial menus with nested submenus
//! - Single-line text inputs with keyboard focus
//!
//! ## Architecture
//!
//! ```text
//! host window ──> input events ──> World event bus ──> widget systems
//!                                                          │
//!                      components (DockPanel, RadialMenu, TextInput, Bounds)
//! ```
//!
//! The host renders from components; nothing here draws.
//!
//! ## Example
//!
//! ```rust
//! use kestrel_core::World;
//! use kestrel_ui::{add_widget_systems, spawn_text_input, focus, Rect, TextInput, TextTyped};
//!
//! let mut world = World::new();
//! add_widget_systems(&mut world, Rect::new(0.0, 0.0, 800.0, 600.0));
//!
//! let input = spawn_text_input(&mut world, Rect::new(10.0, 10.0, 200.0, 24.0), None);
//! focus(&mut world, input);
//! world.send(TextTyped::new("hello"));
//!
//! assert_eq!(world.get::<TextInput>(input).unwrap().text, "hello");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod input;
pub mod layout;
pub mod widget;

pub use input::{Key, KeyPressed, Modifiers, MouseButton, PointerMoved, PointerPressed, TextTyped};
pub use layout::{Bounds, Direction, Rect};
pub use widget::{
    add_widget_systems, blur_all, focus, focused_input, spawn_dock_panel, spawn_radial_menu,
    spawn_text_input, CloseRadialMenu, DockPanel, DockRequest, DockSpace, DockState, DockSystem,
    DockZone, Focused, OpenRadialMenu, PanelDocked, PanelUndocked, RadialMenu, RadialMenuClosed,
    RadialMenuOpened, RadialMenuSystem, RadialSlice, RadialSliceConfirmed, TextChanged, TextInput,
    TextInputSystem, TextSubmitted, UndockRequest,
};
