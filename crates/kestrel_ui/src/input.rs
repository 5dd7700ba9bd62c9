//! Input events for widgets.
//!
//! Platform polling is outside the toolkit: the host translates raw window
//! input into these events and sends them on the world's bus, where widget
//! systems pick them up.
//!
//! ```text
//! window backend ──> world.send(PointerMoved { .. }) ──> RadialMenuSystem
//!                ──> world.send(KeyPressed { .. })   ──> TextInputSystem
//! ```

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
///
/// Only keys with widget behavior attached are listed; printable input
/// arrives as [`TextTyped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Control key is held.
    pub ctrl: bool,
    /// Alt key is held.
    pub alt: bool,
    /// Super/Command key is held.
    pub super_key: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        super_key: false,
    };

    /// Returns true if any modifier is held.
    #[must_use]
    pub const fn any(self) -> bool {
        self.shift || self.ctrl || self.alt || self.super_key
    }
}

/// The pointer moved to `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMoved {
    /// Screen X.
    pub x: f32,
    /// Screen Y.
    pub y: f32,
}

/// A pointer button went down at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPressed {
    /// Which button.
    pub button: MouseButton,
    /// Screen X.
    pub x: f32,
    /// Screen Y.
    pub y: f32,
}

/// A non-text key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPressed {
    /// The key.
    pub key: Key,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
}

impl KeyPressed {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }
}

/// Text was entered (already composed by the platform IME).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTyped {
    /// The entered characters.
    pub text: String,
}

impl TextTyped {
    /// Creates a text event.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
