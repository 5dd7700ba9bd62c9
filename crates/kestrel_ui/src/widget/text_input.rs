//! Single-line text inputs.
//!
//! At most one input carries [`Focused`]; typed text and editing keys go to
//! it. The cursor is a character index, so multi-byte text edits cleanly.

use kestrel_core::{Entity, Subscriptions, System, World};
use tracing::{debug, trace, warn};

use crate::input::{Key, KeyPressed, MouseButton, PointerPressed, TextTyped};
use crate::layout::{Bounds, Rect};

/// Editable single-line text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    /// Current contents.
    pub text: String,
    /// Cursor position, in characters from the start.
    pub cursor: usize,
    /// Maximum number of characters, if limited.
    pub max_length: Option<usize>,
}

impl TextInput {
    /// Creates an empty input.
    #[must_use]
    pub fn new(max_length: Option<usize>) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            max_length,
        }
    }

    /// Returns the number of characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Pulls the cursor back inside the text. The fields are public, so the
    /// text may have been replaced since the cursor was last placed.
    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.char_count());
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    /// Inserts text at the cursor, dropping control characters and whatever
    /// does not fit under `max_length`. Returns whether anything changed.
    pub fn insert(&mut self, text: &str) -> bool {
        self.clamp_cursor();
        let room = self
            .max_length
            .map_or(usize::MAX, |max| max.saturating_sub(self.char_count()));
        let accepted: String = text.chars().filter(|c| !c.is_control()).take(room).collect();
        if accepted.is_empty() {
            return false;
        }

        let offset = self.byte_offset(self.cursor);
        self.text.insert_str(offset, &accepted);
        self.cursor += accepted.chars().count();
        true
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        self.clamp_cursor();
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.text.remove(offset);
        true
    }

    /// Deletes the character at the cursor.
    pub fn delete(&mut self) -> bool {
        self.clamp_cursor();
        if self.cursor >= self.char_count() {
            return false;
        }
        let offset = self.byte_offset(self.cursor);
        self.text.remove(offset);
        true
    }

    /// Applies a cursor-movement key. Returns whether the cursor moved.
    pub fn move_cursor(&mut self, key: Key) -> bool {
        let before = self.cursor;
        self.clamp_cursor();
        self.cursor = match key {
            Key::Left => self.cursor.saturating_sub(1),
            Key::Right => (self.cursor + 1).min(self.char_count()),
            Key::Home => 0,
            Key::End => self.char_count(),
            _ => self.cursor,
        };
        self.cursor != before
    }
}

/// Marker for the input that receives keyboard input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Focused;

/// The text of an input changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChanged {
    /// The input entity.
    pub input: Entity,
    /// New contents.
    pub text: String,
}

/// Enter was pressed in an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSubmitted {
    /// The input entity.
    pub input: Entity,
    /// Submitted contents.
    pub text: String,
}

/// Moves focus to `input`, clearing it from every other entity.
///
/// Returns `false` (and leaves focus untouched) if `input` is not a live
/// text input.
pub fn focus(world: &mut World, input: Entity) -> bool {
    if !world.has::<TextInput>(input) {
        return false;
    }
    blur_all(world);
    if let Err(err) = world.add(input, Focused) {
        warn!(%input, %err, "failed to focus text input");
        return false;
    }
    debug!(%input, "text input focused");
    true
}

/// Clears focus from every entity.
pub fn blur_all(world: &mut World) {
    for entity in world.query_entities::<(Focused,)>() {
        world.remove::<Focused>(entity);
    }
}

/// Returns the focused text input, if any.
#[must_use]
pub fn focused_input(world: &World) -> Option<Entity> {
    world.query::<(TextInput, Focused)>().entities().next()
}

/// Applies typed text, editing keys and click-to-focus to text inputs.
#[derive(Default)]
pub struct TextInputSystem {
    subscriptions: Subscriptions,
}

impl TextInputSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for TextInputSystem {
    fn name(&self) -> &str {
        "text_input"
    }

    fn initialize(&mut self, world: &mut World) {
        let subs = &mut self.subscriptions;
        subs.subscribe(world, |world: &mut World, event: &TextTyped| {
            edit_focused(world, |input| input.insert(&event.text));
        });
        subs.subscribe(world, |world: &mut World, event: &KeyPressed| on_key(world, event.key));
        subs.subscribe(world, |world: &mut World, event: &PointerPressed| {
            if event.button != MouseButton::Left {
                return;
            }
            let hit = world
                .query::<(TextInput, Bounds)>()
                .find(|(_, (_, bounds))| bounds.0.contains(event.x, event.y))
                .map(|(entity, _)| entity);
            match hit {
                Some(input) => {
                    focus(world, input);
                }
                None => blur_all(world),
            }
        });
    }

    fn update(&mut self, _world: &mut World, _delta_time: f32) {}

    fn dispose(&mut self, world: &mut World) {
        self.subscriptions.release(world);
    }
}

/// Runs `edit` on the focused input and announces the new text if it changed.
fn edit_focused(world: &mut World, edit: impl FnOnce(&mut TextInput) -> bool) {
    let Some(input) = focused_input(world) else {
        return;
    };
    let Some(text_input) = world.try_get_mut::<TextInput>(input) else {
        return;
    };
    if !edit(text_input) {
        return;
    }
    let text = text_input.text.clone();
    trace!(%input, text = %text, "text changed");
    world.send(TextChanged { input, text });
}

fn on_key(world: &mut World, key: Key) {
    match key {
        Key::Backspace => edit_focused(world, TextInput::backspace),
        Key::Delete => edit_focused(world, TextInput::delete),
        Key::Left | Key::Right | Key::Home | Key::End => {
            if let Some(input) = focused_input(world) {
                if let Some(text_input) = world.try_get_mut::<TextInput>(input) {
                    text_input.move_cursor(key);
                }
            }
        }
        Key::Enter => {
            let Some(input) = focused_input(world) else {
                return;
            };
            if let Some(text) = world.try_get::<TextInput>(input).map(|field| field.text.clone()) {
                debug!(%input, "text submitted");
                world.send(TextSubmitted { input, text });
            }
        }
        Key::Escape => blur_all(world),
        _ => {}
    }
}

/// Spawns an unfocused text input occupying `bounds`.
pub fn spawn_text_input(world: &mut World, bounds: Rect, max_length: Option<usize>) -> Entity {
    world
        .spawn()
        .with(TextInput::new(max_length))
        .with(Bounds(bounds))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn typed(world: &mut World, text: &str) {
        world.send(TextTyped::new(text));
    }

    fn key(world: &mut World, key: Key) {
        world.send(KeyPressed::plain(key));
    }

    fn text(world: &World, input: Entity) -> (String, usize) {
        let input = world.get::<TextInput>(input).unwrap();
        (input.text.clone(), input.cursor)
    }

    #[test]
    fn test_editing_operations() {
        let mut input = TextInput::new(None);
        assert!(input.insert("héllo"));
        assert_eq!(input.cursor, 5);

        assert!(input.move_cursor(Key::Left));
        assert!(input.backspace());
        assert_eq!(input.text, "hélo");
        assert!(input.move_cursor(Key::Home));
        assert!(!input.move_cursor(Key::Home));
        assert!(input.delete());
        assert_eq!(input.text, "élo");
        assert!(input.insert("\u{8}H"));
        assert_eq!(input.text, "Hélo");
        assert!(input.move_cursor(Key::End));
        assert!(!input.delete());
        assert_eq!(input.cursor, 4);
    }

    #[test]
    fn test_max_length() {
        let mut input = TextInput::new(Some(3));
        assert!(input.insert("abcdef"));
        assert_eq!(input.text, "abc");
        assert!(!input.insert("x"));
        assert!(!input.insert(""));
    }

    #[test]
    fn test_stale_cursor_after_external_edit() {
        let mut input = TextInput::new(None);
        assert!(input.insert("hello"));
        input.text.truncate(2);

        assert!(input.backspace());
        assert_eq!((input.text.as_str(), input.cursor), ("h", 1));

        input.text.clear();
        assert!(!input.delete());
        assert!(!input.move_cursor(Key::Right));
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_host_clears_text_after_submit() {
        let mut world = World::new();
        world.add_system(TextInputSystem::new());
        let input = spawn_text_input(&mut world, Rect::ZERO, None);
        focus(&mut world, input);

        typed(&mut world, "hello");
        world.get_mut::<TextInput>(input).unwrap().text.clear();

        key(&mut world, Key::Backspace);
        key(&mut world, Key::Delete);
        key(&mut world, Key::Right);
        assert_eq!(text(&world, input), (String::new(), 0));

        typed(&mut world, "ok");
        assert_eq!(text(&world, input), ("ok".to_string(), 2));
    }

    #[test]
    fn test_only_focused_input_receives_text() {
        let mut world = World::new();
        world.add_system(TextInputSystem::new());
        let a = spawn_text_input(&mut world, Rect::new(0.0, 0.0, 100.0, 20.0), None);
        let b = spawn_text_input(&mut world, Rect::new(0.0, 30.0, 100.0, 20.0), None);

        typed(&mut world, "lost");
        assert_eq!(text(&world, a).0, "");

        world.send(PointerPressed {
            button: MouseButton::Left,
            x: 10.0,
            y: 35.0,
        });
        assert_eq!(focused_input(&world), Some(b));
        typed(&mut world, "hi");
        assert_eq!(text(&world, b), ("hi".to_string(), 2));
        assert_eq!(text(&world, a).0, "");

        assert!(focus(&mut world, a));
        assert!(!world.has::<Focused>(b));
        assert!(!focus(&mut world, Entity::NULL));
        assert_eq!(focused_input(&world), Some(a));

        world.send(PointerPressed {
            button: MouseButton::Left,
            x: 500.0,
            y: 500.0,
        });
        assert_eq!(focused_input(&world), None);
    }

    #[test]
    fn test_change_and_submit_events() {
        let mut world = World::new();
        world.add_system(TextInputSystem::new());
        let input = spawn_text_input(&mut world, Rect::ZERO, Some(5));
        focus(&mut world, input);

        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = Rc::clone(&log);
            world.subscribe(move |_: &mut World, event: &TextChanged| log.borrow_mut().push(format!("changed {}", event.text)));
        }
        {
            let log = Rc::clone(&log);
            world.subscribe(move |_: &mut World, event: &TextSubmitted| log.borrow_mut().push(format!("submitted {}", event.text)));
        }

        typed(&mut world, "abc");
        key(&mut world, Key::Backspace);
        key(&mut world, Key::Left);
        key(&mut world, Key::Delete);
        key(&mut world, Key::Delete);
        key(&mut world, Key::Enter);

        assert_eq!(
            *log.borrow(),
            vec!["changed abc", "changed ab", "changed a", "submitted a"]
        );
        assert_eq!(text(&world, input), ("a".to_string(), 1));

        key(&mut world, Key::Escape);
        assert_eq!(focused_input(&world), None);
    }
}
