//! Event model
//!
//! Identifiers and payloads carried by the [`EventBus`](crate::EventBus).
//! Native input (pointer, keyboard, quit) is translated into these types by the
//! window collaborator before it is broadcast.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

/// Event identifier
///
/// Either a static name (the built-in constants) or an owned name created at
/// runtime for application events.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(Cow<'static, str>);

impl EventId {
    pub const TEST_MESSAGE: EventId = EventId::from_static("event_test_message");
    /// Held-keys snapshot, broadcast once per logic tick
    pub const KEYS_PRESSED: EventId = EventId::from_static("event_keys_pressed");
    pub const QUIT: EventId = EventId::from_static("event_quit");
    pub const POINTER_DOWN: EventId = EventId::from_static("event_pointer_down");
    pub const POINTER_UP: EventId = EventId::from_static("event_pointer_up");
    pub const POINTER_MOTION: EventId = EventId::from_static("event_pointer_motion");
    pub const KEY_DOWN: EventId = EventId::from_static("event_key_down");
    pub const KEY_UP: EventId = EventId::from_static("event_key_up");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for EventId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for EventId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// An event payload delivered to handlers
#[derive(Clone, Debug)]
pub enum Event {
    Pointer(PointerEvent),
    Key(KeyEvent),
    /// Keys currently held down
    KeysPressed(KeySnapshot),
    Quit,
    /// Free-form text message
    Message(String),
    /// Application-defined payload
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Event {
    /// The identifier a native input event is broadcast under.
    ///
    /// Returns `None` for application payloads, which carry no implied id.
    pub fn native_id(&self) -> Option<EventId> {
        match self {
            Event::Pointer(pointer) => Some(match pointer.kind {
                PointerKind::Down => EventId::POINTER_DOWN,
                PointerKind::Up => EventId::POINTER_UP,
                PointerKind::Motion => EventId::POINTER_MOTION,
            }),
            Event::Key(key) => Some(if key.pressed {
                EventId::KEY_DOWN
            } else {
                EventId::KEY_UP
            }),
            Event::KeysPressed(_) => Some(EventId::KEYS_PRESSED),
            Event::Quit => Some(EventId::QUIT),
            Event::Message(_) | Event::Custom(_) => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerEvent> {
        match self {
            Event::Pointer(pointer) => Some(pointer),
            _ => None,
        }
    }

    pub fn as_keys(&self) -> Option<&KeySnapshot> {
        match self {
            Event::KeysPressed(keys) => Some(keys),
            _ => None,
        }
    }

    /// Downcast a [`Event::Custom`] payload
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Event::Custom(payload) => payload.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// Pointer phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Up,
    Motion,
}

/// A pointer event in screen space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    /// Button index (0 = primary); meaningless for motion
    pub button: u8,
}

impl PointerEvent {
    pub const fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            button: 0,
        }
    }

    pub const fn down(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Down, x, y)
    }

    pub const fn up(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Up, x, y)
    }

    pub const fn motion(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Motion, x, y)
    }

    pub fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }

    /// Same event at a different position
    pub fn moved_to(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// A single key transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn down(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            pressed: true,
        }
    }

    pub const fn up(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            pressed: false,
        }
    }
}

/// The set of keys held at one instant
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    held: FxHashSet<KeyCode>,
}

impl KeySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    /// Apply a key transition
    pub fn apply(&mut self, event: &KeyEvent) {
        if event.pressed {
            self.press(event.key);
        } else {
            self.release(event.key);
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held.iter().copied()
    }
}

impl FromIterator<KeyCode> for KeySnapshot {
    fn from_iter<I: IntoIterator<Item = KeyCode>>(iter: I) -> Self {
        Self {
            held: iter.into_iter().collect(),
        }
    }
}

/// Virtual key codes (platform-agnostic)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    // Alphanumeric keys
    pub const A: KeyCode = KeyCode(0x41);
    pub const D: KeyCode = KeyCode(0x44);
    pub const S: KeyCode = KeyCode(0x53);
    pub const W: KeyCode = KeyCode(0x57);

    // Special keys
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);

    // Arrow keys
    pub const LEFT: KeyCode = KeyCode(0x25);
    pub const UP: KeyCode = KeyCode(0x26);
    pub const RIGHT: KeyCode = KeyCode(0x27);
    pub const DOWN: KeyCode = KeyCode(0x28);

    pub const UNKNOWN: KeyCode = KeyCode(0);

    /// Key code for an ASCII letter or digit
    pub const fn from_ascii(c: u8) -> Self {
        KeyCode(c.to_ascii_uppercase() as u32)
    }
}

/// Keyboard modifier flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    bits: u8,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { bits: 0 };
    pub const SHIFT: u8 = 0b0001;
    pub const CTRL: u8 = 0b0010;
    pub const ALT: u8 = 0b0100;
    pub const META: u8 = 0b1000;

    pub const fn new(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0;
        if shift {
            bits |= Self::SHIFT;
        }
        if ctrl {
            bits |= Self::CTRL;
        }
        if alt {
            bits |= Self::ALT;
        }
        if meta {
            bits |= Self::META;
        }
        Self { bits }
    }

    pub const fn shift(&self) -> bool {
        self.bits & Self::SHIFT != 0
    }

    pub const fn ctrl(&self) -> bool {
        self.bits & Self::CTRL != 0
    }

    pub const fn alt(&self) -> bool {
        self.bits & Self::ALT != 0
    }

    pub const fn meta(&self) -> bool {
        self.bits & Self::META != 0
    }

    pub const fn any(&self) -> bool {
        self.bits != 0
    }
}
