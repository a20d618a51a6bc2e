//! Key identifiers shared between the interpreter and sinks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Modifier bitmask constants.
///
/// Bit order matches the first byte of a standard HID keyboard report
/// (left-hand modifiers, usage 0xE0-0xE3).
pub mod mods {
    pub const CTRL: u8 = 0x01;
    pub const SHIFT: u8 = 0x02;
    pub const ALT: u8 = 0x04;
    pub const META: u8 = 0x08;
}

/// A modifier key held concurrently with another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl Modifier {
    /// All modifiers in press order.
    pub const ALL: [Modifier; 4] = [
        Modifier::Ctrl,
        Modifier::Shift,
        Modifier::Alt,
        Modifier::Meta,
    ];

    /// Bitmask bit for this modifier.
    pub fn bit(self) -> u8 {
        match self {
            Modifier::Ctrl => mods::CTRL,
            Modifier::Shift => mods::SHIFT,
            Modifier::Alt => mods::ALT,
            Modifier::Meta => mods::META,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Alt => "Alt",
            Modifier::Meta => "Meta",
        }
    }
}

/// Set of modifiers, stored as a bitmask.
///
/// Iteration always yields ctrl, shift, alt, meta in that order regardless of
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierSet(u8);

impl ModifierSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(|m| self.contains(*m))
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = ModifierSet::empty();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Modifier::name).collect();
        write!(f, "{}", names.join("+"))
    }
}

/// Abstract key identifier handed to a [`HidSink`](crate::HidSink).
///
/// Printable keys are carried as characters; translating them into platform
/// scan codes is the sink's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Modifier(Modifier),
}

impl KeyCode {
    /// Canonical display name (`"Enter"`, `"Space"`, `"a"`).
    pub fn name(&self) -> String {
        match self {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Escape => "Escape".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Modifier(m) => m.name().to_string(),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Error for parsing a [`KeyCode`] from its name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key: \"{0}\"")]
pub struct ParseKeyCodeError(pub String);

impl FromStr for KeyCode {
    type Err = ParseKeyCodeError;

    /// Accepts canonical names case-insensitively, or any single character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(KeyCode::Char(c));
        }

        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(KeyCode::Char(' ')),
            "enter" => Ok(KeyCode::Enter),
            "tab" => Ok(KeyCode::Tab),
            "escape" => Ok(KeyCode::Escape),
            "backspace" => Ok(KeyCode::Backspace),
            "left" => Ok(KeyCode::Left),
            "right" => Ok(KeyCode::Right),
            "up" => Ok(KeyCode::Up),
            "down" => Ok(KeyCode::Down),
            "ctrl" => Ok(KeyCode::Modifier(Modifier::Ctrl)),
            "shift" => Ok(KeyCode::Modifier(Modifier::Shift)),
            "alt" => Ok(KeyCode::Modifier(Modifier::Alt)),
            "meta" => Ok(KeyCode::Modifier(Modifier::Meta)),
            _ => Err(ParseKeyCodeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for KeyCode {
    type Error = ParseKeyCodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<KeyCode> for String {
    fn from(key: KeyCode) -> Self {
        key.name()
    }
}

impl From<Modifier> for KeyCode {
    fn from(m: Modifier) -> Self {
        KeyCode::Modifier(m)
    }
}
