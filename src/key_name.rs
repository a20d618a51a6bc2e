//! Named-key vocabulary used inside `{...}` directives.
//!
//! # Default names
//!
//! ```text
//! enter, return    → Enter
//! tab              → Tab
//! escape, esc      → Escape
//! backspace, bs    → Backspace
//! left/right/up/down → arrow keys
//! space            → ' '
//! ```
//!
//! The table is plain data: the `[key_names]` config section adds or
//! overrides entries. A name with no entry is not an error; the interpreter
//! falls back to typing the word.

use keyrelay_hid::KeyCode;
use std::collections::HashMap;

const DEFAULT_NAMES: &[(&str, KeyCode)] = &[
    ("enter", KeyCode::Enter),
    ("return", KeyCode::Enter),
    ("tab", KeyCode::Tab),
    ("escape", KeyCode::Escape),
    ("esc", KeyCode::Escape),
    ("backspace", KeyCode::Backspace),
    ("bs", KeyCode::Backspace),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("space", KeyCode::Char(' ')),
];

/// Case-insensitive name → key lookup table.
#[derive(Debug, Clone)]
pub struct KeyNameTable {
    names: HashMap<String, KeyCode>,
}

impl Default for KeyNameTable {
    fn default() -> Self {
        Self {
            names: DEFAULT_NAMES
                .iter()
                .map(|&(name, key)| (name.to_string(), key))
                .collect(),
        }
    }
}

impl KeyNameTable {
    /// Table with no names at all.
    pub fn empty() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Add or replace a name. Names are stored case-folded.
    pub fn insert(&mut self, name: &str, key: KeyCode) -> Option<KeyCode> {
        self.names.insert(name.trim().to_lowercase(), key)
    }

    /// Builder-style [`insert`](Self::insert) for many names.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = (S, KeyCode)>,
        S: AsRef<str>,
    {
        for (name, key) in names {
            self.insert(name.as_ref(), key);
        }
        self
    }

    /// Look a name up, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<KeyCode> {
        self.names.get(&name.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All entries, sorted by name.
    pub fn entries(&self) -> Vec<(&str, KeyCode)> {
        let mut entries: Vec<_> = self.names.iter().map(|(n, k)| (n.as_str(), *k)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary() {
        let table = KeyNameTable::default();
        assert_eq!(table.resolve("enter"), Some(KeyCode::Enter));
        assert_eq!(table.resolve("return"), Some(KeyCode::Enter));
        assert_eq!(table.resolve("tab"), Some(KeyCode::Tab));
        assert_eq!(table.resolve("esc"), Some(KeyCode::Escape));
        assert_eq!(table.resolve("escape"), Some(KeyCode::Escape));
        assert_eq!(table.resolve("bs"), Some(KeyCode::Backspace));
        assert_eq!(table.resolve("backspace"), Some(KeyCode::Backspace));
        assert_eq!(table.resolve("left"), Some(KeyCode::Left));
        assert_eq!(table.resolve("right"), Some(KeyCode::Right));
        assert_eq!(table.resolve("up"), Some(KeyCode::Up));
        assert_eq!(table.resolve("down"), Some(KeyCode::Down));
        assert_eq!(table.resolve("space"), Some(KeyCode::Char(' ')));
        assert_eq!(table.len(), 12);
    }

    #[test]
    fn lookup_is_case_folded() {
        let table = KeyNameTable::default();
        assert_eq!(table.resolve("ENTER"), Some(KeyCode::Enter));
        assert_eq!(table.resolve("Esc"), Some(KeyCode::Escape));
    }

    #[test]
    fn unknown_name_is_none() {
        let table = KeyNameTable::default();
        assert_eq!(table.resolve("safari"), None);
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn extend_and_override() {
        let table = KeyNameTable::default().with_names([
            ("Del", KeyCode::Backspace),
            ("tab", KeyCode::Char('\t')),
        ]);
        assert_eq!(table.resolve("del"), Some(KeyCode::Backspace));
        assert_eq!(table.resolve("tab"), Some(KeyCode::Char('\t')));
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn entries_sorted() {
        let table = KeyNameTable::empty()
            .with_names([("b", KeyCode::Tab), ("a", KeyCode::Enter)]);
        assert_eq!(
            table.entries(),
            vec![("a", KeyCode::Enter), ("b", KeyCode::Tab)]
        );
    }
}
