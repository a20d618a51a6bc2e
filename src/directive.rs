//! Command-line parser.
//!
//! Turns one command line into a [`Directive`]. Parsing never fails:
//! anything that is not a well-formed bracket directive is literal text.
//!
//! # Syntax
//!
//! ```text
//! Hello world      → type the text
//! {enter}          → press a named key
//! {ctrl+shift}+z   → modifier combo with a single key
//! {meta}+Safari    → modifiers, then type the text
//! {ctrl}           → modifiers only (held briefly, then released)
//! {oops            → no closing brace: typed literally, then released
//! ```

use keyrelay_hid::{Modifier, ModifierSet};
use tracing::debug;

use crate::split;

/// What follows the modifiers of a bracket directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trailing {
    /// Exactly one character after the closing brace.
    SingleChar(char),
    /// More than one character after the closing brace.
    Text(String),
    /// Non-modifier word inside the braces (case-folded).
    NamedKey(String),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Bracket {
        modifiers: ModifierSet,
        trailing: Option<Trailing>,
    },
    /// Plain text line.
    Literal(String),
    /// Starts with `{` but has no closing brace; typed as-is, then released.
    Unterminated(String),
}

/// Map a case-folded directive token to a modifier.
pub fn modifier_token(token: &str) -> Option<Modifier> {
    match token {
        "ctrl" | "control" => Some(Modifier::Ctrl),
        "shift" => Some(Modifier::Shift),
        "alt" => Some(Modifier::Alt),
        "meta" | "cmd" | "gui" => Some(Modifier::Meta),
        _ => None,
    }
}

impl Directive {
    /// Parse a single command line. Returns `None` for an empty line.
    pub fn parse(line: &str) -> Option<Self> {
        if line.is_empty() {
            return None;
        }

        let Some(rest) = line.strip_prefix('{') else {
            return Some(Directive::Literal(line.to_string()));
        };

        let Some(close) = rest.find('}') else {
            debug!("unterminated directive, typing literally: {line:?}");
            return Some(Directive::Unterminated(line.to_string()));
        };

        let body = rest[..close].to_lowercase();
        let after = &rest[close + 1..];
        let trailing = after.strip_prefix('+').unwrap_or(after);

        let mut modifiers = ModifierSet::empty();
        let mut named_key: Option<String> = None;
        for token in split::segments(&body, &['+']) {
            match modifier_token(token) {
                Some(m) => modifiers.insert(m),
                None => {
                    // Several key words in one directive: the last one wins
                    if let Some(previous) = named_key.replace(token.to_string()) {
                        debug!("directive {line:?}: key {token:?} replaces {previous:?}");
                    }
                }
            }
        }

        let mut chars = trailing.chars();
        let trailing = match (chars.next(), chars.next()) {
            (None, _) => named_key.map(Trailing::NamedKey),
            (Some(c), None) => Some(Trailing::SingleChar(c)),
            (Some(_), Some(_)) => Some(Trailing::Text(trailing.to_string())),
        };

        Some(Directive::Bracket {
            modifiers,
            trailing,
        })
    }
}
