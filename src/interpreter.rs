//! Command-line interpreter.
//!
//! Resolves a parsed [`Directive`] into the [`Action`] sequence the runner
//! dispatches to the sink. Every line starting with `{` ends with a delay and a
//! `ReleaseAll`, whichever branch produced its payload, so a directive can
//! never leave a modifier latched on the host.

use keyrelay_hid::KeyCode;
use std::time::Duration;
use tracing::debug;

use crate::action::Action;
use crate::directive::{Directive, Trailing};
use crate::key_name::KeyNameTable;

/// Delays inserted inside a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Settle time after modifier presses, key hold time, and the gap
    /// before the final release.
    pub key_delay: Duration,
    /// Hold time for a modifier-only directive like `{ctrl}`.
    pub idle_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            key_delay: Duration::from_millis(20),
            idle_delay: Duration::from_millis(100),
        }
    }
}

/// Turns command lines into primitive actions.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    names: KeyNameTable,
    timing: Timing,
}

impl Interpreter {
    pub fn new(names: KeyNameTable, timing: Timing) -> Self {
        Self { names, timing }
    }

    /// Interpret one command line. An empty line yields no actions.
    pub fn interpret(&self, line: &str) -> Vec<Action> {
        match Directive::parse(line) {
            Some(directive) => self.resolve(&directive),
            None => Vec::new(),
        }
    }

    /// Expand a parsed directive into actions.
    pub fn resolve(&self, directive: &Directive) -> Vec<Action> {
        let (modifiers, trailing) = match directive {
            Directive::Literal(text) => return vec![Action::TypeText(text.clone())],
            Directive::Unterminated(text) => {
                return vec![
                    Action::TypeText(text.clone()),
                    Action::Delay(self.timing.key_delay),
                    Action::ReleaseAll,
                ]
            }
            Directive::Bracket {
                modifiers,
                trailing,
            } => (modifiers, trailing),
        };

        let d = self.timing.key_delay;
        let mut actions: Vec<Action> = modifiers
            .iter()
            .map(|m| Action::PressKey(KeyCode::Modifier(m)))
            .collect();
        if !modifiers.is_empty() {
            actions.push(Action::Delay(d));
        }

        // Typed text must not run with modifiers still held
        let release_held = |actions: &mut Vec<Action>| {
            if !modifiers.is_empty() {
                actions.push(Action::ReleaseAll);
            }
        };

        match trailing {
            Some(Trailing::SingleChar(c)) => {
                actions.push(Action::PressKey(KeyCode::Char(*c)));
                actions.push(Action::Delay(d));
                actions.push(Action::ReleaseAll);
            }
            Some(Trailing::Text(text)) => {
                release_held(&mut actions);
                actions.push(Action::TypeText(text.clone()));
            }
            Some(Trailing::NamedKey(name)) => match self.names.resolve(name) {
                Some(key) => {
                    actions.push(Action::PressKey(key));
                    actions.push(Action::Delay(d));
                    actions.push(Action::ReleaseAll);
                }
                None => {
                    debug!("unknown key name {name:?}, typing it");
                    release_held(&mut actions);
                    actions.push(Action::TypeText(name.clone()));
                }
            },
            None => actions.push(Action::Delay(self.timing.idle_delay)),
        }

        actions.push(Action::Delay(d));
        actions.push(Action::ReleaseAll);
        actions
    }
}
