//! Primitive keyboard actions.

use keyrelay_hid::KeyCode;
use std::fmt;
use std::time::Duration;

/// The atomic unit of keyboard output. A directive resolves to an ordered list
/// of these; a shortcut is `Press(mod)… Press(key) ReleaseAll`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PressKey(KeyCode),
    ReleaseAll,
    TypeText(String),
    Delay(Duration),
}

impl Action {
    pub fn delay_ms(ms: u64) -> Self {
        Action::Delay(Duration::from_millis(ms))
    }

    pub fn is_delay(&self) -> bool {
        matches!(self, Action::Delay(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::PressKey(key) => write!(f, "↓{key}"),
            Action::ReleaseAll => write!(f, "↑all"),
            Action::TypeText(text) => write!(f, "type {text:?}"),
            Action::Delay(d) => write!(f, "+{}ms", d.as_millis()),
        }
    }
}

/// True when nothing is left held: no `PressKey` after the last `ReleaseAll`.
pub fn leaves_released(actions: &[Action]) -> bool {
    actions
        .iter()
        .rev()
        .take_while(|a| **a != Action::ReleaseAll)
        .all(|a| !matches!(a, Action::PressKey(_)))
}

/// Render a sequence as a comma-separated line, e.g. `↓Ctrl,+20ms,↓c,↑all`.
pub fn format_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyrelay_hid::Modifier;

    #[test]
    fn display() {
        assert_eq!(Action::PressKey(KeyCode::Enter).to_string(), "↓Enter");
        assert_eq!(Action::ReleaseAll.to_string(), "↑all");
        assert_eq!(Action::TypeText("hi".into()).to_string(), "type \"hi\"");
        assert_eq!(Action::delay_ms(20).to_string(), "+20ms");
    }

    #[test]
    fn format_sequence() {
        let actions = vec![
            Action::PressKey(KeyCode::Modifier(Modifier::Ctrl)),
            Action::delay_ms(20),
            Action::PressKey(KeyCode::Char('c')),
            Action::ReleaseAll,
        ];
        assert_eq!(format_actions(&actions), "↓Ctrl,+20ms,↓c,↑all");
    }

    #[test]
    fn released_state() {
        assert!(leaves_released(&[]));
        assert!(leaves_released(&[Action::TypeText("x".into())]));
        assert!(leaves_released(&[
            Action::PressKey(KeyCode::Tab),
            Action::ReleaseAll,
            Action::delay_ms(5),
        ]));
        assert!(!leaves_released(&[
            Action::ReleaseAll,
            Action::PressKey(KeyCode::Tab),
        ]));
    }
}
