//! HID sink abstraction for keyrelay
//!
//! A sink is the capability that turns primitive keyboard actions into real
//! emulated key events. The interpreter and runner only ever talk to the
//! [`HidSink`] trait; backends live behind it:
//!
//! - [`RecordingSink`] keeps every call in memory (tests, dry runs)
//! - [`PrinterSink`] is middleware that prints each call and forwards it

pub mod error;
pub mod printer;
pub mod recording;
pub mod types;

pub use error::SinkError;
pub use printer::{PrinterConfig, PrinterSink};
pub use recording::{RecordingSink, SinkEvent};
pub use types::{mods, KeyCode, Modifier, ModifierSet, ParseKeyCodeError};

use std::sync::Arc;

/// The core sink trait - every keyboard backend implements this
///
/// Calls are synchronous and expected to block for at most a small bounded
/// time. Connection lifecycle belongs to the backend; callers only query it.
pub trait HidSink: Send + Sync {
    /// Whether a host is currently connected to the emulated keyboard
    fn is_connected(&self) -> bool;

    /// Press and hold a key until the next [`release_all`](HidSink::release_all)
    fn press(&self, key: KeyCode) -> Result<(), SinkError>;

    /// Release every held key and modifier
    fn release_all(&self) -> Result<(), SinkError>;

    /// Type a run of text (press/release per character, handled by the backend)
    fn type_text(&self, text: &str) -> Result<(), SinkError>;
}

impl<T: HidSink + ?Sized> HidSink for Arc<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn press(&self, key: KeyCode) -> Result<(), SinkError> {
        (**self).press(key)
    }

    fn release_all(&self) -> Result<(), SinkError> {
        (**self).release_all()
    }

    fn type_text(&self, text: &str) -> Result<(), SinkError> {
        (**self).type_text(text)
    }
}
