//! In-memory sink that records every call

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{HidSink, KeyCode, SinkError};

/// One call observed by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Press(KeyCode),
    ReleaseAll,
    Type(String),
}

/// Sink that stores calls instead of emitting HID reports.
///
/// While disconnected, calls are accepted and silently dropped, the same way a
/// wireless keyboard stack discards reports with no host attached.
#[derive(Debug)]
pub struct RecordingSink {
    connected: AtomicBool,
    events: Mutex<Vec<SinkEvent>>,
    /// Drop the connection once this many events were recorded
    disconnect_after: Mutex<Option<usize>>,
    /// 1-based call number that fails with [`SinkError::Write`]
    fail_on: Mutex<Option<usize>>,
    calls: AtomicUsize,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    /// Create a connected sink
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
            disconnect_after: Mutex::new(None),
            fail_on: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a sink with no host attached
    pub fn disconnected() -> Self {
        let sink = Self::new();
        sink.set_connected(false);
        sink
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Simulate the host going away after `count` recorded events
    pub fn disconnect_after(&self, count: usize) {
        *self.disconnect_after.lock() = Some(count);
    }

    /// Make the `call`-th sink call (counting from 1) fail with a write error
    pub fn fail_on(&self, call: usize) {
        *self.fail_on.lock() = Some(call);
    }

    /// Calls received, including dropped and failed ones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Drain recorded events
    pub fn take_events(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, event: SinkEvent) -> Result<(), SinkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_on.lock() == Some(call) {
            return Err(SinkError::Write(format!("injected failure on call {call}")));
        }
        if !self.is_connected() {
            return Ok(());
        }
        let mut events = self.events.lock();
        events.push(event);
        if let Some(limit) = *self.disconnect_after.lock() {
            if events.len() >= limit {
                self.set_connected(false);
            }
        }
        Ok(())
    }
}

impl HidSink for RecordingSink {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn press(&self, key: KeyCode) -> Result<(), SinkError> {
        self.record(SinkEvent::Press(key))
    }

    fn release_all(&self) -> Result<(), SinkError> {
        self.record(SinkEvent::ReleaseAll)
    }

    fn type_text(&self, text: &str) -> Result<(), SinkError> {
        self.record(SinkEvent::Type(text.to_string()))
    }
}
