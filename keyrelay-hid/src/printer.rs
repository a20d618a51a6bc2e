//! PrinterSink middleware for monitoring sink traffic
//!
//! Wraps any [`HidSink`] and prints every call passing through it before
//! forwarding. Used by the CLI so a dry run shows exactly what a real
//! keyboard would receive.
//!
//! # Example
//!
//! ```ignore
//! use keyrelay_hid::{PrinterConfig, PrinterSink, RecordingSink};
//!
//! let sink = PrinterSink::wrap(Arc::new(RecordingSink::new()), PrinterConfig::default());
//! sink.press(KeyCode::Enter)?; // prints "↓Enter"
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::{HidSink, KeyCode, SinkError};

/// Configuration for the PrinterSink
#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    /// Prefix each line with milliseconds since the sink was created
    pub show_timestamps: bool,
    /// Also print connectivity probes
    pub show_probes: bool,
}

impl PrinterConfig {
    pub fn with_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    pub fn with_probes(mut self, show: bool) -> Self {
        self.show_probes = show;
        self
    }
}

/// Sink middleware that prints all calls
pub struct PrinterSink {
    inner: Arc<dyn HidSink>,
    config: PrinterConfig,
    started: Instant,
    out: Mutex<Box<dyn Write + Send>>,
}

impl PrinterSink {
    /// Wrap a sink, printing to stdout
    pub fn wrap(inner: Arc<dyn HidSink>, config: PrinterConfig) -> Arc<dyn HidSink> {
        Arc::new(Self::with_writer(inner, config, Box::new(std::io::stdout())))
    }

    /// Wrap a sink, printing to an arbitrary writer
    pub fn with_writer(
        inner: Arc<dyn HidSink>,
        config: PrinterConfig,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            inner,
            config,
            started: Instant::now(),
            out: Mutex::new(out),
        }
    }

    fn print(&self, line: &str) {
        debug!("sink: {line}");
        let mut out = self.out.lock();
        let result = if self.config.show_timestamps {
            let ms = self.started.elapsed().as_millis();
            writeln!(out, "[{ms:>6}ms] {line}")
        } else {
            writeln!(out, "{line}")
        };
        // A broken pipe on the monitor output must not stop keystrokes
        let _ = result.and_then(|_| out.flush());
    }
}

impl HidSink for PrinterSink {
    fn is_connected(&self) -> bool {
        let connected = self.inner.is_connected();
        if self.config.show_probes {
            self.print(if connected { "? connected" } else { "? disconnected" });
        }
        connected
    }

    fn press(&self, key: KeyCode) -> Result<(), SinkError> {
        self.print(&format!("↓{key}"));
        self.inner.press(key)
    }

    fn release_all(&self) -> Result<(), SinkError> {
        self.print("↑all");
        self.inner.release_all()
    }

    fn type_text(&self, text: &str) -> Result<(), SinkError> {
        self.print(&format!("type {text:?}"));
        self.inner.type_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Modifier, RecordingSink, SinkEvent};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    #[test]
    fn prints_and_forwards() {
        let inner = Arc::new(RecordingSink::new());
        let buf = SharedBuf::default();
        let sink = PrinterSink::with_writer(
            inner.clone(),
            PrinterConfig::default(),
            Box::new(buf.clone()),
        );

        sink.press(KeyCode::Modifier(Modifier::Meta)).unwrap();
        sink.release_all().unwrap();
        sink.type_text("Safari").unwrap();

        assert_eq!(buf.text(), "↓Meta\n↑all\ntype \"Safari\"\n");
        assert_eq!(
            inner.events(),
            vec![
                SinkEvent::Press(KeyCode::Modifier(Modifier::Meta)),
                SinkEvent::ReleaseAll,
                SinkEvent::Type("Safari".into()),
            ]
        );
    }

    #[test]
    fn probes_hidden_by_default() {
        let inner = Arc::new(RecordingSink::disconnected());
        let buf = SharedBuf::default();
        let sink =
            PrinterSink::with_writer(inner, PrinterConfig::default(), Box::new(buf.clone()));
        assert!(!sink.is_connected());
        assert!(buf.text().is_empty());
    }

    #[test]
    fn probes_printed_when_enabled() {
        let buf = SharedBuf::default();
        let sink = PrinterSink::with_writer(
            Arc::new(RecordingSink::new()),
            PrinterConfig::default().with_probes(true),
            Box::new(buf.clone()),
        );
        assert!(sink.is_connected());
        assert_eq!(buf.text(), "? connected\n");
    }

    #[test]
    fn inner_failure_is_forwarded() {
        let inner = Arc::new(RecordingSink::new());
        inner.fail_on(1);
        let buf = SharedBuf::default();
        let sink = PrinterSink::with_writer(inner, PrinterConfig::default(), Box::new(buf.clone()));
        assert!(matches!(sink.type_text("x"), Err(SinkError::Write(_))));
        assert_eq!(buf.text(), "type \"x\"\n");
    }

    #[test]
    fn timestamps_prefix_lines() {
        let buf = SharedBuf::default();
        let sink = PrinterSink::with_writer(
            Arc::new(RecordingSink::new()),
            PrinterConfig::default().with_timestamps(true),
            Box::new(buf.clone()),
        );
        sink.press(KeyCode::Enter).unwrap();
        let text = buf.text();
        assert!(text.starts_with('['));
        assert!(text.trim_end().ends_with("ms] ↓Enter"));
    }
}
