//! Chain runner.
//!
//! Executes command lines one after another: interpret, dispatch each action
//! to the sink, then wait the inter-line pacing delay. Delays are tokio
//! timers, so a long chain occupies only its own task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keyrelay_hid::HidSink;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::chain::SharedStore;
use crate::error::RunError;
use crate::interpreter::Interpreter;

/// Cooperative cancellation flag checked between lines and during delays.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag before starting the next request.
    pub fn reset(&self) {
        self.inner.cancelled.store(false, Ordering::SeqCst);
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    /// Chain name, or the request kind for ad-hoc lines
    pub label: String,
    pub lines: usize,
    pub actions: usize,
}

/// Runner behaviour knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Pause after every command line
    pub line_delay: Duration,
    /// Stop between lines when the sink reports it lost the host
    pub abort_on_disconnect: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            line_delay: Duration::from_millis(100),
            abort_on_disconnect: true,
        }
    }
}

/// Replays chains on a HID sink.
#[derive(Clone)]
pub struct ChainRunner {
    interpreter: Arc<Interpreter>,
    sink: Arc<dyn HidSink>,
    options: RunnerOptions,
}

impl ChainRunner {
    pub fn new(interpreter: Interpreter, sink: Arc<dyn HidSink>, options: RunnerOptions) -> Self {
        Self {
            interpreter: Arc::new(interpreter),
            sink,
            options,
        }
    }

    pub fn sink(&self) -> &Arc<dyn HidSink> {
        &self.sink
    }

    /// Run the chain called `name` from `store`.
    ///
    /// Fails without touching the sink when the chain does not exist or the
    /// sink is not connected.
    pub async fn run(
        &self,
        store: &SharedStore,
        name: &str,
        cancel: &CancelToken,
    ) -> Result<Completed, RunError> {
        // Snapshot so the store lock is not held across awaits
        let commands = store
            .read()
            .get(name)
            .map(|chain| chain.commands.clone())
            .ok_or_else(|| RunError::NotFound(name.to_string()))?;

        if !self.sink.is_connected() {
            return Err(RunError::SinkUnavailable);
        }

        info!("Running chain {name:?} ({} lines)", commands.len());
        let result = self.run_lines(name, &commands, cancel).await;
        match &result {
            Ok(done) => info!("Chain {name:?} finished ({} actions)", done.actions),
            Err(e) => warn!("Chain {name:?} stopped: {e}"),
        }
        result
    }

    /// Execute `lines` in order. Connectivity is the caller's concern for the
    /// first line; later lines are re-checked when `abort_on_disconnect` is set.
    pub async fn run_lines(
        &self,
        label: &str,
        lines: &[String],
        cancel: &CancelToken,
    ) -> Result<Completed, RunError> {
        let mut actions_sent = 0;

        for (index, line) in lines.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(self.abort(RunError::Cancelled {
                    completed_lines: index,
                }));
            }
            if index > 0 && self.options.abort_on_disconnect && !self.sink.is_connected() {
                return Err(self.abort(RunError::Disconnected {
                    completed_lines: index,
                }));
            }

            let actions = self.interpreter.interpret(line);
            debug!("line {index}: {line:?} -> {} actions", actions.len());
            for action in &actions {
                if let Err(e) = self.dispatch(action, cancel).await {
                    let e = match e {
                        RunError::Cancelled { .. } => RunError::Cancelled {
                            completed_lines: index,
                        },
                        other => other,
                    };
                    return Err(self.abort(e));
                }
            }
            actions_sent += actions.len();

            if self.pause(self.options.line_delay, cancel).await.is_err() {
                return Err(self.abort(RunError::Cancelled {
                    completed_lines: index + 1,
                }));
            }
        }

        Ok(Completed {
            label: label.to_string(),
            lines: lines.len(),
            actions: actions_sent,
        })
    }

    /// Type `text` verbatim, without interpretation.
    pub fn type_text(&self, text: &str) -> Result<Completed, RunError> {
        self.sink.type_text(text)?;
        Ok(Completed {
            label: "type".to_string(),
            lines: 1,
            actions: 1,
        })
    }

    /// Issue one action to the sink.
    pub async fn dispatch(&self, action: &Action, cancel: &CancelToken) -> Result<(), RunError> {
        match action {
            Action::PressKey(key) => self.sink.press(*key)?,
            Action::ReleaseAll => self.sink.release_all()?,
            Action::TypeText(text) => self.sink.type_text(text)?,
            Action::Delay(d) => self
                .pause(*d, cancel)
                .await
                .map_err(|_| RunError::Cancelled { completed_lines: 0 })?,
        }
        Ok(())
    }

    async fn pause(&self, duration: Duration, cancel: &CancelToken) -> Result<(), ()> {
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = cancel.cancelled() => Err(()),
        }
    }

    /// Best-effort release so an interrupted directive leaves nothing held.
    fn abort(&self, error: RunError) -> RunError {
        if let Err(e) = self.sink.release_all() {
            warn!("release after abort failed: {e}");
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainStore;
    use crate::persist::MemoryPersistence;
    use keyrelay_hid::{KeyCode, Modifier, RecordingSink, SinkError, SinkEvent};
    use pretty_assertions::assert_eq;

    fn setup(sink: Arc<RecordingSink>) -> (ChainRunner, SharedStore) {
        let store = ChainStore::open(MemoryPersistence::new()).unwrap().into_shared();
        let runner = ChainRunner::new(Interpreter::default(), sink, RunnerOptions::default());
        (runner, store)
    }

    #[tokio::test(start_paused = true)]
    async fn greet_scenario() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("greet", "Hello\n{enter}");

        let done = runner.run(&store, "greet", &CancelToken::new()).await.unwrap();
        assert_eq!(done.lines, 2);
        assert_eq!(done.actions, 6);
        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Type("Hello".into()),
                SinkEvent::Press(KeyCode::Enter),
                SinkEvent::ReleaseAll,
                SinkEvent::ReleaseAll,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_chain_has_no_side_effects() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        let err = runner.run(&store, "nope", &CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, RunError::NotFound(name) if name == "nope"));
        assert!(sink.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_when_disconnected() {
        let sink = Arc::new(RecordingSink::disconnected());
        let (runner, store) = setup(sink.clone());
        store.write().save("x", "abc");
        let err = runner.run(&store, "x", &CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, RunError::SinkUnavailable));
        sink.set_connected(true);
        assert!(sink.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn paces_lines() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("slow", "a;b;c");

        let start = tokio::time::Instant::now();
        runner.run(&store, "slow", &CancelToken::new()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn combo_delays_are_slept() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("redo", "{ctrl+shift}+z");

        let start = tokio::time::Instant::now();
        runner.run(&store, "redo", &CancelToken::new()).await.unwrap();
        // settle + hold + final gap + line pacing
        assert_eq!(start.elapsed(), Duration::from_millis(20 * 3 + 100));
        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Press(KeyCode::Modifier(Modifier::Ctrl)),
                SinkEvent::Press(KeyCode::Modifier(Modifier::Shift)),
                SinkEvent::Press(KeyCode::Char('z')),
                SinkEvent::ReleaseAll,
                SinkEvent::ReleaseAll,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn aborts_on_mid_chain_disconnect() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("long", "one;two;three");
        sink.disconnect_after(1);

        let err = runner.run(&store, "long", &CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, RunError::Disconnected { completed_lines: 1 }));
        assert_eq!(sink.events(), vec![SinkEvent::Type("one".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_abort_still_sends_release() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("long", "one;two");
        sink.disconnect_after(1);

        let err = runner.run(&store, "long", &CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, RunError::Disconnected { completed_lines: 1 }));
        // The typed line, then the abort release the sink dropped while offline
        assert_eq!(sink.calls(), 2);
        assert_eq!(sink.events(), vec![SinkEvent::Type("one".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn sink_failure_mid_directive_releases() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("copy", "{ctrl}+c;never");
        // Call 1 presses ctrl, call 2 (the `c`) fails
        sink.fail_on(2);

        let err = runner.run(&store, "copy", &CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, RunError::Sink(SinkError::Write(_))));
        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Press(KeyCode::Modifier(Modifier::Ctrl)),
                SinkEvent::ReleaseAll,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_blind_when_abort_disabled() {
        let sink = Arc::new(RecordingSink::new());
        let store = ChainStore::open(MemoryPersistence::new()).unwrap().into_shared();
        let runner = ChainRunner::new(
            Interpreter::default(),
            sink.clone(),
            RunnerOptions {
                abort_on_disconnect: false,
                ..RunnerOptions::default()
            },
        );
        store.write().save("long", "one;two;three");
        sink.disconnect_after(1);

        let done = runner.run(&store, "long", &CancelToken::new()).await.unwrap();
        assert_eq!(done.lines, 3);
        assert_eq!(sink.events().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_between_lines_and_releases() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("c", "first;second");
        let cancel = CancelToken::new();

        let task = {
            let runner = runner.clone();
            let store = store.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { runner.run(&store, "c", &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, RunError::Cancelled { completed_lines: 1 }));
        assert_eq!(
            sink.events(),
            vec![SinkEvent::Type("first".into()), SinkEvent::ReleaseAll]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_stops_before_first_line() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("c", "never");
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = runner.run(&store, "c", &cancel).await.unwrap_err();
        assert!(matches!(err, RunError::Cancelled { completed_lines: 0 }));
        assert_eq!(sink.events(), vec![SinkEvent::ReleaseAll]);

        cancel.reset();
        runner.run(&store, "c", &cancel).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn empty_chain_completes() {
        let sink = Arc::new(RecordingSink::new());
        let (runner, store) = setup(sink.clone());
        store.write().save("empty", " ; \n ");
        let done = runner.run(&store, "empty", &CancelToken::new()).await.unwrap();
        assert_eq!(done.lines, 0);
        assert!(sink.events().is_empty());
    }
}
