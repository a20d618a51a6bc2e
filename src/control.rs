//! Request hand-off between the control surface and the executor.
//!
//! Control requests go through a bounded FIFO queue to a single executor
//! task that owns the sink, so at most one request touches the keyboard at a
//! time and requests run in arrival order. A full queue rejects new requests
//! with [`ControlError::Busy`] instead of overwriting pending ones.
//!
//! Chain CRUD does not queue: it goes straight to the shared store.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chain::{Chain, SharedStore};
use crate::error::{ControlError, RunError};
use crate::runner::{CancelToken, ChainRunner, Completed};

/// Executor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOptions {
    /// Pending requests allowed besides the one executing
    pub queue_capacity: usize,
    /// Scheduling tick: connection polling and deferred-request re-checks
    pub tick: Duration,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            queue_capacity: 4,
            tick: Duration::from_millis(10),
        }
    }
}

/// A request for keyboard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Type text verbatim
    TypeText(String),
    /// Interpret and execute one command line
    Execute(String),
    /// Run a stored chain by name
    RunChain(String),
}

pub type Reply = Result<Completed, RunError>;

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Reply>,
}

/// Cloneable entry point for control surfaces.
#[derive(Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<Envelope>,
    store: SharedStore,
    cancel: CancelToken,
}

impl ControlHandle {
    /// Queue a request. The receiver yields its outcome once executed.
    pub fn submit(&self, request: Request) -> Result<oneshot::Receiver<Reply>, ControlError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .try_send(Envelope { request, reply })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ControlError::Busy,
                mpsc::error::TrySendError::Closed(_) => ControlError::Closed,
            })?;
        Ok(rx)
    }

    /// Queue a request and wait for its outcome.
    pub async fn execute(&self, request: Request) -> Result<Completed, ControlError> {
        let rx = self.submit(request)?;
        let reply = rx.await.map_err(|_| ControlError::Closed)?;
        Ok(reply?)
    }

    pub async fn type_text(&self, text: &str) -> Result<Completed, ControlError> {
        self.execute(Request::TypeText(text.to_string())).await
    }

    pub async fn execute_line(&self, line: &str) -> Result<Completed, ControlError> {
        self.execute(Request::Execute(line.to_string())).await
    }

    pub async fn run_chain(&self, name: &str) -> Result<Completed, ControlError> {
        self.execute(Request::RunChain(name.to_string())).await
    }

    /// Create or replace a chain from a free-text blob.
    pub fn save_chain(&self, name: &str, blob: &str) -> Chain {
        self.store.write().save(name, blob).clone()
    }

    pub fn get_chain(&self, name: &str) -> Option<Chain> {
        self.store.read().get(name).cloned()
    }

    pub fn list_chains(&self) -> Vec<Chain> {
        self.store.read().list().to_vec()
    }

    pub fn delete_chain(&self, name: &str) -> bool {
        self.store.write().delete(name)
    }

    /// Cancel whatever request is executing right now.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token for cancelling from outside the runtime (signal handlers).
    /// Holding it does not keep the executor alive.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

/// Start the executor task on the current tokio runtime.
pub fn spawn_executor(
    runner: ChainRunner,
    store: SharedStore,
    options: ControlOptions,
) -> (ControlHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));
    let cancel = CancelToken::new();
    let executor = Executor {
        rx,
        runner,
        store: store.clone(),
        cancel: cancel.clone(),
        tick: options.tick,
        connected: None,
    };
    let task = tokio::spawn(executor.run());
    (ControlHandle { tx, store, cancel }, task)
}

struct Executor {
    rx: mpsc::Receiver<Envelope>,
    runner: ChainRunner,
    store: SharedStore,
    cancel: CancelToken,
    tick: Duration,
    /// Last observed sink state, for transition logging
    connected: Option<bool>,
}

impl Executor {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                envelope = self.rx.recv() => {
                    let Some(Envelope { request, reply }) = envelope else {
                        break;
                    };
                    self.cancel.reset();
                    let outcome = self.handle(request).await;
                    if reply.send(outcome).is_err() {
                        debug!("request submitter went away before the reply");
                    }
                }
                _ = ticker.tick() => self.observe_connection(),
            }
        }
        debug!("executor stopped: all handles dropped");
    }

    async fn handle(&mut self, request: Request) -> Reply {
        self.observe_connection();
        match request {
            Request::RunChain(name) => self.runner.run(&self.store, &name, &self.cancel).await,
            Request::TypeText(text) => {
                self.wait_for_sink().await?;
                self.runner.type_text(&text)
            }
            Request::Execute(line) => {
                self.wait_for_sink().await?;
                self.runner
                    .run_lines("execute", std::slice::from_ref(&line), &self.cancel)
                    .await
            }
        }
    }

    /// Defer until the sink is connected, re-checking every tick.
    async fn wait_for_sink(&mut self) -> Result<(), RunError> {
        let mut deferred = false;
        while !self.runner.sink().is_connected() {
            if !deferred {
                info!("HID sink not connected, deferring request");
                deferred = true;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.tick) => {}
                _ = self.cancel.cancelled() => {
                    return Err(RunError::Cancelled { completed_lines: 0 });
                }
            }
        }
        if deferred {
            self.observe_connection();
        }
        Ok(())
    }

    fn observe_connection(&mut self) {
        let now = self.runner.sink().is_connected();
        match self.connected.replace(now) {
            Some(before) if before == now => {}
            Some(_) if now => info!("HID host connected"),
            Some(_) => warn!("HID host disconnected"),
            None => debug!("HID host connected: {now}"),
        }
    }
}
