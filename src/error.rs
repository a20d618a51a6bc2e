//! Error types for the chain engine

use keyrelay_hid::SinkError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from chain persistence
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid chain file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode chains: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Why a chain or line did not run to completion
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Chain not found: {0}")]
    NotFound(String),

    #[error("HID sink not connected")]
    SinkUnavailable,

    #[error("HID sink disconnected after {completed_lines} line(s)")]
    Disconnected { completed_lines: usize },

    #[error("Cancelled after {completed_lines} line(s)")]
    Cancelled { completed_lines: usize },

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Errors handing a request to the executor
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Executor busy: request queue is full")]
    Busy,

    #[error("Executor stopped")]
    Closed,

    #[error(transparent)]
    Run(#[from] RunError),
}
