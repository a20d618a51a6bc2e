//! Sink error types

use thiserror::Error;

/// Errors that can occur while driving a HID sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("HID write failed: {0}")]
    Write(String),
}
