//! Command handlers for the CLI application.
//!
//! - `interpret`: dry runs and key-name listing (no sink involved)
//! - `output`: type, execute, run (queued through the executor)
//! - `chains`: chain store commands (save, list, show, delete)
//! - `setup`: config file creation

pub mod chains;
pub mod interpret;
pub mod output;
pub mod setup;

use keyrelay::{CancelToken, Config, SharedStore};
use tracing::warn;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Everything a store-backed command needs
pub struct Context {
    pub config: Config,
    pub store: SharedStore,
    /// Prefix sink output with elapsed milliseconds
    pub timestamps: bool,
    /// Print connection checks too
    pub probes: bool,
}

/// Cancel the running request on Ctrl-C.
pub fn setup_interrupt_handler(token: CancelToken) {
    if let Err(e) = ctrlc::set_handler(move || token.cancel()) {
        warn!("Ctrl-C handler not installed: {e}");
    }
}
