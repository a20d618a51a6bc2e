// keyrelay - Shared Library
// Command-chain language, interpreter, chain store and runner

pub mod action;
pub mod chain;
pub mod config;
pub mod control;
pub mod directive;
pub mod error;
pub mod interpreter;
pub mod key_name;
pub mod persist;
pub mod runner;
pub mod split;

pub use action::Action;
pub use chain::{Chain, ChainStore, SharedStore};
pub use config::Config;
pub use control::{spawn_executor, ControlHandle, ControlOptions, Request};
pub use directive::{Directive, Trailing};
pub use error::{ControlError, RunError, StoreError};
pub use interpreter::{Interpreter, Timing};
pub use key_name::KeyNameTable;
pub use persist::{ChainPersistence, JsonFileStore, MemoryPersistence};
pub use runner::{CancelToken, ChainRunner, Completed, RunnerOptions};

pub use keyrelay_hid as hid;
