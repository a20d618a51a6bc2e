//! Configuration file handling
//!
//! Everything is optional; a missing file yields [`Config::default`].
//!
//! ```toml
//! store_path = "/home/me/.local/share/keyrelay/chains.json"
//!
//! [timing]
//! key_delay_ms = 20
//! line_delay_ms = 100
//!
//! [key_names]
//! del = "Backspace"
//!
//! [[presets]]
//! name = "next-tab"
//! commands = "{meta+right}"
//! ```

use keyrelay_hid::KeyCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chain::Chain;
use crate::control::ControlOptions;
use crate::interpreter::{Interpreter, Timing};
use crate::key_name::KeyNameTable;
use crate::runner::RunnerOptions;

/// Delays, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "default_key_delay")]
    pub key_delay_ms: u64,
    #[serde(default = "default_idle_delay")]
    pub idle_delay_ms: u64,
    #[serde(default = "default_line_delay")]
    pub line_delay_ms: u64,
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
}

fn default_key_delay() -> u64 {
    20
}
fn default_idle_delay() -> u64 {
    100
}
fn default_line_delay() -> u64 {
    100
}
fn default_tick() -> u64 {
    10
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            key_delay_ms: default_key_delay(),
            idle_delay_ms: default_idle_delay(),
            line_delay_ms: default_line_delay(),
            tick_ms: default_tick(),
        }
    }
}

/// Executor queue settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_true")]
    pub abort_on_disconnect: bool,
}

fn default_queue_capacity() -> usize {
    4
}
fn default_true() -> bool {
    true
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            abort_on_disconnect: true,
        }
    }
}

/// Chain seeded into a store that was never written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresetChain {
    pub name: String,
    /// Free-text blob, split like a saved chain
    pub commands: String,
}

/// Complete keyrelay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Chain collection file; defaults to the platform data dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub control: ControlConfig,
    /// Extra or overriding directive key names
    #[serde(default)]
    pub key_names: BTreeMap<String, KeyCode>,
    #[serde(default)]
    pub presets: Vec<PresetChain>,
}

impl Config {
    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyrelay")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Chain store location, falling back to the platform data dir
    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("keyrelay")
                .join("chains.json")
        })
    }

    /// Default key names plus the configured ones
    pub fn key_names(&self) -> KeyNameTable {
        KeyNameTable::default().with_names(self.key_names.iter().map(|(n, k)| (n, *k)))
    }

    /// Interpreter with the configured key names and delays
    pub fn interpreter(&self) -> Interpreter {
        Interpreter::new(self.key_names(), self.interpreter_timing())
    }

    pub fn interpreter_timing(&self) -> Timing {
        Timing {
            key_delay: Duration::from_millis(self.timing.key_delay_ms),
            idle_delay: Duration::from_millis(self.timing.idle_delay_ms),
        }
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            line_delay: Duration::from_millis(self.timing.line_delay_ms),
            abort_on_disconnect: self.control.abort_on_disconnect,
        }
    }

    pub fn control_options(&self) -> ControlOptions {
        ControlOptions {
            queue_capacity: self.control.queue_capacity,
            tick: Duration::from_millis(self.timing.tick_ms.max(1)),
        }
    }

    pub fn preset_chains(&self) -> Vec<Chain> {
        self.presets
            .iter()
            .map(|p| Chain::from_blob(p.name.clone(), &p.commands))
            .collect()
    }
}
