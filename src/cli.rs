// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keyrelay")]
#[command(author, version, about = "Replay keystroke chains on an emulated HID keyboard")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Chain store file (overrides the config file)
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Prefix sink output with elapsed time
    #[arg(long, global = true)]
    pub timestamps: bool,

    /// Also print every connection check made against the sink
    #[arg(long, global = true)]
    pub probes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Interpreter ===
    /// Show the actions a command line resolves to, without sending them
    #[command(visible_aliases = ["dry", "i"])]
    Interpret {
        /// Command line, e.g. "{ctrl+shift}+z"
        line: String,
    },

    /// List directive key names
    #[command(visible_alias = "names")]
    Keys,

    // === Output ===
    /// Type text verbatim
    #[command(visible_alias = "t")]
    Type {
        text: String,
    },

    /// Interpret and execute a single command line
    #[command(visible_aliases = ["exec", "x"])]
    Execute {
        line: String,
    },

    /// Run a stored chain
    #[command(visible_alias = "r")]
    Run {
        name: String,
    },

    // === Chain store ===
    /// Create or replace a chain
    #[command(visible_alias = "s")]
    Save {
        name: String,
        /// Commands separated by newlines or `;`
        #[arg(required_unless_present = "file")]
        commands: Option<String>,
        /// Read commands from a file instead
        #[arg(short, long, conflicts_with = "commands")]
        file: Option<PathBuf>,
    },

    /// List stored chains
    #[command(visible_aliases = ["ls", "l"])]
    List,

    /// Show a chain's command lines
    Show {
        name: String,
    },

    /// Delete a chain
    #[command(visible_aliases = ["rm", "del"])]
    Delete {
        name: String,
    },

    // === Setup ===
    /// Write the effective configuration to the config file
    #[command(visible_alias = "init")]
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
