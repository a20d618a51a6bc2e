//! keyrelay CLI
//!
//! Stores named keystroke chains and replays them on an emulated keyboard.

use anyhow::Context as _;
use clap::Parser;
use keyrelay::{ChainStore, Config, JsonFileStore, SharedStore};
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let printer = Printer {
        timestamps: cli.timestamps,
        probes: cli.probes,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    debug!("config: {}", config_path.display());

    match cli.command {
        // === Interpreter ===
        Commands::Interpret { line } => commands::interpret::interpret(&config, &line)?,
        Commands::Keys => commands::interpret::key_names(&config)?,

        // === Chain store ===
        Commands::Save {
            name,
            commands: blob,
            file,
        } => {
            let store = open_store(&config, cli.store.as_deref())?;
            commands::chains::save(&store, &name, blob.as_deref(), file.as_deref())?;
        }
        Commands::List => {
            let store = open_store(&config, cli.store.as_deref())?;
            commands::chains::list(&store)?;
        }
        Commands::Show { name } => {
            let store = open_store(&config, cli.store.as_deref())?;
            commands::chains::show(&store, &name)?;
        }
        Commands::Delete { name } => {
            let store = open_store(&config, cli.store.as_deref())?;
            commands::chains::delete(&store, &name)?;
        }

        // === Setup ===
        Commands::InitConfig { force } => {
            commands::setup::init_config(&config, &config_path, force)?;
        }

        // === Output ===
        Commands::Type { text } => {
            let ctx = context(config, cli.store.as_deref(), printer)?;
            commands::output::type_text(&ctx, &text).await?;
        }
        Commands::Execute { line } => {
            let ctx = context(config, cli.store.as_deref(), printer)?;
            commands::output::execute(&ctx, &line).await?;
        }
        Commands::Run { name } => {
            let ctx = context(config, cli.store.as_deref(), printer)?;
            commands::output::run(&ctx, &name).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let directive = if verbose {
        "keyrelay=debug"
    } else {
        "keyrelay=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Open the chain store, seeding presets on the first run
fn open_store(config: &Config, override_path: Option<&Path>) -> anyhow::Result<SharedStore> {
    let path = override_path.map_or_else(|| config.store_path(), Path::to_path_buf);
    let mut store = ChainStore::open(JsonFileStore::new(&path))
        .with_context(|| format!("opening chain store {}", path.display()))?;
    store.seed(config.preset_chains());
    Ok(store.into_shared())
}

/// Sink output flags
#[derive(Clone, Copy)]
struct Printer {
    timestamps: bool,
    probes: bool,
}

fn context(
    config: Config,
    store_path: Option<&Path>,
    printer: Printer,
) -> anyhow::Result<commands::Context> {
    let store = open_store(&config, store_path)?;
    Ok(commands::Context {
        config,
        store,
        timestamps: printer.timestamps,
        probes: printer.probes,
    })
}
