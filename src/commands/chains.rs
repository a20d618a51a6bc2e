//! Chain store command handlers.

use std::path::Path;

use anyhow::{bail, Context as _};
use keyrelay::SharedStore;

use super::CommandResult;

/// Create or replace a chain from an inline blob or a file
pub fn save(
    store: &SharedStore,
    name: &str,
    commands: Option<&str>,
    file: Option<&Path>,
) -> CommandResult {
    let blob = match (commands, file) {
        (_, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (Some(commands), None) => commands.to_string(),
        (None, None) => bail!("no commands given"),
    };
    if name.is_empty() {
        bail!("chain name must not be empty");
    }

    let mut store = store.write();
    let chain = store.save(name, &blob);
    println!("Saved '{}' ({} line(s))", chain.name, chain.commands.len());
    if !store.is_synced() {
        eprintln!("Warning: chain kept in memory only, the store file was not written");
    }
    Ok(())
}

/// List stored chains
pub fn list(store: &SharedStore) -> CommandResult {
    let store = store.read();
    if store.is_empty() {
        println!("No chains stored");
        return Ok(());
    }
    println!("Chains ({}):", store.len());
    for chain in store.list() {
        println!("  {:<20} {} line(s)", chain.name, chain.commands.len());
    }
    Ok(())
}

/// Print a chain's command lines in run order
pub fn show(store: &SharedStore, name: &str) -> CommandResult {
    let store = store.read();
    let Some(chain) = store.get(name) else {
        bail!("chain '{name}' not found");
    };
    println!("{}:", chain.name);
    for (i, line) in chain.commands.iter().enumerate() {
        println!("  {i:3}: {line}");
    }
    Ok(())
}

/// Delete a chain
pub fn delete(store: &SharedStore, name: &str) -> CommandResult {
    if !store.write().delete(name) {
        bail!("chain '{name}' not found");
    }
    println!("Deleted '{name}'");
    Ok(())
}
