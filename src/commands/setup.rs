//! Setup command handlers.

use std::path::Path;

use anyhow::bail;
use keyrelay::Config;

use super::CommandResult;

/// Write `config` to `path`, refusing to replace an existing file unless forced
pub fn init_config(config: &Config, path: &Path, force: bool) -> CommandResult {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config.save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
