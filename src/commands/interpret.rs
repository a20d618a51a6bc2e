//! Dry-run command handlers.

use super::CommandResult;
use keyrelay::action::{format_actions, leaves_released};
use keyrelay::{Config, Directive};
use tracing::debug;

/// Print the actions a single command line resolves to
pub fn interpret(config: &Config, line: &str) -> CommandResult {
    let interpreter = config.interpreter();
    debug!("parsed: {:?}", Directive::parse(line));

    let actions = interpreter.interpret(line);
    if actions.is_empty() {
        println!("(no actions)");
        return Ok(());
    }
    for (i, action) in actions.iter().enumerate() {
        println!("  {i:3}: {action}");
    }
    println!("\nSequence: {}", format_actions(&actions));
    if !leaves_released(&actions) {
        println!("Warning: keys are still held after this line");
    }
    Ok(())
}

/// List every directive key name and what it maps to
pub fn key_names(config: &Config) -> CommandResult {
    let table = config.key_names();
    println!("Key names ({}):", table.len());
    for (name, key) in table.entries() {
        println!("  {name:<12} {key}");
    }
    println!("\nModifiers: ctrl/control, shift, alt, meta/cmd/gui");
    Ok(())
}
