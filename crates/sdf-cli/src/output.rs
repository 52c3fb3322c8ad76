//! Output helpers shared by the subcommands.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a command result.
///
/// JSON mode writes the result as pretty JSON on stdout. Text mode leaves
/// rendering to the command.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Json = format {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}: failed to serialize result: {}", "Error".red().bold(), e),
        }
    }
}

/// Progress message. Goes to stderr so JSON on stdout stays parseable.
pub fn info(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => eprintln!("{} {}", "→".blue().bold(), message),
        OutputFormat::Json => {}
    }
}

pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => println!("{} {}", "✓".green().bold(), message),
        OutputFormat::Json => {}
    }
}
