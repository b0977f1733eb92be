//! CLI console utilities

use colored::*;

/// Formatted terminal output
pub struct CliConsole;

impl CliConsole {
    pub const fn new() -> Self {
        Self
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
    }

    /// Print a `key: value` line
    pub fn field(&self, key: &str, value: &str) {
        println!("  {} {}", format!("{key}:").cyan(), value);
    }

    /// Print a list item
    pub fn item(&self, text: &str) {
        println!("  {} {}", "•".dimmed(), text);
    }

    /// Print a dimmed placeholder for an empty section
    pub fn none(&self) {
        println!("  {}", "(none)".dimmed());
    }
}
