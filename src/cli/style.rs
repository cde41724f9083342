//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the escapes when the stream
//! is not a terminal.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Check mark used in success lines
pub const CHECK: &str = "✓";

/// Semantic styles for CLI output
pub trait Stylize {
    /// Green, for completed actions
    fn success(&self) -> String;
    /// Yellow, for problems the user should look at
    fn warn(&self) -> String;
    /// Dimmed, for secondary information
    fn muted(&self) -> String;
    /// Cyan, for identifiers such as PR numbers and branches
    fn accent(&self) -> String;
    /// Bold, for headings
    fn emphasis(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn success(&self) -> String {
        self.green().to_string()
    }

    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn emphasis(&self) -> String {
        self.bold().to_string()
    }
}

/// Styled marker for a boolean signal
pub fn flag(value: bool) -> String {
    if value {
        "yes".success()
    } else {
        "no".warn()
    }
}
