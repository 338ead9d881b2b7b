//! # CLI Output Helpers
//!
//! Centralized output formatting and terminal input for the interactive
//! menu.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use console::{style, Term};

/// Print a success message
pub fn print_success(msg: &str) {
    println!(" {} {}", style("✓").green().bold(), msg);
}

/// Print an error message to stderr
pub fn print_error(msg: impl fmt::Display) {
    eprintln!(" {} Error: {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!(" {} {}", style("!").yellow().bold(), msg);
}

/// Clear the screen; harmless if the terminal refuses.
pub fn clear_screen() {
    let _ = Term::stdout().clear_screen();
}

/// Read one line from standard input. None on end of input.
pub fn input_line(title: &str) -> Option<String> {
    if !title.is_empty() {
        println!("{}", title);
    }
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Prompt for a typed value. None on end of input or parse failure; the
/// caller decides whether to re-prompt.
pub fn input<T: FromStr>(title: &str) -> Option<T> {
    input_line(title)?.trim().parse().ok()
}

/// Show a message and wait for Enter.
pub fn prompt(msg: &str) {
    if !msg.is_empty() {
        println!("{}", msg);
    }
    let _ = input_line("Press Enter to continue");
}

/// Ask a yes/no question.
pub fn confirm(question: &str) -> bool {
    matches!(
        input_line(&format!("{} (y/n)", question)).as_deref(),
        Some("y") | Some("Y") | Some("yes")
    )
}
