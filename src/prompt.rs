use std::io::{self, Write};

use crate::output::{CYAN, GRAY, RESET};

/// Ask a yes/no question and return the user's choice
pub fn confirm(question: &str, default: bool) -> bool {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    print!("{CYAN}?{RESET} {} {GRAY}{}{RESET} ", question, hint);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return default;
    }

    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}
