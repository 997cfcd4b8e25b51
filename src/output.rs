//! Terminal output formatting for dagdeploy.
//!
//! Consistent, colored output for every pipeline stage. Plain `println!`
//! with ANSI codes; nothing here buffers or logs.

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
}

pub use colors::*;

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{RED}{BOLD}Error:{RESET} {}", msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    println!("{YELLOW}Warning:{RESET} {}", msg);
}

/// Print info about what will happen next.
pub fn print_action(msg: &str) {
    println!("{CYAN}→{RESET} {}", msg);
}

/// Print the config file being used for defaults.
pub fn print_config_source(path: &std::path::Path) {
    println!("{GRAY}Using config file:{RESET} {}", path.display());
}

/// Print the commit resolved for deployment.
pub fn print_commit_resolved(short_hash: &str, summary: &str) {
    println!(
        "{GREEN}Found commit{RESET} {BOLD}{}{RESET} ({})",
        short_hash, summary
    );
}

/// Print the manifest entry that was updated.
pub fn print_manifest_updated(dag_name: &str, old_hash: &str, new_hash: &str) {
    println!(
        "{GREEN}Updated{RESET} {}: {GRAY}{}{RESET} -> {BOLD}{}{RESET}",
        dag_name, old_hash, new_hash
    );
}

/// Print the deploy branch that was created.
pub fn print_branch_created(branch: &str) {
    println!("{GREEN}Created branch:{RESET} {}", branch);
}

/// Print a status message when pushing branch to remote.
pub fn print_pushing_branch(branch: &str) {
    println!("{CYAN}Pushing branch '{}'...{RESET}", branch);
}

/// Print a success message when branch push completes.
pub fn print_push_success() {
    println!("{GREEN}Branch pushed successfully.{RESET}");
}

/// Print a prominent success message for a created PR with its URL.
pub fn print_pr_success(url: &str) {
    println!();
    println!("{GREEN}{BOLD}╔════════════════════════════════════════════════════════╗{RESET}");
    println!("{GREEN}{BOLD}║  ✓ Deployment Pull Request Created                     ║{RESET}");
    println!("{GREEN}{BOLD}╚════════════════════════════════════════════════════════╝{RESET}");
    println!();
    println!("{GREEN}{BOLD}  {}{RESET}", url);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Output helpers must not panic on arbitrary input.
    #[test]
    fn test_print_helpers_smoke() {
        print_warning("a warning");
        print_action("doing a thing");
        print_commit_resolved("abc123", "Fix install dag (#4655)");
        print_manifest_updated("install", "abc", "def");
        print_branch_created("deploy-test-install-4655");
        print_pushing_branch("deploy-test-install-4655");
        print_push_success();
        print_pr_success("https://github.com/org/airflow/pull/1");
    }
}
