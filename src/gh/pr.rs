//! PR creation through the GitHub CLI.

use std::path::Path;
use std::process::Command;

use crate::error::{DeployError, Result};

use super::format::DeployPr;

/// Check if the GitHub CLI (gh) is installed and available in PATH
pub fn is_gh_installed() -> bool {
    Command::new("gh")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check if the user is authenticated with GitHub CLI
pub fn is_gh_authenticated() -> bool {
    Command::new("gh")
        .args(["auth", "status"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Create the deployment pull request and return its URL.
///
/// The branch must already be pushed. No cleanup happens on failure; a
/// pushed branch with no PR is left for the user to inspect.
pub fn create_pull_request(repo: &Path, pr: &DeployPr) -> Result<String> {
    let output = Command::new("gh")
        .current_dir(repo)
        .args([
            "pr",
            "create",
            "--head",
            &pr.branch_name,
            "--base",
            &pr.base_branch,
            "--title",
            &pr.title,
            "--body",
            &pr.body,
        ])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DeployError::Hosting(format!(
            "Failed to create PR: {}",
            stderr.trim()
        )));
    }

    // gh prints the new PR's URL on stdout
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
